//! Board state, move execution, and capture logic.
//!
//! Points are indices 1..=size² (0 is the pass move), numbered from the
//! lower-left corner row by row. Stones live in [`Group`]s kept in a slot
//! arena indexed by point: the slot of a group is the point whose stone
//! founded it, `owner[p]` maps every occupied point to its group's slot,
//! and a merge redirects the absorbed stones' owner entries. This keeps
//! placement, capture, and liberty bookkeeping incremental — the playout
//! loop calls [`Board::play_in_sim`] tens of thousands of times per move
//! decision and never flood-fills.
//!
//! The committed game is an append-only history of points; [`Board::restore`]
//! rebuilds the exact position (occupancy, liberties, hash) by replaying
//! it, which is how simulations return the board to reality.

use std::fmt;

use thiserror::Error;

use crate::constants::{
    COORDINATES, HANDICAP13, HANDICAP19, HANDICAP9, MAXSIZE, MERCY_DIVISOR, PASS,
};
use crate::group::Group;
use crate::topology::Topology;
use crate::zobrist::Zobrist;

/// A point on the board: 1..=size², or [`PASS`].
pub type Point = usize;

/// Stone color. Black moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

impl Color {
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Index into per-color arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

/// Why a move was rejected. The board is unchanged after a rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("point is not empty")]
    Occupied,
    #[error("move retakes the ko")]
    Ko,
    #[error("move repeats a recent position")]
    Superko,
    #[error("move is suicide")]
    Suicide,
}

/// Requested board size is not supported. The previous size is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unsupported board size {0}")]
pub struct SizeError(pub usize);

pub struct Board {
    pub(crate) size: usize,
    pub(crate) size2: usize,
    komi: f32,
    handicap: usize,
    pub(crate) side: Color,
    pub(crate) ko_point: Point,
    /// 0 = empty, otherwise the slot of the owning group.
    pub(crate) owner: Vec<usize>,
    /// Group slot arena; slot = founding point, slot 0 unused.
    pub(crate) groups: Vec<Group>,
    pub(crate) stones_on_board: [usize; 2],
    /// Group most recently left in atari, per color. Cleared eagerly when
    /// that group is captured, merged, or regains a liberty.
    pub(crate) last_atari: [Option<usize>; 2],
    pub(crate) last_point: Point,
    pub(crate) empty_points: Vec<Point>,
    game_history: Vec<Point>,
    pub(crate) topo: Topology,
    zobrist: Zobrist,
}

impl Board {
    /// A fresh 9x9 board, komi 0.5, Black to move.
    pub fn new() -> Self {
        let size = 9;
        let size2 = size * size;
        let mut board = Board {
            size,
            size2,
            komi: 0.5,
            handicap: 0,
            side: Color::Black,
            ko_point: 0,
            owner: vec![0; size2 + 1],
            groups: (0..=size2).map(|_| Group::new()).collect(),
            stones_on_board: [0, 0],
            last_atari: [None, None],
            last_point: 0,
            empty_points: Vec::with_capacity(size2),
            game_history: Vec::new(),
            topo: Topology::new(size),
            zobrist: Zobrist::new(),
        };
        board.reset();
        board
    }

    pub fn with_size(size: usize) -> Result<Self, SizeError> {
        let mut board = Board::new();
        board.set_size(size)?;
        Ok(board)
    }

    /// Change the board size, rebuilding the topology tables and clearing
    /// the board. Unsupported sizes are rejected with everything intact.
    pub fn set_size(&mut self, size: usize) -> Result<(), SizeError> {
        if !(2..=MAXSIZE).contains(&size) {
            return Err(SizeError(size));
        }
        self.size = size;
        self.size2 = size * size;
        self.owner = vec![0; self.size2 + 1];
        self.groups = (0..=self.size2).map(|_| Group::new()).collect();
        self.topo = Topology::new(size);
        self.clear();
        Ok(())
    }

    /// Empty the board and forget the game history and handicap.
    pub fn clear(&mut self) {
        self.reset();
        self.handicap = 0;
        self.game_history.clear();
    }

    /// Empty the board, keeping history and handicap (for [`Self::restore`]).
    fn reset(&mut self) {
        self.side = Color::Black;
        self.ko_point = 0;
        self.zobrist.reset();
        self.stones_on_board = [0, 0];
        self.last_atari = [None, None];
        self.last_point = 0;
        for p in 1..=self.size2 {
            let slot = self.owner[p];
            if slot != 0 {
                self.groups[slot].clear();
            }
            self.owner[p] = 0;
        }
        self.empty_points.clear();
        self.empty_points.extend(1..=self.size2);
    }

    /// Rebuild the committed position by replaying handicap and history
    /// from an empty board. Undoes any simulation moves played since.
    pub fn restore(&mut self) {
        self.reset();
        if self.handicap > 0 {
            let handicap = self.handicap;
            self.place_fixed_handicap(handicap);
        }
        let history = std::mem::take(&mut self.game_history);
        for &mv in &history {
            if mv != PASS {
                self.drop_stone(mv, self.side);
            }
            self.side = self.side.opponent();
            self.zobrist.toggle_side();
        }
        self.game_history = history;
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn size2(&self) -> usize {
        self.size2
    }

    pub fn komi(&self) -> f32 {
        self.komi
    }

    pub fn set_komi(&mut self, komi: f32) {
        self.komi = komi;
    }

    pub fn side(&self) -> Color {
        self.side
    }

    pub fn last_point(&self) -> Point {
        self.last_point
    }

    pub fn ko_point(&self) -> Point {
        self.ko_point
    }

    pub fn handicap(&self) -> usize {
        self.handicap
    }

    pub fn history(&self) -> &[Point] {
        &self.game_history
    }

    pub fn zobrist_key(&self) -> u64 {
        self.zobrist.key()
    }

    #[inline]
    pub fn is_occupied(&self, point: Point) -> bool {
        self.owner[point] != 0
    }

    /// The group owning `point`, if any.
    #[inline]
    pub fn group_at(&self, point: Point) -> Option<&Group> {
        match self.owner[point] {
            0 => None,
            slot => Some(&self.groups[slot]),
        }
    }

    pub fn stones_on_board(&self, color: Color) -> usize {
        self.stones_on_board[color.index()]
    }

    /// 1 for a black stone, -1 for a white stone, 0 for empty.
    pub fn point_value(&self, point: Point) -> i32 {
        match self.group_at(point) {
            Some(g) if g.color() == Color::Black => 1,
            Some(_) => -1,
            None => 0,
        }
    }

    // -------------------------------------------------------------------------
    // Neighbour queries
    // -------------------------------------------------------------------------

    /// Number of empty points adjacent to `point`.
    #[inline]
    pub(crate) fn point_liberties(&self, point: Point) -> usize {
        self.topo
            .adjacent(point)
            .iter()
            .filter(|&&adj| self.owner[adj] == 0)
            .count()
    }

    /// Distinct slots of the groups adjacent to `point`, at most 4.
    pub(crate) fn neighbour_slots(&self, point: Point) -> ([usize; 4], usize) {
        let mut slots = [0usize; 4];
        let mut len = 0;
        for &adj in self.topo.adjacent(point) {
            let slot = self.owner[adj];
            if slot != 0 && !slots[..len].contains(&slot) {
                slots[len] = slot;
                len += 1;
            }
        }
        (slots, len)
    }

    /// Slots of groups of `color` adjacent to `point` with at most
    /// `max_liberties` liberties.
    pub(crate) fn neighbour_slots_filtered(
        &self,
        point: Point,
        color: Color,
        max_liberties: usize,
        out: &mut Vec<usize>,
    ) {
        for &adj in self.topo.adjacent(point) {
            let slot = self.owner[adj];
            if slot != 0 && !out.contains(&slot) {
                let g = &self.groups[slot];
                if g.color() == color && g.nliberties() <= max_liberties {
                    out.push(slot);
                }
            }
        }
    }

    /// Total stones of `color` in groups adjacent to `point`.
    pub(crate) fn neighbours_size(&self, point: Point, color: Color) -> usize {
        let (slots, len) = self.neighbour_slots(point);
        slots[..len]
            .iter()
            .map(|&s| &self.groups[s])
            .filter(|g| g.color() == color)
            .map(|g| g.nstones())
            .sum()
    }

    fn neighbours_in_atari(&self, color: Color, slots: &[usize]) -> usize {
        slots
            .iter()
            .map(|&s| &self.groups[s])
            .filter(|g| g.color() != color && g.in_atari())
            .count()
    }

    // -------------------------------------------------------------------------
    // Eyes
    // -------------------------------------------------------------------------

    /// All 4-neighbours of the empty point belong to `color` (off-board
    /// neighbours excepted). `consider_occupied` is treated as filled
    /// (0 for none).
    pub(crate) fn is_surrounded(&self, point: Point, color: Color, consider_occupied: Point) -> bool {
        if self.owner[point] != 0 {
            return false;
        }
        for &adj in self.topo.adjacent(point) {
            if adj == consider_occupied {
                continue;
            }
            match self.owner[adj] {
                0 => return false,
                slot if self.groups[slot].color() != color => return false,
                _ => {}
            }
        }
        true
    }

    /// A surrounded point whose diagonals are controlled by `color` in at
    /// least 3 of 4 directions; with fewer than 4 diagonals (edge,
    /// corner), all of them must be controlled.
    pub(crate) fn is_true_eye(&self, point: Point, color: Color, consider_occupied: Point) -> bool {
        if !self.is_surrounded(point, color, consider_occupied) {
            return false;
        }
        let diagonals = self.topo.diagonals(point);
        let mut ncontrolled = 0;
        for &diag in diagonals {
            match self.owner[diag] {
                0 => {
                    if self.is_surrounded(diag, color, consider_occupied) {
                        ncontrolled += 1;
                    }
                }
                slot => {
                    if self.groups[slot].color() == color {
                        ncontrolled += 1;
                    }
                }
            }
        }
        if diagonals.len() == 4 {
            ncontrolled > 2
        } else {
            ncontrolled == diagonals.len()
        }
    }

    /// A surrounded point that still functions as an eye: fewer than two
    /// opposing diagonals, where the board edge counts as one.
    pub(crate) fn is_virtual_eye(&self, point: Point, color: Color) -> bool {
        if !self.is_surrounded(point, color, 0) {
            return false;
        }
        let diagonals = self.topo.diagonals(point);
        let mut nopponent = 0;
        for &diag in diagonals {
            let slot = self.owner[diag];
            if slot != 0 && self.groups[slot].color() != color {
                nopponent += 1;
            }
        }
        if diagonals.len() < 4 {
            nopponent += 1;
        }
        nopponent < 2
    }

    /// Surrounded, but not even a virtual eye.
    pub(crate) fn is_false_eye(&self, point: Point, color: Color) -> bool {
        self.is_surrounded(point, color, 0) && !self.is_virtual_eye(point, color)
    }

    // -------------------------------------------------------------------------
    // Legality
    // -------------------------------------------------------------------------

    /// Validate a move without mutating anything. Order: occupied, ko,
    /// bounded superko, then the liberty rules — an empty neighbour makes
    /// the move legal outright; otherwise it must connect to a same-color
    /// group that is not in atari, or capture an adjacent opposing group
    /// in atari (which is what distinguishes a capturing move from
    /// suicide).
    pub fn check_move(&self, point: Point, color: Color) -> Result<(), MoveError> {
        if self.owner[point] != 0 {
            return Err(MoveError::Occupied);
        }
        if point == self.ko_point {
            return Err(MoveError::Ko);
        }
        if self.zobrist.check_history(self.key_after(point, color)) {
            return Err(MoveError::Superko);
        }
        if self.point_liberties(point) > 0 {
            return Ok(());
        }
        let (slots, len) = self.neighbour_slots(point);
        for &slot in &slots[..len] {
            let g = &self.groups[slot];
            if g.color() == color && !g.in_atari() {
                return Ok(());
            }
        }
        if self.neighbours_in_atari(color, &slots[..len]) > 0 {
            Ok(())
        } else {
            Err(MoveError::Suicide)
        }
    }

    #[inline]
    pub fn is_legal(&self, point: Point, color: Color) -> bool {
        self.check_move(point, color).is_ok()
    }

    /// All legal points for the side to move, pass appended last.
    pub fn legal_moves(&self) -> Vec<Point> {
        let mut moves: Vec<Point> = self
            .empty_points
            .iter()
            .copied()
            .filter(|&p| self.is_legal(p, self.side))
            .collect();
        moves.push(PASS);
        moves
    }

    /// Position key as it would be after `color` plays `point`,
    /// accounting for the removal of adjacent opposing groups in atari.
    fn key_after(&self, point: Point, color: Color) -> u64 {
        let mut key = self.zobrist.key_with(point, color);
        let (slots, len) = self.neighbour_slots(point);
        for &slot in &slots[..len] {
            let g = &self.groups[slot];
            if g.color() != color && g.in_atari() {
                for &st in g.stones() {
                    key = self.zobrist.without(key, st, g.color());
                }
            }
        }
        key
    }

    // -------------------------------------------------------------------------
    // Playing
    // -------------------------------------------------------------------------

    /// Play a committed move: validated, recorded in the game history and
    /// the position-key window. When `color` is not the side to move, a
    /// pass is inserted into the history so replay stays alternating.
    /// Returns the point played; the board is untouched on rejection.
    pub fn play_move(&mut self, point: Point, color: Color) -> Result<Point, MoveError> {
        if point != PASS {
            self.check_move(point, color)?;
        }
        if self.side != color {
            self.game_history.push(PASS);
        } else {
            self.zobrist.toggle_side();
        }
        if point != PASS {
            self.drop_stone(point, color);
        } else {
            self.ko_point = 0;
        }
        self.side = color.opponent();
        self.game_history.push(point);
        self.zobrist.record_key();
        Ok(point)
    }

    /// Play an uncommitted simulation move for the side to move: not
    /// validated, not entered into the history. [`Self::restore`] erases it.
    pub fn play_in_sim(&mut self, point: Point) -> Point {
        if point != PASS {
            self.drop_stone(point, self.side);
        }
        self.side = self.side.opponent();
        self.zobrist.toggle_side();
        self.zobrist.record_key();
        point
    }

    /// Place a stone and resolve its consequences. The point must be
    /// empty; legality is the caller's business.
    fn drop_stone(&mut self, point: Point, color: Color) {
        debug_assert_eq!(self.owner[point], 0, "dropping a stone on a stone");
        let mut libs: [Point; 4] = [0; 4];
        let mut nlibs = 0;
        for &adj in self.topo.adjacent(point) {
            if self.owner[adj] == 0 {
                libs[nlibs] = adj;
                nlibs += 1;
            }
        }
        self.groups[point].set_up(point, color, &libs[..nlibs]);
        self.owner[point] = point;
        self.remove_empty(point);
        self.stones_on_board[color.index()] += 1;
        self.zobrist.update(point, color);

        self.ko_point = self.handle_neighbours(point);

        let slot = self.owner[point];
        if self.groups[slot].nliberties() == 0 {
            // Suicide on an unchecked path (stale tree move): take the
            // stones off again rather than leave a zero-liberty group.
            self.erase_group(slot);
        } else if self.groups[slot].in_atari() {
            self.last_atari[color.index()] = Some(slot);
        }
        self.last_point = point;
    }

    /// Merge same-colored neighbours into the new stone's group, take
    /// liberties from opposing ones, capture those that run out. Returns
    /// the new ko point: the captured point when a lone stone captured
    /// exactly one lone stone, 0 otherwise.
    fn handle_neighbours(&mut self, point: Point) -> Point {
        let color = self.groups[point].color();
        let mut captured_lone = 0;
        let mut ncapt_lone = 0;

        let (slots, len) = self.neighbour_slots(point);
        for &slot in &slots[..len] {
            if self.groups[slot].color() == color {
                self.merge_neighbour(point, slot);
            } else if self.groups[slot].in_atari() {
                if self.groups[slot].nstones() == 1 {
                    ncapt_lone += 1;
                    captured_lone = self.groups[slot].stones()[0];
                }
                self.erase_group(slot);
            } else {
                self.groups[slot].erase_liberty(point);
                if self.groups[slot].in_atari() {
                    let c = self.groups[slot].color();
                    self.last_atari[c.index()] = Some(slot);
                }
            }
        }

        if ncapt_lone == 1 && self.groups[point].nstones() == 1 {
            captured_lone
        } else {
            0
        }
    }

    /// Absorb the group in `slot` into the group founded at `point`.
    fn merge_neighbour(&mut self, point: Point, slot: usize) {
        self.groups[slot].erase_liberty(point);
        let absorbed = std::mem::take(&mut self.groups[slot]);
        self.groups[point].absorb(&absorbed);
        for &st in absorbed.stones() {
            self.owner[st] = point;
        }
        let c = absorbed.color();
        if self.last_atari[c.index()] == Some(slot) {
            // The merged group may still be in atari; drop_stone rechecks.
            self.last_atari[c.index()] = None;
        }
    }

    /// Remove a captured (or suicided) group from the board, restoring a
    /// liberty to every surviving neighbour of each removed stone.
    fn erase_group(&mut self, slot: usize) {
        let dead = std::mem::take(&mut self.groups[slot]);
        let color = dead.color();
        for &st in dead.stones() {
            self.owner[st] = 0;
            self.stones_on_board[color.index()] -= 1;
            self.zobrist.update(st, color);
            self.empty_points.push(st);

            let mut seen = [0usize; 4];
            let mut nseen = 0;
            for &adj in self.topo.adjacent(st) {
                let g = self.owner[adj];
                if g != 0 && !seen[..nseen].contains(&g) {
                    seen[nseen] = g;
                    nseen += 1;
                    self.groups[g].add_liberty(st);
                    let c = self.groups[g].color();
                    if self.last_atari[c.index()] == Some(g) {
                        self.last_atari[c.index()] = None;
                    }
                }
            }
        }
        if self.last_atari[color.index()] == Some(slot) {
            self.last_atari[color.index()] = None;
        }
    }

    fn remove_empty(&mut self, point: Point) {
        if let Some(i) = self.empty_points.iter().position(|&p| p == point) {
            self.empty_points.swap_remove(i);
        }
    }

    // -------------------------------------------------------------------------
    // Handicap
    // -------------------------------------------------------------------------

    /// Place `handicap` (2..=9) fixed handicap stones. Only the standard
    /// sizes have tables. White moves first afterwards.
    pub fn set_fixed_handicap(&mut self, handicap: usize) -> bool {
        if !(2..=9).contains(&handicap) {
            return false;
        }
        if !matches!(self.size, 9 | 13 | 19) {
            return false;
        }
        self.handicap = handicap;
        self.place_fixed_handicap(handicap);
        true
    }

    fn place_fixed_handicap(&mut self, handicap: usize) {
        let table: &[[usize; 9]; 8] = match self.size {
            19 => &HANDICAP19,
            13 => &HANDICAP13,
            _ => &HANDICAP9,
        };
        let row = &table[9 - handicap];
        for &p in row.iter().take_while(|&&p| p != 0) {
            self.drop_stone(p, Color::Black);
        }
        self.side = Color::White;
        self.zobrist.toggle_side();
    }

    // -------------------------------------------------------------------------
    // Scoring
    // -------------------------------------------------------------------------

    /// Area count: stones plus single-color-surrounded empty points,
    /// minus komi. Positive favors Black.
    pub fn chinese_count(&self) -> f32 {
        let mut black = 0;
        let mut white = 0;
        let mut eyes = 0i32;
        for p in 1..=self.size2 {
            match self.group_at(p) {
                Some(g) if g.color() == Color::Black => black += 1,
                Some(_) => white += 1,
                None => {
                    if self.is_surrounded(p, Color::Black, 0) {
                        eyes += 1;
                    } else if self.is_surrounded(p, Color::White, 0) {
                        eyes -= 1;
                    }
                }
            }
        }
        eyes as f32 + black as f32 - white as f32 - self.komi
    }

    /// Accumulate per-point ownership into `table` (+1 Black, -1 White),
    /// indexed by point.
    pub fn score_area(&self, table: &mut [i32]) {
        for p in 1..=self.size2 {
            match self.group_at(p) {
                Some(g) if g.color() == Color::Black => table[p] += 1,
                Some(_) => table[p] -= 1,
                None => {
                    if self.is_surrounded(p, Color::White, 0) {
                        table[p] -= 1;
                    } else if self.is_surrounded(p, Color::Black, 0) {
                        table[p] += 1;
                    }
                }
            }
        }
    }

    /// The color whose stone surplus exceeds a third of the board, if
    /// any. Used to cut runaway playouts short.
    pub fn mercy(&self) -> Option<Color> {
        let black = self.stones_on_board[0] as isize;
        let white = self.stones_on_board[1] as isize;
        let bound = (self.size2 / MERCY_DIVISOR) as isize;
        if black - white > bound {
            Some(Color::Black)
        } else if white - black > bound {
            Some(Color::White)
        } else {
            None
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.size).rev() {
            write!(f, "{:2} ", row + 1)?;
            for col in 0..self.size {
                let p = row * self.size + col + 1;
                let ch = match self.point_value(p) {
                    1 => 'X',
                    -1 => 'O',
                    _ => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for col in 0..self.size {
            write!(f, "{} ", COORDINATES[col])?;
        }
        writeln!(f)
    }
}
