//! Tactical analysis and the playout move policies.
//!
//! Everything here answers one question fast: given the last few moves,
//! where should a simulated game play next? The light policy picks any
//! filtered legal point; the heavy policy tries targeted candidate
//! generators first (atari rescue/kill, saving two-liberty groups,
//! tactical shapes, captures around the previous move) and falls back to
//! the light policy. All randomness comes from the caller's generator so
//! playouts are reproducible.

use fastrand::Rng;

use crate::board::{Board, Color, Point};
use crate::constants::PASS;

impl Board {
    // -------------------------------------------------------------------------
    // Liberty analysis
    // -------------------------------------------------------------------------

    /// Any stone within Manhattan distance `distance` of `point`?
    pub(crate) fn stones_around(&self, point: Point, distance: usize) -> bool {
        for dis in 1..=distance {
            for &v in self.topo.within_manhattan(point, dis) {
                if v != 0 && self.is_occupied(v) {
                    return true;
                }
            }
        }
        false
    }

    /// Liberties a stone of `color` played at `point` would end up with:
    /// the point's own empty neighbours, the liberties of same-colored
    /// neighbour groups, and points freed by capturing adjacent opposing
    /// groups in atari. Real (empty-point) liberties are appended to
    /// `liberties`; the returned count also includes capture gains.
    /// Counting stops early once the count exceeds `enough` (0 = count
    /// everything). `exclude` leaves one group slot out of the merge.
    pub(crate) fn total_liberties(
        &self,
        point: Point,
        color: Color,
        liberties: &mut Vec<Point>,
        enough: usize,
        exclude: Option<usize>,
    ) -> usize {
        let mut libs: Vec<Point> = Vec::new();
        for &adj in self.topo.adjacent(point) {
            if self.owner[adj] == 0 {
                if !liberties.contains(&adj) {
                    liberties.push(adj);
                }
                if !libs.contains(&adj) {
                    libs.push(adj);
                }
            }
        }
        if enough > 0 && libs.len() > enough {
            return libs.len();
        }

        let (slots, len) = self.neighbour_slots(point);
        for &slot in &slots[..len] {
            if exclude == Some(slot) {
                continue;
            }
            let g = &self.groups[slot];
            if g.color() == color {
                for &lib in g.liberties() {
                    if lib != point {
                        if !liberties.contains(&lib) {
                            liberties.push(lib);
                        }
                        if !libs.contains(&lib) {
                            libs.push(lib);
                            if enough > 0 && libs.len() > enough {
                                return libs.len();
                            }
                        }
                    }
                }
            } else if g.in_atari() {
                // Capturing this group frees its stones adjacent to the
                // new stone or to one of the merged neighbour groups.
                for &st in g.stones() {
                    for &adj in self.topo.adjacent(st) {
                        let freed = if adj == point {
                            true
                        } else {
                            let o = self.owner[adj];
                            o != 0
                                && self.groups[o].color() == color
                                && slots[..len].contains(&o)
                        };
                        if freed && !libs.contains(&st) {
                            libs.push(st);
                            if enough > 0 && libs.len() > enough {
                                return libs.len();
                            }
                        }
                    }
                }
            }
        }
        libs.len()
    }

    /// Would playing `point` leave the group in `slot` with more
    /// liberties than it has now?
    pub(crate) fn gains_liberties(&self, point: Point, slot: usize) -> bool {
        let group = &self.groups[slot];
        let current = group.nliberties();
        let mut liberties = Vec::new();
        let nlibs = self.total_liberties(point, group.color(), &mut liberties, current, Some(slot));
        nlibs > current
    }

    /// Playing `point` would leave exactly one liberty.
    pub(crate) fn is_self_atari(&self, point: Point, color: Color) -> bool {
        let mut liberties = Vec::new();
        self.total_liberties(point, color, &mut liberties, 1, None) == 1
    }

    /// The single liberty a self-atari at `point` would keep, if it is a
    /// self-atari at all. 0 when the only "liberty" comes from a capture.
    pub(crate) fn atari_last_liberty(&self, point: Point, color: Color) -> Option<Point> {
        let mut liberties = Vec::new();
        if self.total_liberties(point, color, &mut liberties, 1, None) == 1 {
            Some(liberties.first().copied().unwrap_or(0))
        } else {
            None
        }
    }

    /// Moves that rescue the group in `slot`: liberty-gaining extensions
    /// plus counter-captures of low-liberty opposing neighbours.
    pub(crate) fn atari_escapes(&self, slot: usize, escapes: &mut Vec<Point>) {
        let group = &self.groups[slot];
        for &lib in group.liberties() {
            if self.gains_liberties(lib, slot) && !escapes.contains(&lib) {
                escapes.push(lib);
            }
        }
        let mut enemies = Vec::new();
        for &st in group.stones() {
            self.neighbour_slots_filtered(
                st,
                group.color().opponent(),
                group.nliberties(),
                &mut enemies,
            );
        }
        for &enemy in &enemies {
            for &lib in self.groups[enemy].liberties() {
                if self.gains_liberties(lib, slot) && !escapes.contains(&lib) {
                    escapes.push(lib);
                }
            }
        }
    }

    /// Approximate ladder read: does a two-liberty stone at `point` get
    /// chased into the edge or a hostile stone? Stops at the first own
    /// stone on the running path (a potential breaker).
    pub(crate) fn fast_ladder(&self, point: Point, color: Color) -> bool {
        let mut tliberties = Vec::new();
        if self.total_liberties(point, color, &mut tliberties, 0, None) != 2 {
            return false;
        }
        let mut weak_enemies = Vec::new();
        self.neighbour_slots_filtered(point, color.opponent(), 2, &mut weak_enemies);
        if !weak_enemies.is_empty() {
            return false;
        }

        let mut liberties = Vec::new();
        for &adj in self.topo.adjacent(point) {
            if self.owner[adj] == 0 {
                liberties.push(adj);
            }
        }
        for &lib in &liberties {
            if self.point_liberties(lib) == 4 {
                continue;
            }
            let mut delta = [0isize; 2];
            delta[0] = lib as isize - point as isize;
            for &adj in self.topo.adjacent(lib) {
                if self.owner[adj] == 0 && adj != point && adj as isize != lib as isize + delta[0] {
                    delta[1] = adj as isize - lib as isize;
                    break;
                }
            }
            if delta[1] == 0 {
                return true;
            }
            let mut p = point as isize;
            let mut act = 0;
            while self.topo.distance_to_edge(p as usize) > 1 {
                p += delta[act];
                match self.stone((p) as usize) {
                    Some(c) if c == color => break,
                    Some(_) => return true,
                    None => {}
                }
                match self.stone((p + delta[act]) as usize) {
                    Some(c) if c == color => break,
                    Some(_) => return true,
                    None => {}
                }
                act = 1 - act;
            }
            if self.topo.distance_to_edge(p as usize) < 2 {
                return true;
            }
        }
        false
    }

    /// Number of adjacent points that become true eyes of `color` once
    /// `point` is filled.
    pub(crate) fn creates_eyes(&self, point: Point, color: Color) -> usize {
        self.topo
            .adjacent(point)
            .iter()
            .filter(|&&adj| self.is_true_eye(adj, color, point))
            .count()
    }

    /// A self-atari that is not a snapback, a capturing throw-in, or a
    /// nakade shape loses the stones for nothing.
    pub(crate) fn bad_self_atari(&self, point: Point, color: Color) -> bool {
        let last_lib = match self.atari_last_liberty(point, color) {
            None => return false,
            Some(lib) => lib,
        };
        let mut liberties = Vec::new();
        if self.total_liberties(last_lib, color.opponent(), &mut liberties, 0, None) < 2 {
            // Recapturing would leave the opponent in atari: snapback.
            return false;
        }
        if self.creates_eyes(point, color.opponent()) > 0
            && self.creates_eyes(last_lib, color.opponent()) == 0
        {
            // Throw-in destroying an eye.
            return false;
        }
        if self.nakade_shape(point, color) {
            return false;
        }
        true
    }

    /// Greatest number of same-group (or `point`) neighbours any stone of
    /// the group has.
    fn bulkiness(&self, slot: usize, point: Point) -> usize {
        let mut max_bulk = 0;
        for &st in self.groups[slot].stones() {
            let bulk = self
                .topo
                .adjacent(st)
                .iter()
                .filter(|&&adj| self.owner[adj] == slot || adj == point)
                .count();
            max_bulk = max_bulk.max(bulk);
        }
        max_bulk
    }

    fn neighbour_bulkiness(&self, point: Point, color: Color) -> usize {
        let (slots, len) = self.neighbour_slots(point);
        let mut max_bulk = len;
        for &slot in &slots[..len] {
            if self.groups[slot].color() == color {
                max_bulk = max_bulk.max(self.bulkiness(slot, point));
            }
        }
        max_bulk
    }

    /// Would the stones around `point` form a killable nakade lump?
    pub(crate) fn nakade_shape(&self, point: Point, color: Color) -> bool {
        let bulk = self.neighbour_bulkiness(point, color);
        match self.neighbours_size(point, color) {
            2 => true,
            3 => bulk == 3,
            4 => bulk == 4 || bulk == 3,
            5 => bulk == 4,
            _ => false,
        }
    }

    #[inline]
    pub(crate) fn stone(&self, point: Point) -> Option<Color> {
        self.group_at(point).map(|g| g.color())
    }

    // -------------------------------------------------------------------------
    // Policies
    // -------------------------------------------------------------------------

    /// Filter shared by both policies: no eye filling, no illegal moves,
    /// no pointless self-atari.
    pub(crate) fn random_policy(&self, point: Point, color: Color) -> bool {
        !self.is_true_eye(point, color, 0)
            && self.is_legal(point, color)
            && !self.bad_self_atari(point, color)
    }

    /// Stricter filter for heuristic candidates: also refuses any
    /// self-atari and moves that run a losing ladder.
    pub(crate) fn heavy_policy(&self, point: Point, color: Color) -> bool {
        !self.is_true_eye(point, color, 0)
            && self.is_legal(point, color)
            && !self.is_self_atari(point, color)
            && !self.fast_ladder(point, color)
    }

    /// First point of `list` (scanned circularly from a random start)
    /// accepted by `policy`, or [`PASS`].
    fn random_choose(
        &self,
        list: &[Point],
        rng: &mut Rng,
        policy: impl Fn(&Board, Point, Color) -> bool,
    ) -> Point {
        if list.is_empty() {
            return PASS;
        }
        let start = rng.usize(0..list.len());
        for &point in list[start..].iter().chain(list[..start].iter()) {
            if policy(self, point, self.side) {
                return point;
            }
        }
        PASS
    }

    /// One light-policy move: any filtered legal point, or a pass.
    pub fn play_random(&mut self, rng: &mut Rng) -> Point {
        let mv = self.random_choose(&self.empty_points, rng, Board::random_policy);
        self.play_in_sim(mv)
    }

    /// One heavy-policy move: the first non-empty heuristic candidate set
    /// wins, falling back to the light policy.
    pub fn play_heavy(&mut self, rng: &mut Rng) -> Point {
        let mv = self.last_atari_heuristic(rng);
        if mv != PASS {
            return self.play_in_sim(mv);
        }
        if self.last_point != PASS {
            let mut list = Vec::new();
            self.save_heuristic(self.last_point, &mut list);
            let mv = self.random_choose(&list, rng, Board::heavy_policy);
            if mv != PASS {
                return self.play_in_sim(mv);
            }

            list.clear();
            self.pattern_heuristic(self.last_point, &mut list);
            let mv = self.random_choose(&list, rng, Board::heavy_policy);
            if mv != PASS {
                return self.play_in_sim(mv);
            }

            list.clear();
            self.capture_heuristic(self.last_point, &mut list);
            let mv = self.random_choose(&list, rng, Board::heavy_policy);
            if mv != PASS {
                return self.play_in_sim(mv);
            }
        }
        self.play_random(rng)
    }

    // -------------------------------------------------------------------------
    // Heuristic candidate generators
    // -------------------------------------------------------------------------

    /// Kill the opposing group just left in atari by taking its last
    /// liberty, or rescue our own. The weak references are validated
    /// before use; a stale one is ignored.
    fn last_atari_heuristic(&self, rng: &mut Rng) -> Point {
        let side = self.side;
        if let Some(slot) = self.last_atari[side.opponent().index()] {
            let g = &self.groups[slot];
            if g.nstones() > 0 && g.in_atari() {
                let mv = g.liberty(0);
                if self.is_legal(mv, side) && !self.is_self_atari(mv, side) {
                    return mv;
                }
            }
        }
        if let Some(slot) = self.last_atari[side.index()] {
            let g = &self.groups[slot];
            if g.nstones() > 0 && g.in_atari() {
                let mut escapes = Vec::new();
                self.atari_escapes(slot, &mut escapes);
                let mv = self.random_choose(&escapes, rng, Board::heavy_policy);
                if mv != PASS {
                    return mv;
                }
            }
        }
        PASS
    }

    /// Escape squares of opposing groups in atari around `point`.
    pub(crate) fn capture_heuristic(&self, point: Point, list: &mut Vec<Point>) {
        for &v in &self.topo.vicinity(point)[..8] {
            if v == 0 {
                continue;
            }
            let slot = self.owner[v];
            if slot != 0 {
                let g = &self.groups[slot];
                if g.color() != self.side && g.in_atari() {
                    self.atari_escapes(slot, list);
                }
            }
        }
    }

    /// Liberty-gaining answers to the group that just moved, and rescues
    /// for our own neighbouring groups down to two liberties.
    pub(crate) fn save_heuristic(&self, point: Point, list: &mut Vec<Point>) {
        let slot = self.owner[point];
        if slot != 0 && self.groups[slot].has_two_liberties() {
            for i in 0..2 {
                let lib = self.groups[slot].liberty(i);
                if self.gains_liberties(lib, slot) && !list.contains(&lib) {
                    list.push(lib);
                }
            }
        }
        let (slots, len) = self.neighbour_slots(point);
        for &slot in &slots[..len] {
            let g = &self.groups[slot];
            if g.color() == self.side && g.has_two_liberties() {
                self.atari_escapes(slot, list);
            }
        }
    }

    /// Empty vicinity points matching a tactical shape.
    pub(crate) fn pattern_heuristic(&self, point: Point, list: &mut Vec<Point>) {
        for &v in &self.topo.vicinity(point)[..8] {
            if v != 0 && self.owner[v] == 0 && self.matches_pattern(v, self.side) && !list.contains(&v)
            {
                list.push(v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(size: usize, col: usize, row: usize) -> Point {
        row * size + col + 1
    }

    #[test]
    fn self_atari_detected() {
        let mut board = Board::with_size(5).unwrap();
        board.play_move(pt(5, 0, 1), Color::Black).unwrap(); // A2
        let a1 = pt(5, 0, 0);
        // A1 for White keeps only the B1 liberty once A2 is black.
        assert!(board.is_self_atari(a1, Color::White));
        assert!(!board.is_self_atari(a1, Color::Black));
    }

    #[test]
    fn connecting_counts_merged_liberties() {
        let mut board = Board::with_size(5).unwrap();
        board.play_move(pt(5, 1, 1), Color::Black).unwrap(); // B2
        // Playing B3 as Black merges with B2: plenty of liberties.
        assert!(!board.is_self_atari(pt(5, 1, 2), Color::Black));
    }

    #[test]
    fn capture_counts_as_liberty() {
        let mut board = Board::with_size(5).unwrap();
        // White A1 in atari once Black holds A2 and B1 is empty...
        board.play_move(pt(5, 0, 0), Color::White).unwrap(); // A1
        board.play_move(pt(5, 0, 1), Color::Black).unwrap(); // A2
        board.play_move(pt(5, 2, 0), Color::White).unwrap(); // C1
        // Black B1: own liberties would be B2 only after White C1; but it
        // captures A1, freeing that point.
        let b1 = pt(5, 1, 0);
        let mut libs = Vec::new();
        let total = board.total_liberties(b1, Color::Black, &mut libs, 0, None);
        assert!(total >= 2);
        assert!(board.is_legal(b1, Color::Black));
        assert!(!board.bad_self_atari(b1, Color::Black));
    }

    #[test]
    fn atari_escape_gains_liberties() {
        let mut board = Board::with_size(7).unwrap();
        let d4 = pt(7, 3, 3);
        board.play_move(d4, Color::Black).unwrap();
        board.play_move(pt(7, 2, 3), Color::White).unwrap(); // C4
        board.play_move(pt(7, 6, 6), Color::Black).unwrap();
        board.play_move(pt(7, 3, 2), Color::White).unwrap(); // D3
        board.play_move(pt(7, 6, 5), Color::Black).unwrap();
        board.play_move(pt(7, 4, 3), Color::White).unwrap(); // E4
        // Black D4 now has one liberty, D5.
        let slot = board.owner[d4];
        assert!(board.groups[slot].in_atari());
        let mut escapes = Vec::new();
        board.atari_escapes(slot, &mut escapes);
        assert!(escapes.contains(&pt(7, 3, 4)));
    }

    #[test]
    fn bad_self_atari_rejected_by_light_policy() {
        let mut board = Board::with_size(5).unwrap();
        board.play_move(pt(5, 0, 1), Color::Black).unwrap(); // A2
        // White A1: one liberty (B1), captures nothing, no shape: bad.
        let a1 = pt(5, 0, 0);
        assert!(board.is_self_atari(a1, Color::White));
        assert!(board.bad_self_atari(a1, Color::White));
        assert!(!board.random_policy(a1, Color::White));
    }

    #[test]
    fn policies_refuse_true_eyes() {
        let mut board = Board::with_size(5).unwrap();
        // Black eye at A1: stones at B1, A2 and diagonal B2.
        board.play_move(pt(5, 1, 0), Color::Black).unwrap();
        board.play_move(pt(5, 0, 1), Color::Black).unwrap();
        board.play_move(pt(5, 1, 1), Color::Black).unwrap();
        let a1 = pt(5, 0, 0);
        assert!(board.is_true_eye(a1, Color::Black, 0));
        assert!(!board.random_policy(a1, Color::Black));
        // And for the opponent it is plain suicide.
        assert!(!board.is_legal(a1, Color::White));
    }

    #[test]
    fn heavy_playout_move_is_playable() {
        let mut board = Board::with_size(7).unwrap();
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..40 {
            let mv = board.play_heavy(&mut rng);
            if mv != PASS {
                assert!(board.is_occupied(mv), "heavy move {mv} placed no stone");
            }
        }
    }

    #[test]
    fn save_heuristic_finds_extension() {
        let mut board = Board::with_size(7).unwrap();
        let d4 = pt(7, 3, 3);
        board.play_move(d4, Color::Black).unwrap();
        board.play_move(pt(7, 2, 3), Color::White).unwrap(); // C4
        board.play_move(pt(7, 6, 6), Color::Black).unwrap();
        board.play_move(pt(7, 3, 2), Color::White).unwrap(); // D3
        // Black D4 is down to two liberties; White just moved at D3, and
        // it is Black's turn. Saving answers exist around D3.
        let mut list = Vec::new();
        board.save_heuristic(board.last_point(), &mut list);
        assert!(!list.is_empty());
    }
}
