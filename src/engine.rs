//! The search engine: repeated simulations over the statistics tree.
//!
//! Each simulation descends the tree by RAVE-blended selection, playing
//! the selected moves on the real board, expands nodes that have seen
//! enough visits, finishes the game with a heavy playout, restores the
//! board by replaying the committed history, and backs the result up the
//! recorded path with AMAF credit for every sibling. The loop is
//! single-threaded and runs to a playout budget or a wall-clock deadline,
//! both checked only between simulations.
//!
//! Statistics survive across turns: after the controller commits a move,
//! [`Engine::report_move`] promotes the matching subtree to be the next
//! search root.

use std::time::{Duration, Instant};

use fastrand::Rng;

use crate::amaf::AmafBoard;
use crate::board::{Board, Color, MoveError, Point, SizeError};
use crate::constants::{
    DEF_PLAYOUTS, DEF_TREE_NODES, EARLY_PASS_THRESHOLD, EXPAND_VISITS, PASS, RESIGN_THRESHOLD,
    SCORE_PLAYOUTS,
};
use crate::playout::play_random_game;
use crate::tree::{NodeId, Tree};

/// Outcome of a move generation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenMove {
    Play(Point),
    Pass,
    Resign,
}

pub struct Engine {
    goban: Board,
    tree: Tree,
    amaf: AmafBoard,
    rng: Rng,
    max_playouts: u32,
    max_time: Option<Duration>,
    playouts: u32,
    moves_played: u64,
    discarded: u32,
}

impl Engine {
    /// Engine on a fresh 9x9 board with the default playout budget and a
    /// randomly seeded generator.
    pub fn new() -> Self {
        Self::from_rng(Rng::new())
    }

    /// Deterministic engine: identical seeds, states, and budgets choose
    /// identical moves.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(Rng::with_seed(seed))
    }

    fn from_rng(rng: Rng) -> Self {
        let goban = Board::new();
        let amaf = AmafBoard::new(goban.size2());
        Engine {
            goban,
            tree: Tree::new(DEF_TREE_NODES),
            amaf,
            rng,
            max_playouts: DEF_PLAYOUTS,
            max_time: None,
            playouts: 0,
            moves_played: 0,
            discarded: 0,
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Rng::with_seed(seed);
    }

    pub fn board(&self) -> &Board {
        &self.goban
    }

    /// Drop all accumulated search state.
    pub fn reset(&mut self) {
        self.tree.clear();
        self.amaf.set_up(self.goban.side(), self.goban.size2());
        self.playouts = 0;
        self.moves_played = 0;
        self.discarded = 0;
    }

    // -------------------------------------------------------------------------
    // Game management
    // -------------------------------------------------------------------------

    /// Resize the board and start over. Unsupported sizes leave the
    /// previous game intact.
    pub fn set_size(&mut self, size: usize) -> Result<(), SizeError> {
        self.goban.set_size(size)?;
        self.reset();
        Ok(())
    }

    /// Clear the board for a new game at the current size.
    pub fn clear_board(&mut self) {
        self.goban.clear();
        self.reset();
    }

    pub fn set_komi(&mut self, komi: f32) {
        self.goban.set_komi(komi);
    }

    pub fn set_fixed_handicap(&mut self, handicap: usize) -> bool {
        let ok = self.goban.set_fixed_handicap(handicap);
        if ok {
            self.reset();
        }
        ok
    }

    /// Commit a move to the real game. Failure leaves the game unchanged.
    pub fn play_move(&mut self, point: Point, color: Color) -> Result<(), MoveError> {
        self.goban.play_move(point, color).map(|_| ())
    }

    /// Tell the tree which move was actually committed so its subtree
    /// becomes the next root.
    pub fn report_move(&mut self, point: Point) {
        self.tree.promote(point);
    }

    // -------------------------------------------------------------------------
    // Budgets
    // -------------------------------------------------------------------------

    /// Fixed playout budget; disables the clock.
    pub fn set_playouts(&mut self, playouts: u32) {
        self.max_playouts = playouts;
        self.max_time = None;
    }

    /// Per-move time from main time, byo-yomi time and stones.
    pub fn set_times(&mut self, main_time: u64, byo_time: u64, stones: u64) {
        self.max_playouts = u32::MAX;
        let secs = if stones > 0 {
            main_time as f64 / 10.0 + byo_time as f64 / stones as f64
        } else {
            main_time as f64 / 60.0
        };
        self.max_time = Some(Duration::from_secs_f64(secs.max(0.05)));
    }

    /// Per-move time from the remaining clock.
    pub fn set_time_left(&mut self, time_left: u64, stones: u64) {
        self.max_playouts = u32::MAX;
        if stones > 0 {
            self.max_time = Some(Duration::from_secs_f64(
                (time_left as f64 / stones as f64).max(0.05),
            ));
        }
    }

    pub fn playouts_run(&self) -> u32 {
        self.playouts
    }

    pub fn discarded_playouts(&self) -> u32 {
        self.discarded
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Search under the configured budget and report the preferred move.
    /// Resigns when even the best child's value is hopeless; with
    /// `early_pass`, passes once passing itself looks near-certain and at
    /// least one real stone has been committed.
    pub fn generate_move(&mut self, early_pass: bool) -> GenMove {
        let side = self.goban.side();
        let start = Instant::now();
        self.playouts = 0;
        self.moves_played = 0;
        self.discarded = 0;

        let mut node_history: Vec<NodeId> = Vec::new();

        while self.playouts < self.max_playouts
            && self.max_time.is_none_or(|limit| start.elapsed() < limit)
        {
            node_history.clear();
            let mut sim_len = 0usize;
            self.amaf.set_up(self.goban.side(), self.goban.size2());
            let mut node = self.tree.root();

            loop {
                let mature =
                    node == self.tree.root() || self.tree.node(node).visits() > EXPAND_VISITS;
                if !mature {
                    break;
                }
                if !self.tree.node(node).has_children() {
                    let moves = self.goban.legal_moves();
                    let priors = self.goban.init_priors();
                    self.tree.expand(node, &moves, &priors);
                }
                match self.tree.select_child(node) {
                    Some(child) => {
                        node_history.push(node);
                        node = child;
                        let mv = self.tree.node(node).mv();
                        self.goban.play_in_sim(mv);
                        sim_len += 1;
                        self.amaf.play(mv, sim_len as i32);
                    }
                    // Expansion failed on a full arena: play out from here.
                    None => break,
                }
            }
            node_history.push(node);

            let result = play_random_game(
                &mut self.goban,
                &mut self.amaf,
                &mut sim_len,
                &mut self.moves_played,
                &mut self.rng,
            );
            self.goban.restore();
            self.playouts += 1;

            let Some(mut result) = result else {
                self.discarded += 1;
                continue;
            };
            if side == Color::White {
                result = 1 - result;
            }
            self.back_up(result, &node_history, side);
        }

        let best = match self.tree.best_child(self.tree.root()) {
            Some(best) => best,
            None => return GenMove::Pass,
        };
        self.log_summary(start);

        let best_value = self.tree.node(best).value();
        if best_value < RESIGN_THRESHOLD {
            return GenMove::Resign;
        }
        if early_pass && self.goban.history().iter().any(|&p| p != PASS) {
            let pass_child = self
                .tree
                .children(self.tree.root())
                .find(|&id| self.tree.node(id).mv() == PASS);
            if let Some(pass_child) = pass_child {
                if self.tree.node(pass_child).value() > EARLY_PASS_THRESHOLD {
                    return GenMove::Pass;
                }
            }
        }
        match self.tree.node(best).mv() {
            PASS => GenMove::Pass,
            mv => GenMove::Play(mv),
        }
    }

    /// Walk the recorded path root-to-leaf, flipping the result each ply
    /// and crediting every node's children through the AMAF record.
    fn back_up(&mut self, mut result: i32, history: &[NodeId], mut side: Color) {
        for (depth, &id) in history.iter().enumerate() {
            result = 1 - result;
            side = side.opponent();
            self.tree.add_result(id, result);
            self.tree
                .update_amaf(id, 1 - result, &self.amaf, side.opponent(), depth as i32);
        }
    }

    // -------------------------------------------------------------------------
    // Scoring
    // -------------------------------------------------------------------------

    /// Estimate the final score by averaging territory over fast
    /// playouts. Positive favors Black. With `dead`, also collect the
    /// points whose simulated majority owner disagrees with the stone
    /// standing there.
    pub fn score(&mut self, dead: Option<&mut Vec<Point>>) -> f32 {
        self.score_with(SCORE_PLAYOUTS, dead)
    }

    /// [`Self::score`] with an explicit playout count.
    pub fn score_with(&mut self, sims: u32, mut dead: Option<&mut Vec<Point>>) -> f32 {
        let size2 = self.goban.size2();
        let mut table = vec![0i32; size2 + 1];
        for _ in 0..sims {
            let mut sim_len = 0usize;
            self.amaf.set_up(self.goban.side(), size2);
            let _ = play_random_game(
                &mut self.goban,
                &mut self.amaf,
                &mut sim_len,
                &mut self.moves_played,
                &mut self.rng,
            );
            self.goban.score_area(&mut table);
            self.goban.restore();
        }

        let majority = (sims / 2) as i32;
        let mut score = 0i32;
        for p in 1..=size2 {
            let owned = if table[p] > majority {
                1
            } else if table[p] < -majority {
                -1
            } else {
                0
            };
            score += owned;
            if let Some(list) = dead.as_deref_mut() {
                let stone = self.goban.point_value(p);
                if stone != 0 && owned != stone {
                    list.push(p);
                }
            }
        }
        score as f32 - self.goban.komi()
    }

    /// Timed playout benchmark: run `n` playouts, return moves played.
    pub fn perft(&mut self, n: u32) -> u64 {
        let mut moves = 0u64;
        for _ in 0..n {
            let mut sim_len = 0usize;
            self.amaf.set_up(self.goban.side(), self.goban.size2());
            let _ = play_random_game(
                &mut self.goban,
                &mut self.amaf,
                &mut sim_len,
                &mut moves,
                &mut self.rng,
            );
            self.goban.restore();
        }
        moves
    }

    fn log_summary(&self, start: Instant) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let mut pv = Vec::new();
        let mut cursor = self.tree.best_child(self.tree.root());
        while let Some(id) = cursor {
            pv.push(self.tree.node(id).mv());
            if self.tree.node(id).mv() == PASS {
                break;
            }
            cursor = self.tree.best_child(id);
        }
        let elapsed = start.elapsed().as_secs_f64().max(1e-9);
        let avg_len = self.moves_played as f64 / self.playouts.max(1) as f64;
        log::debug!(
            "search: {} playouts in {:.2}s ({:.0}/s), avg length {:.1}, discarded {}, tree {} nodes",
            self.playouts,
            elapsed,
            self.playouts as f64 / elapsed,
            avg_len,
            self.discarded,
            self.tree.size(),
        );
        log::debug!("pv (points): {:?}", pv);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_engine(seed: u64) -> Engine {
        let mut engine = Engine::with_seed(seed);
        engine.set_size(7).unwrap();
        engine.set_playouts(60);
        engine
    }

    #[test]
    fn generated_move_is_legal() {
        let mut engine = small_engine(9);
        match engine.generate_move(false) {
            GenMove::Play(p) => {
                assert!(engine.board().is_legal(p, engine.board().side()));
            }
            GenMove::Pass => {}
            GenMove::Resign => panic!("no reason to resign an empty board"),
        }
        assert!(engine.playouts_run() > 0);
    }

    #[test]
    fn seeded_search_is_deterministic() {
        let mut a = small_engine(1234);
        let mut b = small_engine(1234);
        for engine in [&mut a, &mut b] {
            engine.play_move(25, Color::Black).unwrap();
            engine.play_move(24, Color::White).unwrap();
        }
        assert_eq!(a.generate_move(false), b.generate_move(false));
    }

    #[test]
    fn differently_seeded_searches_still_work() {
        let mut a = small_engine(1);
        let mut b = small_engine(2);
        // Both must produce usable answers; equality is not required.
        let ma = a.generate_move(false);
        let mb = b.generate_move(false);
        assert!(!matches!(ma, GenMove::Resign));
        assert!(!matches!(mb, GenMove::Resign));
    }

    #[test]
    fn committed_game_survives_search() {
        let mut engine = small_engine(5);
        engine.play_move(25, Color::Black).unwrap();
        engine.report_move(25);
        let key = engine.board().zobrist_key();
        let _ = engine.generate_move(false);
        // The search restored the board to the committed position.
        assert_eq!(engine.board().zobrist_key(), key);
        assert_eq!(engine.board().history(), &[25]);
    }

    #[test]
    fn play_and_report_roundtrip() {
        let mut engine = small_engine(77);
        let mv = engine.generate_move(false);
        if let GenMove::Play(p) = mv {
            let side = engine.board().side();
            engine.play_move(p, side).unwrap();
            engine.report_move(p);
            // Search continues from the promoted subtree.
            let reply = engine.generate_move(false);
            assert!(!matches!(reply, GenMove::Resign));
        }
    }

    #[test]
    fn illegal_commit_is_reported() {
        let mut engine = small_engine(3);
        engine.play_move(25, Color::Black).unwrap();
        assert_eq!(
            engine.play_move(25, Color::White),
            Err(MoveError::Occupied)
        );
    }

    #[test]
    fn score_on_settled_board_favors_black() {
        let mut engine = Engine::with_seed(8);
        engine.set_size(5).unwrap();
        engine.set_komi(0.5);
        // Give Black a dominating position before estimating.
        for p in [7, 8, 9, 12, 14, 17, 18, 19] {
            engine.play_move(p, Color::Black).unwrap();
        }
        let mut dead = Vec::new();
        let score = engine.score_with(120, Some(&mut dead));
        assert!(score > 0.0, "score {score} should favor Black");
    }

    #[test]
    fn unsupported_size_is_rejected() {
        let mut engine = Engine::new();
        assert!(engine.set_size(20).is_err());
        assert_eq!(engine.board().size(), 9);
    }
}
