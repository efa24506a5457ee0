//! All-moves-as-first bookkeeping for one simulation.
//!
//! While a simulation runs, the recorder notes for each point the ply at
//! which it was first occupied and by whom (positive depths for the
//! recorder's starting side, negative for the opponent). Backup then asks,
//! per tree node, whether a sibling's move appeared later in the
//! simulation on the right side — the RAVE statistic. The recorder is
//! reset at the start of every simulation and never outlives one.

use crate::board::{Color, Point};
use crate::constants::PASS;

pub struct AmafBoard {
    /// Signed first-play depth per point; 0 = never played. Index 0 is
    /// the pass slot and is never credited.
    board: Vec<i32>,
    side: Color,
}

impl AmafBoard {
    pub fn new(size2: usize) -> Self {
        AmafBoard {
            board: vec![0; size2 + 1],
            side: Color::Black,
        }
    }

    /// Reset for a new simulation starting with `side` to move.
    pub fn set_up(&mut self, side: Color, size2: usize) {
        self.side = side;
        self.board.clear();
        self.board.resize(size2 + 1, 0);
    }

    /// Record a move at `depth` (1-based ply). Only the first play at a
    /// point counts; the internal side alternates either way.
    pub fn play(&mut self, point: Point, depth: i32) {
        if self.board[point] == 0 {
            self.board[point] = match self.side {
                Color::Black => depth,
                Color::White => -depth,
            };
        }
        self.side = self.side.opponent();
    }

    /// Soft indicator in [0, 1]: 1 minus a linear depth discount when
    /// `point` was first played by `side` at or after `depth`, else 0.
    /// Pass and never-played points are always 0.
    pub fn value(&self, point: Point, depth: i32, side: Color, discount: f64) -> f64 {
        if point == PASS || self.board[point] == 0 {
            return 0.0;
        }
        let val = match side {
            Color::Black => self.board[point],
            Color::White => -self.board[point],
        };
        if val >= depth {
            1.0 - discount * val as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_play_wins() {
        let mut amaf = AmafBoard::new(81);
        amaf.set_up(Color::Black, 81);
        amaf.play(41, 1); // Black
        amaf.play(42, 2); // White
        amaf.play(41, 3); // White replay at 41: ignored
        assert_eq!(amaf.value(41, 1, Color::Black, 0.0), 1.0);
        assert_eq!(amaf.value(41, 1, Color::White, 0.0), 0.0);
        assert_eq!(amaf.value(42, 1, Color::White, 0.0), 1.0);
    }

    #[test]
    fn unrecorded_and_pass_are_zero() {
        let mut amaf = AmafBoard::new(81);
        amaf.set_up(Color::Black, 81);
        amaf.play(PASS, 1);
        assert_eq!(amaf.value(PASS, 0, Color::Black, 0.0), 0.0);
        assert_eq!(amaf.value(41, 0, Color::Black, 0.0), 0.0);
    }

    #[test]
    fn depth_cutoff() {
        let mut amaf = AmafBoard::new(81);
        amaf.set_up(Color::White, 81);
        amaf.play(10, 1); // White at depth 1
        amaf.play(11, 2); // Black at depth 2
        // Played at depth 1: visible at depth <= 1, not after.
        assert_eq!(amaf.value(10, 1, Color::White, 0.0), 1.0);
        assert_eq!(amaf.value(10, 2, Color::White, 0.0), 0.0);
        assert_eq!(amaf.value(11, 2, Color::Black, 0.0), 1.0);
    }

    #[test]
    fn discount_scales_with_depth() {
        let mut amaf = AmafBoard::new(81);
        amaf.set_up(Color::Black, 81);
        amaf.play(20, 1);
        amaf.play(21, 2);
        amaf.play(22, 3);
        let discount = 0.01;
        assert_eq!(amaf.value(22, 1, Color::Black, discount), 1.0 - 0.03);
    }
}
