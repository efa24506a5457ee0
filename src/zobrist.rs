//! Incremental position hashing with a bounded repetition window.
//!
//! Every (color, point) pair and the side to move have a fixed 64-bit
//! key; the board key is their XOR. Keys recorded after each move feed a
//! small ring buffer that the legality check consults to reject a move
//! recreating one of the last few positions. This is deliberately *not*
//! full positional superko: only repetitions within the window are
//! caught, which is what the rest of the engine is tuned against.

use crate::board::{Color, Point};
use crate::constants::{MAXSIZE2, SUPERKO_WINDOW};

/// Seed for the key tables. Fixed so that position hashes are stable
/// across processes and test runs.
const TABLE_SEED: u64 = 0x5EED_60BA_4D00_57A7;

pub struct Zobrist {
    key: u64,
    side_key: u64,
    point_keys: Box<[[u64; MAXSIZE2]; 2]>,
    history: [u64; SUPERKO_WINDOW],
    cursor: usize,
}

impl Zobrist {
    pub fn new() -> Self {
        let mut rng = fastrand::Rng::with_seed(TABLE_SEED);
        let mut point_keys = Box::new([[0u64; MAXSIZE2]; 2]);
        for color in 0..2 {
            for p in 0..MAXSIZE2 {
                point_keys[color][p] = rng.u64(..);
            }
        }
        Zobrist {
            key: 0,
            side_key: rng.u64(..),
            point_keys,
            history: [0; SUPERKO_WINDOW],
            cursor: 0,
        }
    }

    /// Key of the current position. 0 is the empty board, Black to move.
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Clear the key and the repetition window.
    pub fn reset(&mut self) {
        self.key = 0;
        self.clear_history();
    }

    /// Toggle a stone of `color` at `point` in the key.
    #[inline]
    pub fn update(&mut self, point: Point, color: Color) {
        if point != 0 {
            self.key ^= self.point_keys[color.index()][point - 1];
        }
    }

    /// Flip the side-to-move component of the key.
    #[inline]
    pub fn toggle_side(&mut self) {
        self.key ^= self.side_key;
    }

    /// The key as it would be with a stone of `color` added at `point`
    /// and the side flipped, without touching the current key.
    pub fn key_with(&self, point: Point, color: Color) -> u64 {
        let mut key = self.key;
        if point != 0 {
            key ^= self.point_keys[color.index()][point - 1];
        }
        key ^ self.side_key
    }

    /// XOR a stone of `color` at `point` out of an arbitrary key.
    #[inline]
    pub fn without(&self, key: u64, point: Point, color: Color) -> u64 {
        key ^ self.point_keys[color.index()][point - 1]
    }

    /// Push the current key into the repetition window, evicting the
    /// oldest entry.
    pub fn record_key(&mut self) {
        self.history[self.cursor] = self.key;
        self.cursor = (self.cursor + 1) % SUPERKO_WINDOW;
    }

    pub fn clear_history(&mut self) {
        self.history = [0; SUPERKO_WINDOW];
        self.cursor = 0;
    }

    /// Is `key` one of the recently recorded positions?
    pub fn check_history(&self, key: u64) -> bool {
        self.history.contains(&key)
    }
}

impl Default for Zobrist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_is_an_involution() {
        let mut z = Zobrist::new();
        let empty = z.key();
        z.update(41, Color::Black);
        assert_ne!(z.key(), empty);
        z.update(41, Color::Black);
        assert_eq!(z.key(), empty);
    }

    #[test]
    fn colors_hash_differently() {
        let mut z = Zobrist::new();
        z.update(41, Color::Black);
        let black = z.key();
        z.reset();
        z.update(41, Color::White);
        assert_ne!(black, z.key());
    }

    #[test]
    fn key_with_matches_incremental_play() {
        let mut z = Zobrist::new();
        z.update(5, Color::White);
        let predicted = z.key_with(41, Color::Black);
        z.update(41, Color::Black);
        z.toggle_side();
        assert_eq!(predicted, z.key());
    }

    #[test]
    fn history_window_evicts_oldest() {
        let mut z = Zobrist::new();
        let mut keys = Vec::new();
        for p in 1..=SUPERKO_WINDOW + 1 {
            z.update(p, Color::Black);
            z.record_key();
            keys.push(z.key());
        }
        // The first recorded key has been pushed out of the window.
        assert!(!z.check_history(keys[0]));
        for &k in &keys[1..] {
            assert!(z.check_history(k));
        }
    }

    #[test]
    fn tables_are_stable() {
        let a = Zobrist::new();
        let b = Zobrist::new();
        assert_eq!(a.key_with(1, Color::Black), b.key_with(1, Color::Black));
    }
}
