//! Stone chains and their liberties.
//!
//! A [`Group`] is a maximal set of connected same-colored stones,
//! maintained incrementally by the board: liberties are erased as
//! neighbouring points fill, restored when captures empty them, and two
//! groups merge when a move connects them. Order within the stone and
//! liberty lists is not meaningful; removal is swap-remove.

use crate::board::{Color, Point};

#[derive(Clone, Debug)]
pub struct Group {
    color: Color,
    stones: Vec<Point>,
    liberties: Vec<Point>,
}

impl Group {
    pub fn new() -> Self {
        Group {
            color: Color::Black,
            stones: Vec::new(),
            liberties: Vec::new(),
        }
    }

    /// Initialize as a fresh single-stone group.
    pub fn set_up(&mut self, point: Point, color: Color, liberties: &[Point]) {
        self.color = color;
        self.stones.clear();
        self.stones.push(point);
        self.liberties.clear();
        self.liberties.extend_from_slice(liberties);
    }

    pub fn clear(&mut self) {
        self.stones.clear();
        self.liberties.clear();
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn stones(&self) -> &[Point] {
        &self.stones
    }

    pub fn nstones(&self) -> usize {
        self.stones.len()
    }

    pub fn liberties(&self) -> &[Point] {
        &self.liberties
    }

    pub fn nliberties(&self) -> usize {
        self.liberties.len()
    }

    pub fn liberty(&self, i: usize) -> Point {
        self.liberties[i]
    }

    #[inline]
    pub fn in_atari(&self) -> bool {
        self.liberties.len() == 1
    }

    #[inline]
    pub fn has_two_liberties(&self) -> bool {
        self.liberties.len() == 2
    }

    /// Add a liberty unless already present. Returns the new count.
    pub fn add_liberty(&mut self, lib: Point) -> usize {
        if !self.liberties.contains(&lib) {
            self.liberties.push(lib);
        }
        self.liberties.len()
    }

    /// Remove a liberty if present. Returns the remaining count.
    pub fn erase_liberty(&mut self, lib: Point) -> usize {
        if let Some(i) = self.liberties.iter().position(|&l| l == lib) {
            self.liberties.swap_remove(i);
        }
        self.liberties.len()
    }

    /// Merge `other`'s stones and liberties into this group.
    /// The caller is responsible for clearing `other` afterwards.
    pub fn absorb(&mut self, other: &Group) {
        self.stones.extend_from_slice(&other.stones);
        for &lib in &other.liberties {
            self.add_liberty(lib);
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_up_single_stone() {
        let mut g = Group::new();
        g.set_up(41, Color::Black, &[40, 42, 32, 50]);
        assert_eq!(g.nstones(), 1);
        assert_eq!(g.nliberties(), 4);
        assert!(!g.in_atari());
    }

    #[test]
    fn add_liberty_deduplicates() {
        let mut g = Group::new();
        g.set_up(41, Color::White, &[40]);
        assert_eq!(g.add_liberty(40), 1);
        assert_eq!(g.add_liberty(42), 2);
    }

    #[test]
    fn erase_to_atari() {
        let mut g = Group::new();
        g.set_up(1, Color::Black, &[2, 10]);
        g.erase_liberty(2);
        assert!(g.in_atari());
        assert_eq!(g.liberty(0), 10);
        g.erase_liberty(10);
        assert_eq!(g.nliberties(), 0);
    }

    #[test]
    fn absorb_unions_liberties() {
        let mut a = Group::new();
        a.set_up(41, Color::Black, &[40, 32, 50]);
        let mut b = Group::new();
        b.set_up(42, Color::Black, &[43, 33, 51, 40]);
        a.absorb(&b);
        assert_eq!(a.nstones(), 2);
        // 40 is shared; the union has 6 distinct liberties.
        assert_eq!(a.nliberties(), 6);
    }
}
