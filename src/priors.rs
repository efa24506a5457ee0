//! Move priors for newly created tree nodes.
//!
//! When a node is expanded, every legal move gets a pseudo-count pair
//! (prior result, equivalent visits) seeded into its RAVE statistic, so
//! domain knowledge biases selection before any real simulation arrives:
//! self-ataris and false eyes start pessimistic, captures of groups in
//! atari optimistic, tactical shapes and moves near the previous move get
//! a bonus that fades with Manhattan distance.

use crate::board::Board;
use crate::constants::PASS;
use crate::tree::Prior;

impl Board {
    /// Priors for every point (indexed 0..=size², pass included), for the
    /// side to move.
    pub fn init_priors(&self) -> Vec<Prior> {
        let side = self.side;
        let equiv = (self.size / 2) as f64;
        let mut priors = vec![Prior::default(); self.size2 + 1];
        priors[PASS] = Prior {
            prior: 0.1 * equiv,
            equiv,
        };

        for &p in &self.empty_points {
            if self.is_self_atari(p, side) {
                priors[p] = Prior {
                    prior: 0.2 * equiv,
                    equiv: 2.0 * equiv,
                };
                continue;
            }
            if self.is_false_eye(p, side) {
                priors[p] = Prior {
                    prior: 0.3 * equiv,
                    equiv,
                };
                continue;
            }
            priors[p] = Prior {
                prior: 0.5 * equiv,
                equiv,
            };
            if self.size > 11 {
                // On big boards, stay off the first line and favor the
                // fourth in open areas.
                if self.topo.distance_to_edge(p) == 0 && !self.stones_around(p, 4) {
                    priors[p] = Prior {
                        prior: 0.1 * equiv,
                        equiv,
                    };
                } else if self.topo.distance_to_edge(p) == 3 && !self.stones_around(p, 4) {
                    priors[p] = Prior {
                        prior: 0.9 * equiv,
                        equiv,
                    };
                }
            }

            let (slots, len) = self.neighbour_slots(p);
            let mut settled = false;
            for &slot in &slots[..len] {
                if self.groups[slot].in_atari() {
                    if self.groups[slot].color() != side {
                        priors[p] = Prior {
                            prior: 1.4 * equiv,
                            equiv: 2.0 * equiv,
                        };
                    } else {
                        priors[p] = Prior {
                            prior: 0.6 * equiv,
                            equiv,
                        };
                    }
                    settled = true;
                    break;
                }
            }
            if settled {
                continue;
            }
            if self.matches_pattern(p, side) {
                priors[p] = Prior {
                    prior: 0.9 * equiv,
                    equiv,
                };
            }
        }

        if self.last_point == PASS {
            return priors;
        }

        let mut list = Vec::new();
        self.capture_heuristic(self.last_point, &mut list);
        for &p in &list {
            priors[p].prior += 3.0 * equiv;
            priors[p].equiv += 3.0 * equiv;
        }

        list.clear();
        self.save_heuristic(self.last_point, &mut list);
        for &p in &list {
            priors[p].prior += 2.0 * equiv;
            priors[p].equiv += 2.0 * equiv;
        }

        list.clear();
        self.pattern_heuristic(self.last_point, &mut list);
        for &p in &list {
            priors[p].prior += 2.0 * equiv;
            priors[p].equiv += 2.0 * equiv;
        }

        for dis in 1..=4usize {
            for &v in self.topo.within_manhattan(self.last_point, dis) {
                if v != 0 {
                    priors[v].prior += (1.0 - 0.1 * (dis - 1) as f64) * equiv;
                    priors[v].equiv += equiv;
                }
            }
        }

        priors
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, Color, Point};

    fn pt(size: usize, col: usize, row: usize) -> Point {
        row * size + col + 1
    }

    #[test]
    fn pass_prior_is_pessimistic() {
        let board = Board::with_size(9).unwrap();
        let priors = board.init_priors();
        assert!(priors[0].prior / priors[0].equiv < 0.2);
    }

    #[test]
    fn capture_gets_a_boost() {
        let mut board = Board::with_size(5).unwrap();
        // White C3 in atari after three black stones; taking at C4 must
        // look better than a quiet corner point.
        board.play_move(pt(5, 2, 2), Color::White).unwrap(); // C3
        board.play_move(pt(5, 1, 2), Color::Black).unwrap(); // B3
        board.play_move(pt(5, 4, 4), Color::White).unwrap(); // E5
        board.play_move(pt(5, 3, 2), Color::Black).unwrap(); // D3
        board.play_move(pt(5, 4, 0), Color::White).unwrap(); // E1
        board.play_move(pt(5, 2, 1), Color::Black).unwrap(); // C2
        // White to move now; pass to give Black the capture decision.
        board.play_move(0, Color::White).unwrap();

        let priors = board.init_priors();
        let kill = pt(5, 2, 3); // C4, the last liberty
        let quiet = pt(5, 0, 4); // A5
        assert!(priors[kill].prior / priors[kill].equiv > priors[quiet].prior / priors[quiet].equiv);
    }

    #[test]
    fn self_atari_prior_is_low() {
        let mut board = Board::with_size(9).unwrap();
        board.play_move(pt(9, 0, 1), Color::Black).unwrap(); // A2
        board.play_move(pt(9, 4, 4), Color::White).unwrap();
        board.play_move(pt(9, 6, 6), Color::Black).unwrap();
        let priors = board.init_priors();
        // A1 keeps a lone liberty at B1: self-atari for White.
        let a1 = pt(9, 0, 0);
        assert!(priors[a1].prior / priors[a1].equiv <= 0.2);
    }
}
