//! One simulated game to completion.
//!
//! A playout alternates heavy-policy moves from the current position
//! until two consecutive passes, the mercy rule, or the length bound.
//! Every move is recorded in the AMAF board at its ply depth. The caller
//! restores the board afterwards; the playout itself only mutates.

use fastrand::Rng;

use crate::amaf::AmafBoard;
use crate::board::{Board, Color};
use crate::constants::{MAX_PLAYOUT_FACTOR, PASS};

/// Play one simulated game. `sim_len` is the running ply counter shared
/// with the tree descent that preceded the playout; `moves_played`
/// accumulates into the engine's statistics.
///
/// Returns `Some(1)` when Black wins, `Some(0)` when White wins, and
/// `None` for a playout that exceeded the length bound and must be
/// discarded rather than scored.
pub fn play_random_game(
    board: &mut Board,
    amaf: &mut AmafBoard,
    sim_len: &mut usize,
    moves_played: &mut u64,
    rng: &mut Rng,
) -> Option<i32> {
    let max_len = MAX_PLAYOUT_FACTOR * board.size2();
    let mut passes = 0;
    while passes < 2 {
        let mv = board.play_heavy(rng);
        *sim_len += 1;
        amaf.play(mv, *sim_len as i32);
        *moves_played += 1;
        passes = if mv == PASS { passes + 1 } else { 0 };

        if let Some(winner) = board.mercy() {
            return Some(match winner {
                Color::Black => 1,
                Color::White => 0,
            });
        }
        if *sim_len > max_len {
            return None;
        }
    }
    Some(if board.chinese_count() > 0.0 { 1 } else { 0 })
}
