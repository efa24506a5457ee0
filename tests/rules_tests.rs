//! Rules-level integration tests: legality, ko, the bounded superko
//! window, and replay/incremental equivalence across captures.

use sente::board::{Board, Color, MoveError, Point};
use sente::constants::PASS;

/// Point from zero-based column and row.
fn pt(size: usize, col: usize, row: usize) -> Point {
    row * size + col + 1
}

/// Play a scripted sequence of (point, color) moves, asserting each one
/// is accepted.
fn play_all(board: &mut Board, moves: &[(Point, Color)]) {
    for &(p, c) in moves {
        board
            .play_move(p, c)
            .unwrap_or_else(|e| panic!("move {p} for {c:?} rejected: {e}"));
    }
}

/// The classic ko shape on 5x5: returns the board right after Black has
/// taken the ko, plus the two ko points (White's stone point, Black's).
fn ko_position() -> (Board, Point, Point) {
    let size = 5;
    let mut board = Board::with_size(size).unwrap();
    let c3 = pt(size, 2, 2);
    let d3 = pt(size, 3, 2);
    play_all(
        &mut board,
        &[
            (pt(size, 2, 1), Color::Black), // C2
            (pt(size, 3, 1), Color::White), // D2
            (pt(size, 1, 2), Color::Black), // B3
            (pt(size, 4, 2), Color::White), // E3
            (pt(size, 2, 3), Color::Black), // C4
            (pt(size, 3, 3), Color::White), // D4
            (PASS, Color::Black),
            (c3, Color::White),
            (d3, Color::Black), // takes the ko
        ],
    );
    (board, c3, d3)
}

#[test]
fn ko_point_blocks_immediate_retake() {
    let (mut board, c3, _) = ko_position();
    assert_eq!(board.ko_point(), c3);
    assert_eq!(board.play_move(c3, Color::White), Err(MoveError::Ko));
}

#[test]
fn superko_window_blocks_retake_after_passes() {
    let (mut board, c3, _) = ko_position();
    // Two passes clear the ko point but not the recent-position window:
    // retaking would recreate the position of two moves ago.
    board.play_move(PASS, Color::White).unwrap();
    board.play_move(PASS, Color::Black).unwrap();
    assert_eq!(board.ko_point(), 0);
    assert_eq!(board.play_move(c3, Color::White), Err(MoveError::Superko));
}

#[test]
fn retake_after_real_exchange_is_legal() {
    let (mut board, c3, d3) = ko_position();
    let size = 5;
    play_all(
        &mut board,
        &[
            (pt(size, 0, 4), Color::White), // A5
            (pt(size, 4, 4), Color::Black), // E5
        ],
    );
    // The board has changed, so the recapture repeats nothing.
    board.play_move(c3, Color::White).unwrap();
    assert_eq!(board.ko_point(), d3);
}

#[test]
fn rejected_moves_leave_no_trace() {
    let (mut board, c3, _) = ko_position();
    let key = board.zobrist_key();
    let history = board.history().to_vec();
    let side = board.side();

    assert!(board.play_move(c3, Color::White).is_err());
    let occupied = pt(5, 2, 1);
    assert_eq!(board.play_move(occupied, Color::White), Err(MoveError::Occupied));

    assert_eq!(board.zobrist_key(), key);
    assert_eq!(board.history(), &history[..]);
    assert_eq!(board.side(), side);
}

#[test]
fn replay_matches_incremental_play_through_captures() {
    let size = 9;
    let mut board = Board::with_size(size).unwrap();
    // A running fight including a capture and a pass.
    play_all(
        &mut board,
        &[
            (pt(size, 2, 2), Color::Black),
            (pt(size, 3, 2), Color::White),
            (pt(size, 3, 1), Color::Black),
            (pt(size, 4, 1), Color::White),
            (pt(size, 3, 3), Color::Black),
            (pt(size, 2, 3), Color::White),
            (pt(size, 4, 2), Color::Black), // captures D3
            (PASS, Color::White),
            (pt(size, 6, 6), Color::Black),
        ],
    );
    assert!(!board.is_occupied(pt(size, 3, 2)), "D3 should be captured");

    let key = board.zobrist_key();
    let occupancy: Vec<i32> = (1..=board.size2()).map(|p| board.point_value(p)).collect();
    let liberties: Vec<usize> = (1..=board.size2())
        .map(|p| board.group_at(p).map_or(0, |g| g.nliberties()))
        .collect();

    // Replay the recorded history from an empty board.
    board.restore();

    assert_eq!(board.zobrist_key(), key);
    let occupancy_after: Vec<i32> = (1..=board.size2()).map(|p| board.point_value(p)).collect();
    let liberties_after: Vec<usize> = (1..=board.size2())
        .map(|p| board.group_at(p).map_or(0, |g| g.nliberties()))
        .collect();
    assert_eq!(occupancy, occupancy_after);
    assert_eq!(liberties, liberties_after);
}

#[test]
fn suicide_and_capture_first_are_distinguished() {
    let size = 5;
    let mut board = Board::with_size(size).unwrap();
    // Black controls the corner approach; a bare White A1 is suicide.
    play_all(
        &mut board,
        &[
            (pt(size, 1, 0), Color::Black), // B1
            (pt(size, 0, 1), Color::Black), // A2
        ],
    );
    assert_eq!(
        board.play_move(pt(size, 0, 0), Color::White),
        Err(MoveError::Suicide)
    );

    // Add White stones that put those Black stones in atari: now the
    // same point captures first and is legal.
    play_all(
        &mut board,
        &[
            (pt(size, 2, 0), Color::White), // C1
            (pt(size, 1, 1), Color::White), // B2
            (pt(size, 0, 2), Color::White), // A3
        ],
    );
    board.play_move(pt(size, 0, 0), Color::White).unwrap();
    assert_eq!(board.stones_on_board(Color::Black), 0);
}

#[test]
fn legal_moves_always_include_pass() {
    let mut board = Board::with_size(5).unwrap();
    let moves = board.legal_moves();
    assert_eq!(moves.len(), 26);
    assert_eq!(*moves.last().unwrap(), PASS);

    board.play_move(pt(5, 2, 2), Color::Black).unwrap();
    let moves = board.legal_moves();
    assert_eq!(moves.len(), 25);
    assert!(!moves.contains(&pt(5, 2, 2)));
    assert_eq!(*moves.last().unwrap(), PASS);
}
