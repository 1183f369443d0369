//! Repetition and fifty-move draw detection.

use crate::board::Board;

fn play(board: &mut Board, moves: &[&str]) {
    for text in moves {
        let mv = board.parse_move(text).unwrap();
        assert!(board.make_move(mv));
    }
}

#[test]
fn test_single_prior_occurrence_is_repetition() {
    let mut board = Board::new();
    assert!(!board.is_repetition());
    // Shuffle the knights out and back: the starting position recurs.
    play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert!(board.is_repetition());
}

#[test]
fn test_repetition_requires_identical_state() {
    let mut board = Board::new();
    // The same piece placement but with the kings having lost castling
    // rights is not a repetition of the start.
    play(&mut board, &["e2e4", "e7e5", "e1e2", "e8e7", "e2e1", "e7e8"]);
    // Castling rights differ from the position after e4/e5, so the
    // signatures differ even though the placement matches.
    assert!(!board.is_repetition());
    // Shuffling once more does repeat the rights-less position.
    play(&mut board, &["e1e2", "e8e7", "e2e1", "e7e8"]);
    assert!(board.is_repetition());
}

#[test]
fn test_pawn_move_cuts_repetition_window() {
    let mut board = Board::new();
    play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert!(board.is_repetition());
    // A pawn move resets the clock; the earlier signatures fall outside
    // the lookback window.
    play(&mut board, &["e2e4"]);
    assert!(!board.is_repetition());
}

#[test]
fn test_fifty_move_rule() {
    let mut board: Board = "4k3/8/8/8/8/8/8/R3K3 w - - 98 70".parse().unwrap();
    assert!(!board.is_fifty_move_draw());
    play(&mut board, &["a1a2", "e8d8"]);
    assert!(board.is_fifty_move_draw());
    // A capture or pawn move would have reset the counter instead.
    let mut board: Board = "4k3/8/8/8/8/8/P7/R3K3 w - - 99 70".parse().unwrap();
    play(&mut board, &["a2a3"]);
    assert!(!board.is_fifty_move_draw());
    assert_eq!(board.halfmove_clock(), 0);
}
