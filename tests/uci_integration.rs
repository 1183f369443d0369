//! Protocol-level integration: command parsing, position handling, and
//! output formatting wired to a real search.

use castellan::board::{Board, STARTPOS_FEN};
use castellan::engine::TimeControl;
use castellan::search::{Pool, SearchLimits};
use castellan::uci::command::{parse_command, UciCommand};
use castellan::uci::print::{format_bestmove, format_move};
use castellan::xboard::command::{parse_command as parse_xboard, XBoardCommand};

/// Apply a UCI position command the way the engine loop does: FEN or
/// startpos, then moves until the first illegal one.
fn apply_position(command: &UciCommand) -> Board {
    let UciCommand::Position { fen, moves } = command else {
        panic!("expected a position command");
    };
    let mut board = match fen {
        Some(fen) => Board::from_fen(fen).unwrap(),
        None => Board::new(),
    };
    for text in moves {
        match board.parse_move(text) {
            Ok(mv) => assert!(board.make_move(mv)),
            Err(_) => break,
        }
    }
    board
}

#[test]
fn test_position_startpos_with_moves() {
    let cmd = parse_command("position startpos moves e2e4 e7e5 g1f3");
    let board = apply_position(&cmd);
    assert_eq!(board.ply(), 3);
    assert_eq!(
        board.to_fen(),
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
    );
}

#[test]
fn test_position_fen_roundtrip() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let cmd = parse_command(&format!("position fen {fen}"));
    let board = apply_position(&cmd);
    assert_eq!(board.to_fen(), fen);
}

#[test]
fn test_illegal_move_stops_application() {
    // The third move is illegal; the first two stick.
    let cmd = parse_command("position startpos moves e2e4 e7e5 e4e6");
    let board = apply_position(&cmd);
    assert_eq!(board.ply(), 2);
}

#[test]
fn test_malformed_fen_is_an_error() {
    assert!(Board::from_fen("not a fen").is_err());
    assert!(Board::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
}

#[test]
fn test_go_depth_one_produces_bestmove_line() {
    let cmd = parse_command("position startpos moves e2e4");
    let board = apply_position(&cmd);

    let UciCommand::Go(params) = parse_command("go depth 1") else {
        panic!("expected go");
    };
    let limits = SearchLimits {
        time: TimeControl::Infinite,
        depth: params.depth,
        nodes: params.nodes,
        infinite: params.infinite,
        ponder: params.ponder,
        searchmoves: Vec::new(),
    };

    let mut pool = Pool::new(1, 16);
    let result = pool.go(&board, limits, 1, None);
    let line = format_bestmove(&result, false);
    assert!(line.starts_with("bestmove "));
    let move_text = line.split_whitespace().nth(1).unwrap();
    let mut check = board.clone();
    assert!(check.parse_move(move_text).is_ok());
}

#[test]
fn test_mate_score_reported_from_queen_endgame() {
    // Mate in one, reported as such.
    let board: Board = "7k/5Q2/6K1/8/8/8/8/8 w - - 0 1".parse().unwrap();
    let mut pool = Pool::new(1, 16);
    let limits = SearchLimits {
        time: TimeControl::Infinite,
        depth: Some(2),
        ..SearchLimits::default()
    };
    let result = pool.go(&board, limits, 1, None);
    assert_eq!(result.best_move.unwrap().to_string(), "f7g7");
    assert_eq!(
        castellan::search::constants::mate_distance(result.score),
        1
    );
}

#[test]
fn test_castling_move_text_both_conventions() {
    let mut board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
    // Classical input.
    let classical = board.parse_move("e1g1").unwrap();
    assert!(classical.is_castle_kingside());
    // King-onto-rook input resolves to the same move.
    let fischer = board.parse_move("e1h1").unwrap();
    assert_eq!(classical, fischer);
    // Output follows the configured convention.
    assert_eq!(format_move(classical, false), "e1g1");
    assert_eq!(format_move(classical, true), "e1h1");
}

#[test]
fn test_startpos_fen_constant_matches_board() {
    assert_eq!(Board::new().to_fen(), STARTPOS_FEN);
}

#[test]
fn test_xboard_command_surface() {
    // Every command a protover-2 GUI may send parses to a known variant.
    for (line, expect_known) in [
        ("xboard", true),
        ("protover 2", true),
        ("new", true),
        ("setboard 8/8/8/4k3/8/8/2R5/4K3 w - - 0 1", true),
        ("usermove e2e4", true),
        ("go", true),
        ("force", true),
        ("analyze", true),
        ("exit", true),
        ("time 3000", true),
        ("otim 3000", true),
        ("level 40 5 0", true),
        ("sd 10", true),
        ("st 5", true),
        ("memory 64", true),
        ("cores 2", true),
        ("egtpath syzygy /tmp", true),
        ("ping 7", true),
        ("hard", true),
        ("easy", true),
        ("post", true),
        ("nopost", true),
        ("?", true),
        ("undo", true),
        ("remove", true),
        ("quit", true),
    ] {
        let parsed = parse_xboard(line);
        assert!(
            expect_known && !matches!(parsed, XBoardCommand::Unknown(_)),
            "failed to parse '{line}': {parsed:?}"
        );
    }
}
