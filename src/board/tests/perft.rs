//! Perft: the canonical move-generator test.

use crate::board::Board;

struct PerftPosition {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(usize, u64)],
}

const PERFT_POSITIONS: &[PerftPosition] = &[
    PerftPosition {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8902), (4, 197_281), (5, 4_865_609)],
    },
    PerftPosition {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depths: &[(1, 48), (2, 2039), (3, 97_862), (4, 4_085_603)],
    },
    PerftPosition {
        name: "endgame pins",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depths: &[(1, 14), (2, 191), (3, 2812), (4, 43_238), (5, 674_624)],
    },
    PerftPosition {
        name: "promotions and checks",
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        depths: &[(1, 6), (2, 264), (3, 9467), (4, 422_333)],
    },
    PerftPosition {
        name: "underpromotion tangle",
        fen: "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        depths: &[(1, 44), (2, 1486), (3, 62_379), (4, 2_103_487)],
    },
    PerftPosition {
        name: "en passant pin",
        fen: "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        depths: &[(1, 31), (2, 707), (3, 21_637)],
    },
    PerftPosition {
        name: "promotion storm",
        fen: "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        depths: &[(1, 24), (2, 496), (3, 9483)],
    },
    PerftPosition {
        name: "castling rights",
        fen: "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
        depths: &[(1, 26), (2, 568), (3, 13_744)],
    },
];

#[test]
fn test_perft_positions() {
    for position in PERFT_POSITIONS {
        let mut board: Board = position.fen.parse().unwrap();
        for &(depth, expected) in position.depths {
            let nodes = board.perft(depth);
            assert_eq!(
                nodes, expected,
                "perft mismatch for '{}' at depth {depth}",
                position.name
            );
        }
    }
}

// The full-depth counts take minutes in debug builds; run with
// `cargo test -- --ignored` in release mode.
#[test]
#[ignore]
fn test_perft_startpos_depth_6() {
    let mut board = Board::new();
    assert_eq!(board.perft(6), 119_060_324);
}

#[test]
#[ignore]
fn test_perft_kiwipete_depth_5() {
    let mut board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        .parse()
        .unwrap();
    assert_eq!(board.perft(5), 193_690_690);
}

#[test]
fn test_perft_divide_sums_to_perft() {
    let mut board = Board::new();
    let divide = board.perft_divide(3);
    assert_eq!(divide.len(), 20);
    let total: u64 = divide.iter().map(|(_, n)| n).sum();
    assert_eq!(total, 8902);
}

#[test]
fn test_perft_chess960_castling() {
    // Displaced rooks with Shredder-FEN rights exercise the king-to-rook
    // castling encoding.
    let mut board: Board = "1rk3r1/pppppppp/8/8/8/8/PPPPPPPP/1RK3R1 w GBgb - 0 1"
        .parse()
        .unwrap();
    let legal = board.generate_legal();
    // The g-rook castle is available: king c1 takes its g1 rook.
    assert!(legal
        .iter()
        .any(|m| m.is_castle_kingside() && m.to().file() == 6));
    // Depth-3 perft stays self-consistent through make/unmake.
    let divide = board.perft_divide(2);
    let total: u64 = divide.iter().map(|(_, n)| n).sum();
    assert_eq!(board.perft(2), total);
}
