//! Property-based tests over random legal move sequences.

use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

use crate::board::{Board, Move, MoveList};

fn seed_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

fn move_count_strategy() -> impl Strategy<Value = usize> {
    1..=24usize
}

/// Walk a random legal line from the starting position.
fn random_walk(board: &mut Board, rng: &mut StdRng, max_moves: usize) -> usize {
    let mut played = 0;
    for _ in 0..max_moves {
        let legal = board.generate_legal();
        if legal.is_empty() {
            break;
        }
        let mv = legal[rng.gen_range(0..legal.len())];
        assert!(board.make_move(mv));
        played += 1;
    }
    played
}

proptest! {
    /// make_move then unmake_move restores every observable field,
    /// including the incremental signature.
    #[test]
    fn prop_make_unmake_restores_state(seed in seed_strategy(), count in move_count_strategy()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();
        random_walk(&mut board, &mut rng, count);

        let fen = board.to_fen();
        let hash = board.hash();
        let height = board.height();

        let legal = board.generate_legal();
        for &mv in &legal {
            prop_assert!(board.make_move(mv));
            board.unmake_move();
            prop_assert_eq!(board.to_fen(), fen.clone());
            prop_assert_eq!(board.hash(), hash);
            prop_assert_eq!(board.height(), height);
            prop_assert_eq!(board.hash(), board.compute_hash());
        }
    }

    /// Every generated pseudo-legal move either applies cleanly or is
    /// refused with a full rollback.
    #[test]
    fn prop_pseudo_legal_make_or_rollback(seed in seed_strategy(), count in move_count_strategy()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();
        random_walk(&mut board, &mut rng, count);

        let fen = board.to_fen();
        let mut pseudo = MoveList::new();
        board.generate_all(&mut pseudo);
        for &mv in &pseudo {
            prop_assert!(board.is_pseudo_legal(mv));
            if board.make_move(mv) {
                board.unmake_move();
            }
            prop_assert_eq!(board.to_fen(), fen.clone());
        }
    }

    /// Legal moves are exactly the pseudo-legal moves surviving
    /// make/unmake, and when in check the evasion generator covers them.
    #[test]
    fn prop_legal_equals_filtered_pseudo_legal(seed in seed_strategy(), count in move_count_strategy()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();
        random_walk(&mut board, &mut rng, count);

        let mut pseudo = MoveList::new();
        board.generate_all(&mut pseudo);
        let mut filtered: Vec<Move> = Vec::new();
        for &mv in &pseudo {
            if board.make_move(mv) {
                board.unmake_move();
                filtered.push(mv);
            }
        }
        let legal = board.generate_legal();
        prop_assert_eq!(filtered.len(), legal.len());
        for mv in &filtered {
            prop_assert!(legal.contains(*mv));
        }
    }

    /// Zobrist signatures are path-independent: transposing move orders
    /// that reach the same position produce the same signature.
    #[test]
    fn prop_zobrist_path_independence(seed in seed_strategy()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();
        let legal = board.generate_legal();

        // A knight move from each wing transposes around any black reply.
        let from_b1: Vec<Move> = legal
            .iter()
            .copied()
            .filter(|m| m.from() == crate::board::Square::B1)
            .collect();
        let from_g1: Vec<Move> = legal
            .iter()
            .copied()
            .filter(|m| m.from() == crate::board::Square::G1)
            .collect();
        let first = from_b1[rng.gen_range(0..from_b1.len())];
        let second = from_g1[rng.gen_range(0..from_g1.len())];
        let reply = board.parse_move("e7e6").unwrap();

        let mut one = board.clone();
        prop_assert!(one.make_move(first));
        prop_assert!(one.make_move(reply));
        prop_assert!(one.make_move(second));

        let mut two = board.clone();
        prop_assert!(two.make_move(second));
        prop_assert!(two.make_move(reply));
        prop_assert!(two.make_move(first));

        prop_assert_eq!(one.hash(), two.hash());
        prop_assert_eq!(one.to_fen(), two.to_fen());
    }

    /// see_ge is monotone in the threshold.
    #[test]
    fn prop_see_monotone_in_threshold(seed in seed_strategy(), count in move_count_strategy()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();
        random_walk(&mut board, &mut rng, count);

        let mut moves = MoveList::new();
        board.generate_all(&mut moves);
        for &mv in &moves {
            let mut previous = true;
            for threshold in (-1200..1200).step_by(37) {
                let result = board.see_ge(mv, threshold);
                prop_assert!(previous || !result,
                    "see_ge not monotone for {:?} at threshold {}", mv, threshold);
                previous = result;
            }
        }
    }

    /// The evaluator is a pure function: the score is unchanged by a
    /// make/unmake excursion.
    #[test]
    fn prop_eval_is_pure(seed in seed_strategy(), count in move_count_strategy()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();
        random_walk(&mut board, &mut rng, count);

        let before = crate::board::evaluate(&board);
        let legal = board.generate_legal();
        if let Some(&mv) = legal.iter().next() {
            assert!(board.make_move(mv));
            let _ = crate::board::evaluate(&board);
            board.unmake_move();
        }
        prop_assert_eq!(crate::board::evaluate(&board), before);
    }
}
