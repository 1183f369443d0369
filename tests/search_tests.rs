//! End-to-end search behavior through the public pool API.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use castellan::board::Board;
use castellan::engine::TimeControl;
use castellan::search::constants::{is_mate_score, mate_distance};
use castellan::search::{InfoCallback, Pool, SearchLimits};

fn depth_limits(depth: i32) -> SearchLimits {
    SearchLimits {
        time: TimeControl::Infinite,
        depth: Some(depth),
        nodes: None,
        infinite: false,
        ponder: false,
        searchmoves: Vec::new(),
    }
}

#[test]
fn test_startpos_reply_is_legal_with_pv() {
    let mut pool = Pool::new(1, 16);
    let mut board = Board::new();
    let mv = board.parse_move("e2e4").unwrap();
    assert!(board.make_move(mv));

    let reports = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let info: InfoCallback = Arc::new(move |report| {
        sink.lock().push(report.clone());
    });

    let result = pool.go(&board, depth_limits(1), 1, Some(info));
    let best = result.best_move.expect("black has replies");
    let mut check = board.clone();
    assert!(check.generate_legal().contains(best));

    // At least one completed iteration reported, with a PV of length >= 1.
    let reports = reports.lock();
    assert!(!reports.is_empty());
    assert!(reports.iter().any(|r| !r.pv.is_empty()));
}

#[test]
fn test_rook_endgame_finds_short_mate() {
    // KR vs K: mate in four from this corner arrangement.
    let board: Board = "4k3/8/8/8/8/8/R7/4K3 w - - 0 1".parse().unwrap();
    let mut pool = Pool::new(1, 32);
    let result = pool.go(&board, depth_limits(12), 1, None);

    assert!(
        is_mate_score(result.score),
        "expected a mate score, got {}",
        result.score
    );
    let mate = mate_distance(result.score);
    assert!(mate > 0 && mate <= 5, "mate distance {mate} out of range");
}

#[test]
fn test_deeper_search_never_misses_shorter_mate() {
    let board: Board = "7k/5Q2/6K1/8/8/8/8/8 w - - 0 1".parse().unwrap();
    let mut pool = Pool::new(1, 16);
    for depth in 2..6 {
        let result = pool.go(&board, depth_limits(depth), 1, None);
        assert_eq!(result.best_move.unwrap().to_string(), "f7g7");
        assert_eq!(mate_distance(result.score), 1);
    }
}

#[test]
fn test_search_is_deterministic_on_fresh_tables() {
    let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        .parse()
        .unwrap();
    let mut first_pool = Pool::new(1, 16);
    let first = first_pool.go(&board, depth_limits(5), 1, None);
    let mut second_pool = Pool::new(1, 16);
    let second = second_pool.go(&board, depth_limits(5), 1, None);
    assert_eq!(first.best_move, second.best_move);
    assert_eq!(first.score, second.score);
}

#[test]
fn test_multipv_reports_distinct_lines() {
    let board = Board::new();
    let mut pool = Pool::new(1, 16);

    let firsts = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&firsts);
    let info: InfoCallback = Arc::new(move |report| {
        if let Some(&first) = report.pv.first() {
            sink.lock().push((report.depth, report.multipv, first));
        }
    });

    pool.go(&board, depth_limits(4), 3, Some(info));

    let firsts = firsts.lock();
    let max_depth = firsts.iter().map(|&(d, _, _)| d).max().unwrap();
    let mut final_lines: Vec<_> = firsts
        .iter()
        .filter(|&&(d, _, _)| d == max_depth)
        .map(|&(_, multipv, mv)| (multipv, mv))
        .collect();
    final_lines.sort_by_key(|&(multipv, _)| multipv);
    assert_eq!(final_lines.len(), 3);
    // Three different first moves.
    assert_ne!(final_lines[0].1, final_lines[1].1);
    assert_ne!(final_lines[1].1, final_lines[2].1);
    assert_ne!(final_lines[0].1, final_lines[2].1);
}

#[test]
fn test_ponder_transition_produces_bestmove() {
    let board = Board::new();
    let pool = Arc::new(parking_lot::Mutex::new(Pool::new(1, 16)));
    let controller = pool.lock().controller();

    let node_trace = Arc::new(AtomicU64::new(0));
    let trace = Arc::clone(&node_trace);
    let info: InfoCallback = Arc::new(move |report| {
        // The node counter is monotone across the ponder transition.
        let previous = trace.swap(report.nodes, Ordering::SeqCst);
        assert!(report.nodes >= previous);
    });

    let limits = SearchLimits {
        time: TimeControl::MoveTime { time_ms: 120 },
        depth: None,
        nodes: None,
        infinite: false,
        ponder: true,
        searchmoves: Vec::new(),
    };

    let search_pool = Arc::clone(&pool);
    let handle = std::thread::spawn(move || {
        search_pool.lock().go(&board, limits, 1, Some(info))
    });

    // While pondering the clock is suppressed; the hit starts it.
    std::thread::sleep(std::time::Duration::from_millis(50));
    controller.ponderhit();

    let result = handle.join().expect("search thread panicked");
    assert!(result.best_move.is_some());
}

#[test]
fn test_stop_aborts_infinite_search() {
    let board = Board::new();
    let pool = Arc::new(parking_lot::Mutex::new(Pool::new(2, 16)));
    let controller = pool.lock().controller();

    let limits = SearchLimits {
        time: TimeControl::Infinite,
        depth: None,
        nodes: None,
        infinite: true,
        ponder: false,
        searchmoves: Vec::new(),
    };

    let search_pool = Arc::clone(&pool);
    let handle = std::thread::spawn(move || {
        search_pool.lock().go(&board, limits, 1, None)
    });

    std::thread::sleep(std::time::Duration::from_millis(80));
    controller.stop();
    let result = handle.join().expect("search thread panicked");
    assert!(result.best_move.is_some());
}

// The Reti study: the white king catches both pawns... a known draw, but
// reaching the proof takes a deep search. Run with `--ignored` in release.
#[test]
#[ignore]
fn test_reti_study_is_drawn() {
    let board: Board = "K7/8/k1P5/7p/8/8/8/8 w - - 0 1".parse().unwrap();
    let mut pool = Pool::new(1, 64);
    let result = pool.go(&board, depth_limits(20), 1, None);
    assert!(result.score.abs() <= 50, "Reti study should hold the draw");
}
