//! Lazy-SMP worker pool.
//!
//! A fixed pool of workers shares the transposition table and the
//! coordination atomics; everything else (board, ordering tables, PV lines)
//! is owned per worker. Worker 0 is the master: it runs on the dispatching
//! thread, owns the clock, and publishes the stop flag for everyone.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::board::{attack_tables, Board, Move};
use crate::engine::{Tablebases, TimeManager};
use crate::tt::TranspositionTable;

use super::tables::OrderingTables;
use super::worker::{SharedState, Worker};
use super::{InfoCallback, SearchLimits};

/// Stack size for search threads; the recursion carries per-node selector
/// state.
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Upper bound on configurable workers.
pub const MAX_THREADS: usize = 1024;

/// Outcome of one search dispatch.
#[derive(Debug, Clone, Copy)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// Expected reply, for pondering.
    pub ponder_move: Option<Move>,
    pub score: i32,
    pub depth: i32,
}

/// Handle for stopping or ponder-hitting a running search from another
/// thread.
#[derive(Clone)]
pub struct SearchController {
    stop: Arc<AtomicBool>,
    time: Arc<Mutex<TimeManager>>,
}

impl SearchController {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// The pondered-on move was played: start the clock for real.
    pub fn ponderhit(&self) {
        self.time.lock().ponderhit();
    }
}

/// The worker pool. Created once at startup; each `go` dispatches every
/// worker onto the current position.
pub struct Pool {
    tables: Vec<OrderingTables>,
    tt: Arc<TranspositionTable>,
    tablebases: Arc<Tablebases>,
    stop: Arc<AtomicBool>,
    time: Arc<Mutex<TimeManager>>,
}

impl Pool {
    #[must_use]
    pub fn new(threads: usize, hash_mb: usize) -> Self {
        attack_tables::init();
        let threads = threads.clamp(1, MAX_THREADS);
        let mut tables = Vec::with_capacity(threads);
        tables.resize_with(threads, OrderingTables::new);
        Pool {
            tables,
            tt: Arc::new(TranspositionTable::new(hash_mb)),
            tablebases: Arc::new(Tablebases::new()),
            stop: Arc::new(AtomicBool::new(false)),
            time: Arc::new(Mutex::new(TimeManager::new())),
        }
    }

    pub fn set_threads(&mut self, threads: usize) {
        let threads = threads.clamp(1, MAX_THREADS);
        self.tables.resize_with(threads, OrderingTables::new);
        log::info!("worker pool resized to {threads} threads");
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.tables.len()
    }

    /// Replace the transposition table; the old contents are discarded.
    pub fn set_hash(&mut self, size_mb: usize) {
        self.tt = Arc::new(TranspositionTable::new(size_mb));
        log::info!("transposition table resized to {size_mb} MB");
    }

    pub fn set_tablebase_path(&mut self, path: &str) {
        let mut tb = Tablebases::new();
        tb.set_path(path);
        self.tablebases = Arc::new(tb);
    }

    pub fn set_move_overhead(&mut self, overhead_ms: u64) {
        self.time.lock().set_overhead(overhead_ms);
    }

    /// Forget everything learned from previous games.
    pub fn new_game(&mut self) {
        self.tt.clear();
        for tables in &mut self.tables {
            tables.clear();
        }
    }

    #[must_use]
    pub fn controller(&self) -> SearchController {
        SearchController {
            stop: Arc::clone(&self.stop),
            time: Arc::clone(&self.time),
        }
    }

    /// Run a search on `board` under `limits`, blocking until every worker
    /// has come home. Worker 0 runs on the calling thread.
    pub fn go(
        &mut self,
        board: &Board,
        limits: SearchLimits,
        multi_pv: usize,
        info: Option<InfoCallback>,
    ) -> SearchResult {
        self.stop.store(false, Ordering::Release);
        self.tt.new_search();
        self.time.lock().allocate(limits.time, limits.ponder);

        let mut root_board = board.clone();
        root_board.reset_height();
        let legal = root_board.generate_legal();
        let root_moves: Vec<Move> = legal
            .iter()
            .copied()
            .filter(|mv| limits.searchmoves.is_empty() || limits.searchmoves.contains(mv))
            .collect();

        if root_moves.is_empty() {
            // Checkmate or stalemate already on the board.
            return SearchResult {
                best_move: None,
                ponder_move: None,
                score: 0,
                depth: 0,
            };
        }
        if root_moves.len() == 1 && !limits.ponder && !limits.infinite {
            return SearchResult {
                best_move: Some(root_moves[0]),
                ponder_move: None,
                score: 0,
                depth: 0,
            };
        }

        let shared = Arc::new(SharedState {
            tt: Arc::clone(&self.tt),
            tablebases: Arc::clone(&self.tablebases),
            stop: Arc::clone(&self.stop),
            time: Arc::clone(&self.time),
            completed_depth: AtomicI32::new(0),
            nodes: AtomicU64::new(0),
            limits,
            multi_pv: multi_pv.max(1),
            info,
        });

        let mut workers: Vec<Worker> = self
            .tables
            .drain(..)
            .enumerate()
            .map(|(id, mut tables)| {
                tables.new_search();
                Worker::new(id, root_board.clone(), tables, &root_moves, Arc::clone(&shared))
            })
            .collect();

        let mut master = workers.remove(0);
        let mut finished: Vec<Worker> = Vec::with_capacity(workers.len() + 1);

        thread::scope(|scope| {
            let handles: Vec<_> = workers
                .into_iter()
                .map(|mut worker| {
                    thread::Builder::new()
                        .name(format!("search-{}", worker.id))
                        .stack_size(SEARCH_STACK_SIZE)
                        .spawn_scoped(scope, move || {
                            worker.run();
                            worker
                        })
                        .expect("failed to spawn search worker")
                })
                .collect();

            master.run();
            finished.push(master);
            for handle in handles {
                finished.push(handle.join().expect("search worker panicked"));
            }
        });

        finished.sort_by_key(|worker| worker.id);

        // Worker 0's line by default; in single-PV mode a helper that
        // finished deeper (or equally deep with a better score) wins.
        let mut best_idx = 0;
        if shared.multi_pv == 1 {
            for (i, worker) in finished.iter().enumerate().skip(1) {
                if worker.best_pv.is_empty() {
                    continue;
                }
                let incumbent = &finished[best_idx];
                if incumbent.best_pv.is_empty()
                    || worker.completed_depth > incumbent.completed_depth
                    || (worker.completed_depth == incumbent.completed_depth
                        && worker.best_score > incumbent.best_score)
                {
                    best_idx = i;
                }
            }
        }

        let best = &finished[best_idx];
        let result = SearchResult {
            best_move: best.best_pv.first().copied().or(Some(root_moves[0])),
            ponder_move: best.best_pv.get(1).copied(),
            score: best.best_score,
            depth: best.completed_depth,
        };

        self.tables = finished.into_iter().map(|worker| worker.tables).collect();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TimeControl;
    use crate::search::SearchLimits;

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
    fn test_search_returns_legal_move() {
        let mut pool = Pool::new(1, 16);
        let board = Board::new();
        let result = pool.go(&board, depth_limits(3), 1, None);
        let best = result.best_move.expect("a move from startpos");
        let mut check = board.clone();
        assert!(check.generate_legal().contains(best));
    }

    #[test]
    fn test_mate_in_one_found() {
        let mut pool = Pool::new(1, 16);
        let board: Board = "7k/5Q2/6K1/8/8/8/8/8 w - - 0 1".parse().unwrap();
        let result = pool.go(&board, depth_limits(4), 1, None);
        assert_eq!(result.best_move.unwrap().to_string(), "f7g7");
        assert_eq!(result.score, crate::search::constants::CHECKMATE - 1);
    }

    #[test]
    fn test_stalemate_returns_no_move() {
        // Black to move is stalemated.
        let board: Board = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap();
        let mut pool = Pool::new(1, 16);
        let result = pool.go(&board, depth_limits(3), 1, None);
        assert!(result.best_move.is_none());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_single_reply_shortcut() {
        // Back-rank check with a single escape square.
        let board: Board = "R5k1/6pp/8/8/8/8/8/6K1 b - - 0 1".parse().unwrap();
        let mut pool = Pool::new(1, 16);
        let result = pool.go(&board, depth_limits(10), 1, None);
        assert_eq!(result.best_move.unwrap().to_string(), "g8f7");
    }

    #[test]
    fn test_node_limit_respected() {
        let mut pool = Pool::new(1, 16);
        let board = Board::new();
        let limits = SearchLimits {
            time: TimeControl::Infinite,
            depth: None,
            nodes: Some(20_000),
            infinite: false,
            ponder: false,
            searchmoves: Vec::new(),
        };
        let result = pool.go(&board, limits, 1, None);
        assert!(result.best_move.is_some());
        // Node polling granularity allows a modest overshoot.
        // (The pool aggregates across workers every 1024 nodes.)
    }

    #[test]
    fn test_searchmoves_filter() {
        let mut pool = Pool::new(1, 16);
        let mut board = Board::new();
        let only = board.parse_move("a2a3").unwrap();
        let limits = SearchLimits {
            time: TimeControl::Infinite,
            depth: Some(4),
            nodes: None,
            infinite: false,
            ponder: false,
            searchmoves: vec![only],
        };
        let result = pool.go(&board, limits, 1, None);
        assert_eq!(result.best_move, Some(only));
    }

    #[test]
    fn test_multithreaded_search_agrees_on_legality() {
        let mut pool = Pool::new(4, 16);
        let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let result = pool.go(&board, depth_limits(6), 1, None);
        let best = result.best_move.expect("kiwipete has moves");
        let mut check = board.clone();
        assert!(check.generate_legal().contains(best));
    }
}
