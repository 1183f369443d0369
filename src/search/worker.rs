//! Per-worker search state.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::board::{Board, Move, Piece, Square, MAX_PLY, NO_MOVE};
use crate::engine::{Tablebases, TimeManager};
use crate::tt::TranspositionTable;

use super::constants::{EVAL_NONE, STOP_CHECK_INTERVAL};
use super::tables::OrderingTables;
use super::{Aborted, InfoCallback, SearchLimits};

/// One principal variation line per search ply (triangular layout).
pub(crate) struct PvTable {
    lines: Vec<[Move; MAX_PLY]>,
    lens: [usize; MAX_PLY],
}

impl PvTable {
    pub fn new() -> Self {
        PvTable {
            lines: vec![[NO_MOVE; MAX_PLY]; MAX_PLY],
            lens: [0; MAX_PLY],
        }
    }

    #[inline]
    pub fn clear(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.lens[ply] = 0;
        }
    }

    /// Set `mv` as the head of this ply's line, followed by the line one
    /// ply deeper.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let child_len = if ply + 1 < MAX_PLY {
            self.lens[ply + 1]
        } else {
            0
        };
        let (head, tail) = self.lines.split_at_mut(ply + 1);
        let line = &mut head[ply];
        line[0] = mv;
        if child_len > 0 {
            let child = &tail[0];
            let copy_len = child_len.min(MAX_PLY - 1);
            line[1..=copy_len].copy_from_slice(&child[..copy_len]);
            self.lens[ply] = copy_len + 1;
        } else {
            self.lens[ply] = 1;
        }
    }

    #[must_use]
    pub fn line(&self, ply: usize) -> &[Move] {
        &self.lines[ply][..self.lens[ply]]
    }
}

/// Per-ply search stack entry.
#[derive(Clone, Copy)]
pub(crate) struct StackEntry {
    /// The move made at this ply (null for a null move).
    pub current: Move,
    /// Piece type and destination of that move, for counter/continuation
    /// lookups. `None` after a null move.
    pub moved: Option<(Piece, Square)>,
    pub static_eval: i32,
}

impl StackEntry {
    fn empty() -> Self {
        StackEntry {
            current: NO_MOVE,
            moved: None,
            static_eval: EVAL_NONE,
        }
    }
}

/// A root move with its running scores across iterations.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RootMove {
    pub mv: Move,
    pub score: i32,
    pub prev_score: i32,
}

/// State shared by every worker of one search dispatch.
pub(crate) struct SharedState {
    pub tt: Arc<TranspositionTable>,
    pub tablebases: Arc<Tablebases>,
    pub stop: Arc<AtomicBool>,
    pub time: Arc<Mutex<TimeManager>>,
    /// Pool-wide maximum completed depth (the lazy-SMP depth ladder).
    pub completed_depth: AtomicI32,
    /// Aggregated node count across workers.
    pub nodes: AtomicU64,
    pub limits: SearchLimits,
    pub multi_pv: usize,
    pub info: Option<InfoCallback>,
}

impl SharedState {
    /// Atomic-max publish of a worker's completed depth.
    pub fn publish_depth(&self, depth: i32) {
        let mut current = self.completed_depth.load(Ordering::Relaxed);
        while depth > current {
            match self.completed_depth.compare_exchange_weak(
                current,
                depth,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(seen) => current = seen,
            }
        }
    }

    #[must_use]
    pub fn total_nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }
}

/// A search worker: its own board, ordering tables, PV table, and counters.
/// Only the transposition table and the coordination atomics are shared.
pub(crate) struct Worker {
    pub id: usize,
    pub board: Board,
    pub tables: OrderingTables,
    pub pv: PvTable,
    pub stack: Vec<StackEntry>,
    pub root_moves: Vec<RootMove>,
    /// Root moves already reported this iteration (multi-PV exclusion set).
    pub multipv_exclusions: Vec<Move>,
    /// Nodes since the last flush into the shared counter.
    nodes_since_poll: u64,
    pub nodes: u64,
    pub seldepth: i32,
    /// Depth of the iteration currently running.
    pub root_depth: i32,
    pub completed_depth: i32,
    /// Set while re-searching a root fail past the last completed depth;
    /// extends the time allowance to the hard limit.
    pub resolving_fail: bool,
    pub shared: Arc<SharedState>,
    /// Best line of the last completed iteration.
    pub best_pv: Vec<Move>,
    pub best_score: i32,
}

impl Worker {
    pub fn new(
        id: usize,
        board: Board,
        tables: OrderingTables,
        root_moves: &[Move],
        shared: Arc<SharedState>,
    ) -> Self {
        let mut board = board;
        board.reset_height();
        Worker {
            id,
            board,
            tables,
            pv: PvTable::new(),
            stack: vec![StackEntry::empty(); MAX_PLY + 2],
            root_moves: root_moves
                .iter()
                .map(|&mv| RootMove {
                    mv,
                    score: -crate::search::constants::INFINITE,
                    prev_score: -crate::search::constants::INFINITE,
                })
                .collect(),
            multipv_exclusions: Vec::new(),
            nodes_since_poll: 0,
            nodes: 0,
            seldepth: 0,
            root_depth: 0,
            completed_depth: 0,
            resolving_fail: false,
            shared,
            best_pv: Vec::new(),
            best_score: -crate::search::constants::INFINITE,
        }
    }

    /// Count a node and poll the abort conditions every
    /// `STOP_CHECK_INTERVAL` nodes. The master additionally performs the
    /// time check and publishes the stop flag for everyone.
    pub fn visit_node(&mut self) -> Result<(), Aborted> {
        self.nodes += 1;
        self.nodes_since_poll += 1;
        if self.nodes_since_poll < STOP_CHECK_INTERVAL {
            return Ok(());
        }
        self.flush_nodes();

        if let Some(limit) = self.shared.limits.nodes {
            if self.shared.total_nodes() >= limit {
                self.shared.stop.store(true, Ordering::Release);
            }
        }
        if self.id == 0
            && !self
                .shared
                .time
                .lock()
                .check_time(self.resolving_fail, self.root_depth)
        {
            self.shared.stop.store(true, Ordering::Release);
        }

        if self.shared.stop.load(Ordering::Acquire) {
            return Err(Aborted);
        }
        Ok(())
    }

    /// Push locally-counted nodes into the shared aggregate.
    pub fn flush_nodes(&mut self) {
        if self.nodes_since_poll > 0 {
            self.shared
                .nodes
                .fetch_add(self.nodes_since_poll, Ordering::Relaxed);
            self.nodes_since_poll = 0;
        }
    }

    /// Previous move's (piece, to) `back` plies up the tree, for counter
    /// and continuation lookups.
    #[must_use]
    pub fn previous_move(&self, back: usize) -> Option<(Piece, Square)> {
        let height = self.board.height();
        if height < back {
            return None;
        }
        self.stack[height - back].moved
    }
}
