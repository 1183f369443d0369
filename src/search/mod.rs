//! The search: iterative-deepening alpha-beta over a lazy-SMP worker pool.

pub mod constants;

mod alphabeta;
mod iterative;
mod quiescence;
mod selector;
mod smp;
mod tables;
mod worker;

use std::sync::Arc;

use crate::board::Move;
use crate::engine::TimeControl;
use crate::tt::Bound;

pub use smp::{Pool, SearchController, SearchResult, MAX_THREADS};
pub use tables::OrderingTables;

/// Control-flow sentinel for a stopped search. Not an error: the recursion
/// short-circuits through `Result` back to the iterative-deepening loop,
/// which keeps the last completed iteration's line.
#[derive(Debug, Clone, Copy)]
pub struct Aborted;

/// Everything one `go` request constrains the search by.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    pub time: TimeControl,
    pub depth: Option<i32>,
    pub nodes: Option<u64>,
    pub infinite: bool,
    pub ponder: bool,
    /// When non-empty, only these root moves are searched.
    pub searchmoves: Vec<Move>,
}

/// A completed (or fail-bounded) iteration, handed to the info callback.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub depth: i32,
    pub seldepth: i32,
    /// 1-based multi-PV line index.
    pub multipv: usize,
    pub score: i32,
    /// `Exact` for a completed line, `Lower`/`Upper` for aspiration fails.
    pub bound: Bound,
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u64,
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

/// Callback invoked by the master worker after every iteration.
pub type InfoCallback = Arc<dyn Fn(&SearchReport) + Send + Sync>;
