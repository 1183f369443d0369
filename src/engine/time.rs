//! Time management for UCI and XBoard searches.
//!
//! Protocol-agnostic: both frontends translate their clock commands into a
//! [`TimeControl`] and the search queries the resulting [`TimeManager`].

use std::time::Instant;

/// Default moves-to-go estimate when the protocol does not send one.
const DEFAULT_MOVES_TO_GO: u64 = 30;

/// Hard limit multiplier over the soft limit.
const HARD_LIMIT_FACTOR: u64 = 5;

/// Fraction of remaining time the hard limit may never exceed (percent).
const HARD_LIMIT_REMAINING_PERCENT: u64 = 80;

/// Time control mode for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeControl {
    /// No clock: search until stopped or a depth/node limit hits.
    #[default]
    Infinite,
    /// Exactly this many milliseconds for the move.
    MoveTime { time_ms: u64 },
    /// Remaining clock time with optional increment and moves-to-go.
    Incremental {
        remaining_ms: u64,
        increment_ms: u64,
        moves_to_go: Option<u64>,
    },
}

impl TimeControl {
    /// XBoard `st` command: seconds per move.
    #[must_use]
    pub fn from_seconds_per_move(seconds: u32) -> Self {
        TimeControl::MoveTime {
            time_ms: u64::from(seconds) * 1000,
        }
    }

    /// XBoard `time` state: remaining centiseconds plus `level` settings.
    #[must_use]
    pub fn from_centiseconds(
        remaining_cs: u64,
        increment_sec: u32,
        moves_per_session: Option<u32>,
    ) -> Self {
        TimeControl::Incremental {
            remaining_ms: remaining_cs * 10,
            increment_ms: u64::from(increment_sec) * 1000,
            moves_to_go: moves_per_session.map(u64::from).filter(|&m| m > 0),
        }
    }

    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, TimeControl::Infinite)
    }
}

/// Per-search clock state owned by the master worker.
#[derive(Debug)]
pub struct TimeManager {
    control: TimeControl,
    start: Instant,
    soft_ms: u64,
    hard_ms: u64,
    pondering: bool,
    overhead_ms: u64,
}

impl TimeManager {
    #[must_use]
    pub fn new() -> Self {
        TimeManager {
            control: TimeControl::Infinite,
            start: Instant::now(),
            soft_ms: u64::MAX,
            hard_ms: u64::MAX,
            pondering: false,
            overhead_ms: 100,
        }
    }

    /// Communication-latency reserve taken off the clock (UCI MoveOverhead).
    pub fn set_overhead(&mut self, overhead_ms: u64) {
        self.overhead_ms = overhead_ms;
    }

    #[must_use]
    pub fn overhead(&self) -> u64 {
        self.overhead_ms
    }

    /// Called once per search: derive the soft and hard limits from the
    /// control and start the clock.
    ///
    /// For incremental controls with `M` moves to go and increment `I`:
    /// soft = remaining / M + I, clamped by remaining minus the overhead;
    /// hard = min(5 x soft, 80% of remaining).
    pub fn allocate(&mut self, control: TimeControl, pondering: bool) {
        self.control = control;
        self.pondering = pondering;
        self.start = Instant::now();

        match control {
            TimeControl::Infinite => {
                self.soft_ms = u64::MAX;
                self.hard_ms = u64::MAX;
            }
            TimeControl::MoveTime { time_ms } => {
                let t = time_ms.saturating_sub(self.overhead_ms).max(1);
                self.soft_ms = t;
                self.hard_ms = t;
            }
            TimeControl::Incremental {
                remaining_ms,
                increment_ms,
                moves_to_go,
            } => {
                let mtg = moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
                let ceiling = remaining_ms.saturating_sub(self.overhead_ms).max(1);
                let soft = (remaining_ms / mtg + increment_ms).min(ceiling);
                let hard = (soft.saturating_mul(HARD_LIMIT_FACTOR))
                    .min(remaining_ms * HARD_LIMIT_REMAINING_PERCENT / 100)
                    .max(1);
                self.soft_ms = soft.max(1);
                self.hard_ms = hard.max(self.soft_ms);
            }
        }
    }

    /// Restart the clock on a ponder hit: time is allocated as if the search
    /// had just begun.
    pub fn ponderhit(&mut self) {
        self.pondering = false;
        self.start = Instant::now();
    }

    #[must_use]
    pub fn is_pondering(&self) -> bool {
        self.pondering
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// May the search keep running? `resolving_fail` is set while a worker
    /// is past its last completed depth resolving a root fail-high/low, in
    /// which case only the hard limit stops it. Depth-1 iterations never
    /// stop on time.
    #[must_use]
    pub fn check_time(&self, resolving_fail: bool, depth: i32) -> bool {
        if self.pondering || self.control.is_unlimited() || depth <= 1 {
            return true;
        }
        let elapsed = self.elapsed_ms();
        if resolving_fail {
            elapsed <= self.hard_ms
        } else {
            elapsed <= self.soft_ms
        }
    }

    /// May another iteration start?
    #[must_use]
    pub fn new_iteration(&self, depth: i32) -> bool {
        self.pondering
            || self.control.is_unlimited()
            || depth <= 1
            || self.elapsed_ms() < self.soft_ms
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        TimeManager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infinite_never_stops() {
        let mut tm = TimeManager::new();
        tm.allocate(TimeControl::Infinite, false);
        assert!(tm.check_time(false, 30));
        assert!(tm.new_iteration(30));
    }

    #[test]
    fn test_incremental_allocation() {
        let mut tm = TimeManager::new();
        tm.allocate(
            TimeControl::Incremental {
                remaining_ms: 60_000,
                increment_ms: 1_000,
                moves_to_go: Some(30),
            },
            false,
        );
        // soft = 60000/30 + 1000 = 3000, hard = min(15000, 48000) = 15000.
        assert_eq!(tm.soft_ms, 3_000);
        assert_eq!(tm.hard_ms, 15_000);
    }

    #[test]
    fn test_soft_limit_clamped_by_remaining() {
        let mut tm = TimeManager::new();
        tm.allocate(
            TimeControl::Incremental {
                remaining_ms: 500,
                increment_ms: 2_000,
                moves_to_go: Some(1),
            },
            false,
        );
        // remaining/1 + 2000 would exceed the clock; clamp to
        // remaining - overhead.
        assert_eq!(tm.soft_ms, 400);
        assert!(tm.hard_ms >= tm.soft_ms);
    }

    #[test]
    fn test_movetime_subtracts_overhead() {
        let mut tm = TimeManager::new();
        tm.set_overhead(50);
        tm.allocate(TimeControl::MoveTime { time_ms: 1_000 }, false);
        assert_eq!(tm.soft_ms, 950);
        assert_eq!(tm.hard_ms, 950);
    }

    #[test]
    fn test_depth_one_never_stops() {
        let mut tm = TimeManager::new();
        tm.allocate(TimeControl::MoveTime { time_ms: 1 }, false);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(tm.check_time(false, 1));
        assert!(!tm.check_time(false, 2));
    }

    #[test]
    fn test_pondering_suppresses_checks() {
        let mut tm = TimeManager::new();
        tm.allocate(TimeControl::MoveTime { time_ms: 1 }, true);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(tm.check_time(false, 10));
        tm.ponderhit();
        // After the ponder hit the clock restarts from zero.
        assert!(!tm.is_pondering());
        assert!(tm.elapsed_ms() < 5);
    }

    #[test]
    fn test_resolving_fail_uses_hard_limit() {
        let mut tm = TimeManager::new();
        tm.allocate(
            TimeControl::Incremental {
                remaining_ms: 10_000,
                increment_ms: 0,
                moves_to_go: Some(10),
            },
            false,
        );
        // soft = 1000, hard = 5000. Fake an elapsed time between the two.
        tm.start = Instant::now() - std::time::Duration::from_millis(2_000);
        assert!(!tm.check_time(false, 10));
        assert!(tm.check_time(true, 10));
    }
}
