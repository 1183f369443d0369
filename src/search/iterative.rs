//! Iterative deepening with aspiration windows and multi-PV.

use std::sync::atomic::Ordering;

use crate::board::{Move, MAX_PLY};
use crate::tt::Bound;

use super::constants::{
    is_mate_score, mate_distance, ASPIRATION_DELTA, ASPIRATION_MAX_DELTA, ASPIRATION_MIN_DEPTH,
    INFINITE,
};
use super::worker::Worker;
use super::{Aborted, SearchReport};

impl Worker {
    /// A worker's whole participation in one search dispatch: deepen until
    /// stopped, publishing each completed depth to the pool-wide ladder and
    /// picking the next depth from it.
    pub(crate) fn run(&mut self) {
        let max_depth = self
            .shared
            .limits
            .depth
            .unwrap_or(MAX_PLY as i32 - 1)
            .clamp(1, MAX_PLY as i32 - 1);

        // Even workers start one ply shallower than odd ones, staggering
        // the ensemble across depths.
        let mut depth = 1 + (self.id % 2) as i32;
        let mut previous_score = 0;

        while depth <= max_depth {
            self.root_depth = depth;
            self.multipv_exclusions.clear();
            let lines = self.shared.multi_pv.min(self.root_moves.len());

            let mut aborted = false;
            for pv_index in 0..lines {
                match self.aspiration(depth, previous_score, pv_index) {
                    Ok(score) => {
                        let line = self.pv.line(0).to_vec();
                        if pv_index == 0 {
                            previous_score = score;
                            self.best_score = score;
                            if !line.is_empty() {
                                self.best_pv = line.clone();
                            }
                        }
                        if let Some(&first) = line.first() {
                            self.multipv_exclusions.push(first);
                        }
                        self.report(depth, score, Bound::Exact, pv_index, &line);
                    }
                    Err(Aborted) => {
                        aborted = true;
                        break;
                    }
                }
            }
            if aborted {
                break;
            }

            self.completed_depth = depth;
            self.shared.publish_depth(depth);

            for rm in &mut self.root_moves {
                rm.prev_score = rm.score;
            }
            self.root_moves.sort_by_key(|rm| std::cmp::Reverse(rm.score));

            // The master stops the pool once a mate is proven deep enough,
            // unless told to keep searching.
            if self.id == 0
                && is_mate_score(previous_score)
                && !self.shared.limits.infinite
                && !self.shared.limits.ponder
                && depth >= 2 * mate_distance(previous_score).abs()
            {
                self.shared.stop.store(true, Ordering::Release);
            }

            if self.shared.stop.load(Ordering::Acquire) {
                break;
            }
            if self.id == 0 && !self.shared.time.lock().new_iteration(depth) {
                self.shared.stop.store(true, Ordering::Release);
                break;
            }

            // Lazy SMP ladder: leapfrog whatever the pool has finished.
            depth = self
                .shared
                .completed_depth
                .load(Ordering::Relaxed)
                .max(depth)
                + 1;
        }

        self.flush_nodes();
        if self.id == 0 {
            self.shared.stop.store(true, Ordering::Release);
        }
    }

    /// One iteration at `depth` inside an aspiration window around the
    /// previous score, doubling the window on every fail until it spans the
    /// full range. Fail-high/low results are reported with their bound.
    fn aspiration(&mut self, depth: i32, previous: i32, pv_index: usize) -> Result<i32, Aborted> {
        let mut delta = ASPIRATION_DELTA;
        let (mut alpha, mut beta) = if depth >= ASPIRATION_MIN_DEPTH {
            (
                (previous - delta).max(-INFINITE),
                (previous + delta).min(INFINITE),
            )
        } else {
            (-INFINITE, INFINITE)
        };
        self.resolving_fail = false;

        loop {
            let score = self.search(depth, alpha, beta, true, crate::board::NO_MOVE)?;

            if score <= alpha && alpha > -INFINITE {
                self.report(depth, score, Bound::Upper, pv_index, &[]);
                self.resolving_fail = true;
                delta *= 2;
                alpha = if delta > ASPIRATION_MAX_DELTA {
                    -INFINITE
                } else {
                    (score - delta).max(-INFINITE)
                };
            } else if score >= beta && beta < INFINITE {
                let line = self.pv.line(0).to_vec();
                self.report(depth, score, Bound::Lower, pv_index, &line);
                self.resolving_fail = true;
                delta *= 2;
                beta = if delta > ASPIRATION_MAX_DELTA {
                    INFINITE
                } else {
                    (score + delta).min(INFINITE)
                };
            } else {
                self.resolving_fail = false;
                return Ok(score);
            }
        }
    }

    /// Report an iteration result through the master's info callback.
    fn report(&mut self, depth: i32, score: i32, bound: Bound, pv_index: usize, pv: &[Move]) {
        if self.id != 0 {
            return;
        }
        let Some(callback) = self.shared.info.clone() else {
            return;
        };
        self.flush_nodes();

        let nodes = self.shared.total_nodes();
        let time_ms = self.shared.time.lock().elapsed_ms();
        let nps = if time_ms > 0 {
            nodes * 1000 / time_ms
        } else {
            0
        };
        let report = SearchReport {
            depth,
            seldepth: self.seldepth,
            multipv: pv_index + 1,
            score,
            bound,
            nodes,
            nps,
            time_ms,
            hashfull: self.shared.tt.hashfull(),
            pv: pv.to_vec(),
        };
        callback(&report);
    }
}
