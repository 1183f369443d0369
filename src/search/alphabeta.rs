//! The alpha-beta search node.
//!
//! Negamax with principal-variation search, transposition-table cutoffs,
//! null-move pruning, razoring, reverse futility, ProbCut, singular
//! extensions, late-move reductions, and the per-child prunings. Aborts
//! propagate as `Err(Aborted)` through every pending frame; each frame
//! restores its board state before passing the error up, so nothing but
//! completed transposition-table entries survives an abort.

use crate::board::{evaluate, Move, MAX_PLY, NO_MOVE};
use crate::tt::{bound_allows_cutoff, Bound};

use super::constants::{
    is_mate_score, lmr_reduction, CHECKMATE, CONT_HIST_PRUNE_DEPTH, CONT_HIST_PRUNE_MARGIN, DRAW,
    EVAL_NONE, FUTILITY_DEPTH, FUTILITY_MARGIN, INFINITE, LMP_COUNT, LMP_DEPTH,
    LMR_HISTORY_DIVISOR, MATE_BOUND, NULL_MOVE_DEPTH, PROBCUT_DEPTH, PROBCUT_MARGIN,
    PROBCUT_REDUCTION, RAZOR_DEPTH, RAZOR_MARGIN, SEE_PRUNE_DEPTH, SEE_QUIET_MARGIN,
    SEE_TACTICAL_MARGIN, SINGULAR_DEPTH, SINGULAR_TT_DEPTH_SLACK,
};
use super::selector::{counter_for, MoveSelector, OrderingContext};
use super::tables::piece_index;
use super::worker::Worker;
use super::Aborted;

const MAX_TRACKED_QUIETS: usize = 64;

impl Worker {
    /// Search a node to `depth` within the window `(alpha, beta)`.
    ///
    /// `try_null` gates null-move pruning (off directly after a null move);
    /// `excluded` names a move omitted from this node for singular
    /// verification, `NO_MOVE` otherwise.
    pub(crate) fn search(
        &mut self,
        depth: i32,
        mut alpha: i32,
        beta: i32,
        try_null: bool,
        excluded: Move,
    ) -> Result<i32, Aborted> {
        debug_assert!(alpha < beta);
        let height = self.board.height() as i32;
        let at_root = height == 0;
        let is_pv = beta - alpha > 1;

        if depth <= 0 || height as usize >= MAX_PLY - 1 {
            return self.quiescence(alpha, beta);
        }

        self.visit_node()?;
        self.pv.clear(height as usize);
        self.seldepth = self.seldepth.max(height + 1);

        let us = self.board.side_to_move();
        let in_check = self.board.in_check(us);

        if !at_root && (self.board.is_repetition() || self.board.is_fifty_move_draw()) {
            return Ok(DRAW);
        }

        // Transposition table.
        let mut tt_move = NO_MOVE;
        let mut tt_depth = -1;
        let mut tt_score = 0;
        let mut tt_bound = Bound::None;
        let mut tt_eval = EVAL_NONE;
        if let Some(entry) = self.shared.tt.probe(self.board.hash(), height) {
            let candidate = self.board.expand_tt_move(entry.mv);
            if !candidate.is_none() && self.board.is_pseudo_legal(candidate) {
                tt_move = candidate;
            }
            tt_depth = entry.depth;
            tt_score = entry.score;
            tt_bound = entry.bound;
            tt_eval = entry.eval;

            if !at_root
                && excluded.is_none()
                && entry.depth >= depth
                && bound_allows_cutoff(entry.bound, entry.score, alpha, beta, is_pv)
            {
                return Ok(entry.score);
            }
        }

        // Endgame tablebases.
        if !at_root && excluded.is_none() && self.shared.tablebases.should_probe(&self.board) {
            if let Some(wdl) = self.shared.tablebases.probe_wdl(&self.board) {
                let score = match wdl.cmp(&0) {
                    std::cmp::Ordering::Greater => MATE_BOUND - 1 - height,
                    std::cmp::Ordering::Less => -(MATE_BOUND - 1 - height),
                    std::cmp::Ordering::Equal => DRAW,
                };
                if (wdl > 0 && score >= beta) || (wdl < 0 && score <= alpha) || wdl == 0 {
                    return Ok(score);
                }
            }
        }

        // Static evaluation, reused from the table when available.
        let static_eval = if in_check {
            EVAL_NONE
        } else if tt_eval != EVAL_NONE {
            tt_eval
        } else {
            evaluate(&self.board)
        };
        self.stack[height as usize].static_eval = static_eval;
        let improving = !in_check && height >= 2 && {
            let prior = self.stack[(height - 2) as usize].static_eval;
            prior != EVAL_NONE && static_eval > prior
        };

        // Node-level prunings at non-root, non-PV nodes.
        let mut singular_candidate = false;
        if !at_root && !is_pv && !in_check && excluded.is_none() {
            // Reverse futility: far enough above beta that the opponent has
            // no realistic comeback at this depth.
            if depth <= FUTILITY_DEPTH
                && self.board.has_nonpawn_material(us)
                && static_eval - FUTILITY_MARGIN[depth as usize] >= beta
            {
                return Ok(static_eval);
            }

            // Razoring: hopelessly below alpha, verify with quiescence.
            if depth <= RAZOR_DEPTH
                && tt_move.is_none()
                && static_eval + RAZOR_MARGIN[depth as usize] <= alpha
            {
                if depth == 1 {
                    return self.quiescence(alpha, beta);
                }
                let threshold = alpha - RAZOR_MARGIN[depth as usize];
                let value = self.quiescence(threshold, threshold + 1)?;
                if value <= threshold {
                    return Ok(value);
                }
            }

            // Null move: hand the opponent a free move; if the reduced
            // search still fails high the real position almost surely does.
            if try_null
                && depth > NULL_MOVE_DEPTH
                && static_eval >= beta
                && self.board.has_nonpawn_material(us)
            {
                let reduction = 2 + depth / 6;
                self.stack[height as usize].current = Move::null();
                self.stack[height as usize].moved = None;
                self.board.make_null_move();
                let result = self.search(depth - reduction - 1, -beta, -beta + 1, false, NO_MOVE);
                self.board.unmake_null_move();
                let score = -result?;
                if score >= beta {
                    // A mate proven with a free move for the opponent is not
                    // trustworthy; cap at beta.
                    return Ok(if is_mate_score(score) {
                        beta
                    } else {
                        score.min(beta)
                    });
                }
            }

            // ProbCut: a good capture that beats beta by a margin at
            // reduced depth refutes the node.
            if depth >= PROBCUT_DEPTH
                && self.board.has_nonpawn_material(us)
                && !is_mate_score(beta)
            {
                let threshold = beta + PROBCUT_MARGIN;
                if let Some(score) = self.probcut(depth, threshold, static_eval)? {
                    return Ok(score);
                }
            }

            singular_candidate = depth >= SINGULAR_DEPTH
                && !tt_move.is_none()
                && tt_bound == Bound::Lower
                && tt_depth >= depth - SINGULAR_TT_DEPTH_SLACK
                && !is_mate_score(beta)
                && !is_mate_score(tt_score);
        }

        // Singular verification: search the node without the TT move at
        // half depth; if nothing comes close, the TT move is singular and
        // earns an extension.
        let mut singular = false;
        if singular_candidate {
            let target = tt_score - 2 * depth;
            let value = self.search(depth / 2, target - 1, target, false, tt_move)?;
            if value < target {
                singular = true;
            }
        }

        let futility = !at_root
            && !is_pv
            && !in_check
            && excluded.is_none()
            && depth <= FUTILITY_DEPTH
            && static_eval != EVAL_NONE
            && static_eval + FUTILITY_MARGIN[depth as usize] <= alpha;

        // Move loop.
        let killer1 = self.tables.killers.primary(height as usize);
        let killer2 = self.tables.killers.secondary(height as usize);
        let prev = self.previous_move(1);
        let prev2 = self.previous_move(2);
        let counter = counter_for(&self.tables, us, prev);
        let mut selector = if in_check {
            MoveSelector::evasions(tt_move)
        } else {
            MoveSelector::main(tt_move, killer1, killer2, counter)
        };

        let mut best_score = -INFINITE;
        let mut best_move = NO_MOVE;
        let mut raised_alpha = false;
        let mut legal_moves = 0usize;
        let mut move_count = 0usize;
        let mut quiets_tried = [NO_MOVE; MAX_TRACKED_QUIETS];
        let mut quiets_count = 0usize;
        let mut root_index = 0usize;

        loop {
            let next = if at_root {
                let mut picked = None;
                while root_index < self.root_moves.len() {
                    let m = self.root_moves[root_index].mv;
                    root_index += 1;
                    if !self.multipv_exclusions.contains(&m) {
                        picked = Some(m);
                        break;
                    }
                }
                picked
            } else {
                let ctx = OrderingContext {
                    tables: &self.tables,
                    stm: us,
                    prev,
                    prev2,
                };
                selector.next(&self.board, &ctx)
            };
            let Some(mv) = next else { break };
            if mv == excluded {
                continue;
            }
            move_count += 1;

            let gives_check = self.board.gives_check(mv);
            let is_tactical = mv.is_tactical() || in_check || gives_check;
            let moved = self.board.piece_at(mv.from()).map(|(_, p)| (p, mv.to()));

            let main_hist = self.tables.history.score(us, mv);
            let cont_hist = match (prev, moved) {
                (Some(p), Some(c)) => self.tables.continuation[0].score(p, c),
                _ => 0,
            };
            let follow_hist = match (prev2, moved) {
                (Some(p), Some(c)) => self.tables.continuation[1].score(p, c),
                _ => 0,
            };

            // Per-child prunings, only once a mate-avoiding move is banked.
            if !at_root && best_score > -MATE_BOUND {
                if futility && !is_tactical {
                    continue;
                }
                if !is_pv
                    && depth <= LMP_DEPTH
                    && !is_tactical
                    && move_count > LMP_COUNT[depth as usize]
                    && !is_mate_score(alpha)
                {
                    continue;
                }
                if depth < SEE_PRUNE_DEPTH {
                    let margin = if is_tactical {
                        SEE_TACTICAL_MARGIN * depth * depth
                    } else {
                        SEE_QUIET_MARGIN * depth
                    };
                    if !self.board.see_ge(mv, margin) {
                        continue;
                    }
                }
                if !is_tactical
                    && depth <= CONT_HIST_PRUNE_DEPTH
                    && (cont_hist < CONT_HIST_PRUNE_MARGIN
                        || follow_hist < CONT_HIST_PRUNE_MARGIN)
                {
                    continue;
                }
            }

            // Extensions, at most one ply per move.
            let mut extension = 0;
            if singular && mv == tt_move {
                extension = 1;
            } else if gives_check && (at_root || self.board.see_ge(mv, 0)) {
                extension = 1;
            } else if !at_root && is_pv && !gives_check && mv.is_capture() && height >= 1 {
                // Recapture on the square of the opponent's last capture.
                let prev_mv = self.stack[(height - 1) as usize].current;
                if prev_mv.is_capture() && prev_mv.to() == mv.to() && self.board.see_ge(mv, 0) {
                    extension = 1;
                }
            }

            self.stack[height as usize].current = mv;
            self.stack[height as usize].moved = moved;

            if !self.board.make_move(mv) {
                continue;
            }
            legal_moves += 1;
            if mv.is_quiet() && quiets_count < MAX_TRACKED_QUIETS {
                quiets_tried[quiets_count] = mv;
                quiets_count += 1;
            }

            let ext_depth = depth + extension;

            // Late-move reduction for quiet moves ordered late.
            let mut reduction = 0;
            if !is_tactical && extension == 0 && legal_moves > 1 && ext_depth > 2 {
                let mut r = lmr_reduction(ext_depth, move_count);
                r -= ((cont_hist + follow_hist + main_hist) / LMR_HISTORY_DIVISOR).clamp(-2, 2);
                if !is_pv && !improving {
                    r += 1;
                }
                reduction = r.clamp(0, ext_depth - 1);
            }

            let result =
                self.search_child(ext_depth, reduction, alpha, beta, is_pv, legal_moves == 1);
            self.board.unmake_move();
            let score = result?;

            if at_root {
                if let Some(rm) = self.root_moves.iter_mut().find(|rm| rm.mv == mv) {
                    rm.score = if legal_moves == 1 || score > alpha {
                        score
                    } else {
                        -INFINITE
                    };
                }
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if score > alpha {
                    if is_pv {
                        self.pv.update(height as usize, mv);
                    }
                    if score >= beta {
                        break;
                    }
                    alpha = score;
                    raised_alpha = true;
                }
            }
        }

        if legal_moves == 0 {
            if !excluded.is_none() {
                // Everything but the excluded move was illegal: report the
                // fail-low the singular verification expects.
                return Ok(alpha);
            }
            return Ok(if in_check {
                -CHECKMATE + height
            } else {
                DRAW
            });
        }

        if best_score >= beta {
            self.update_cutoff_stats(
                best_move,
                depth,
                height as usize,
                prev,
                prev2,
                &quiets_tried[..quiets_count],
            );
        }

        if excluded.is_none() {
            let bound = if best_score >= beta {
                Bound::Lower
            } else if raised_alpha {
                Bound::Exact
            } else {
                Bound::Upper
            };
            self.shared.tt.store(
                self.board.hash(),
                best_move.compact(),
                best_score,
                static_eval,
                depth,
                bound,
                height,
            );
        }

        Ok(best_score)
    }

    /// Principal-variation recursion for one child: full window on the
    /// first move, otherwise a reduced null-window probe with re-searches
    /// when it improves alpha. Returns the score from the parent's
    /// perspective.
    fn search_child(
        &mut self,
        ext_depth: i32,
        reduction: i32,
        alpha: i32,
        beta: i32,
        is_pv: bool,
        first: bool,
    ) -> Result<i32, Aborted> {
        if first {
            return Ok(-self.search(ext_depth - 1, -beta, -alpha, true, NO_MOVE)?);
        }
        let mut score =
            -self.search(ext_depth - 1 - reduction, -alpha - 1, -alpha, true, NO_MOVE)?;
        if score > alpha && reduction > 0 {
            score = -self.search(ext_depth - 1, -alpha - 1, -alpha, true, NO_MOVE)?;
        }
        if is_pv && score > alpha {
            score = -self.search(ext_depth - 1, -beta, -alpha, true, NO_MOVE)?;
        }
        Ok(score)
    }

    /// ProbCut: try captures whose static exchange clears `threshold -
    /// static_eval`; any reduced search scoring at or above the threshold
    /// refutes the node.
    fn probcut(
        &mut self,
        depth: i32,
        threshold: i32,
        static_eval: i32,
    ) -> Result<Option<i32>, Aborted> {
        let height = self.board.height();
        let us = self.board.side_to_move();
        let mut selector = MoveSelector::probcut(threshold - static_eval);

        loop {
            let ctx = OrderingContext {
                tables: &self.tables,
                stm: us,
                prev: None,
                prev2: None,
            };
            let Some(mv) = selector.next(&self.board, &ctx) else {
                return Ok(None);
            };
            let moved = self.board.piece_at(mv.from()).map(|(_, p)| (p, mv.to()));
            self.stack[height].current = mv;
            self.stack[height].moved = moved;
            if !self.board.make_move(mv) {
                continue;
            }
            let result = self.search(
                depth - PROBCUT_REDUCTION,
                -threshold,
                -threshold + 1,
                true,
                NO_MOVE,
            );
            self.board.unmake_move();
            let score = -result?;
            if score >= threshold {
                return Ok(Some(score));
            }
        }
    }

    /// Beta-cutoff bookkeeping: killers and the counter move (unless the
    /// cutter is a capture that holds its material), history bonus for the
    /// cutter, penalties for the quiets tried before it.
    fn update_cutoff_stats(
        &mut self,
        best_move: Move,
        depth: i32,
        ply: usize,
        prev: Option<(crate::board::Piece, crate::board::Square)>,
        prev2: Option<(crate::board::Piece, crate::board::Square)>,
        quiets_tried: &[Move],
    ) {
        let us = self.board.side_to_move();

        if !(best_move.is_capture() && self.board.see_ge(best_move, 0)) {
            self.tables.killers.update(ply, best_move);
            if let Some((piece, to)) = prev {
                self.tables
                    .counters
                    .set(piece_index(us.opponent(), piece), to, best_move);
            }
        }

        if best_move.is_quiet() {
            self.tables.history.bonus(us, best_move, depth);
            if let Some((_, piece)) = self.board.piece_at(best_move.from()) {
                let cur = (piece, best_move.to());
                if let Some(p) = prev {
                    self.tables.continuation[0].adjust(p, cur, depth * depth);
                }
                if let Some(p2) = prev2 {
                    self.tables.continuation[1].adjust(p2, cur, depth * depth);
                }
            }
            for &quiet in quiets_tried {
                if quiet != best_move {
                    self.tables.history.penalty(us, quiet, depth);
                }
            }
        }
    }
}
