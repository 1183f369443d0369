//! Phased lazy move selection.
//!
//! A small state machine per node that yields moves one at a time in
//! best-first order, so that an early beta cutoff never pays for scoring or
//! sorting the moves behind it. Selection within a phase is pick-max in
//! place over a scored array; losing captures found during the good-capture
//! phase are banked in a separate buffer and come out last.

use crate::board::{
    Board, Color, Move, MoveList, Piece, ScoredMoveList, Square, NO_MOVE, SEE_VALUES,
};

use super::tables::{piece_index, OrderingTables};

/// Move-ordering inputs that live outside the selector: the per-worker
/// tables plus the previous moves' (piece, to) pairs for counter and
/// continuation lookups.
pub(crate) struct OrderingContext<'a> {
    pub tables: &'a OrderingTables,
    pub stm: Color,
    pub prev: Option<(Piece, Square)>,
    pub prev2: Option<(Piece, Square)>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Stage {
    TtMove,
    GenCaptures,
    GoodCaptures,
    Killer1,
    Killer2,
    Counter,
    GenQuiets,
    Quiets,
    BadCaptures,
    GenQuiescence,
    Quiescence,
    GenEvasions,
    Evasions,
    GenProbcut,
    Probcut,
    Done,
}

const TT_SCORE: i32 = i32::MAX;
const CAPTURE_OFFSET: i32 = 1 << 20;

/// Lazy phased move generator for one node.
pub(crate) struct MoveSelector {
    stage: Stage,
    tt_move: Move,
    killer1: Move,
    killer2: Move,
    counter: Move,
    moves: ScoredMoveList,
    idx: usize,
    bad_captures: ScoredMoveList,
    bad_idx: usize,
    probcut_threshold: i32,
    underpromotions: bool,
}

impl MoveSelector {
    /// Selector for a normal interior node.
    pub fn main(tt_move: Move, killer1: Move, killer2: Move, counter: Move) -> Self {
        MoveSelector {
            stage: Stage::TtMove,
            tt_move,
            killer1,
            killer2,
            counter,
            moves: ScoredMoveList::new(),
            idx: 0,
            bad_captures: ScoredMoveList::new(),
            bad_idx: 0,
            probcut_threshold: 0,
            underpromotions: true,
        }
    }

    /// Selector for a quiescence node. When in check all evasions are
    /// yielded; otherwise captures and queen promotions only.
    pub fn quiescence(tt_move: Move, in_check: bool) -> Self {
        MoveSelector {
            stage: if in_check {
                Stage::GenEvasions
            } else {
                Stage::GenQuiescence
            },
            tt_move,
            killer1: NO_MOVE,
            killer2: NO_MOVE,
            counter: NO_MOVE,
            moves: ScoredMoveList::new(),
            idx: 0,
            bad_captures: ScoredMoveList::new(),
            bad_idx: 0,
            probcut_threshold: 0,
            underpromotions: false,
        }
    }

    /// Selector for an interior node in check: evasions in one scored pass.
    pub fn evasions(tt_move: Move) -> Self {
        MoveSelector {
            stage: Stage::GenEvasions,
            tt_move,
            killer1: NO_MOVE,
            killer2: NO_MOVE,
            counter: NO_MOVE,
            moves: ScoredMoveList::new(),
            idx: 0,
            bad_captures: ScoredMoveList::new(),
            bad_idx: 0,
            probcut_threshold: 0,
            underpromotions: true,
        }
    }

    /// Selector for a ProbCut search: captures passing a SEE threshold.
    pub fn probcut(threshold: i32) -> Self {
        MoveSelector {
            stage: Stage::GenProbcut,
            tt_move: NO_MOVE,
            killer1: NO_MOVE,
            killer2: NO_MOVE,
            counter: NO_MOVE,
            moves: ScoredMoveList::new(),
            idx: 0,
            bad_captures: ScoredMoveList::new(),
            bad_idx: 0,
            probcut_threshold: threshold,
            underpromotions: true,
        }
    }

    fn is_special(&self, mv: Move) -> bool {
        mv == self.tt_move || mv == self.killer1 || mv == self.killer2 || mv == self.counter
    }

    /// Yield the next move in best-first order, or `None` when the node is
    /// exhausted.
    pub fn next(&mut self, board: &Board, ctx: &OrderingContext) -> Option<Move> {
        loop {
            match self.stage {
                Stage::TtMove => {
                    self.stage = Stage::GenCaptures;
                    if !self.tt_move.is_none() && board.is_pseudo_legal(self.tt_move) {
                        return Some(self.tt_move);
                    }
                }

                Stage::GenCaptures => {
                    let mut list = MoveList::new();
                    board.generate_captures(&mut list);
                    self.moves.clear();
                    for &mv in &list {
                        self.moves.push(mv, mvv_lva(board, mv));
                    }
                    self.idx = 0;
                    self.stage = Stage::GoodCaptures;
                }

                Stage::GoodCaptures => {
                    let Some(scored) = self.moves.pick_best(self.idx) else {
                        self.stage = Stage::Killer1;
                        continue;
                    };
                    self.idx += 1;
                    let mv = scored.mv;
                    if self.is_special(mv) {
                        continue;
                    }
                    if !board.see_ge(mv, 0) {
                        self.bad_captures.push(mv, scored.score);
                        continue;
                    }
                    return Some(mv);
                }

                Stage::Killer1 => {
                    self.stage = Stage::Killer2;
                    let k = self.killer1;
                    if !k.is_none() && k != self.tt_move && board.is_pseudo_legal(k) {
                        return Some(k);
                    }
                }

                Stage::Killer2 => {
                    self.stage = Stage::Counter;
                    let k = self.killer2;
                    if !k.is_none()
                        && k != self.tt_move
                        && k != self.killer1
                        && board.is_pseudo_legal(k)
                    {
                        return Some(k);
                    }
                }

                Stage::Counter => {
                    self.stage = Stage::GenQuiets;
                    let c = self.counter;
                    if !c.is_none()
                        && c != self.tt_move
                        && c != self.killer1
                        && c != self.killer2
                        && board.is_pseudo_legal(c)
                    {
                        return Some(c);
                    }
                }

                Stage::GenQuiets => {
                    let mut list = MoveList::new();
                    board.generate_quiets(&mut list);
                    board.generate_promotions(&mut list, self.underpromotions);
                    self.moves.clear();
                    for &mv in &list {
                        self.moves.push(mv, quiet_score(board, ctx, mv));
                    }
                    self.idx = 0;
                    self.stage = Stage::Quiets;
                }

                Stage::Quiets => {
                    let Some(scored) = self.moves.pick_best(self.idx) else {
                        self.bad_idx = 0;
                        self.stage = Stage::BadCaptures;
                        continue;
                    };
                    self.idx += 1;
                    if self.is_special(scored.mv) {
                        continue;
                    }
                    return Some(scored.mv);
                }

                Stage::BadCaptures => {
                    let Some(scored) = self.bad_captures.pick_best(self.bad_idx) else {
                        self.stage = Stage::Done;
                        continue;
                    };
                    self.bad_idx += 1;
                    // TT/killer/counter duplicates were already filtered
                    // when the capture was banked.
                    return Some(scored.mv);
                }

                Stage::GenQuiescence => {
                    let mut list = MoveList::new();
                    board.generate_captures(&mut list);
                    board.generate_promotions(&mut list, false);
                    self.moves.clear();
                    for &mv in &list {
                        let score = if mv == self.tt_move {
                            TT_SCORE
                        } else {
                            mvv_lva(board, mv)
                        };
                        self.moves.push(mv, score);
                    }
                    self.idx = 0;
                    self.stage = Stage::Quiescence;
                }

                Stage::Quiescence => {
                    let Some(scored) = self.moves.pick_best(self.idx) else {
                        self.stage = Stage::Done;
                        continue;
                    };
                    self.idx += 1;
                    return Some(scored.mv);
                }

                Stage::GenEvasions => {
                    let mut list = MoveList::new();
                    board.generate_evasions(&mut list);
                    self.moves.clear();
                    for &mv in &list {
                        let score = if mv == self.tt_move {
                            TT_SCORE
                        } else if mv.is_capture() {
                            CAPTURE_OFFSET + mvv_lva(board, mv)
                        } else {
                            quiet_score(board, ctx, mv)
                        };
                        self.moves.push(mv, score);
                    }
                    self.idx = 0;
                    self.stage = Stage::Evasions;
                }

                Stage::Evasions => {
                    let Some(scored) = self.moves.pick_best(self.idx) else {
                        self.stage = Stage::Done;
                        continue;
                    };
                    self.idx += 1;
                    return Some(scored.mv);
                }

                Stage::GenProbcut => {
                    let mut list = MoveList::new();
                    board.generate_captures(&mut list);
                    self.moves.clear();
                    for &mv in &list {
                        self.moves.push(mv, mvv_lva(board, mv));
                    }
                    self.idx = 0;
                    self.stage = Stage::Probcut;
                }

                Stage::Probcut => {
                    let Some(scored) = self.moves.pick_best(self.idx) else {
                        self.stage = Stage::Done;
                        continue;
                    };
                    self.idx += 1;
                    if !board.see_ge(scored.mv, self.probcut_threshold) {
                        continue;
                    }
                    return Some(scored.mv);
                }

                Stage::Done => return None,
            }
        }
    }
}

/// Most-valuable-victim / least-valuable-attacker capture score.
fn mvv_lva(board: &Board, mv: Move) -> i32 {
    let victim = if mv.is_en_passant() {
        Piece::Pawn
    } else if let Some(promo) = mv.promotion().filter(|_| !mv.is_capture()) {
        // Quiet promotions in the quiescence list: order by the gained piece.
        return SEE_VALUES[promo.index()];
    } else {
        match board.piece_at(mv.to()) {
            Some((_, piece)) => piece,
            None => return 0,
        }
    };
    let attacker = board
        .piece_at(mv.from())
        .map_or(Piece::Pawn, |(_, piece)| piece);
    SEE_VALUES[victim.index()] * 16 - attacker.index() as i32
}

/// History-based score for a quiet move: butterfly history plus the
/// continuation histories one and two plies back.
fn quiet_score(board: &Board, ctx: &OrderingContext, mv: Move) -> i32 {
    if let Some(promo) = mv.promotion() {
        // Quiet promotions among the quiets: ahead of ordinary moves.
        return CAPTURE_OFFSET / 2 + SEE_VALUES[promo.index()];
    }
    let mut score = ctx.tables.history.score(ctx.stm, mv);
    if let Some((_, piece)) = board.piece_at(mv.from()) {
        let cur = (piece, mv.to());
        if let Some(prev) = ctx.prev {
            score += ctx.tables.continuation[0].score(prev, cur);
        }
        if let Some(prev2) = ctx.prev2 {
            score += ctx.tables.continuation[1].score(prev2, cur);
        }
    }
    score
}

/// Counter-move lookup for the previous move, (piece, to)-indexed.
pub(crate) fn counter_for(
    tables: &OrderingTables,
    stm: Color,
    prev: Option<(Piece, Square)>,
) -> Move {
    match prev {
        Some((piece, to)) => tables.counters.get(piece_index(stm.opponent(), piece), to),
        None => NO_MOVE,
    }
}
