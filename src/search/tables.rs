//! Per-worker move-ordering memories: history, killers, counter-moves, and
//! continuation history. Never shared between workers; values are advisory.

use crate::board::{Color, Move, Piece, Square, MAX_PLY, NO_MOVE};

use super::constants::HISTORY_MAX;

/// Butterfly history: (side to move, from, to) -> score. Quiet moves that
/// cause beta cutoffs gain `depth * depth`; quiets tried earlier at the same
/// node lose the same amount.
pub struct HistoryTable(Box<[[[i32; 64]; 64]; 2]>);

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable(Box::new([[[0; 64]; 64]; 2]))
    }

    #[inline]
    #[must_use]
    pub fn score(&self, side: Color, mv: Move) -> i32 {
        self.0[side.index()][mv.from().index()][mv.to().index()]
    }

    pub fn bonus(&mut self, side: Color, mv: Move, depth: i32) {
        self.adjust(side, mv, depth * depth);
    }

    pub fn penalty(&mut self, side: Color, mv: Move, depth: i32) {
        self.adjust(side, mv, -(depth * depth));
    }

    fn adjust(&mut self, side: Color, mv: Move, delta: i32) {
        let entry = &mut self.0[side.index()][mv.from().index()][mv.to().index()];
        *entry += delta;
        if entry.abs() >= HISTORY_MAX {
            self.halve();
        }
    }

    /// Halve every entry; called when any entry hits the clamp so relative
    /// ordering survives while magnitudes stay bounded.
    fn halve(&mut self) {
        for side in self.0.iter_mut() {
            for from in side.iter_mut() {
                for entry in from.iter_mut() {
                    *entry /= 2;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        for side in self.0.iter_mut() {
            for from in side.iter_mut() {
                from.fill(0);
            }
        }
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        HistoryTable::new()
    }
}

/// Two most recent quiet beta-cutoff moves per search ply.
pub struct KillerTable([[Move; 2]; MAX_PLY]);

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable([[NO_MOVE; 2]; MAX_PLY])
    }

    #[inline]
    #[must_use]
    pub fn primary(&self, ply: usize) -> Move {
        if ply < MAX_PLY {
            self.0[ply][0]
        } else {
            NO_MOVE
        }
    }

    #[inline]
    #[must_use]
    pub fn secondary(&self, ply: usize) -> Move {
        if ply < MAX_PLY {
            self.0[ply][1]
        } else {
            NO_MOVE
        }
    }

    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY || self.0[ply][0] == mv {
            return;
        }
        self.0[ply][1] = self.0[ply][0];
        self.0[ply][0] = mv;
    }

    pub fn clear(&mut self) {
        self.0 = [[NO_MOVE; 2]; MAX_PLY];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        KillerTable::new()
    }
}

/// Index of a colored piece for counter/continuation tables.
#[inline]
#[must_use]
pub fn piece_index(color: Color, piece: Piece) -> usize {
    color.index() * 6 + piece.index()
}

/// The move that most recently refuted (previous piece, previous to-square).
pub struct CounterMoveTable(Box<[[Move; 64]; 12]>);

impl CounterMoveTable {
    #[must_use]
    pub fn new() -> Self {
        CounterMoveTable(Box::new([[NO_MOVE; 64]; 12]))
    }

    #[inline]
    #[must_use]
    pub fn get(&self, prev_piece: usize, prev_to: Square) -> Move {
        self.0[prev_piece][prev_to.index()]
    }

    pub fn set(&mut self, prev_piece: usize, prev_to: Square, mv: Move) {
        self.0[prev_piece][prev_to.index()] = mv;
    }

    pub fn clear(&mut self) {
        for row in self.0.iter_mut() {
            row.fill(NO_MOVE);
        }
    }
}

impl Default for CounterMoveTable {
    fn default() -> Self {
        CounterMoveTable::new()
    }
}

/// Continuation history: (previous piece type, previous to) x (current piece
/// type, current to). One table per lookback distance (one and two plies).
pub struct ContinuationHistory(Box<[[i32; 384]; 384]>);

impl ContinuationHistory {
    #[must_use]
    pub fn new() -> Self {
        ContinuationHistory(vec![[0i32; 384]; 384].try_into().expect("384 rows"))
    }

    #[inline]
    fn slot(prev: (Piece, Square), cur: (Piece, Square)) -> (usize, usize) {
        (
            prev.0.index() * 64 + prev.1.index(),
            cur.0.index() * 64 + cur.1.index(),
        )
    }

    #[inline]
    #[must_use]
    pub fn score(&self, prev: (Piece, Square), cur: (Piece, Square)) -> i32 {
        let (p, c) = Self::slot(prev, cur);
        self.0[p][c]
    }

    pub fn adjust(&mut self, prev: (Piece, Square), cur: (Piece, Square), delta: i32) {
        let (p, c) = Self::slot(prev, cur);
        let entry = &mut self.0[p][c];
        *entry = (*entry + delta).clamp(-HISTORY_MAX, HISTORY_MAX);
    }

    pub fn clear(&mut self) {
        for row in self.0.iter_mut() {
            row.fill(0);
        }
    }
}

impl Default for ContinuationHistory {
    fn default() -> Self {
        ContinuationHistory::new()
    }
}

/// Everything a worker consults for move ordering, bundled so the pool can
/// hand the set to a search thread and take it back afterwards.
pub struct OrderingTables {
    pub history: HistoryTable,
    pub killers: KillerTable,
    pub counters: CounterMoveTable,
    /// Continuation history one and two plies back.
    pub continuation: [ContinuationHistory; 2],
}

impl OrderingTables {
    #[must_use]
    pub fn new() -> Self {
        OrderingTables {
            history: HistoryTable::new(),
            killers: KillerTable::new(),
            counters: CounterMoveTable::new(),
            continuation: [ContinuationHistory::new(), ContinuationHistory::new()],
        }
    }

    /// Reset everything; used on `ucinewgame`.
    pub fn clear(&mut self) {
        self.history.clear();
        self.killers.clear();
        self.counters.clear();
        for table in &mut self.continuation {
            table.clear();
        }
    }

    /// Between searches killers go stale but history keeps its value.
    pub fn new_search(&mut self) {
        self.killers.clear();
    }
}

impl Default for OrderingTables {
    fn default() -> Self {
        OrderingTables::new()
    }
}
