//! Perft: exhaustive legal move counting for generator validation.

use super::state::Board;
use super::types::{Move, MoveList};

impl Board {
    /// Count the leaf nodes of the legal move tree to `depth`.
    #[must_use]
    pub fn perft(&mut self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }
        let mut moves = MoveList::new();
        self.generate_all(&mut moves);

        let mut nodes = 0;
        for &mv in &moves {
            if self.make_move(mv) {
                nodes += if depth == 1 {
                    1
                } else {
                    self.perft(depth - 1)
                };
                self.unmake_move();
            }
        }
        nodes
    }

    /// Per-root-move perft counts, for divide-style debugging.
    #[must_use]
    pub fn perft_divide(&mut self, depth: usize) -> Vec<(Move, u64)> {
        let mut results = Vec::new();
        if depth == 0 {
            return results;
        }
        let mut moves = MoveList::new();
        self.generate_all(&mut moves);

        for &mv in &moves {
            if self.make_move(mv) {
                let nodes = self.perft(depth - 1);
                self.unmake_move();
                results.push((mv, nodes));
            }
        }
        results
    }
}
