//! Static Exchange Evaluation.
//!
//! Answers whether a capture sequence on one square retains at least a
//! threshold of material, assuming both sides always recapture with their
//! least valuable attacker and may stand pat when ahead.

use super::attack_tables::{bishop_attacks, rook_attacks};
use super::state::Board;
use super::types::{Bitboard, Color, Move, Piece, Square};

/// Piece values for exchange evaluation only. Knight equals bishop so the
/// search does not chase trivial minor-piece trades.
pub(crate) const SEE_VALUES: [i32; 6] = [100, 325, 325, 500, 975, 10000];

impl Board {
    /// Does making `m` win at least `threshold` centipawns of material after
    /// every profitable recapture on the destination square? Pure; never
    /// mutates the position.
    #[must_use]
    pub fn see_ge(&self, m: Move, threshold: i32) -> bool {
        // Castling moves no material onto a contested square.
        if m.is_castling() {
            return threshold <= 0;
        }

        let from = m.from();
        let to = m.to();
        let us = self.stm;

        let captured_value = if m.is_en_passant() {
            SEE_VALUES[Piece::Pawn.index()]
        } else {
            self.piece_at(to)
                .map_or(0, |(_, p)| SEE_VALUES[p.index()])
        };

        let Some((_, mover)) = self.piece_at(from) else {
            return false;
        };

        // Material balance if the opponent never recaptures.
        let mut swap = captured_value - threshold;
        let mut on_square = mover;
        if let Some(promo) = m.promotion() {
            swap += SEE_VALUES[promo.index()] - SEE_VALUES[Piece::Pawn.index()];
            on_square = promo;
        }
        if swap < 0 {
            return false;
        }

        // Balance if we immediately lose the capturing piece.
        swap = SEE_VALUES[on_square.index()] - swap;
        if swap <= 0 {
            return true;
        }

        let mut occupied =
            self.occupancy() ^ Bitboard::from_square(from) ^ Bitboard::from_square(to);
        if m.is_en_passant() {
            occupied ^= Bitboard::from_square(Square::new(from.rank(), to.file()));
        }

        let mut attackers = self.attackers_to(to, occupied);
        let mut stm = us;
        let mut winning = true;

        loop {
            stm = stm.opponent();
            attackers &= occupied;
            let stm_attackers = attackers & self.occupied_by(stm);
            if stm_attackers.is_empty() {
                break;
            }
            winning = !winning;

            let Some((piece, sq)) = self.least_valuable_attacker(stm_attackers, stm) else {
                break;
            };

            if piece == Piece::King {
                // The king may only complete the exchange when the opponent
                // has no attacker left to answer with.
                if !(attackers & self.occupied_by(stm.opponent())).is_empty() {
                    winning = !winning;
                }
                break;
            }

            swap = SEE_VALUES[piece.index()] - swap;
            if swap < i32::from(winning) {
                break;
            }

            occupied ^= Bitboard::from_square(sq);
            // X-ray attackers uncovered by the departing piece.
            if matches!(piece, Piece::Pawn | Piece::Bishop | Piece::Queen) {
                let diag = self.pieces_of(Color::White, Piece::Bishop)
                    | self.pieces_of(Color::Black, Piece::Bishop)
                    | self.pieces_of(Color::White, Piece::Queen)
                    | self.pieces_of(Color::Black, Piece::Queen);
                attackers |= bishop_attacks(to, occupied) & diag;
            }
            if matches!(piece, Piece::Rook | Piece::Queen) {
                let straight = self.pieces_of(Color::White, Piece::Rook)
                    | self.pieces_of(Color::Black, Piece::Rook)
                    | self.pieces_of(Color::White, Piece::Queen)
                    | self.pieces_of(Color::Black, Piece::Queen);
                attackers |= rook_attacks(to, occupied) & straight;
            }
        }

        winning
    }

    /// The least valuable piece of `color` within `candidates`.
    fn least_valuable_attacker(
        &self,
        candidates: Bitboard,
        color: Color,
    ) -> Option<(Piece, Square)> {
        for piece_idx in 0..6 {
            let piece = Piece::from_index(piece_idx);
            let subset = candidates & self.pieces_of(color, piece);
            if let Some(sq) = subset.first() {
                return Some((piece, sq));
            }
        }
        None
    }
}
