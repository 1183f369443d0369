//! Incremental make/unmake with the history stack.

use super::attack_tables::pawn_attacks;
use super::state::{Board, HistoryEntry};
use super::types::{CastleSide, CastlingRights, Color, Move, Piece, Square};
use crate::zobrist;

impl Board {
    /// Apply a pseudo-legal move.
    ///
    /// Returns `false` when the move leaves the mover's king in check; in
    /// that case the position has been rolled back completely and the move
    /// must be skipped. All other effects (captures, en passant, promotions,
    /// Chess960 castling, clocks, signature) are applied incrementally.
    #[must_use]
    pub fn make_move(&mut self, m: Move) -> bool {
        debug_assert!(!m.is_none() && !m.is_null());
        let us = self.stm;
        let them = us.opponent();
        let from = m.from();
        let to = m.to();

        let (_, piece) = self
            .piece_at(from)
            .expect("make_move: no piece on from-square");

        // The captured pawn of an en passant capture sits on the mover's
        // rank, not on the destination square.
        let capture_sq = if m.is_en_passant() {
            Square::new(from.rank(), to.file())
        } else {
            to
        };
        let captured = if m.is_capture() {
            self.piece_at(capture_sq)
        } else {
            None
        };

        self.history.push(HistoryEntry {
            mv: m,
            captured,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        });

        let old_castling_bits = self.castling.zobrist_bits();
        let mut hash = self.hash ^ zobrist::side_key();

        if let Some(old_ep) = self.en_passant.take() {
            hash ^= zobrist::en_passant_key(old_ep.file());
        }

        if m.is_castling() {
            let side = if m.is_castle_kingside() {
                CastleSide::King
            } else {
                CastleSide::Queen
            };
            let king_to = CastlingRights::king_destination(us, side);
            let rook_to = CastlingRights::rook_destination(us, side);

            // Remove both before placing either: in Chess960 the king or the
            // rook may land on the square the other started from.
            self.remove_piece(from, us, Piece::King);
            self.remove_piece(to, us, Piece::Rook);
            self.set_piece(king_to, us, Piece::King);
            self.set_piece(rook_to, us, Piece::Rook);

            hash ^= zobrist::piece_key(us, Piece::King, from)
                ^ zobrist::piece_key(us, Piece::King, king_to)
                ^ zobrist::piece_key(us, Piece::Rook, to)
                ^ zobrist::piece_key(us, Piece::Rook, rook_to);

            self.castling.revoke_all(us);
        } else {
            if let Some((cap_color, cap_piece)) = captured {
                self.remove_piece(capture_sq, cap_color, cap_piece);
                hash ^= zobrist::piece_key(cap_color, cap_piece, capture_sq);
                if cap_piece == Piece::Rook {
                    self.castling.revoke_rook(them, capture_sq);
                }
            }

            self.remove_piece(from, us, piece);
            let placed = m.promotion().unwrap_or(piece);
            self.set_piece(to, us, placed);
            hash ^= zobrist::piece_key(us, piece, from) ^ zobrist::piece_key(us, placed, to);

            match piece {
                Piece::King => self.castling.revoke_all(us),
                Piece::Rook => self.castling.revoke_rook(us, from),
                _ => {}
            }

            // A double push only yields an en-passant target when an enemy
            // pawn actually stands ready to capture it.
            if piece == Piece::Pawn && from.rank().abs_diff(to.rank()) == 2 {
                let ep_sq = Square::new(usize::midpoint(from.rank(), to.rank()), from.file());
                if !(pawn_attacks(us, ep_sq) & self.pieces_of(them, Piece::Pawn)).is_empty() {
                    self.en_passant = Some(ep_sq);
                    hash ^= zobrist::en_passant_key(ep_sq.file());
                }
            }
        }

        hash ^= zobrist::castling_key(old_castling_bits)
            ^ zobrist::castling_key(self.castling.zobrist_bits());

        if piece == Piece::Pawn || m.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.stm = them;
        self.hash = hash;
        self.height += 1;

        debug_assert_eq!(self.hash, self.compute_hash());

        if self.in_check(us) {
            self.unmake_move();
            return false;
        }
        true
    }

    /// Invert the most recent `make_move` exactly. Cannot fail.
    pub fn unmake_move(&mut self) {
        let entry = self
            .history
            .pop()
            .expect("unmake_move without prior make_move");
        let m = entry.mv;
        debug_assert!(!m.is_null(), "null entries are popped by unmake_null_move");

        let us = self.stm.opponent();
        self.height = self.height.saturating_sub(1);
        self.stm = us;
        self.castling = entry.castling;
        self.en_passant = entry.en_passant;
        self.halfmove_clock = entry.halfmove_clock;
        self.hash = entry.hash;
        if us == Color::Black {
            self.fullmove_number -= 1;
        }

        let from = m.from();
        let to = m.to();

        if m.is_castling() {
            let side = if m.is_castle_kingside() {
                CastleSide::King
            } else {
                CastleSide::Queen
            };
            let king_to = CastlingRights::king_destination(us, side);
            let rook_to = CastlingRights::rook_destination(us, side);
            self.remove_piece(king_to, us, Piece::King);
            self.remove_piece(rook_to, us, Piece::Rook);
            self.set_piece(from, us, Piece::King);
            self.set_piece(to, us, Piece::Rook);
            return;
        }

        let (_, placed) = self
            .piece_at(to)
            .expect("unmake_move: destination square empty");
        self.remove_piece(to, us, placed);
        let original = if m.is_promotion() { Piece::Pawn } else { placed };
        self.set_piece(from, us, original);

        if let Some((cap_color, cap_piece)) = entry.captured {
            let capture_sq = if m.is_en_passant() {
                Square::new(from.rank(), to.file())
            } else {
                to
            };
            self.set_piece(capture_sq, cap_color, cap_piece);
        }
    }

    /// Toggle the side to move without moving a piece. Used by null-move
    /// pruning; forbidden when the side to move is in check.
    pub fn make_null_move(&mut self) {
        debug_assert!(!self.in_check(self.stm));
        self.history.push(HistoryEntry {
            mv: Move::null(),
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        });

        self.hash ^= zobrist::side_key();
        if let Some(ep) = self.en_passant.take() {
            self.hash ^= zobrist::en_passant_key(ep.file());
        }
        self.stm = self.stm.opponent();
        self.height += 1;
    }

    pub fn unmake_null_move(&mut self) {
        let entry = self
            .history
            .pop()
            .expect("unmake_null_move without prior make_null_move");
        debug_assert!(entry.mv.is_null());
        self.stm = self.stm.opponent();
        self.en_passant = entry.en_passant;
        self.halfmove_clock = entry.halfmove_clock;
        self.hash = entry.hash;
        self.height = self.height.saturating_sub(1);
    }
}
