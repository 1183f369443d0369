//! Pseudo-legal move generation, classified into quiet, tactical, and
//! check-evasion subsets.

use super::attack_tables::{
    aligned, between, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks,
    rook_attacks,
};
use super::error::MoveParseError;
use super::state::Board;
use super::types::{
    Bitboard, CastleSide, CastlingRights, Color, Move, MoveList, Piece, Square, NO_MOVE,
    PROMOTION_PIECES,
};

#[inline]
fn promotion_rank(color: Color) -> usize {
    if color.is_white() {
        7
    } else {
        0
    }
}

#[inline]
fn start_rank(color: Color) -> usize {
    if color.is_white() {
        1
    } else {
        6
    }
}

impl Board {
    /// Generate capture moves: plain captures, en passant, and capturing
    /// promotions (expanded to all four pieces).
    pub fn generate_captures(&self, list: &mut MoveList) {
        let us = self.stm;
        let them = us.opponent();
        let targets = self.occupied_by(them);
        let occ = self.occupancy();
        let promo_rank = promotion_rank(us);

        for from in self.pieces_of(us, Piece::Pawn) {
            let attacks = pawn_attacks(us, from) & targets;
            for to in attacks {
                if to.rank() == promo_rank {
                    for piece in PROMOTION_PIECES {
                        list.push(Move::promotion_capture(from, to, piece));
                    }
                } else {
                    list.push(Move::capture(from, to));
                }
            }
            if let Some(ep) = self.en_passant {
                if pawn_attacks(us, from).contains(ep) {
                    list.push(Move::en_passant(from, ep));
                }
            }
        }

        for from in self.pieces_of(us, Piece::Knight) {
            for to in knight_attacks(from) & targets {
                list.push(Move::capture(from, to));
            }
        }
        for from in self.pieces_of(us, Piece::Bishop) {
            for to in bishop_attacks(from, occ) & targets {
                list.push(Move::capture(from, to));
            }
        }
        for from in self.pieces_of(us, Piece::Rook) {
            for to in rook_attacks(from, occ) & targets {
                list.push(Move::capture(from, to));
            }
        }
        for from in self.pieces_of(us, Piece::Queen) {
            for to in queen_attacks(from, occ) & targets {
                list.push(Move::capture(from, to));
            }
        }
        let king = self.king_square(us);
        for to in king_attacks(king) & targets {
            list.push(Move::capture(king, to));
        }
    }

    /// Generate non-capturing promotions, queen first. When
    /// `underpromotions` is false only the queen promotion is emitted.
    pub fn generate_promotions(&self, list: &mut MoveList, underpromotions: bool) {
        let us = self.stm;
        let promo_rank = promotion_rank(us);
        let occ = self.occupancy();

        for from in self.pieces_of(us, Piece::Pawn) {
            let Some(to) = from.forward(us.is_white()) else {
                continue;
            };
            if to.rank() != promo_rank || occ.contains(to) {
                continue;
            }
            if underpromotions {
                for piece in PROMOTION_PIECES {
                    list.push(Move::promote(from, to, piece));
                }
            } else {
                list.push(Move::promote(from, to, Piece::Queen));
            }
        }
    }

    /// Generate quiet moves: non-capturing piece moves, pawn pushes below
    /// the promotion rank, and castling.
    pub fn generate_quiets(&self, list: &mut MoveList) {
        let us = self.stm;
        let occ = self.occupancy();
        let empty = !occ;
        let promo_rank = promotion_rank(us);

        for from in self.pieces_of(us, Piece::Pawn) {
            let Some(one) = from.forward(us.is_white()) else {
                continue;
            };
            if occ.contains(one) || one.rank() == promo_rank {
                continue;
            }
            list.push(Move::quiet(from, one));
            if from.rank() == start_rank(us) {
                if let Some(two) = one.forward(us.is_white()) {
                    if !occ.contains(two) {
                        list.push(Move::quiet(from, two));
                    }
                }
            }
        }

        for from in self.pieces_of(us, Piece::Knight) {
            for to in knight_attacks(from) & empty {
                list.push(Move::quiet(from, to));
            }
        }
        for from in self.pieces_of(us, Piece::Bishop) {
            for to in bishop_attacks(from, occ) & empty {
                list.push(Move::quiet(from, to));
            }
        }
        for from in self.pieces_of(us, Piece::Rook) {
            for to in rook_attacks(from, occ) & empty {
                list.push(Move::quiet(from, to));
            }
        }
        for from in self.pieces_of(us, Piece::Queen) {
            for to in queen_attacks(from, occ) & empty {
                list.push(Move::quiet(from, to));
            }
        }
        let king = self.king_square(us);
        for to in king_attacks(king) & empty {
            list.push(Move::quiet(king, to));
        }

        self.generate_castling(list);
    }

    /// Castling moves, encoded king-from to rook-from. Generation-time
    /// legality: right present, nothing between king and rook, both piece
    /// paths clear, and no square the king stands on or crosses attacked.
    fn generate_castling(&self, list: &mut MoveList) {
        let us = self.stm;
        let them = us.opponent();
        let occ = self.occupancy();
        let kfrom = self.king_square(us);

        for side in [CastleSide::King, CastleSide::Queen] {
            let Some(rfrom) = self.castling_rights().rook_square(us, side) else {
                continue;
            };
            let kto = CastlingRights::king_destination(us, side);
            let rto = CastlingRights::rook_destination(us, side);

            let occ_without = occ
                ^ Bitboard::from_square(kfrom)
                ^ Bitboard::from_square(rfrom);
            let king_path = between(kfrom, kto) | Bitboard::from_square(kto);
            let rook_path = between(rfrom, rto) | Bitboard::from_square(rto);
            if !((king_path | rook_path) & occ_without).is_empty() {
                continue;
            }
            if !(between(kfrom, rfrom) & occ_without).is_empty() {
                continue;
            }

            // Attack tests run with the king lifted so that moving along the
            // checking ray is caught.
            let occ_no_king = occ ^ Bitboard::from_square(kfrom);
            let mut attacked = self.is_square_attacked(kfrom, them);
            for sq in king_path {
                if attacked {
                    break;
                }
                attacked = self.is_square_attacked_with_occ(sq, them, occ_no_king);
            }
            if attacked {
                continue;
            }

            let mv = match side {
                CastleSide::King => Move::castle_kingside(kfrom, rfrom),
                CastleSide::Queen => Move::castle_queenside(kfrom, rfrom),
            };
            list.push(mv);
        }
    }

    /// Generate check evasions. Only valid when the side to move is in
    /// check; the output may still leave the king in check from a pinned
    /// piece, which `make_move` rejects.
    pub fn generate_evasions(&self, list: &mut MoveList) {
        let us = self.stm;
        let them = us.opponent();
        let occ = self.occupancy();
        let ksq = self.king_square(us);
        let checkers = self.attackers_to(ksq, occ) & self.occupied_by(them);
        debug_assert!(!checkers.is_empty());

        // King steps, with the king lifted off the board so that retreating
        // along the checking ray is rejected.
        let occ_no_king = occ ^ Bitboard::from_square(ksq);
        for to in king_attacks(ksq) & !self.occupied_by(us) {
            if self.is_square_attacked_with_occ(to, them, occ_no_king) {
                continue;
            }
            if occ.contains(to) {
                list.push(Move::capture(ksq, to));
            } else {
                list.push(Move::quiet(ksq, to));
            }
        }

        if checkers.count() != 1 {
            return;
        }
        let checker_sq = checkers.first().expect("single checker");
        let (_, checker_piece) = self.piece_at(checker_sq).expect("checker piece");

        // Non-king captures of the checker.
        let promo_rank = promotion_rank(us);
        let capturers =
            self.attackers_to(checker_sq, occ) & self.occupied_by(us) & !Bitboard::from_square(ksq);
        for from in capturers {
            let (_, piece) = self.piece_at(from).expect("capturer piece");
            if piece == Piece::Pawn && checker_sq.rank() == promo_rank {
                for promo in PROMOTION_PIECES {
                    list.push(Move::promotion_capture(from, checker_sq, promo));
                }
            } else {
                list.push(Move::capture(from, checker_sq));
            }
        }

        // En passant when the checker is the pawn that just double-pushed.
        if let Some(ep) = self.en_passant {
            let pushed_rank = if us.is_white() {
                ep.rank().wrapping_sub(1)
            } else {
                ep.rank() + 1
            };
            if checker_piece == Piece::Pawn && checker_sq == Square::new(pushed_rank, ep.file()) {
                for from in pawn_attacks(them, ep) & self.pieces_of(us, Piece::Pawn) {
                    list.push(Move::en_passant(from, ep));
                }
            }
        }

        // Interpositions against a sliding checker.
        if checker_piece.slides_diagonally() || checker_piece.slides_straight() {
            for block_sq in between(checker_sq, ksq) {
                self.generate_blocks_to(block_sq, list);
            }
        }
    }

    /// Every non-king move landing on the (empty) square `to`.
    fn generate_blocks_to(&self, to: Square, list: &mut MoveList) {
        let us = self.stm;
        let occ = self.occupancy();
        let promo_rank = promotion_rank(us);

        // Pawn pushes onto the blocking square.
        if let Some(behind) = to.forward(!us.is_white()) {
            if self.pieces_of(us, Piece::Pawn).contains(behind) {
                if to.rank() == promo_rank {
                    for promo in PROMOTION_PIECES {
                        list.push(Move::promote(behind, to, promo));
                    }
                } else {
                    list.push(Move::quiet(behind, to));
                }
            } else if !occ.contains(behind) {
                let double_rank = if us.is_white() { 3 } else { 4 };
                if to.rank() == double_rank {
                    if let Some(start) = behind.forward(!us.is_white()) {
                        if self.pieces_of(us, Piece::Pawn).contains(start) {
                            list.push(Move::quiet(start, to));
                        }
                    }
                }
            }
        }

        self.generate_piece_blocks_to(to, list);
    }

    fn generate_piece_blocks_to(&self, to: Square, list: &mut MoveList) {
        let us = self.stm;
        let occ = self.occupancy();

        for from in knight_attacks(to) & self.pieces_of(us, Piece::Knight) {
            list.push(Move::quiet(from, to));
        }
        let diag = self.pieces_of(us, Piece::Bishop) | self.pieces_of(us, Piece::Queen);
        for from in bishop_attacks(to, occ) & diag {
            list.push(Move::quiet(from, to));
        }
        let straight = self.pieces_of(us, Piece::Rook) | self.pieces_of(us, Piece::Queen);
        for from in rook_attacks(to, occ) & straight {
            list.push(Move::quiet(from, to));
        }
    }

    /// All pseudo-legal moves for the side to move: evasions when in check,
    /// otherwise the union of captures, promotions, and quiets.
    pub fn generate_all(&self, list: &mut MoveList) {
        if self.in_check(self.stm) {
            self.generate_evasions(list);
        } else {
            self.generate_captures(list);
            self.generate_promotions(list, true);
            self.generate_quiets(list);
        }
    }

    /// Fully legal moves, filtered through make/unmake.
    #[must_use]
    pub fn generate_legal(&mut self) -> MoveList {
        let mut pseudo = MoveList::new();
        self.generate_all(&mut pseudo);

        let mut legal = MoveList::new();
        for &mv in &pseudo {
            if self.make_move(mv) {
                self.unmake_move();
                legal.push(mv);
            }
        }
        legal
    }

    /// Validate an arbitrary move (typically from the transposition table)
    /// against the current position without making it. O(1) in piece count.
    #[must_use]
    pub fn is_pseudo_legal(&self, m: Move) -> bool {
        if m.is_none() || m.is_null() {
            return false;
        }
        let us = self.stm;
        let them = us.opponent();
        let from = m.from();
        let to = m.to();

        let Some((color, piece)) = self.piece_at(from) else {
            return false;
        };
        if color != us {
            return false;
        }

        if m.is_castling() {
            let side = if m.is_castle_kingside() {
                CastleSide::King
            } else {
                CastleSide::Queen
            };
            if piece != Piece::King || self.castling_rights().rook_square(us, side) != Some(to) {
                return false;
            }
            // Re-run generation-time legality for this one move.
            let mut scratch = MoveList::new();
            self.generate_castling(&mut scratch);
            return scratch.contains(m);
        }

        if m.is_en_passant() {
            return piece == Piece::Pawn
                && self.en_passant == Some(to)
                && pawn_attacks(us, from).contains(to);
        }

        if m.is_promotion() {
            if piece != Piece::Pawn || to.rank() != promotion_rank(us) {
                return false;
            }
        } else if piece == Piece::Pawn && to.rank() == promotion_rank(us) {
            // A pawn reaching the last rank must carry a promotion flag.
            return false;
        }

        // Capture flag must match the destination occupancy.
        match self.piece_at(to) {
            Some((c, _)) => {
                if c == us || !m.is_capture() {
                    return false;
                }
            }
            None => {
                if m.is_capture() {
                    return false;
                }
            }
        }

        let occ = self.occupancy();
        match piece {
            Piece::Pawn => {
                if m.is_capture() {
                    pawn_attacks(us, from).contains(to)
                } else if from.forward(us.is_white()) == Some(to) {
                    true
                } else {
                    // Double push: correct start rank and both squares empty.
                    from.rank() == start_rank(us)
                        && from
                            .forward(us.is_white())
                            .is_some_and(|mid| {
                                !occ.contains(mid) && mid.forward(us.is_white()) == Some(to)
                            })
                }
            }
            Piece::Knight => knight_attacks(from).contains(to),
            Piece::Bishop => bishop_attacks(from, occ).contains(to),
            Piece::Rook => rook_attacks(from, occ).contains(to),
            Piece::Queen => queen_attacks(from, occ).contains(to),
            Piece::King => king_attacks(from).contains(to),
        }
    }

    /// Would `m` put the opponent king in check? Side-effect free: covers
    /// direct checks, discovered checks, and the castling rook arriving on a
    /// checking ray, without calling make/unmake.
    #[must_use]
    pub fn gives_check(&self, m: Move) -> bool {
        let us = self.stm;
        let ksq = self.king_square(us.opponent());
        let occ = self.occupancy();
        let from = m.from();
        let to = m.to();

        if m.is_castling() {
            let side = if m.is_castle_kingside() {
                CastleSide::King
            } else {
                CastleSide::Queen
            };
            let kto = CastlingRights::king_destination(us, side);
            let rto = CastlingRights::rook_destination(us, side);
            let occ_after = (occ
                ^ Bitboard::from_square(from)
                ^ Bitboard::from_square(to))
                | Bitboard::from_square(kto)
                | Bitboard::from_square(rto);
            return rook_attacks(ksq, occ_after).contains(rto);
        }

        let (_, piece) = self
            .piece_at(from)
            .expect("gives_check: no piece on from-square");
        let mut occ_after =
            (occ ^ Bitboard::from_square(from)) | Bitboard::from_square(to);
        if m.is_en_passant() {
            occ_after ^= Bitboard::from_square(Square::new(from.rank(), to.file()));
        }

        // Direct check by the piece arriving on `to`.
        let placed = m.promotion().unwrap_or(piece);
        let direct = match placed {
            Piece::Pawn => pawn_attacks(us, to).contains(ksq),
            Piece::Knight => knight_attacks(to).contains(ksq),
            Piece::Bishop => bishop_attacks(to, occ_after).contains(ksq),
            Piece::Rook => rook_attacks(to, occ_after).contains(ksq),
            Piece::Queen => queen_attacks(to, occ_after).contains(ksq),
            Piece::King => false,
        };
        if direct {
            return true;
        }

        // Discovered check: a slider of ours uncovered by the departure.
        // Only possible when a vacated square lies on a line with the king
        // (en passant vacates the captured pawn's square as well).
        if !m.is_en_passant() && !aligned(ksq, from, from) {
            return false;
        }
        let moved = Bitboard::from_square(from);
        let diag = (self.pieces_of(us, Piece::Bishop) | self.pieces_of(us, Piece::Queen)) & !moved;
        if !(bishop_attacks(ksq, occ_after) & diag).is_empty() {
            return true;
        }
        let straight = (self.pieces_of(us, Piece::Rook) | self.pieces_of(us, Piece::Queen)) & !moved;
        !(rook_attacks(ksq, occ_after) & straight).is_empty()
    }

    /// Expand a 16-bit transposition-table move back into a full move for
    /// this position. Returns `NO_MOVE` when the compact form cannot
    /// describe a move of the side to move here; the result must still pass
    /// [`Board::is_pseudo_legal`] before use.
    #[must_use]
    pub fn expand_tt_move(&self, compact: u16) -> Move {
        if compact == 0 {
            return NO_MOVE;
        }
        let from = Square::from_index((compact & 0x3F) as usize);
        let to = Square::from_index(((compact >> 6) & 0x3F) as usize);
        let promo_idx = ((compact >> 12) & 0xF) as usize;

        let us = self.stm;
        let Some((color, piece)) = self.piece_at(from) else {
            return NO_MOVE;
        };
        if color != us {
            return NO_MOVE;
        }

        // King onto its own rook: a castle in the internal encoding.
        if piece == Piece::King {
            for side in [CastleSide::King, CastleSide::Queen] {
                if self.castling_rights().rook_square(us, side) == Some(to) {
                    return match side {
                        CastleSide::King => Move::castle_kingside(from, to),
                        CastleSide::Queen => Move::castle_queenside(from, to),
                    };
                }
            }
        }

        if piece == Piece::Pawn && self.en_passant == Some(to) && from.file() != to.file() {
            return Move::en_passant(from, to);
        }

        let is_capture = matches!(self.piece_at(to), Some((c, _)) if c != us);
        if promo_idx != 0 {
            if piece != Piece::Pawn || promo_idx > Piece::Queen.index() {
                return NO_MOVE;
            }
            let promo = Piece::from_index(promo_idx);
            return if is_capture {
                Move::promotion_capture(from, to, promo)
            } else {
                Move::promote(from, to, promo)
            };
        }

        if is_capture {
            Move::capture(from, to)
        } else {
            Move::quiet(from, to)
        }
    }

    /// Parse a move in coordinate notation against the current position.
    ///
    /// Castling is accepted in both forms: king-to-rook (Chess960) and the
    /// classical king-to-g/c.
    pub fn parse_move(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let bytes = text.as_bytes();
        if bytes.len() < 4 || bytes.len() > 5 {
            return Err(MoveParseError::BadFormat {
                text: text.to_string(),
            });
        }
        let from: Square = text[0..2].parse().map_err(|_| MoveParseError::BadFormat {
            text: text.to_string(),
        })?;
        let to: Square = text[2..4].parse().map_err(|_| MoveParseError::BadFormat {
            text: text.to_string(),
        })?;
        let promo = if bytes.len() == 5 {
            match Piece::from_char(bytes[4] as char) {
                Some(p) if p != Piece::Pawn && p != Piece::King => Some(p),
                _ => {
                    return Err(MoveParseError::BadFormat {
                        text: text.to_string(),
                    })
                }
            }
        } else {
            None
        };

        let us = self.stm;
        let legal = self.generate_legal();

        // Exact match first (castling given as king-to-rook).
        for &mv in &legal {
            if mv.from() == from && mv.to() == to && mv.promotion() == promo {
                return Ok(mv);
            }
        }
        // Classical castling notation: king to its g/c destination.
        for &mv in &legal {
            if mv.is_castling() && mv.from() == from {
                let side = if mv.is_castle_kingside() {
                    CastleSide::King
                } else {
                    CastleSide::Queen
                };
                if CastlingRights::king_destination(us, side) == to {
                    return Ok(mv);
                }
            }
        }

        Err(MoveParseError::Illegal {
            text: text.to_string(),
        })
    }

}
