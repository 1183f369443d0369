//! The authoritative board state.

use super::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};
use super::types::{Bitboard, CastlingRights, Color, Move, Piece, Square};
use crate::zobrist;

/// One entry of the make/unmake history stack. Plain values only, so cloning
/// a `Board` for a new search worker is a flat copy.
#[derive(Clone, Copy, Debug)]
pub struct HistoryEntry {
    pub(crate) mv: Move,
    pub(crate) captured: Option<(Color, Piece)>,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) hash: u64,
}

/// Board state: piece array, per-piece bitboards, side unions, castling
/// rights, en-passant target, clocks, Zobrist signature, and the history
/// stack consumed by `unmake_move`.
///
/// Invariant: the piece array and the bitboards always describe the same
/// position.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) piece_on: [Option<(Color, Piece)>; 64],
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) all_occupied: Bitboard,
    pub(crate) stm: Color,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    /// Plies from the current search root; reset by `reset_height`.
    pub(crate) height: usize,
    pub(crate) hash: u64,
    pub(crate) history: Vec<HistoryEntry>,
    pub(crate) chess960: bool,
}

impl Board {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back_rank.iter().enumerate() {
            board.set_piece(Square::new(0, file), Color::White, *piece);
            board.set_piece(Square::new(7, file), Color::Black, *piece);
            board.set_piece(Square::new(1, file), Color::White, Piece::Pawn);
            board.set_piece(Square::new(6, file), Color::Black, Piece::Pawn);
        }

        board.castling = CastlingRights::standard();
        board.hash = board.compute_hash();
        board
    }

    pub(crate) fn empty() -> Self {
        Board {
            piece_on: [None; 64],
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupied: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            stm: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            height: 0,
            hash: 0,
            history: Vec::with_capacity(256),
            chess960: false,
        }
    }

    #[inline]
    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        debug_assert!(self.piece_on[sq.index()].is_none());
        let bit = Bitboard::from_square(sq);
        self.piece_on[sq.index()] = Some((color, piece));
        self.pieces[color.index()][piece.index()] |= bit;
        self.occupied[color.index()] |= bit;
        self.all_occupied |= bit;
    }

    #[inline]
    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        debug_assert_eq!(self.piece_on[sq.index()], Some((color, piece)));
        let bit = Bitboard::from_square(sq);
        self.piece_on[sq.index()] = None;
        self.pieces[color.index()][piece.index()] ^= bit;
        self.occupied[color.index()] ^= bit;
        self.all_occupied ^= bit;
    }

    /// The piece and color on a square, O(1).
    #[inline]
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.piece_on[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn is_empty_square(&self, sq: Square) -> bool {
        self.piece_on[sq.index()].is_none()
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.stm
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    #[must_use]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> &CastlingRights {
        &self.castling
    }

    /// Plies from the current search root.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Half-moves played since the game start.
    #[inline]
    #[must_use]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Mark the current position as the search root.
    pub fn reset_height(&mut self) {
        self.height = 0;
    }

    #[must_use]
    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    pub fn set_chess960(&mut self, enabled: bool) {
        self.chess960 = enabled;
    }

    #[inline]
    #[must_use]
    pub(crate) fn pieces_of(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    #[must_use]
    pub(crate) fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    #[inline]
    #[must_use]
    pub(crate) fn occupancy(&self) -> Bitboard {
        self.all_occupied
    }

    /// The king square of `color`. Positions without both kings are rejected
    /// at construction, so the lookup cannot fail afterwards.
    #[inline]
    #[must_use]
    pub(crate) fn king_square(&self, color: Color) -> Square {
        debug_assert!(!self.pieces_of(color, Piece::King).is_empty());
        self.pieces_of(color, Piece::King)
            .first()
            .unwrap_or(Square::A1)
    }

    /// All pieces of both colors attacking `sq` under `occupancy`.
    #[must_use]
    pub(crate) fn attackers_to(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        let diag = self.pieces_of(Color::White, Piece::Bishop)
            | self.pieces_of(Color::Black, Piece::Bishop)
            | self.pieces_of(Color::White, Piece::Queen)
            | self.pieces_of(Color::Black, Piece::Queen);
        let straight = self.pieces_of(Color::White, Piece::Rook)
            | self.pieces_of(Color::Black, Piece::Rook)
            | self.pieces_of(Color::White, Piece::Queen)
            | self.pieces_of(Color::Black, Piece::Queen);

        (pawn_attacks(Color::White, sq) & self.pieces_of(Color::Black, Piece::Pawn))
            | (pawn_attacks(Color::Black, sq) & self.pieces_of(Color::White, Piece::Pawn))
            | (knight_attacks(sq)
                & (self.pieces_of(Color::White, Piece::Knight)
                    | self.pieces_of(Color::Black, Piece::Knight)))
            | (king_attacks(sq)
                & (self.pieces_of(Color::White, Piece::King)
                    | self.pieces_of(Color::Black, Piece::King)))
            | (bishop_attacks(sq, occupancy) & diag)
            | (rook_attacks(sq, occupancy) & straight)
    }

    /// Is `sq` attacked by any piece of `by`, under an explicit occupancy?
    /// The occupancy parameter lets check-evasion generation lift the king
    /// off the board to expose sliding attacks along the checking ray.
    #[must_use]
    pub(crate) fn is_square_attacked_with_occ(
        &self,
        sq: Square,
        by: Color,
        occupancy: Bitboard,
    ) -> bool {
        if !(pawn_attacks(by.opponent(), sq) & self.pieces_of(by, Piece::Pawn)).is_empty() {
            return true;
        }
        if !(knight_attacks(sq) & self.pieces_of(by, Piece::Knight)).is_empty() {
            return true;
        }
        if !(king_attacks(sq) & self.pieces_of(by, Piece::King)).is_empty() {
            return true;
        }
        let diag = self.pieces_of(by, Piece::Bishop) | self.pieces_of(by, Piece::Queen);
        if !(bishop_attacks(sq, occupancy) & diag).is_empty() {
            return true;
        }
        let straight = self.pieces_of(by, Piece::Rook) | self.pieces_of(by, Piece::Queen);
        !(rook_attacks(sq, occupancy) & straight).is_empty()
    }

    #[inline]
    #[must_use]
    pub(crate) fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        self.is_square_attacked_with_occ(sq, by, self.all_occupied)
    }

    /// Is `color`'s king attacked?
    #[inline]
    #[must_use]
    pub fn in_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_square(color), color.opponent())
    }

    /// Does `color` have any piece besides pawns and the king?
    #[must_use]
    pub fn has_nonpawn_material(&self, color: Color) -> bool {
        let c = color.index();
        !(self.pieces[c][Piece::Knight.index()]
            | self.pieces[c][Piece::Bishop.index()]
            | self.pieces[c][Piece::Rook.index()]
            | self.pieces[c][Piece::Queen.index()])
        .is_empty()
    }

    /// Recompute the Zobrist signature from scratch. Used at construction and
    /// by debug assertions; play uses incremental updates.
    #[must_use]
    pub(crate) fn compute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for idx in 0..64 {
            if let Some((color, piece)) = self.piece_on[idx] {
                hash ^= zobrist::piece_key(color, piece, Square::from_index(idx));
            }
        }
        if self.stm == Color::Black {
            hash ^= zobrist::side_key();
        }
        hash ^= zobrist::castling_key(self.castling.zobrist_bits());
        if let Some(ep) = self.en_passant {
            hash ^= zobrist::en_passant_key(ep.file());
        }
        hash
    }

    /// A single prior occurrence of the current signature within the last
    /// `halfmove_clock` plies counts as a draw for search purposes.
    #[must_use]
    pub fn is_repetition(&self) -> bool {
        let lookback = (self.halfmove_clock as usize).min(self.history.len());
        self.history
            .iter()
            .rev()
            .take(lookback)
            .any(|entry| entry.hash == self.hash)
    }

    /// Fifty-move-rule draw.
    #[inline]
    #[must_use]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can possibly deliver mate (bare kings, lone minor, or
    /// same-colored bishops only).
    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        let pawns = self.pieces_of(Color::White, Piece::Pawn)
            | self.pieces_of(Color::Black, Piece::Pawn);
        let majors = self.pieces_of(Color::White, Piece::Rook)
            | self.pieces_of(Color::Black, Piece::Rook)
            | self.pieces_of(Color::White, Piece::Queen)
            | self.pieces_of(Color::Black, Piece::Queen);
        if !pawns.is_empty() || !majors.is_empty() {
            return false;
        }

        let knights = self.pieces_of(Color::White, Piece::Knight)
            | self.pieces_of(Color::Black, Piece::Knight);
        let bishops = self.pieces_of(Color::White, Piece::Bishop)
            | self.pieces_of(Color::Black, Piece::Bishop);
        let minors = knights.count() + bishops.count();

        if minors <= 1 {
            return true;
        }
        if knights.is_empty() {
            // Bishops only: drawn when they all share a square color.
            const LIGHT: u64 = 0x55AA_55AA_55AA_55AA;
            return bishops.0 & LIGHT == 0 || bishops.0 & !LIGHT == 0;
        }
        false
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
