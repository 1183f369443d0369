//! Attack-set lookups. Pure functions of (square, occupancy).

use super::tables::{
    occupancy_index, BETWEEN, BISHOP_TABLE, KING_ATTACKS, KNIGHT_ATTACKS, LINE, PAWN_ATTACKS,
    ROOK_TABLE,
};
use crate::board::types::{Bitboard, Color, Square};

#[inline]
#[must_use]
pub(crate) fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard(KNIGHT_ATTACKS[sq.index()])
}

#[inline]
#[must_use]
pub(crate) fn king_attacks(sq: Square) -> Bitboard {
    Bitboard(KING_ATTACKS[sq.index()])
}

/// Squares a pawn of `color` on `sq` attacks (captures towards).
#[inline]
#[must_use]
pub(crate) fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    Bitboard(PAWN_ATTACKS[color.index()][sq.index()])
}

#[inline]
#[must_use]
pub(crate) fn bishop_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    let table = &*BISHOP_TABLE;
    let idx = sq.index();
    Bitboard(table.attacks[idx][occupancy_index(occupancy.0, table.masks[idx])])
}

#[inline]
#[must_use]
pub(crate) fn rook_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    let table = &*ROOK_TABLE;
    let idx = sq.index();
    Bitboard(table.attacks[idx][occupancy_index(occupancy.0, table.masks[idx])])
}

#[inline]
#[must_use]
pub(crate) fn queen_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupancy) | rook_attacks(sq, occupancy)
}

/// Squares strictly between two aligned squares; empty when unaligned.
#[inline]
#[must_use]
pub(crate) fn between(a: Square, b: Square) -> Bitboard {
    Bitboard(BETWEEN[a.index()][b.index()])
}

/// True when three squares share a rank, file, or diagonal.
#[inline]
#[must_use]
pub(crate) fn aligned(a: Square, b: Square, c: Square) -> bool {
    LINE[a.index()][b.index()] & (1u64 << c.index()) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knight_attacks_center() {
        let attacks = knight_attacks(Square::new(3, 3));
        assert_eq!(attacks.count(), 8);
    }

    #[test]
    fn test_knight_attacks_corner() {
        let attacks = knight_attacks(Square::A1);
        assert_eq!(attacks.count(), 2);
        assert!(attacks.contains(Square::new(2, 1)));
        assert!(attacks.contains(Square::new(1, 2)));
    }

    #[test]
    fn test_king_attacks_edge() {
        assert_eq!(king_attacks(Square::A1).count(), 3);
        assert_eq!(king_attacks(Square::new(3, 3)).count(), 8);
    }

    #[test]
    fn test_pawn_attacks() {
        let white = pawn_attacks(Color::White, Square::new(1, 4));
        assert!(white.contains(Square::new(2, 3)));
        assert!(white.contains(Square::new(2, 5)));
        assert_eq!(white.count(), 2);

        let black = pawn_attacks(Color::Black, Square::new(6, 0));
        assert!(black.contains(Square::new(5, 1)));
        assert_eq!(black.count(), 1);
    }

    #[test]
    fn test_rook_attacks_empty_board() {
        let attacks = rook_attacks(Square::new(3, 3), Bitboard::EMPTY);
        assert_eq!(attacks.count(), 14);
    }

    #[test]
    fn test_rook_attacks_blocked() {
        // Blocker on d6: the ray stops there and includes the blocker.
        let blocker = Bitboard::from_square(Square::new(5, 3));
        let attacks = rook_attacks(Square::new(3, 3), blocker);
        assert!(attacks.contains(Square::new(4, 3)));
        assert!(attacks.contains(Square::new(5, 3)));
        assert!(!attacks.contains(Square::new(6, 3)));
    }

    #[test]
    fn test_bishop_attacks_blocked() {
        let blocker = Bitboard::from_square(Square::new(5, 5));
        let attacks = bishop_attacks(Square::new(3, 3), blocker);
        assert!(attacks.contains(Square::new(4, 4)));
        assert!(attacks.contains(Square::new(5, 5)));
        assert!(!attacks.contains(Square::new(6, 6)));
    }

    #[test]
    fn test_queen_is_rook_plus_bishop() {
        let occ = Bitboard::from_square(Square::new(5, 3));
        let q = queen_attacks(Square::new(3, 3), occ);
        let rb = rook_attacks(Square::new(3, 3), occ) | bishop_attacks(Square::new(3, 3), occ);
        assert_eq!(q, rb);
    }

    #[test]
    fn test_between() {
        let b = between(Square::A1, Square::new(0, 4));
        assert_eq!(b.count(), 3);
        assert!(b.contains(Square::B1));
        assert!(b.contains(Square::D1));
        // Unaligned squares have no between set.
        assert!(between(Square::A1, Square::new(2, 1)).is_empty());
        // Adjacent squares have an empty between set.
        assert!(between(Square::A1, Square::B1).is_empty());
    }

    #[test]
    fn test_aligned() {
        assert!(aligned(Square::A1, Square::new(0, 4), Square::H1));
        assert!(aligned(Square::A1, Square::new(3, 3), Square::new(5, 5)));
        assert!(!aligned(Square::A1, Square::new(2, 1), Square::H8));
    }
}
