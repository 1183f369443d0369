//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position signatures for the
//! transposition table. The key tables are generated once from a fixed seed
//! so that restarts produce identical signatures.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::board::{Color, Piece, Square};

pub(crate) struct ZobristKeys {
    /// `piece_keys[color * 6 + piece][square]`
    pub(crate) piece_keys: [[u64; 64]; 12],
    pub(crate) side_key: u64,
    /// One key per castling right: WK, WQ, BK, BQ.
    pub(crate) castling_keys: [u64; 4],
    /// Only the file of the en-passant target matters.
    pub(crate) en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(0x5EED_CA57_1E5C_0DE5);
        let mut piece_keys = [[0u64; 64]; 12];
        let mut castling_keys = [0u64; 4];
        let mut en_passant_keys = [0u64; 8];

        for piece in &mut piece_keys {
            for key in piece.iter_mut() {
                *key = rng.gen();
            }
        }

        let side_key = rng.gen();

        for key in &mut castling_keys {
            *key = rng.gen();
        }

        for key in &mut en_passant_keys {
            *key = rng.gen();
        }

        ZobristKeys {
            piece_keys,
            side_key,
            castling_keys,
            en_passant_keys,
        }
    }
}

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

/// Key for a colored piece on a square.
#[inline]
pub(crate) fn piece_key(color: Color, piece: Piece, sq: Square) -> u64 {
    ZOBRIST.piece_keys[color.index() * 6 + piece.index()][sq.index()]
}

/// Key toggled when black is to move.
#[inline]
pub(crate) fn side_key() -> u64 {
    ZOBRIST.side_key
}

/// Combined key for a set of castling rights (4-bit presence mask).
#[inline]
pub(crate) fn castling_key(bits: u8) -> u64 {
    let mut key = 0u64;
    for (i, right) in ZOBRIST.castling_keys.iter().enumerate() {
        if bits & (1 << i) != 0 {
            key ^= right;
        }
    }
    key
}

/// Key for an en-passant target on `file`.
#[inline]
pub(crate) fn en_passant_key(file: usize) -> u64 {
    ZOBRIST.en_passant_keys[file]
}
