//! Precomputed attack tables and mask constants.
//!
//! Everything here is a pure function of (square, occupancy) backed by
//! lazily-initialized global tables. Initialization is idempotent and
//! thread-safe; [`init`] forces it eagerly so no worker pays the cost
//! mid-search.

mod attacks;
mod tables;

use once_cell::sync::Lazy;

pub(crate) use attacks::{
    aligned, between, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks,
    rook_attacks,
};
pub(crate) use tables::{FILE_MASKS, FRONT_SPANS, KING_ZONE};

/// Force initialization of every table. Safe to call more than once and from
/// multiple threads; must complete before search workers start.
pub fn init() {
    Lazy::force(&tables::KNIGHT_ATTACKS);
    Lazy::force(&tables::KING_ATTACKS);
    Lazy::force(&tables::PAWN_ATTACKS);
    Lazy::force(&tables::BISHOP_TABLE);
    Lazy::force(&tables::ROOK_TABLE);
    Lazy::force(&tables::FILE_MASKS);
    Lazy::force(&tables::RANK_MASKS);
    Lazy::force(&tables::DIAGONAL_MASKS);
    Lazy::force(&tables::FRONT_SPANS);
    Lazy::force(&tables::REAR_SPANS);
    Lazy::force(&tables::KING_ZONE);
    Lazy::force(&tables::BETWEEN);
    Lazy::force(&tables::LINE);
}
