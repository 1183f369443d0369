//! Chess board representation and move generation.
//!
//! Bitboard-based with an O(1) piece array kept in lockstep. Supports full
//! chess rules including Chess960 castling, en passant, and promotions.

pub(crate) mod attack_tables;
mod error;
mod eval;
mod fen;
mod make_unmake;
mod movegen;
mod perft;
mod see;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use error::{FenError, MoveParseError, SquareError};
pub use eval::evaluate;
pub use fen::STARTPOS_FEN;
pub use state::{Board, HistoryEntry};
pub use types::{
    Bitboard, CastleSide, CastlingRights, Color, Move, MoveList, Piece, ScoredMove,
    ScoredMoveList, Square, MAX_PLY, NO_MOVE,
};

pub(crate) use see::SEE_VALUES;
