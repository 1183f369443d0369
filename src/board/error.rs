//! Error types for board construction and move parsing.

use std::fmt;

/// Errors from square notation parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::InvalidNotation { notation } => {
                write!(f, "invalid square notation '{notation}'")
            }
        }
    }
}

impl std::error::Error for SquareError {}

/// Errors from FEN parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// The FEN does not have the expected number of fields
    MissingFields { found: usize },
    /// A rank in the placement field has the wrong number of squares
    BadRank { rank: String },
    /// An unknown character in the placement field
    BadPiece { c: char },
    /// The side-to-move field is not "w" or "b"
    BadSideToMove { field: String },
    /// The castling field contains an unusable flag
    BadCastling { field: String },
    /// The en-passant field is not "-" or a square
    BadEnPassant { field: String },
    /// A numeric field did not parse
    BadCounter { field: String },
    /// The placement is structurally impossible (e.g. missing king)
    InvalidPosition { reason: &'static str },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::MissingFields { found } => {
                write!(f, "expected 6 FEN fields, found {found}")
            }
            FenError::BadRank { rank } => write!(f, "malformed FEN rank '{rank}'"),
            FenError::BadPiece { c } => write!(f, "unknown FEN piece character '{c}'"),
            FenError::BadSideToMove { field } => {
                write!(f, "bad side-to-move field '{field}'")
            }
            FenError::BadCastling { field } => write!(f, "bad castling field '{field}'"),
            FenError::BadEnPassant { field } => write!(f, "bad en-passant field '{field}'"),
            FenError::BadCounter { field } => write!(f, "bad move counter '{field}'"),
            FenError::InvalidPosition { reason } => write!(f, "invalid position: {reason}"),
        }
    }
}

impl std::error::Error for FenError {}

impl From<SquareError> for FenError {
    fn from(e: SquareError) -> Self {
        match e {
            SquareError::InvalidNotation { notation } => FenError::BadEnPassant { field: notation },
        }
    }
}

/// Errors from coordinate move parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// The text is not of the form `<from><to>[promo]`
    BadFormat { text: String },
    /// The move parses but is not legal in the current position
    Illegal { text: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::BadFormat { text } => write!(f, "malformed move '{text}'"),
            MoveParseError::Illegal { text } => write!(f, "illegal move '{text}'"),
        }
    }
}

impl std::error::Error for MoveParseError {}
