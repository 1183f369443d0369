//! FEN parsing and emission.
//!
//! Castling rights parse in both classical (`KQkq`) and Shredder-FEN
//! (`HAha`) forms; `KQkq` is resolved against the actual rook placement so
//! X-FEN Chess960 positions load correctly.

use std::str::FromStr;

use super::attack_tables::pawn_attacks;
use super::error::FenError;
use super::state::Board;
use super::types::{CastleSide, Color, Piece, Square};

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    /// Parse a six-field FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::MissingFields {
                found: fields.len(),
            });
        }

        let mut board = Board::empty();
        parse_placement(&mut board, fields[0])?;

        board.stm = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::BadSideToMove {
                    field: other.to_string(),
                })
            }
        };

        parse_castling(&mut board, fields[2])?;

        match fields[3] {
            "-" => {}
            ep_field => {
                let ep: Square = ep_field.parse()?;
                // The target is only recorded when an enemy pawn stands
                // ready to capture it, matching make_move's convention.
                let mover = board.stm;
                if !(pawn_attacks(mover.opponent(), ep)
                    & board.pieces_of(mover, Piece::Pawn))
                .is_empty()
                {
                    board.en_passant = Some(ep);
                }
            }
        }

        board.halfmove_clock = fields[4].parse().map_err(|_| FenError::BadCounter {
            field: fields[4].to_string(),
        })?;
        board.fullmove_number = fields[5].parse().map_err(|_| FenError::BadCounter {
            field: fields[5].to_string(),
        })?;
        if board.fullmove_number == 0 {
            board.fullmove_number = 1;
        }

        for color in [Color::White, Color::Black] {
            if board.pieces_of(color, Piece::King).count() != 1 {
                return Err(FenError::InvalidPosition {
                    reason: "each side needs exactly one king",
                });
            }
        }

        board.hash = board.compute_hash();
        Ok(board)
    }

    /// Emit the position as a six-field FEN string, round-tripping with
    /// [`Board::from_fen`].
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8).rev() {
            let mut empties = 0;
            for file in 0..8 {
                match self.piece_at(Square::new(rank, file)) {
                    Some((color, piece)) => {
                        if empties > 0 {
                            fen.push(char::from_digit(empties, 10).expect("digit"));
                            empties = 0;
                        }
                        fen.push(piece.to_fen_char(color));
                    }
                    None => empties += 1,
                }
            }
            if empties > 0 {
                fen.push(char::from_digit(empties, 10).expect("digit"));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.stm == Color::White { 'w' } else { 'b' });
        fen.push(' ');
        fen.push_str(&self.castling_field());
        fen.push(' ');
        match self.en_passant {
            Some(ep) => fen.push_str(&ep.to_string()),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }

    fn castling_field(&self) -> String {
        if !self.castling.any() {
            return "-".to_string();
        }

        let mut out = String::new();
        for color in [Color::White, Color::Black] {
            for side in [CastleSide::King, CastleSide::Queen] {
                let Some(rook) = self.castling.rook_square(color, side) else {
                    continue;
                };
                let classic_file = if side == CastleSide::King { 7 } else { 0 };
                let c = if rook.file() == classic_file {
                    match side {
                        CastleSide::King => 'k',
                        CastleSide::Queen => 'q',
                    }
                } else {
                    // Shredder-FEN file letter for displaced rooks.
                    (b'a' + rook.file() as u8) as char
                };
                out.push(if color == Color::White {
                    c.to_ascii_uppercase()
                } else {
                    c
                });
            }
        }
        out
    }
}

fn parse_placement(board: &mut Board, placement: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::BadRank {
            rank: placement.to_string(),
        });
    }

    for (i, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - i;
        let mut file = 0;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
                continue;
            }
            if file >= 8 {
                return Err(FenError::BadRank {
                    rank: (*rank_str).to_string(),
                });
            }
            let piece = Piece::from_char(c).ok_or(FenError::BadPiece { c })?;
            let color = if c.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            board.set_piece(Square::new(rank, file), color, piece);
            file += 1;
        }
        if file != 8 {
            return Err(FenError::BadRank {
                rank: (*rank_str).to_string(),
            });
        }
    }
    Ok(())
}

fn parse_castling(board: &mut Board, field: &str) -> Result<(), FenError> {
    if field == "-" {
        return Ok(());
    }

    for c in field.chars() {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let back_rank = if color == Color::White { 0 } else { 7 };
        let kings = board.pieces_of(color, Piece::King);
        let king_sq = kings.first().ok_or(FenError::InvalidPosition {
            reason: "castling rights without a king",
        })?;
        if king_sq.rank() != back_rank {
            return Err(FenError::BadCastling {
                field: field.to_string(),
            });
        }

        let rooks = board.pieces_of(color, Piece::Rook);
        let (side, rook_sq) = match c.to_ascii_lowercase() {
            // Classical flags: outermost rook on the given side of the king.
            'k' => {
                let rook = ((king_sq.file() + 1)..8)
                    .rev()
                    .map(|f| Square::new(back_rank, f))
                    .find(|sq| rooks.contains(*sq));
                (CastleSide::King, rook)
            }
            'q' => {
                let rook = (0..king_sq.file())
                    .map(|f| Square::new(back_rank, f))
                    .find(|sq| rooks.contains(*sq));
                (CastleSide::Queen, rook)
            }
            // Shredder-FEN: an explicit rook file.
            'a'..='h' => {
                let file = c.to_ascii_lowercase() as usize - 'a' as usize;
                let sq = Square::new(back_rank, file);
                if !rooks.contains(sq) {
                    return Err(FenError::BadCastling {
                        field: field.to_string(),
                    });
                }
                let side = if file > king_sq.file() {
                    CastleSide::King
                } else {
                    CastleSide::Queen
                };
                (side, Some(sq))
            }
            _ => {
                return Err(FenError::BadCastling {
                    field: field.to_string(),
                })
            }
        };

        let rook_sq = rook_sq.ok_or(FenError::BadCastling {
            field: field.to_string(),
        })?;
        board.castling.grant(color, side, rook_sq);
    }
    Ok(())
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_fen(s)
    }
}
