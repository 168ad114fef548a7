use thiserror::Error;

use crate::board::Board;
use crate::types::{CastleRights, Color, Piece, PieceKind, Square};

pub const STARTING_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid fen")]
    Invalid,
    #[error("{0}")]
    Validation(String),
    #[error("invalid piece")]
    InvalidPiece,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFen {
    pub board: Board,
    pub turn: Color,
    pub castle_rights: CastleRights,
    pub en_passant_target: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

/// Parses the piece-placement field. `has_moved` is inferred: a piece counts
/// as unmoved iff it stands on one of its initial-array squares.
pub fn parse_placement(placement: &str) -> Result<Board, FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::Validation(format!(
            "piece placement is invalid [expected 8 ranks, received {}]",
            ranks.len()
        )));
    }

    let mut board = Board::empty();
    for (row, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - row as u8;
        let mut file = 0u8;
        for ch in rank_str.chars() {
            if let Some(skip) = ch.to_digit(10) {
                file += skip as u8;
                continue;
            }
            let kind = PieceKind::from_fen_code(ch.to_ascii_lowercase())
                .ok_or(FenError::InvalidPiece)?;
            let color = if ch.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };
            let square = Square::new(file, rank).ok_or_else(|| {
                FenError::Validation(format!(
                    "piece placement is invalid [rank {} overflows]",
                    rank + 1
                ))
            })?;
            let mut piece = Piece::new(kind, color);
            piece.has_moved = !is_initial_square(kind, color, square);
            board.put(piece, square);
            file += 1;
        }
        if file != 8 {
            return Err(FenError::Validation(format!(
                "piece placement is invalid [expected 8 squares, received {} in rank {}]",
                file,
                rank + 1
            )));
        }
    }
    Ok(board)
}

pub fn encode_placement(board: &Board) -> String {
    let mut out = String::new();
    for row in 0..8u8 {
        let rank = 7 - row;
        let mut empty = 0u8;
        for file in 0..8u8 {
            match board.get(Square::new_unchecked(file, rank)) {
                Some(piece) => {
                    if empty > 0 {
                        out.push(char::from_digit(u32::from(empty), 10).expect("digit 1..=8"));
                        empty = 0;
                    }
                    let code = piece.kind.fen_code();
                    out.push(if piece.color == Color::White {
                        code.to_ascii_uppercase()
                    } else {
                        code
                    });
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push(char::from_digit(u32::from(empty), 10).expect("digit 1..=8"));
        }
        if row != 7 {
            out.push('/');
        }
    }
    out
}

pub fn parse_fen(fen: &str) -> Result<ParsedFen, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 6 {
        return Err(FenError::Validation(format!(
            "expected 6 fields, received {}",
            parts.len()
        )));
    }

    let board = parse_placement(parts[0])?;

    let turn = match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => {
            return Err(FenError::Validation(format!(
                "2nd field (active player) is invalid [expected 'w' or 'b', received {other}]"
            )))
        }
    };

    let mut castle_rights = CastleRights::none();
    if parts[2] != "-" {
        for ch in parts[2].chars() {
            match ch {
                'K' => castle_rights.white_king_side = true,
                'Q' => castle_rights.white_queen_side = true,
                'k' => castle_rights.black_king_side = true,
                'q' => castle_rights.black_queen_side = true,
                _ => {
                    return Err(FenError::Validation(
                        "3rd field (castling) is invalid".to_string(),
                    ))
                }
            }
        }
    }

    let en_passant_target = match parts[3] {
        "-" => None,
        label => Some(
            Square::parse(label)
                .ok_or_else(|| FenError::Validation("4th field (en passant) is invalid".to_string()))?,
        ),
    };

    let halfmove_clock = parts[4]
        .parse()
        .map_err(|_| FenError::Validation("5th field (halfmove clock) is invalid".to_string()))?;
    let fullmove_number = parts[5]
        .parse()
        .map_err(|_| FenError::Validation("6th field (fullmove number) is invalid".to_string()))?;

    Ok(ParsedFen {
        board,
        turn,
        castle_rights,
        en_passant_target,
        halfmove_clock,
        fullmove_number,
    })
}

pub fn encode_fen(parsed: &ParsedFen) -> String {
    let mut castle = String::new();
    if parsed.castle_rights.white_king_side {
        castle.push('K');
    }
    if parsed.castle_rights.white_queen_side {
        castle.push('Q');
    }
    if parsed.castle_rights.black_king_side {
        castle.push('k');
    }
    if parsed.castle_rights.black_queen_side {
        castle.push('q');
    }
    if castle.is_empty() {
        castle.push('-');
    }

    let en_passant = parsed
        .en_passant_target
        .map(|square| square.label().to_ascii_lowercase())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} {} {} {} {} {}",
        encode_placement(&parsed.board),
        parsed.turn.to_code(),
        castle,
        en_passant,
        parsed.halfmove_clock,
        parsed.fullmove_number
    )
}

fn is_initial_square(kind: PieceKind, color: Color, square: Square) -> bool {
    let back_rank = if color == Color::White { 0 } else { 7 };
    match kind {
        PieceKind::Pawn => square.rank == if color == Color::White { 1 } else { 6 },
        PieceKind::Knight => square.rank == back_rank && (square.file == 1 || square.file == 6),
        PieceKind::Bishop => square.rank == back_rank && (square.file == 2 || square.file == 5),
        PieceKind::Rook => square.rank == back_rank && (square.file == 0 || square.file == 7),
        PieceKind::Queen => square.rank == back_rank && square.file == 3,
        PieceKind::King => square.rank == back_rank && square.file == 4,
    }
}
