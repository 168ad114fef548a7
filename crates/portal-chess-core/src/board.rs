use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::SQUARES;
use crate::types::{Color, Piece, PieceKind, Square};

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Board {
    pub const fn empty() -> Self {
        Self {
            squares: [None; 64],
        }
    }

    pub fn starting() -> Self {
        let mut board = Self::empty();
        for file in 0..8u8 {
            board.put(
                Piece::new(BACK_RANK[file as usize], Color::White),
                Square::new_unchecked(file, 0),
            );
            board.put(
                Piece::new(PieceKind::Pawn, Color::White),
                Square::new_unchecked(file, 1),
            );
            board.put(
                Piece::new(PieceKind::Pawn, Color::Black),
                Square::new_unchecked(file, 6),
            );
            board.put(
                Piece::new(BACK_RANK[file as usize], Color::Black),
                Square::new_unchecked(file, 7),
            );
        }
        board
    }

    pub const fn get(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn put(&mut self, piece: Piece, square: Square) {
        self.squares[square.index()] = Some(piece);
    }

    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.index()].take()
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.squares[square.index()].is_none()
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        SQUARES
            .iter()
            .copied()
            .filter_map(|square| self.get(square).map(|piece| (square, piece)))
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| piece.kind == PieceKind::King && piece.color == color)
            .map(|(square, _)| square)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

// On the wire the board travels as a FEN placement string. `has_moved` is
// re-inferred on parse from initial-array squares, which is lossy for pieces
// that left and returned; the authoritative state never round-trips through
// this encoding.
impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::fen::encode_placement(self))
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::fen::parse_placement(&raw).map_err(D::Error::custom)
    }
}
