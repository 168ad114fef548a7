use std::fmt;

use arrayvec::ArrayVec;
use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize, Serializer};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const fn to_code(self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'w' => Some(Self::White),
            'b' => Some(Self::Black),
            _ => None,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.to_code())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => Color::from_code(code.to_ascii_lowercase())
                .ok_or_else(|| D::Error::custom("expected 'w' or 'b'")),
            _ => Err(D::Error::custom("expected 'w' or 'b'")),
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    pub const ALL: [Self; 6] = [
        Self::Pawn,
        Self::Knight,
        Self::Bishop,
        Self::Rook,
        Self::Queen,
        Self::King,
    ];

    pub const fn fen_code(self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    pub const fn from_fen_code(code: char) -> Option<Self> {
        match code {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub has_moved: bool,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            has_moved: false,
        }
    }
}

/// Board square. `file` 0 is the A file, `rank` 0 is rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    pub const fn new_unchecked(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    pub const fn index(self) -> usize {
        self.file as usize + 8 * self.rank as usize
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 64 {
            Some(Self {
                file: (index % 8) as u8,
                rank: (index / 8) as u8,
            })
        } else {
            None
        }
    }

    /// Parses an `"A1".."H8"` label. Lowercase input is normalized.
    pub fn parse(input: &str) -> Option<Self> {
        let mut chars = input.chars();
        let file = chars.next()?.to_ascii_uppercase();
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if !('A'..='H').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Some(Self {
            file: file as u8 - b'A',
            rank: rank as u8 - b'1',
        })
    }

    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file as i8 + file_delta;
        let rank = self.rank as i8 + rank_delta;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Self {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    pub fn label(self) -> String {
        format!("{}{}", (b'A' + self.file) as char, self.rank + 1)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.file) as char, self.rank + 1)
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Square::parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid square: {raw}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    #[serde(rename = "K")]
    King,
    #[serde(rename = "Q")]
    Queen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastleRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastleRights {
    pub const fn all() -> Self {
        Self {
            white_king_side: true,
            white_queen_side: true,
            black_king_side: true,
            black_queen_side: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            white_king_side: false,
            white_queen_side: false,
            black_king_side: false,
            black_queen_side: false,
        }
    }

    pub const fn allows(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::King) => self.white_king_side,
            (Color::White, CastleSide::Queen) => self.white_queen_side,
            (Color::Black, CastleSide::King) => self.black_king_side,
            (Color::Black, CastleSide::Queen) => self.black_queen_side,
        }
    }

    pub fn clear(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::White, CastleSide::King) => self.white_king_side = false,
            (Color::White, CastleSide::Queen) => self.white_queen_side = false,
            (Color::Black, CastleSide::King) => self.black_king_side = false,
            (Color::Black, CastleSide::Queen) => self.black_queen_side = false,
        }
    }

    pub fn clear_color(&mut self, color: Color) {
        self.clear(color, CastleSide::King);
        self.clear(color, CastleSide::Queen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromoPiece {
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "R")]
    Rook,
    #[serde(rename = "B")]
    Bishop,
    #[serde(rename = "N")]
    Knight,
}

impl PromoPiece {
    pub const ALL: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    pub const fn piece_kind(self) -> PieceKind {
        match self {
            Self::Queen => PieceKind::Queen,
            Self::Rook => PieceKind::Rook,
            Self::Bishop => PieceKind::Bishop,
            Self::Knight => PieceKind::Knight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveKind {
    Move,
    Capture,
    PortalActivation,
    Castle,
    Promotion,
    Enpassant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkKind {
    Exclusive,
    Neutral,
}

/// A teleport decision: remain on the entry square or jump to a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalChoice {
    Stay,
    Teleport(Square),
}

impl Serialize for PortalChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Stay => serializer.serialize_str("STAY"),
            Self::Teleport(square) => square.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PortalChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.eq_ignore_ascii_case("STAY") {
            return Ok(Self::Stay);
        }
        Square::parse(&raw)
            .map(Self::Teleport)
            .ok_or_else(|| D::Error::custom(format!("invalid portal choice: {raw}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalTransit {
    pub entry: Square,
    pub network: NetworkKind,
    pub choice: PortalChoice,
    pub swapped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMove {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castle: Option<CastleSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromoPiece>,
}

impl BaseMove {
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self {
            from,
            to,
            kind,
            castle: None,
            promotion: None,
        }
    }

    pub const fn castle(from: Square, to: Square, side: CastleSide) -> Self {
        Self {
            from,
            to,
            kind: MoveKind::Castle,
            castle: Some(side),
            promotion: None,
        }
    }

    pub const fn promotion(from: Square, to: Square, promo: PromoPiece) -> Self {
        Self {
            from,
            to,
            kind: MoveKind::Promotion,
            castle: None,
            promotion: Some(promo),
        }
    }
}

/// A fully disambiguated move: the base move plus the final landing square
/// and any portal decision taken along the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMove {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castle: Option<CastleSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromoPiece>,
    pub to_final: Square,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_portal: Option<PortalTransit>,
}

impl ResolvedMove {
    /// Resolution of a base move with no portal involvement.
    pub const fn direct(base: BaseMove) -> Self {
        Self {
            from: base.from,
            to: base.to,
            kind: base.kind,
            castle: base.castle,
            promotion: base.promotion,
            to_final: base.to,
            via_portal: None,
        }
    }

    pub const fn with_portal(base: BaseMove, to_final: Square, transit: PortalTransit) -> Self {
        Self {
            from: base.from,
            to: base.to,
            kind: base.kind,
            castle: base.castle,
            promotion: base.promotion,
            to_final,
            via_portal: Some(transit),
        }
    }

    /// The fields the server trusts when matching a client submission
    /// against its own re-derived outcome set. Anything else a client
    /// sends is ignored.
    pub fn key(&self) -> MoveKey {
        MoveKey {
            to_final: self.to_final,
            kind: self.kind,
            promotion: self.promotion,
            choice: self.via_portal.map(|transit| transit.choice),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveKey {
    pub to_final: Square,
    pub kind: MoveKind,
    pub promotion: Option<PromoPiece>,
    pub choice: Option<PortalChoice>,
}

pub type BaseMoves = ArrayVec<BaseMove, 32>;
pub type Outcomes = ArrayVec<ResolvedMove, 8>;
pub type MoveList = ArrayVec<ResolvedMove, 1024>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_label_round_trip() {
        for index in 0..64 {
            let square = Square::from_index(index).unwrap();
            assert_eq!(Square::parse(&square.label()), Some(square));
            assert_eq!(square.index(), index);
        }
    }

    #[test]
    fn parse_square_normalizes_case() {
        assert_eq!(Square::parse("e4"), Square::parse("E4"));
        assert_eq!(Square::parse("a1"), Some(Square::new_unchecked(0, 0)));
        assert_eq!(Square::parse("H8"), Some(Square::new_unchecked(7, 7)));
        assert_eq!(Square::parse("I1"), None);
        assert_eq!(Square::parse("A9"), None);
        assert_eq!(Square::parse("A10"), None);
        assert_eq!(Square::parse(""), None);
    }

    #[test]
    fn piece_code_round_trip() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_fen_code(kind.fen_code()), Some(kind));
        }
    }

    #[test]
    fn move_key_ignores_non_matching_fields() {
        let from = Square::parse("B5").unwrap();
        let to = Square::parse("G4").unwrap();
        let base = BaseMove::new(from, to, MoveKind::PortalActivation);
        let transit = PortalTransit {
            entry: from,
            network: NetworkKind::Neutral,
            choice: PortalChoice::Teleport(to),
            swapped: true,
        };
        let resolved = ResolvedMove::with_portal(base, to, transit);

        let mut altered = resolved;
        altered.via_portal = Some(PortalTransit {
            swapped: false,
            ..transit
        });
        assert_eq!(resolved.key(), altered.key());
    }
}
