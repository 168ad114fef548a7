use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Board;
use crate::fen::{encode_fen, parse_fen, ParsedFen};
use crate::portal::PortalConfig;
use crate::types::{
    CastleRights, CastleSide, Color, MoveKind, NetworkKind, Piece, PieceKind, PortalChoice,
    ResolvedMove, Square,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("{0}")]
    Fen(String),
    #[error("no piece on origin square {0}")]
    EmptyOrigin(Square),
    #[error("castle move has no side")]
    MissingCastleSide,
    #[error("castle move is missing its rook")]
    MissingRook,
    #[error("promotion move has no promotion piece")]
    MissingPromotion,
    #[error("swap destination holds no piece")]
    MissingSwapTarget,
    #[error("move does not match any legal outcome")]
    UnmatchedMove,
}

/// One active no-return restriction: a piece standing on `landing` may not
/// teleport back to `origin` this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoReturnEntry {
    pub landing: Square,
    pub origin: Square,
}

pub type NoReturnList = ArrayVec<NoReturnEntry, 4>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub board: Board,
    pub turn: Color,
    pub move_number: u32,
    pub castle_rights: CastleRights,
    pub portals: PortalConfig,
    /// Indexed by `Color as usize`. True forbids that color's neutral
    /// activations for its current turn.
    pub neutral_cooldown: [bool; 2],
    /// Active personal no-return restrictions, per color.
    pub no_return: [NoReturnList; 2],
    /// Restrictions that become active at the start of that color's next turn.
    pub pending_no_return: [NoReturnList; 2],
    /// Reserved; never produced by generation.
    pub en_passant_target: Option<Square>,
    pub halfmove_clock: u32,
    pub history: Vec<ResolvedMove>,
}

impl Position {
    pub fn initial(portals: PortalConfig) -> Self {
        Self {
            board: Board::starting(),
            turn: Color::White,
            move_number: 1,
            castle_rights: CastleRights::all(),
            portals,
            neutral_cooldown: [false, false],
            no_return: [NoReturnList::new(), NoReturnList::new()],
            pending_no_return: [NoReturnList::new(), NoReturnList::new()],
            en_passant_target: None,
            halfmove_clock: 0,
            history: Vec::new(),
        }
    }

    pub fn new() -> Self {
        Self::initial(PortalConfig::reference())
    }

    pub fn from_fen(fen: &str, portals: PortalConfig) -> Result<Self, PositionError> {
        let parsed = parse_fen(fen).map_err(|err| PositionError::Fen(err.to_string()))?;
        Ok(Self::from_parsed(parsed, portals))
    }

    pub fn fen(&self) -> String {
        encode_fen(&ParsedFen {
            board: self.board,
            turn: self.turn,
            castle_rights: self.castle_rights,
            en_passant_target: self.en_passant_target,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.move_number,
        })
    }

    fn from_parsed(parsed: ParsedFen, portals: PortalConfig) -> Self {
        Self {
            board: parsed.board,
            turn: parsed.turn,
            move_number: parsed.fullmove_number,
            castle_rights: parsed.castle_rights,
            portals,
            neutral_cooldown: [false, false],
            no_return: [NoReturnList::new(), NoReturnList::new()],
            pending_no_return: [NoReturnList::new(), NoReturnList::new()],
            en_passant_target: parsed.en_passant_target,
            halfmove_clock: parsed.halfmove_clock,
            history: Vec::new(),
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.get(square)
    }

    pub fn cooldown(&self, color: Color) -> bool {
        self.neutral_cooldown[color as usize]
    }

    /// The forbidden teleport origin for a piece of `color` standing on
    /// `landing`, if any.
    pub fn no_return_origin(&self, color: Color, landing: Square) -> Option<Square> {
        self.no_return[color as usize]
            .iter()
            .find(|entry| entry.landing == landing)
            .map(|entry| entry.origin)
    }

    /// Advances the game by one resolved move, producing a new position.
    /// The receiver is never mutated.
    pub fn apply(&self, mv: &ResolvedMove) -> Result<Self, PositionError> {
        let mut next = self.clone();
        next.en_passant_target = None;

        let mut mover = next
            .board
            .take(mv.from)
            .ok_or(PositionError::EmptyOrigin(mv.from))?;
        let mover_color = mover.color;
        let mover_kind = mover.kind;
        mover.has_moved = true;

        match mv.kind {
            MoveKind::Castle => {
                next.board.put(mover, mv.to_final);
                let rank = mv.from.rank;
                let (rook_from, rook_to) = match mv.castle {
                    Some(CastleSide::King) => (
                        Square::new_unchecked(7, rank),
                        Square::new_unchecked(5, rank),
                    ),
                    Some(CastleSide::Queen) => (
                        Square::new_unchecked(0, rank),
                        Square::new_unchecked(3, rank),
                    ),
                    None => return Err(PositionError::MissingCastleSide),
                };
                let mut rook = next
                    .board
                    .take(rook_from)
                    .ok_or(PositionError::MissingRook)?;
                rook.has_moved = true;
                next.board.put(rook, rook_to);
                next.castle_rights.clear_color(mover_color);
                next.halfmove_clock += 1;
            }
            MoveKind::Promotion => {
                if let Some(victim) = next.board.take(mv.to) {
                    clear_captured_rook_right(&mut next.castle_rights, victim, mv.to);
                }
                let promo = mv.promotion.ok_or(PositionError::MissingPromotion)?;
                let mut promoted = Piece::new(promo.piece_kind(), mover_color);
                promoted.has_moved = true;
                next.board.put(promoted, mv.to);
                next.halfmove_clock = 0;
            }
            _ => {
                let mut captured = false;
                if matches!(mv.kind, MoveKind::Capture | MoveKind::Enpassant) {
                    if let Some(victim) = next.board.take(mv.to) {
                        clear_captured_rook_right(&mut next.castle_rights, victim, mv.to);
                        captured = true;
                    }
                }

                match mv.via_portal {
                    Some(transit) if transit.swapped => {
                        let mut victim = next
                            .board
                            .take(mv.to_final)
                            .ok_or(PositionError::MissingSwapTarget)?;
                        victim.has_moved = true;
                        next.board.put(mover, mv.to_final);
                        next.board.put(victim, transit.entry);
                    }
                    _ => next.board.put(mover, mv.to_final),
                }

                if mover_kind == PieceKind::Pawn || captured {
                    next.halfmove_clock = 0;
                } else {
                    next.halfmove_clock += 1;
                }
            }
        }

        if mover_kind == PieceKind::King {
            next.castle_rights.clear_color(mover_color);
        }
        if mover_kind == PieceKind::Rook {
            if let Some((color, side)) = original_rook_square(mv.from) {
                if color == mover_color {
                    next.castle_rights.clear(color, side);
                }
            }
        }

        if let Some(transit) = mv.via_portal {
            if transit.network == NetworkKind::Neutral && transit.swapped {
                next.neutral_cooldown[mover_color.opposite() as usize] = true;
            }
            if transit.network == NetworkKind::Exclusive {
                if let PortalChoice::Teleport(_) = transit.choice {
                    let pending = &mut next.pending_no_return[mover_color as usize];
                    pending.retain(|entry| entry.landing != mv.to_final);
                    pending.push(NoReturnEntry {
                        landing: mv.to_final,
                        origin: transit.entry,
                    });
                }
            }
        }

        // The mover's one-turn restrictions are consumed by moving at all.
        next.neutral_cooldown[mover_color as usize] = false;
        next.no_return[mover_color as usize].clear();

        next.turn = mover_color.opposite();
        if next.turn == Color::White {
            next.move_number += 1;
        }
        next.history.push(*mv);

        let incoming = next.turn as usize;
        if !next.pending_no_return[incoming].is_empty() {
            next.no_return[incoming] = std::mem::take(&mut next.pending_no_return[incoming]);
        }

        Ok(next)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

fn clear_captured_rook_right(rights: &mut CastleRights, victim: Piece, square: Square) {
    if victim.kind != PieceKind::Rook {
        return;
    }
    if let Some((color, side)) = original_rook_square(square) {
        if color == victim.color {
            rights.clear(color, side);
        }
    }
}

fn original_rook_square(square: Square) -> Option<(Color, CastleSide)> {
    match (square.file, square.rank) {
        (0, 0) => Some((Color::White, CastleSide::Queen)),
        (7, 0) => Some((Color::White, CastleSide::King)),
        (0, 7) => Some((Color::Black, CastleSide::Queen)),
        (7, 7) => Some((Color::Black, CastleSide::King)),
        _ => None,
    }
}
