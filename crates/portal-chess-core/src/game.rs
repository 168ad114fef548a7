use serde::{Deserialize, Serialize};

use crate::movegen::{all_legal_moves, in_check, legal_moves_from};
use crate::portal::PortalConfig;
use crate::position::{Position, PositionError};
use crate::types::{Color, MoveList, ResolvedMove, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub status: GameStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Color>,
}

impl GameResult {
    pub const fn ongoing() -> Self {
        Self {
            status: GameStatus::Ongoing,
            winner: None,
        }
    }

    pub const fn is_over(&self) -> bool {
        !matches!(self.status, GameStatus::Ongoing)
    }
}

/// Checkmate iff the side to move has no legal resolved outcome and is in
/// check; stalemate iff none and not in check.
pub fn game_result(position: &Position) -> GameResult {
    if !all_legal_moves(position).is_empty() {
        return GameResult::ongoing();
    }
    if in_check(position, position.turn) {
        GameResult {
            status: GameStatus::Checkmate,
            winner: Some(position.turn.opposite()),
        }
    } else {
        GameResult {
            status: GameStatus::Stalemate,
            winner: None,
        }
    }
}

/// Game facade over [`Position`]: owns the current state and validates
/// submitted moves against the re-derived legal outcome set.
#[derive(Debug, Clone)]
pub struct PortalChess {
    position: Position,
}

impl PortalChess {
    pub fn new() -> Self {
        Self {
            position: Position::new(),
        }
    }

    pub fn with_config(portals: PortalConfig) -> Self {
        Self {
            position: Position::initial(portals),
        }
    }

    pub fn from_fen(fen: &str, portals: PortalConfig) -> Result<Self, PositionError> {
        Ok(Self {
            position: Position::from_fen(fen, portals)?,
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn turn(&self) -> Color {
        self.position.turn
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    pub fn moves(&self) -> MoveList {
        all_legal_moves(&self.position)
    }

    pub fn moves_from(&self, square: Square) -> MoveList {
        legal_moves_from(&self.position, square)
    }

    /// Applies the legal outcome matching `mv` on its trusted fields; the
    /// matched outcome (not the submitted record) is what gets applied.
    pub fn make_move(&mut self, mv: &ResolvedMove) -> Result<(), PositionError> {
        let legal = legal_moves_from(&self.position, mv.from);
        let matched = legal
            .iter()
            .find(|candidate| candidate.key() == mv.key())
            .copied()
            .ok_or(PositionError::UnmatchedMove)?;
        self.position = self.position.apply(&matched)?;
        Ok(())
    }

    pub fn in_check(&self) -> bool {
        in_check(&self.position, self.position.turn)
    }

    pub fn result(&self) -> GameResult {
        game_result(&self.position)
    }

    pub fn is_game_over(&self) -> bool {
        self.result().is_over()
    }

    pub fn history(&self) -> &[ResolvedMove] {
        &self.position.history
    }

    pub fn move_number(&self) -> u32 {
        self.position.move_number
    }
}

impl Default for PortalChess {
    fn default() -> Self {
        Self::new()
    }
}
