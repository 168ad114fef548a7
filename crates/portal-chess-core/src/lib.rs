pub mod board;
pub mod constants;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod portal;
pub mod position;
pub mod types;

pub use board::Board;
pub use constants::SQUARES;
pub use fen::{encode_fen, parse_fen, FenError, ParsedFen, STARTING_POSITION};
pub use game::{game_result, GameResult, GameStatus, PortalChess};
pub use movegen::{
    all_legal_moves, expand, filter_check_legal, generate_base_moves, in_check,
    is_square_attacked, legal_moves_from, pseudo_legal_moves_from,
};
pub use portal::{PortalConfig, PortalExits};
pub use position::{NoReturnEntry, NoReturnList, Position, PositionError};
pub use types::{
    BaseMove, BaseMoves, CastleRights, CastleSide, Color, MoveKey, MoveKind, MoveList,
    NetworkKind, Outcomes, Piece, PieceKind, PortalChoice, PortalTransit, PromoPiece,
    ResolvedMove, Square,
};
