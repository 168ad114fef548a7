pub mod protocol;
pub mod room;
pub mod ws;

pub use protocol::{ClientMessage, Clocks, EndResult, ErrorCode, ServerMessage};
pub use room::{Room, Rooms, SocketHandle, DEFAULT_TIME_MINUTES, TICK_INTERVAL};
