use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use portal_chess_core::{
    game_result, legal_moves_from, Color, GameStatus, Position, ResolvedMove,
};

use crate::protocol::{color_word, Clocks, EndResult, ErrorCode, ServerMessage};

pub const TICK_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_TIME_MINUTES: f64 = 10.0;

/// A connected participant: its ephemeral socket id and outbound queue.
#[derive(Debug, Clone)]
pub struct SocketHandle {
    pub id: String,
    pub tx: UnboundedSender<ServerMessage>,
}

#[derive(Debug)]
pub struct Room {
    pub id: String,
    pub position: Position,
    pub sockets: Vec<SocketHandle>,
    pub host: String,
    /// Socket holding the white seat. Starts as the host; a later joiner
    /// inherits the seat if its holder disconnected mid-game.
    white_socket: String,
    pub locked: bool,
    pub terminal: bool,
    pub closed: bool,
    /// Remaining time in ms, indexed by `Color as usize`.
    pub clocks: [u64; 2],
    pub last_tick: Instant,
    ticker_running: bool,
}

impl Room {
    pub fn new(id: String, host: SocketHandle, time_minutes: Option<f64>) -> Self {
        let minutes = time_minutes.unwrap_or(DEFAULT_TIME_MINUTES);
        let ms = ((minutes * 60_000.0) as i64).max(1) as u64;
        let host_id = host.id.clone();
        Self {
            id,
            position: Position::new(),
            sockets: vec![host],
            host: host_id.clone(),
            white_socket: host_id,
            locked: false,
            terminal: false,
            closed: false,
            clocks: [ms, ms],
            last_tick: Instant::now(),
            ticker_running: false,
        }
    }

    pub fn broadcast(&self, message: &ServerMessage) {
        for socket in &self.sockets {
            let _ = socket.tx.send(message.clone());
        }
    }

    fn send_to(&self, socket_id: &str, message: ServerMessage) {
        if let Some(socket) = self.sockets.iter().find(|socket| socket.id == socket_id) {
            let _ = socket.tx.send(message);
        }
    }

    fn clocks_snapshot(&self) -> Clocks {
        Clocks::from_ms(self.clocks)
    }

    fn clock_message(&self) -> ServerMessage {
        ServerMessage::Clock {
            clocks: self.clocks_snapshot(),
            turn: self.position.turn,
            ts: unix_millis(),
        }
    }

    /// Color of a participant socket: the host plays white.
    fn color_of(&self, socket_id: &str) -> Color {
        if socket_id == self.white_socket {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Admits a second participant, locks the room and deals colors.
    /// Callers start the ticker once this returns `Ok`.
    pub fn admit(&mut self, socket: SocketHandle) -> Result<(), ErrorCode> {
        if self.locked {
            return Err(ErrorCode::RoomLocked);
        }
        let joiner_id = socket.id.clone();
        self.sockets.push(socket);
        let host = self.host.clone();
        self.send_to(
            &host,
            ServerMessage::PlayerJoined {
                socket_id: joiner_id.clone(),
            },
        );

        if self.sockets.len() >= 2 {
            self.locked = true;
            self.last_tick = Instant::now();
            // The white seat may have been vacated by a disconnect; the new
            // participant inherits it.
            if !self
                .sockets
                .iter()
                .any(|socket| socket.id == self.white_socket)
            {
                self.white_socket = joiner_id.clone();
            }
            let clocks = self.clocks_snapshot();
            for socket in &self.sockets {
                let _ = socket.tx.send(ServerMessage::GameStart {
                    room_id: self.id.clone(),
                    color: self.color_of(&socket.id),
                    state: self.position.clone(),
                    clocks,
                });
            }
        }
        Ok(())
    }

    /// One clock tick: charges elapsed time to the side to move and
    /// broadcasts a snapshot. Flag-fall makes the room terminal and emits
    /// `gameEnd` exactly once.
    pub fn tick(&mut self, now: Instant) {
        if self.terminal || self.closed {
            return;
        }
        if !self.locked {
            // Waiting rooms do not burn clock time.
            self.last_tick = now;
            return;
        }

        self.charge_side_to_move(now);
        self.broadcast(&self.clock_message());

        if self.clocks[self.position.turn as usize] == 0 {
            self.terminal = true;
            self.broadcast(&ServerMessage::GameEnd {
                result: EndResult::Timeout,
                winner: Some(color_word(self.position.turn.opposite())),
            });
        }
    }

    fn charge_side_to_move(&mut self, now: Instant) {
        let delta = now.saturating_duration_since(self.last_tick).as_millis() as u64;
        let side = self.position.turn as usize;
        self.clocks[side] = self.clocks[side].saturating_sub(delta);
        self.last_tick = now;
    }

    /// Validates a client-submitted resolved move by re-deriving the legal
    /// outcome set and matching on the trusted tuple, then applies the
    /// server's own matching outcome. Emits the acknowledgement, the
    /// `moveMade` broadcast and a fresh clock snapshot in that order.
    pub fn handle_move(
        &mut self,
        socket_id: &str,
        resolved: Option<Value>,
    ) -> Result<(), ErrorCode> {
        let submitted: ResolvedMove = resolved
            .ok_or(ErrorCode::InvalidPayload)
            .and_then(|value| {
                serde_json::from_value(value).map_err(|_| ErrorCode::InvalidPayload)
            })?;
        if !self.locked {
            return Err(ErrorCode::NotReady);
        }
        if self.terminal {
            return Err(ErrorCode::GameOver);
        }

        let legal = legal_moves_from(&self.position, submitted.from);
        let matched = legal
            .iter()
            .find(|candidate| candidate.key() == submitted.key())
            .copied()
            .ok_or(ErrorCode::IllegalMove)?;

        // A final pre-apply tick charges the mover's remaining think time.
        self.charge_side_to_move(Instant::now());

        let next = self
            .position
            .apply(&matched)
            .map_err(|_| ErrorCode::ServerError)?;
        self.position = next;

        self.send_to(socket_id, ServerMessage::ack_ok());
        self.broadcast(&ServerMessage::MoveMade {
            resolved: matched,
            state: self.position.clone(),
            clocks: self.clocks_snapshot(),
        });
        self.broadcast(&self.clock_message());

        let result = game_result(&self.position);
        if result.is_over() {
            self.terminal = true;
            let (end, winner) = match result.status {
                GameStatus::Checkmate => (
                    EndResult::Checkmate,
                    result.winner.map(color_word),
                ),
                _ => (EndResult::Stalemate, None),
            };
            self.broadcast(&ServerMessage::GameEnd {
                result: end,
                winner,
            });
        }
        Ok(())
    }

    /// Drops a participant. Returns true when the room is now empty and
    /// should be destroyed.
    pub fn drop_socket(&mut self, socket_id: &str) -> bool {
        let before = self.sockets.len();
        self.sockets.retain(|socket| socket.id != socket_id);
        if self.sockets.len() == before {
            return false;
        }
        if self.sockets.is_empty() {
            self.closed = true;
            return true;
        }
        self.locked = false;
        self.broadcast(&ServerMessage::PlayerLeft {
            socket_id: socket_id.to_string(),
        });
        false
    }

    pub fn has_socket(&self, socket_id: &str) -> bool {
        self.sockets.iter().any(|socket| socket.id == socket_id)
    }
}

/// The process-wide room table. Mutated only on connect, disconnect, create
/// and join; tickers capture their room handle.
pub struct Rooms {
    inner: Mutex<HashMap<String, Arc<Mutex<Room>>>>,
}

impl Rooms {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(HashMap::new()),
        })
    }

    pub fn create_room(&self, host: SocketHandle, time_minutes: Option<f64>) -> String {
        let mut table = self.inner.lock().expect("rooms table lock");
        let id = loop {
            let candidate = new_room_id();
            if !table.contains_key(&candidate) {
                break candidate;
            }
        };
        let room = Room::new(id.clone(), host, time_minutes);
        table.insert(id.clone(), Arc::new(Mutex::new(room)));
        id
    }

    pub fn join_room(
        self: &Arc<Self>,
        room_id: Option<String>,
        socket: SocketHandle,
    ) -> Result<(), ErrorCode> {
        let room_id = room_id.ok_or(ErrorCode::MissingRoomId)?;
        let room = self.get(&room_id).ok_or(ErrorCode::NotFound)?;

        let mut guard = room.lock().map_err(|_| ErrorCode::ServerError)?;
        guard.admit(socket)?;
        let start_ticker = guard.locked && !guard.ticker_running;
        if start_ticker {
            guard.ticker_running = true;
        }
        drop(guard);

        if start_ticker {
            spawn_ticker(Arc::clone(&room));
        }
        Ok(())
    }

    pub fn make_move(
        &self,
        room_id: Option<String>,
        resolved: Option<Value>,
        socket_id: &str,
    ) -> Result<(), ErrorCode> {
        let room_id = room_id.ok_or(ErrorCode::InvalidPayload)?;
        let room = self.get(&room_id).ok_or(ErrorCode::NotFound)?;
        let mut guard = room.lock().map_err(|_| ErrorCode::ServerError)?;
        guard.handle_move(socket_id, resolved)
    }

    pub fn disconnect(&self, socket_id: &str) {
        let mut table = self.inner.lock().expect("rooms table lock");
        let mut empty_rooms = Vec::new();
        for (id, room) in table.iter() {
            let Ok(mut guard) = room.lock() else {
                continue;
            };
            if guard.has_socket(socket_id) && guard.drop_socket(socket_id) {
                empty_rooms.push(id.clone());
            }
        }
        for id in empty_rooms {
            table.remove(&id);
        }
    }

    pub fn get(&self, room_id: &str) -> Option<Arc<Mutex<Room>>> {
        self.inner
            .lock()
            .expect("rooms table lock")
            .get(room_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("rooms table lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 5 lowercase hex chars from the thread-local CSPRNG.
fn new_room_id() -> String {
    format!("{:05x}", rand::rng().random_range(0..0x100000u32))
}

pub fn new_socket_id() -> String {
    format!("{:08x}", rand::rng().random::<u32>())
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Per-room 250 ms ticker. Tick failures are swallowed so one bad tick
/// cannot kill the room.
fn spawn_ticker(room: Arc<Mutex<Room>>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let Ok(mut guard) = room.lock() else {
                continue;
            };
            if guard.terminal || guard.closed {
                guard.ticker_running = false;
                break;
            }
            guard.tick(Instant::now());
            if guard.terminal {
                guard.ticker_running = false;
                break;
            }
        }
    });
}
