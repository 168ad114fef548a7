use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use portal_chess_core::{
    legal_moves_from, Color, PortalConfig, Position, Square,
};
use portal_chess_server::{
    EndResult, ErrorCode, Room, Rooms, ServerMessage, SocketHandle,
};

fn socket(id: &str) -> (SocketHandle, UnboundedReceiver<ServerMessage>) {
    let (tx, rx) = unbounded_channel();
    (
        SocketHandle {
            id: id.to_string(),
            tx,
        },
        rx,
    )
}

fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        out.push(message);
    }
    out
}

fn opener_json() -> serde_json::Value {
    let position = Position::new();
    let mv = legal_moves_from(&position, Square::parse("E2").unwrap())
        .iter()
        .find(|mv| mv.to_final == Square::parse("E4").unwrap())
        .copied()
        .unwrap();
    serde_json::to_value(mv).unwrap()
}

#[test]
fn room_ids_are_five_hex_chars() {
    let rooms = Rooms::new();
    let (host, _rx) = socket("host");
    let id = rooms.create_room(host, None);
    assert_eq!(id.len(), 5);
    assert!(id.chars().all(|ch| ch.is_ascii_hexdigit()));
    assert!(rooms.get(&id).is_some());
}

#[test]
fn default_and_custom_time_controls() {
    let (host, _rx) = socket("host");
    let room = Room::new("00abc".to_string(), host, None);
    assert_eq!(room.clocks, [600_000, 600_000]);

    let (host2, _rx2) = socket("host2");
    let short = Room::new("00abd".to_string(), host2, Some(0.1));
    assert_eq!(short.clocks, [6_000, 6_000]);
}

#[tokio::test]
async fn join_requires_a_known_room_id() {
    let rooms = Rooms::new();
    let (guest, _rx) = socket("guest");
    assert_eq!(
        rooms.join_room(None, guest.clone()),
        Err(ErrorCode::MissingRoomId)
    );
    assert_eq!(
        rooms.join_room(Some("zzzzz".to_string()), guest),
        Err(ErrorCode::NotFound)
    );
}

#[tokio::test]
async fn second_join_locks_room_and_deals_colors() {
    let rooms = Rooms::new();
    let (host, mut host_rx) = socket("host");
    let (guest, mut guest_rx) = socket("guest");
    let (third, _third_rx) = socket("third");

    let id = rooms.create_room(host, None);
    rooms.join_room(Some(id.clone()), guest).unwrap();
    assert_eq!(
        rooms.join_room(Some(id.clone()), third),
        Err(ErrorCode::RoomLocked)
    );

    let host_messages = drain(&mut host_rx);
    assert!(matches!(
        host_messages[0],
        ServerMessage::PlayerJoined { ref socket_id } if socket_id == "guest"
    ));
    assert!(matches!(
        host_messages[1],
        ServerMessage::GameStart { color: Color::White, .. }
    ));

    let guest_messages = drain(&mut guest_rx);
    assert!(matches!(
        guest_messages[0],
        ServerMessage::GameStart { color: Color::Black, .. }
    ));
}

#[tokio::test]
async fn make_move_acks_then_broadcasts_then_snapshots() {
    let rooms = Rooms::new();
    let (host, mut host_rx) = socket("host");
    let (guest, _guest_rx) = socket("guest");
    let id = rooms.create_room(host, None);
    rooms.join_room(Some(id.clone()), guest).unwrap();
    drain(&mut host_rx);

    rooms
        .make_move(Some(id.clone()), Some(opener_json()), "host")
        .unwrap();

    let messages = drain(&mut host_rx);
    assert!(matches!(
        messages[0],
        ServerMessage::Ack { ok: Some(true), .. }
    ));
    let ServerMessage::MoveMade { ref state, .. } = messages[1] else {
        panic!("expected moveMade after the ack");
    };
    assert_eq!(state.turn, Color::Black);
    assert!(matches!(messages[2], ServerMessage::Clock { .. }));
}

#[tokio::test]
async fn accepted_move_is_rejected_on_resubmission() {
    let rooms = Rooms::new();
    let (host, _host_rx) = socket("host");
    let (guest, _guest_rx) = socket("guest");
    let id = rooms.create_room(host, None);
    rooms.join_room(Some(id.clone()), guest).unwrap();

    let resolved = opener_json();
    rooms
        .make_move(Some(id.clone()), Some(resolved.clone()), "host")
        .unwrap();
    assert_eq!(
        rooms.make_move(Some(id.clone()), Some(resolved), "host"),
        Err(ErrorCode::IllegalMove)
    );
}

#[tokio::test]
async fn make_move_requires_a_locked_room() {
    let rooms = Rooms::new();
    let (host, _host_rx) = socket("host");
    let id = rooms.create_room(host, None);
    assert_eq!(
        rooms.make_move(Some(id), Some(opener_json()), "host"),
        Err(ErrorCode::NotReady)
    );
}

#[tokio::test]
async fn malformed_payloads_are_invalid() {
    let rooms = Rooms::new();
    let (host, _host_rx) = socket("host");
    let (guest, _guest_rx) = socket("guest");
    let id = rooms.create_room(host, None);
    rooms.join_room(Some(id.clone()), guest).unwrap();

    assert_eq!(
        rooms.make_move(Some(id.clone()), None, "host"),
        Err(ErrorCode::InvalidPayload)
    );
    assert_eq!(
        rooms.make_move(
            Some(id),
            Some(serde_json::json!({"from": "Z9"})),
            "host"
        ),
        Err(ErrorCode::InvalidPayload)
    );
}

#[tokio::test]
async fn payload_shape_is_checked_before_room_state() {
    let rooms = Rooms::new();
    let (host, _host_rx) = socket("host");
    let id = rooms.create_room(host, None);

    // The room is not locked yet; a malformed payload still reports
    // invalid-payload, not not-ready.
    assert_eq!(
        rooms.make_move(Some(id.clone()), None, "host"),
        Err(ErrorCode::InvalidPayload)
    );
    assert_eq!(
        rooms.make_move(
            Some(id.clone()),
            Some(serde_json::json!({"from": "Z9"})),
            "host"
        ),
        Err(ErrorCode::InvalidPayload)
    );

    // A well-formed payload against the same unlocked room is what reports
    // not-ready.
    assert_eq!(
        rooms.make_move(Some(id), Some(opener_json()), "host"),
        Err(ErrorCode::NotReady)
    );
}

#[test]
fn flag_fall_ends_the_room_exactly_once() {
    let (host, mut host_rx) = socket("host");
    let (guest, _guest_rx) = socket("guest");
    let mut room = Room::new("00abc".to_string(), host, Some(0.1));
    room.admit(guest).unwrap();
    drain(&mut host_rx);

    // White never moves; seven seconds later the 6-second clock is gone.
    let late = room.last_tick + Duration::from_secs(7);
    room.tick(late);
    assert!(room.terminal);
    assert_eq!(room.clocks[Color::White as usize], 0);

    let messages = drain(&mut host_rx);
    assert!(matches!(messages[0], ServerMessage::Clock { .. }));
    assert!(matches!(
        messages[1],
        ServerMessage::GameEnd {
            result: EndResult::Timeout,
            winner: Some("black"),
        }
    ));

    // Terminal rooms tick no further and reject moves.
    room.tick(late + Duration::from_secs(1));
    assert!(drain(&mut host_rx).is_empty());
    assert_eq!(
        room.handle_move("host", Some(opener_json())),
        Err(ErrorCode::GameOver)
    );
    // Even terminal rooms report malformed payloads as such.
    assert_eq!(
        room.handle_move("host", None),
        Err(ErrorCode::InvalidPayload)
    );
}

#[test]
fn checkmate_broadcasts_game_end() {
    let (host, _host_rx) = socket("host");
    let (guest, mut guest_rx) = socket("guest");
    let mut room = Room::new("00abc".to_string(), host, None);
    room.admit(guest).unwrap();
    room.position = Position::from_fen(
        "k7/7Q/1K6/8/8/8/8/8 w - - 0 1",
        PortalConfig::reference(),
    )
    .unwrap();
    drain(&mut guest_rx);

    let mate = legal_moves_from(&room.position, Square::parse("H7").unwrap())
        .iter()
        .find(|mv| mv.to_final == Square::parse("B7").unwrap())
        .copied()
        .unwrap();
    room.handle_move("host", Some(serde_json::to_value(mate).unwrap()))
        .unwrap();

    assert!(room.terminal);
    let messages = drain(&mut guest_rx);
    assert!(messages.iter().any(|message| matches!(
        message,
        ServerMessage::GameEnd {
            result: EndResult::Checkmate,
            winner: Some("white"),
        }
    )));
}

#[tokio::test]
async fn disconnect_unlocks_then_destroys() {
    let rooms = Rooms::new();
    let (host, mut host_rx) = socket("host");
    let (guest, _guest_rx) = socket("guest");
    let id = rooms.create_room(host, None);
    rooms.join_room(Some(id.clone()), guest).unwrap();
    drain(&mut host_rx);

    rooms.disconnect("guest");
    let room = rooms.get(&id).expect("room survives one disconnect");
    assert!(!room.lock().unwrap().locked);
    let messages = drain(&mut host_rx);
    assert!(matches!(
        messages[0],
        ServerMessage::PlayerLeft { ref socket_id } if socket_id == "guest"
    ));

    rooms.disconnect("host");
    assert!(rooms.get(&id).is_none());
    assert!(rooms.is_empty());
}
