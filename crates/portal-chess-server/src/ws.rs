use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::protocol::{ClientMessage, ErrorCode, ServerMessage};
use crate::room::{new_socket_id, Rooms, SocketHandle};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(rooms): State<Arc<Rooms>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, rooms))
}

async fn handle_socket(socket: WebSocket, rooms: Arc<Rooms>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let socket_id = new_socket_id();

    // Writer task: drains the outbound queue onto the socket. Room handlers
    // and tickers only ever touch the queue, never the socket.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&message) else {
                continue;
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = receiver.next().await {
        let text = match message {
            Message::Text(text) => text.to_string(),
            Message::Close(_) => break,
            _ => continue,
        };

        match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::CreateRoom { time_minutes }) => {
                let handle = SocketHandle {
                    id: socket_id.clone(),
                    tx: tx.clone(),
                };
                let room_id = rooms.create_room(handle, time_minutes);
                let _ = tx.send(ServerMessage::ack_room(room_id));
            }
            Ok(ClientMessage::JoinRoom { room_id }) => {
                let handle = SocketHandle {
                    id: socket_id.clone(),
                    tx: tx.clone(),
                };
                let ack = match rooms.join_room(room_id, handle) {
                    Ok(()) => ServerMessage::ack_ok(),
                    Err(code) => ServerMessage::ack_error(code),
                };
                let _ = tx.send(ack);
            }
            Ok(ClientMessage::MakeMove { room_id, resolved }) => {
                // The ok-acknowledgement is emitted inside the room so it
                // precedes the moveMade broadcast on this socket.
                if let Err(code) = rooms.make_move(room_id, resolved, &socket_id) {
                    let _ = tx.send(ServerMessage::ack_error(code));
                }
            }
            Err(_) => {
                let _ = tx.send(ServerMessage::ack_error(ErrorCode::InvalidPayload));
            }
        }
    }

    rooms.disconnect(&socket_id);
    writer.abort();
}
