use axum::{routing::get, Router};

use portal_chess_server::room::Rooms;
use portal_chess_server::ws::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(3000);

    let rooms = Rooms::new();
    let app = Router::new().route("/ws", get(ws_handler)).with_state(rooms);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    eprintln!("portal-chess server listening on port {port}");
    axum::serve(listener, app).await?;
    Ok(())
}
