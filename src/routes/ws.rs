//! WebSocket endpoint: one connection per (client, family).
//!
//! The socket is subscribe-only. Events originate from the mutation services
//! after commit; anything the client sends upstream is ignored except close,
//! which tears the subscription down.

use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    services::family_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{family_id}", get(ws_upgrade))
}

#[utoipa::path(get, path = "/ws/{family_id}", tag = "WebSocket")]
pub async fn ws_upgrade(
    State(state): State<AppState>,
    user: AuthUser,
    Path(family_id): Path<Uuid>,
    upgrade: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    family_service::ensure_member(&state.orm, family_id, user.user_id).await?;
    Ok(upgrade.on_upgrade(move |socket| handle_socket(socket, state, family_id)))
}

async fn handle_socket(socket: WebSocket, state: AppState, family_id: Uuid) {
    let (conn_id, mut events) = state.ws.register(family_id);
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(payload) = event else { break };
                if sink.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Pings are answered by axum; everything else is ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.ws.deregister(family_id, conn_id);
}
