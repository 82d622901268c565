//! WebSocket upgrade handler and per-connection pump.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

#[derive(Debug, Deserialize)]
pub struct GatewayParams {
    #[serde(default)]
    group_id: Option<String>,
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(params): Query<GatewayParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    // A missing or non-numeric group id still gets a channel; it is never
    // attached and receives nothing.
    let group_id = params
        .group_id
        .as_deref()
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|id| *id > 0);

    ws.on_upgrade(move |socket| handle_connection(socket, state, group_id))
}

async fn handle_connection(socket: WebSocket, state: AppState, group_id: Option<i64>) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (connection, mut pushes) = state.registry.channel();
    let connection_id = connection.id();

    // An unattached handle is parked to keep its queue open; the pump below
    // still runs, the socket just never sees a frame.
    let _parked = match group_id {
        Some(gid) => {
            state.registry.attach(gid, connection);
            tracing::debug!(connection_id, group_id = gid, "live channel attached");
            None
        }
        None => {
            tracing::debug!(connection_id, "live channel accepted without a group");
            Some(connection)
        }
    };

    loop {
        tokio::select! {
            // A broadcast queued a frame for this connection.
            frame = pushes.recv() => {
                match frame {
                    Some(frame) => {
                        if ws_tx.send(Message::Text(frame.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // The channel is receive-only; client frames are drained and
            // dropped, and closure ends the pump.
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        tracing::debug!(?err, connection_id, "ws read error");
                        break;
                    }
                }
            }
        }
    }

    if let Some(gid) = group_id {
        state.registry.detach(gid, connection_id);
        tracing::debug!(connection_id, group_id = gid, "live channel detached");
    }
}
