//! SSE transport: `GET /sse` opens the server-to-client event stream,
//! `POST /messages?sessionId=...` carries client-to-server messages.
//!
//! Each stream gets a fresh session id; the first event (`endpoint`)
//! tells the client where to POST, and every response then rides the
//! stream as a `message` event. Sessions are cleaned up lazily: once
//! the stream is dropped the next send fails and the entry is removed.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::Router;
use futures::stream::Stream;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::server::McpServer;

struct SseState {
    server: McpServer,
    sessions: Mutex<HashMap<String, mpsc::UnboundedSender<String>>>,
}

/// Serve MCP over SSE on `bind_addr`.
pub async fn run_sse(server: McpServer, bind_addr: &str) -> anyhow::Result<()> {
    let state = Arc::new(SseState {
        server,
        sessions: Mutex::new(HashMap::new()),
    });

    let app = Router::new()
        .route("/sse", get(sse_handler))
        .route("/messages", post(messages_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = bind_addr, "mcp server ready on sse");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn sse_handler(
    State(state): State<Arc<SseState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    state
        .sessions
        .lock()
        .await
        .insert(session_id.clone(), tx);
    info!(session = %session_id, "sse session opened");

    let endpoint = format!("/messages?sessionId={session_id}");
    let first = futures::stream::once(async move {
        Ok(Event::default().event("endpoint").data(endpoint))
    });
    let responses = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|msg| (Ok(Event::default().event("message").data(msg)), rx))
    });

    Sse::new(first.chain(responses)).keep_alive(KeepAlive::default())
}

#[derive(Deserialize)]
struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

async fn messages_handler(
    State(state): State<Arc<SseState>>,
    Query(query): Query<SessionQuery>,
    body: String,
) -> StatusCode {
    let tx = {
        let sessions = state.sessions.lock().await;
        sessions.get(&query.session_id).cloned()
    };
    let Some(tx) = tx else {
        warn!(session = %query.session_id, "message for unknown session");
        return StatusCode::NOT_FOUND;
    };

    if let Some(response) = state.server.handle_message(&body).await {
        if tx.send(response).is_err() {
            // Stream is gone; drop the session.
            debug!(session = %query.session_id, "sse session closed");
            state.sessions.lock().await.remove(&query.session_id);
            return StatusCode::NOT_FOUND;
        }
    }
    StatusCode::ACCEPTED
}
