use axum::{
    body::Body,
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::chat::{ChatError, ChatRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> { Router::new().route("/chat", post(chat)) }

/// Relay the gateway's server-sent events to the caller.
async fn chat(State(s): State<AppState>, Json(r): Json<ChatRequest>) -> Result<Response, ChatError> {
    let stream = s.chat.stream(r.messages).await?;
    Ok(([(CONTENT_TYPE, "text/event-stream")], Body::from_stream(stream)).into_response())
}
