use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::{ScreeningService, SessionError, SessionStore, SessionToken};

/// Router builder exposing the conversational endpoints.
pub fn screening_router<S>(service: Arc<ScreeningService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route("/start", post(start_handler::<S>))
        .route("/answer", post(answer_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct StartResponse {
    bot_greeting: &'static str,
    session: String,
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    #[serde(default)]
    session: Option<String>,
    #[serde(default)]
    reply: Option<String>,
}

async fn start_handler<S>(State(service): State<Arc<ScreeningService<S>>>) -> Response
where
    S: SessionStore + 'static,
{
    match service.start() {
        Ok((token, greeting)) => Json(StartResponse {
            bot_greeting: greeting,
            session: token.0,
        })
        .into_response(),
        Err(err) => internal_error(err),
    }
}

async fn answer_handler<S>(
    State(service): State<Arc<ScreeningService<S>>>,
    Json(request): Json<AnswerRequest>,
) -> Response
where
    S: SessionStore + 'static,
{
    let reply = request.reply.as_deref().map(str::trim).unwrap_or_default();
    if reply.is_empty() {
        return caller_error("missing 'reply' in JSON body");
    }

    let Some(session) = request.session.filter(|token| !token.is_empty()) else {
        return caller_error("session not initialized. Call /start first.");
    };
    let token = SessionToken(session);

    match service.submit_answer(&token, reply).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err @ (SessionError::NotInitialized | SessionError::AlreadyCompleted)) => {
            caller_error(&err.to_string())
        }
        Err(err) => internal_error(err),
    }
}

fn caller_error(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    error!(error = %err, "screening request failed unexpectedly");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
        .into_response()
}
