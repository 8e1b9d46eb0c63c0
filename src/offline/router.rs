use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::pipeline::{OfflinePipeline, TOP_K_DEFAULT};

/// Router builder for the batch prediction endpoint. Only mounted when an
/// artifact bundle is configured.
pub fn predict_router(pipeline: Arc<OfflinePipeline>) -> Router {
    Router::new()
        .route("/api/predict", post(predict_handler))
        .with_state(pipeline)
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    #[serde(default)]
    answers: Vec<Option<String>>,
    #[serde(default)]
    top_k: Option<usize>,
}

async fn predict_handler(
    State(pipeline): State<Arc<OfflinePipeline>>,
    Json(request): Json<PredictRequest>,
) -> Response {
    // JSON nulls count as submitted-but-empty answers.
    let answers: Vec<String> = request
        .answers
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    let top_k = request.top_k.unwrap_or(TOP_K_DEFAULT);

    match pipeline.predict_from_answers(&answers, top_k, false) {
        Ok(result) => {
            info!(
                label = %result.label,
                q9_flag = result.q9_suicidal_flag,
                "offline prediction served"
            );
            Json(json!({ "success": true, "result": result })).into_response()
        }
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": err.to_string() })),
        )
            .into_response(),
    }
}
