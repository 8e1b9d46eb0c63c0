use crate::config::ConfigError;
use crate::offline::{ArtifactError, PredictError};
use crate::screening::oracle::OracleError;
use crate::telemetry::TelemetryError;
use crate::transcript::TranscriptError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Oracle(OracleError),
    Artifacts(ArtifactError),
    Prediction(PredictError),
    Transcript(TranscriptError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Oracle(err) => write!(f, "oracle error: {}", err),
            AppError::Artifacts(err) => write!(f, "model artifact error: {}", err),
            AppError::Prediction(err) => write!(f, "prediction error: {}", err),
            AppError::Transcript(err) => write!(f, "transcript error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Oracle(err) => Some(err),
            AppError::Artifacts(err) => Some(err),
            AppError::Prediction(err) => Some(err),
            AppError::Transcript(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Prediction(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Oracle(_)
            | AppError::Artifacts(_)
            | AppError::Transcript(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<OracleError> for AppError {
    fn from(value: OracleError) -> Self {
        Self::Oracle(value)
    }
}

impl From<ArtifactError> for AppError {
    fn from(value: ArtifactError) -> Self {
        Self::Artifacts(value)
    }
}

impl From<PredictError> for AppError {
    fn from(value: PredictError) -> Self {
        Self::Prediction(value)
    }
}

impl From<TranscriptError> for AppError {
    fn from(value: TranscriptError) -> Self {
        Self::Transcript(value)
    }
}
