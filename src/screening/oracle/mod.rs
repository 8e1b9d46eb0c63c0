mod gemini;

pub use gemini::GeminiOracle;

use async_trait::async_trait;

/// One blocking round trip to a remote text-generation service.
///
/// Implementations must not retry internally; resilience lives in the
/// callers' fallback paths, not in the transport.
#[async_trait]
pub trait TextOracle: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String, OracleError>;
}

/// Failure of an oracle round trip. Timeouts surface as `Transport`.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("oracle returned HTTP status {status}")]
    Status { status: u16 },
    #[error("oracle returned an empty response")]
    Empty,
}
