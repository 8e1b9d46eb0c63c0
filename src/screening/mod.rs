//! Conversational PHQ-9 screening: oracle-backed score mapping, empathetic
//! turn generation, and the session state machine.

pub mod empathy;
pub mod items;
pub mod mapper;
pub mod oracle;
pub mod prompts;
pub mod scorer;
pub mod session;

pub use mapper::{MappedAnswer, RiskSignal, ScoreMapper};
pub use session::{ScreeningService, TurnOutcome};
