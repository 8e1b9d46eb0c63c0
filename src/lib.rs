pub mod config;
pub mod error;
pub mod offline;
pub mod screening;
pub mod telemetry;
pub mod transcript;
