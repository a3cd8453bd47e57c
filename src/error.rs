//! Error types for the island simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Invalid or unknown species/landscape parameter, or a malformed map.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Seeding into an impassable or out-of-grid cell.
    #[error("placement error: {0}")]
    Placement(String),

    /// Operation attempted before the island exists.
    #[error("state error: {0}")]
    State(String),
}

impl SimError {
    pub fn config(msg: impl Into<String>) -> Self {
        SimError::Configuration(msg.into())
    }

    pub fn placement(msg: impl Into<String>) -> Self {
        SimError::Placement(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        SimError::State(msg.into())
    }
}
