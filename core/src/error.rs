use thiserror::Error;

use crate::types::AgentId;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Agent {agent_id} not found")]
    AgentNotFound { agent_id: AgentId },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
