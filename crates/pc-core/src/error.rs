use crate::types::StageKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("{stage} backend unavailable: {reason}")]
    BackendUnavailable { stage: StageKind, reason: String },
    #[error("{stage} backend call failed: {source}")]
    BackendCallFailed {
        stage: StageKind,
        #[source]
        source: anyhow::Error,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CompressError {
    pub fn unavailable(stage: StageKind, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable { stage, reason: reason.into() }
    }

    pub fn call_failed(stage: StageKind, source: anyhow::Error) -> Self {
        Self::BackendCallFailed { stage, source }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// The stage a backend error originated from, if any.
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            Self::BackendUnavailable { stage, .. } | Self::BackendCallFailed { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompressError>;
