//! Error types for Pitchcraft.

use thiserror::Error;

/// Primary error type for all Pitchcraft operations.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("No form data found: {0}")]
    MissingInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to get selling advice (status {status}): {message}")]
    AdviceFetch { status: u16, message: String },

    #[error("Transport error{}: {status_text}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        status_text: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unparseable stream frame: {0}")]
    StreamParse(String),

    #[error("Marketing plan generation failed: {0}")]
    PlanGeneration(#[source] Box<GeneratorError>),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("View was torn down before the operation finished")]
    Cancelled,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

/// Broad error category for logging and banner selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The user supplied nothing, or something unusable.
    Input,
    /// The backend answered with a failure status.
    Upstream,
    /// The connection itself failed or broke mid-stream.
    Transport,
    Timeout,
    /// Configuration, storage and serialization problems on this side.
    Local,
    Cancelled,
}

impl GeneratorError {
    /// Build a transport error from a non-success HTTP status.
    pub fn status(status: reqwest::StatusCode) -> Self {
        Self::Transport {
            status: Some(status.as_u16()),
            status_text: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        }
    }

    /// Wrap a plan-branch failure, leaving already wrapped errors alone.
    pub fn plan(source: GeneratorError) -> Self {
        match source {
            err @ (Self::PlanGeneration(_) | Self::Cancelled) => err,
            other => Self::PlanGeneration(Box::new(other)),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingInput(_) | Self::InvalidInput(_) => ErrorCategory::Input,
            Self::AdviceFetch { .. } => ErrorCategory::Upstream,
            Self::Transport { status: Some(_), .. } => ErrorCategory::Upstream,
            Self::Transport { status: None, .. } | Self::Network(_) => ErrorCategory::Transport,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::PlanGeneration(inner) => inner.category(),
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Io(_)
            | Self::Serialization(_)
            | Self::StreamParse(_)
            | Self::Configuration(_)
            | Self::Storage(_) => ErrorCategory::Local,
        }
    }

    /// Banner text shown to the user. There is no automatic retry, so every
    /// message tells the user to submit the form again.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingInput(_) => "No form data found. Please submit the form again.".to_string(),
            Self::AdviceFetch { .. } => {
                "Failed to get selling advice. Please submit the form again.".to_string()
            }
            Self::Timeout(_) => {
                "The marketing service took too long to respond. Please submit the form again."
                    .to_string()
            }
            other => format!("{other}. Please submit the form again."),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GeneratorError>;
