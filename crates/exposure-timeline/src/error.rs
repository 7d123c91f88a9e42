//! Error types for timeline construction and query batches.

use exposure_model::ModelError;
use thiserror::Error;

/// Errors raised while building timelines or answering query batches.
///
/// Indices are zero-based positions in the caller's input sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("event {index} is invalid: {source}")]
    InvalidEvent {
        index: usize,
        #[source]
        source: ModelError,
    },

    #[error("query {index} is invalid: {source}")]
    InvalidQuery {
        index: usize,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl TimelineError {
    /// Position of the offending input, if the error is tied to one.
    pub fn index(&self) -> Option<usize> {
        match self {
            TimelineError::InvalidEvent { index, .. } | TimelineError::InvalidQuery { index, .. } => {
                Some(*index)
            }
            TimelineError::Model(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TimelineError>;
