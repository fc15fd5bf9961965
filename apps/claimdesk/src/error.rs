//! Application error type.

use claimdesk_core::{Failure, StoreError};
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum AppError {
    /// A user-facing failure from validation or the backend.
    #[error("{0}")]
    Failure(#[from] Failure),

    /// The session store failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Terminal or file IO failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The command needs a signed-in user.
    #[error("Not signed in. Run `claimdesk login` first.")]
    NotSignedIn,
}

impl AppError {
    /// The failure, when this error is one.
    #[must_use]
    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Self::Failure(f) => Some(f),
            _ => None,
        }
    }
}
