//! # Failure Module
//!
//! The flat failure taxonomy shown to the user.
//!
//! Every operation is attempted once. Its outcome is either the success value
//! or exactly one [`Failure`]:
//!
//! - `Validation`: rejected on the client, no request was sent
//! - `Backend`: the request failed; the backend's `detail` text verbatim, or a
//!   per-operation fallback when there is none
//! - `Quota`: HTTP 429, or a `detail` that mentions "quota"

use serde_json::Value;
use std::fmt;

/// HTTP status the backend uses for rate limiting.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Message shown for every quota failure.
pub const QUOTA_MESSAGE: &str = "Out of Message Quota - Please try again later";

/// Fallback messages used when the backend sends no `detail`.
pub mod fallback {
    pub const SIGNUP: &str = "Signup failed";
    pub const LOGIN: &str = "Login failed";
    pub const PROFILE: &str = "Failed to fetch profile";
    pub const STATUS: &str = "Failed to fetch status";
    pub const CHAT: &str = "Failed to get response";
    pub const PDF_UPLOAD: &str = "Failed to upload PDF files";
    pub const TEXT2SQL: &str = "Failed to process query";
    pub const CSV_UPLOAD: &str = "Failed to upload CSV file";
}

/// A user-facing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Rejected before any request was sent.
    Validation(String),
    /// Network or backend failure.
    Backend(String),
    /// Rate-limit or usage-quota exhaustion.
    Quota,
}

impl Failure {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify a failed request.
    ///
    /// `status` is `None` when no response arrived at all.
    #[must_use]
    pub fn classify(status: Option<u16>, detail: Option<&str>, fallback: &str) -> Self {
        if status == Some(TOO_MANY_REQUESTS) || detail.is_some_and(|d| d.contains("quota")) {
            return Self::Quota;
        }
        match detail {
            Some(d) if !d.is_empty() => Self::Backend(d.to_string()),
            _ => Self::Backend(fallback.to_string()),
        }
    }

    /// Text shown to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::Backend(m) => m,
            Self::Quota => QUOTA_MESSAGE,
        }
    }

    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::Quota)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Failure {}

/// Extract the `detail` text from an error body.
///
/// FastAPI sends a string for raised errors and an array of objects for
/// request validation errors; anything that is not a string is rendered as
/// compact JSON.
#[must_use]
pub fn detail_text(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
