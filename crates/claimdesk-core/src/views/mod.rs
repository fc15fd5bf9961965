//! # Views Module
//!
//! Sans-IO state for each screen of the client.
//!
//! Views live only as long as the dashboard that owns them. Nothing here is
//! persisted: messages, selected files and query results are dropped with the
//! view.

pub mod chat;
pub mod csv_upload;
pub mod dashboard;
pub mod text2sql;
pub mod upload;

pub use chat::{ChatMessage, ChatView, Sender};
pub use csv_upload::{CsvUploadRequest, CsvUploadView, TargetTable};
pub use dashboard::{Dashboard, Route, Tab};
pub use text2sql::Text2SqlView;
pub use upload::PdfUploadView;

use crate::failure::Failure;

/// Kind of an upload status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

/// Status line shown under an upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Loading,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_failure(failure: &Failure) -> Self {
        Self::error(failure.message())
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }

    /// One-line rendering with a kind marker.
    #[must_use]
    pub fn to_line(&self) -> String {
        let marker = match self.kind {
            StatusKind::Loading => "…",
            StatusKind::Success => "✓",
            StatusKind::Error => "✗",
        };
        format!("{} {}", marker, self.message)
    }
}
