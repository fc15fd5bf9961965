//! # API Module
//!
//! Request and response bodies of the ClaimDesk backend.
//!
//! ```text
//! POST /signup      SignupRequest        -> SignupResponse
//! POST /login       LoginRequest         -> LoginResponse
//! GET  /me                               -> UserProfile
//! POST /upload      multipart "files"    -> UploadResponse
//! POST /chat        ChatRequest          -> ChatResponse
//! GET  /status                           -> StatusResponse
//! POST /text2sql    Text2SqlRequest      -> Text2SqlResponse
//! POST /upload-csv  multipart "file",
//!                   "table_name"         -> CsvUploadResponse
//! ```

use crate::session::{Role, SessionRecord, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A result row: column name to value, in backend order.
pub type Row = Map<String, Value>;

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Signup response.
///
/// Some deployments sign the new user in immediately and return the same
/// fields as login; others only confirm creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SignupResponse {
    /// The session this signup grants, if the backend issued a token.
    #[must_use]
    pub fn session(&self) -> Option<SessionRecord> {
        let token = self.access_token.as_ref().filter(|t| !t.is_empty())?;
        Some(SessionRecord::new(
            token.clone(),
            self.user_id.clone().unwrap_or_default(),
            self.role.clone().unwrap_or_default(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: UserId,
    pub role: Role,
}

impl LoginResponse {
    #[must_use]
    pub fn session(&self) -> SessionRecord {
        SessionRecord::new(
            self.access_token.clone(),
            self.user_id.clone(),
            self.role.clone(),
        )
    }
}

// =============================================================================
// DOCUMENTS AND CHAT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub chunks_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Backend health and content counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub database_connected: bool,
    #[serde(default)]
    pub document_chunks: Option<u64>,
    #[serde(default)]
    pub chat_history_entries: Option<u64>,
    #[serde(default)]
    pub api_key_configured: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Database: {}\n",
            if self.database_connected {
                "connected"
            } else {
                "disconnected"
            }
        ));
        if let Some(n) = self.document_chunks {
            out.push_str(&format!("Document chunks: {}\n", n));
        }
        if let Some(n) = self.chat_history_entries {
            out.push_str(&format!("Chat history entries: {}\n", n));
        }
        out.push_str(&format!(
            "API key configured: {}\n",
            if self.api_key_configured { "yes" } else { "no" }
        ));
        if let Some(err) = &self.error {
            out.push_str(&format!("Error: {}\n", err));
        }
        out
    }
}

// =============================================================================
// ANALYTICS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text2SqlRequest {
    pub question: String,
    pub top_k: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text2SqlResponse {
    #[serde(default)]
    pub sql_query: String,
    #[serde(default)]
    pub results: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvUploadResponse {
    pub message: String,
}

// =============================================================================
// TESTS
// =============================================================================
