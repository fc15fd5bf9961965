//! # ClaimDesk SDK - The Kit
//!
//! Typed HTTP client for the ClaimDesk backend.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use claimdesk_sdk::ClaimdeskClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), claimdesk_sdk::Error> {
//!     let client = ClaimdeskClient::new("http://localhost:8000");
//!
//!     let login = client.login("ada@example.com", "secret").await?;
//!     let client = client.with_token(&login.access_token)?;
//!
//!     let reply = client.chat("What does the policy cover?").await?;
//!     println!("{}", reply.answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Endpoints
//!
//! ```text
//! ┌─────────────────────┐          HTTP           ┌─────────────────────┐
//! │   ClaimDesk app     │ ◄───────────────────►   │   Backend service   │
//! │                     │  POST /signup /login    │                     │
//! │  ┌───────────────┐  │  GET  /me /status       │  auth, embeddings,  │
//! │  │ claimdesk-sdk │  │  POST /upload /chat     │  chat, text-to-SQL, │
//! │  └───────────────┘  │  POST /text2sql         │  CSV ingestion      │
//! └─────────────────────┘  POST /upload-csv       └─────────────────────┘
//! ```

use claimdesk_core::api::{
    ChatRequest, ChatResponse, CsvUploadResponse, LoginRequest, LoginResponse, SignupRequest,
    SignupResponse, StatusResponse, Text2SqlRequest, Text2SqlResponse, UploadResponse,
};
use claimdesk_core::failure::{Failure, detail_text};
use claimdesk_core::views::TargetTable;
use claimdesk_core::{SelectedFile, UserProfile};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

pub use claimdesk_core;

/// Request timeout applied to every call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors from the ClaimDesk SDK.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a usable response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered with a non-success status.
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    /// The token cannot be sent as a header value.
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl Error {
    /// HTTP status, when a response arrived.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Json(_) | Self::InvalidToken(_) => None,
        }
    }

    /// Map into the user-facing taxonomy, using `fallback` when the backend
    /// gave no detail.
    #[must_use]
    pub fn failure(&self, fallback: &str) -> Failure {
        match self {
            Self::Api { status, detail } => {
                Failure::classify(Some(*status), detail.as_deref(), fallback)
            }
            Self::InvalidToken(msg) => Failure::validation(msg.clone()),
            Self::Http(_) | Self::Json(_) => Failure::classify(self.status(), None, fallback),
        }
    }
}

// =============================================================================
// UPLOAD FILE
// =============================================================================

/// A file ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Pair a selected file with the bytes read from it.
    #[must_use]
    pub fn from_selected(file: &SelectedFile, bytes: Vec<u8>) -> Self {
        Self::new(file.name.clone(), file.content_type.clone(), bytes)
    }

    fn into_part(self) -> Result<Part, Error> {
        let part = Part::bytes(self.bytes)
            .file_name(self.name)
            .mime_str(&self.content_type)?;
        Ok(part)
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for the ClaimDesk backend.
///
/// Cheap to clone. A client built with [`ClaimdeskClient::with_token`] sends
/// `Authorization: Bearer <token>` with every request.
#[derive(Debug, Clone)]
pub struct ClaimdeskClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    authenticated: bool,
}

impl ClaimdeskClient {
    /// Create an unauthenticated client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            client: build_client(reqwest::Client::builder()),
            timeout: REQUEST_TIMEOUT,
            authenticated: false,
        }
    }

    /// The same client with a different per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// A client for the same backend that authenticates with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidToken`] if the token contains invalid header
    /// characters, or [`Error::Http`] if the HTTP client fails to build.
    pub fn with_token(&self, token: &str) -> Result<Self, Error> {
        use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| Error::InvalidToken(format!("Invalid token header: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url: self.base_url.clone(),
            client,
            timeout: self.timeout,
            authenticated: true,
        })
    }

    /// A client for the same backend without credentials.
    #[must_use]
    pub fn without_token(&self) -> Self {
        Self::new(self.base_url.clone()).with_timeout(self.timeout)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).timeout(self.timeout)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).timeout(self.timeout)
    }

    /// Register a new account.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupResponse, Error> {
        let body = SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        tracing::debug!(endpoint = "/signup", "sending request");
        let resp = self.post("/signup").json(&body).send().await?;
        read_json(resp).await
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, Error> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        tracing::debug!(endpoint = "/login", "sending request");
        let resp = self.post("/login").json(&body).send().await?;
        read_json(resp).await
    }

    /// Fetch the profile of the token's owner.
    pub async fn me(&self) -> Result<UserProfile, Error> {
        tracing::debug!(endpoint = "/me", "sending request");
        let resp = self.get("/me").send().await?;
        read_json(resp).await
    }

    /// Backend health and counters.
    pub async fn status(&self) -> Result<StatusResponse, Error> {
        tracing::debug!(endpoint = "/status", "sending request");
        let resp = self.get("/status").send().await?;
        read_json(resp).await
    }

    /// Upload one or more PDFs, each as a `files` part.
    pub async fn upload_pdfs(&self, files: Vec<UploadFile>) -> Result<UploadResponse, Error> {
        tracing::debug!(endpoint = "/upload", count = files.len(), "sending request");
        let mut form = Form::new();
        for file in files {
            form = form.part("files", file.into_part()?);
        }
        let resp = self.post("/upload").multipart(form).send().await?;
        read_json(resp).await
    }

    /// Ask a question about the uploaded documents.
    pub async fn chat(&self, question: &str) -> Result<ChatResponse, Error> {
        let body = ChatRequest {
            question: question.to_string(),
        };
        tracing::debug!(endpoint = "/chat", "sending request");
        let resp = self.post("/chat").json(&body).send().await?;
        read_json(resp).await
    }

    /// Translate a question into SQL and run it.
    pub async fn text2sql(&self, request: &Text2SqlRequest) -> Result<Text2SqlResponse, Error> {
        tracing::debug!(endpoint = "/text2sql", top_k = request.top_k, "sending request");
        let resp = self.post("/text2sql").json(request).send().await?;
        read_json(resp).await
    }

    /// Ingest a CSV file into one of the claims tables.
    pub async fn upload_csv(
        &self,
        file: UploadFile,
        table: TargetTable,
    ) -> Result<CsvUploadResponse, Error> {
        tracing::debug!(endpoint = "/upload-csv", table = table.as_str(), "sending request");
        let form = Form::new()
            .part("file", file.into_part()?)
            .text("table_name", table.as_str());
        let resp = self.post("/upload-csv").multipart(form).send().await?;
        read_json(resp).await
    }
}

/// Build the shared HTTP client. A builder failure falls back to the default
/// client; the per-request timeout still applies.
fn build_client(builder: reqwest::ClientBuilder) -> reqwest::Client {
    match builder.timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "HTTP client configuration failed, using defaults");
            reqwest::Client::new()
        }
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Decode a success body, or turn an error status into [`Error::Api`].
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let bytes = resp.bytes().await?;
        return Ok(serde_json::from_slice(&bytes)?);
    }

    let body = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| detail_text(&v));
    tracing::debug!(status = status.as_u16(), detail = ?detail, "request failed");
    Err(Error::Api {
        status: status.as_u16(),
        detail,
    })
}
