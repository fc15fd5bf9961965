//! # Session Module
//!
//! The authenticated identity held for the lifetime of the client.
//!
//! A [`SessionRecord`] is what gets persisted (token, user id, role). A
//! [`CurrentUser`] is the in-memory value: the record plus the profile the
//! backend returned for it, if any.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// =============================================================================
// ROLE
// =============================================================================

/// Role of the signed-in user.
///
/// Serialized as the backend's wire text (`ADMIN`, `USER`). Unknown role text
/// is kept verbatim and treated as non-administrator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    #[default]
    User,
    Other(String),
}

impl Role {
    /// Whether this role may ingest CSV data.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Wire text for this role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ADMIN" => Self::Admin,
            "USER" => Self::User,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// USER ID
// =============================================================================

/// Opaque user identifier.
///
/// The backend sends either a number or a string; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// SESSION RECORD
// =============================================================================

/// The persisted identity: bearer token, user id and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: UserId,
    pub role: Role,
}

impl SessionRecord {
    pub fn new(token: impl Into<String>, user_id: UserId, role: Role) -> Self {
        Self {
            token: token.into(),
            user_id,
            role,
        }
    }
}

/// User record returned by `GET /me`.
///
/// Every field is optional so that a sparse record still validates the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

// =============================================================================
// CURRENT USER
// =============================================================================

/// The in-memory signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub record: SessionRecord,
    pub profile: Option<UserProfile>,
}

impl CurrentUser {
    /// A user known only from the login response.
    #[must_use]
    pub fn from_record(record: SessionRecord) -> Self {
        Self {
            record,
            profile: None,
        }
    }

    /// A user whose token was validated against `/me`.
    #[must_use]
    pub fn with_profile(record: SessionRecord, profile: UserProfile) -> Self {
        Self {
            record,
            profile: Some(profile),
        }
    }

    /// Profile role when the backend reported one, else the stored role.
    #[must_use]
    pub fn role(&self) -> &Role {
        self.profile
            .as_ref()
            .and_then(|p| p.role.as_ref())
            .unwrap_or(&self.record.role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }

    /// Name shown in the dashboard header.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.profile
            .as_ref()
            .and_then(|p| p.username.clone().or_else(|| p.email.clone()))
            .unwrap_or_else(|| format!("user {}", self.record.user_id))
    }
}

// =============================================================================
// TESTS
// =============================================================================
