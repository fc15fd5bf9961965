//! # Configuration
//!
//! Resolution order for every setting: command-line flag, then environment
//! variable, then built-in default.
//!
//! | Setting      | Flag          | Environment          | Default                              |
//! |--------------|---------------|----------------------|--------------------------------------|
//! | Backend URL  | `--api-url`   | `CLAIMDESK_API_URL`  | `http://localhost:8000`              |
//! | Session file | `--session`   | `CLAIMDESK_SESSION`  | `<data dir>/claimdesk/session.redb`  |
//! | No storage   | `--ephemeral` |                      | off                                  |

use claimdesk_core::{KeyValueStore, MemoryStore, RedbStore, StoreError};
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const SESSION_FILE: &str = "session.redb";

/// Configuration flags shared by every command.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Backend base URL
    #[arg(long, env = "CLAIMDESK_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Session database path
    #[arg(long, env = "CLAIMDESK_SESSION", global = true)]
    pub session: Option<PathBuf>,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    /// `None` when the session is not persisted.
    pub session_path: Option<PathBuf>,
}

impl Config {
    #[must_use]
    pub fn resolve(args: &ConfigArgs) -> Self {
        let session_path = if args.ephemeral {
            None
        } else {
            Some(args.session.clone().unwrap_or_else(default_session_path))
        };
        Self {
            api_url: args.api_url.clone(),
            session_path,
        }
    }

    /// Open the session store this configuration points at.
    pub fn open_store(&self) -> Result<SessionStore, StoreError> {
        match &self.session_path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "opening session store");
                Ok(SessionStore::Disk(RedbStore::open(path)?))
            }
            None => Ok(SessionStore::Memory(MemoryStore::new())),
        }
    }
}

/// `<data dir>/claimdesk/session.redb`, or the working directory when the
/// platform has no data dir.
#[must_use]
pub fn default_session_path() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("claimdesk").join(SESSION_FILE),
        None => PathBuf::from(".claimdesk").join(SESSION_FILE),
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

/// The store selected by configuration.
#[derive(Debug)]
pub enum SessionStore {
    Memory(MemoryStore),
    Disk(RedbStore),
}

impl KeyValueStore for SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Memory(s) => s.get(key),
            Self::Disk(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.set(key, value),
            Self::Disk(s) => s.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.remove(key),
            Self::Disk(s) => s.remove(key),
        }
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.set_many(entries),
            Self::Disk(s) => s.set_many(entries),
        }
    }

    fn remove_many(&mut self, keys: &[&str]) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.remove_many(keys),
            Self::Disk(s) => s.remove_many(keys),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
