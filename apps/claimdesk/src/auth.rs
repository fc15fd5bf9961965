//! # Auth Context
//!
//! The explicit session object passed to every command.
//!
//! The context owns the durable store and the HTTP client. The in-memory
//! user and the stored record change together:
//!
//! | Event                             | Store          | Memory         |
//! |-----------------------------------|----------------|----------------|
//! | `login`, token-granting `signup`  | record written | user set       |
//! | `logout`                          | record cleared | user cleared   |
//! | `initialize`, `/me` fails         | record cleared | user cleared   |
//! | `initialize`, `/me` succeeds      | unchanged      | user + profile |

use crate::error::AppError;
use claimdesk_core::failure::fallback;
use claimdesk_core::storage::{clear_record, load_record, save_record};
use claimdesk_core::validate::require_text;
use claimdesk_core::views::Route;
use claimdesk_core::{CurrentUser, KeyValueStore, SessionRecord, StoreError};
use claimdesk_sdk::ClaimdeskClient;

/// Result of a signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupOutcome {
    /// Backend confirmation text, if any.
    pub message: Option<String>,
    /// Whether the backend issued a token and the user is now signed in.
    pub signed_in: bool,
}

/// Session context: store, client and current user.
#[derive(Debug)]
pub struct AuthContext<S: KeyValueStore> {
    store: S,
    anonymous: ClaimdeskClient,
    client: ClaimdeskClient,
    user: Option<CurrentUser>,
    initializing: bool,
}

impl<S: KeyValueStore> AuthContext<S> {
    /// A context that has not restored its session yet.
    pub fn new(store: S, client: ClaimdeskClient) -> Self {
        let anonymous = client.without_token();
        Self {
            store,
            anonymous: anonymous.clone(),
            client: anonymous,
            user: None,
            initializing: true,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// The signed-in user, or [`AppError::NotSignedIn`].
    pub fn require_user(&self) -> Result<&CurrentUser, AppError> {
        self.user.as_ref().ok_or(AppError::NotSignedIn)
    }

    /// Client carrying the current bearer token, if any.
    #[must_use]
    pub fn client(&self) -> &ClaimdeskClient {
        &self.client
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn route(&self) -> Route {
        Route::resolve(self.initializing, self.user.as_ref())
    }

    /// Restore the stored session and validate it against `/me`.
    ///
    /// A stored token the backend rejects, or a failed fetch, clears the
    /// session silently. Only store failures are returned, and the context
    /// leaves the loading state either way.
    pub async fn initialize(&mut self) -> Result<Option<&CurrentUser>, StoreError> {
        self.initializing = true;
        let restored = self.restore().await;
        self.initializing = false;
        restored?;
        Ok(self.user.as_ref())
    }

    async fn restore(&mut self) -> Result<(), StoreError> {
        let Some(record) = load_record(&self.store)? else {
            tracing::debug!("no stored session");
            self.set_signed_out();
            return Ok(());
        };

        let client = match self.anonymous.with_token(&record.token) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "stored token unusable, clearing session");
                self.set_signed_out();
                return clear_record(&mut self.store);
            }
        };

        match client.me().await {
            Ok(profile) => {
                tracing::debug!(user_id = %record.user_id, "session restored");
                self.user = Some(CurrentUser::with_profile(record, profile));
                self.client = client;
                Ok(())
            }
            Err(e) => {
                let failure = e.failure(fallback::PROFILE);
                tracing::debug!(error = %failure, "stored token rejected, clearing session");
                self.set_signed_out();
                clear_record(&mut self.store)
            }
        }
    }

    /// Sign in with email and password.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&CurrentUser, AppError> {
        self.initializing = false;
        let email = require_text("Email", email)?;
        // Passwords are sent exactly as typed.
        require_text("Password", password)?;

        let resp = self
            .anonymous
            .login(email, password)
            .await
            .map_err(|e| e.failure(fallback::LOGIN))?;
        tracing::info!(user_id = %resp.user_id, role = %resp.role, "signed in");
        self.establish(resp.session())
    }

    /// Create an account. Signs in when the backend issues a token.
    pub async fn signup(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupOutcome, AppError> {
        self.initializing = false;
        let username = require_text("Username", username)?;
        let email = require_text("Email", email)?;
        require_text("Password", password)?;

        let resp = self
            .anonymous
            .signup(username, email, password)
            .await
            .map_err(|e| e.failure(fallback::SIGNUP))?;

        let signed_in = match resp.session() {
            Some(record) => {
                self.establish(record)?;
                true
            }
            None => false,
        };
        Ok(SignupOutcome {
            message: resp.message,
            signed_in,
        })
    }

    /// Clear the session from storage and memory.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.initializing = false;
        clear_record(&mut self.store)?;
        self.set_signed_out();
        tracing::info!("signed out");
        Ok(())
    }

    fn establish(&mut self, record: SessionRecord) -> Result<&CurrentUser, AppError> {
        let client = self
            .anonymous
            .with_token(&record.token)
            .map_err(|e| e.failure(fallback::LOGIN))?;
        save_record(&mut self.store, &record)?;
        self.client = client;
        Ok(self.user.insert(CurrentUser::from_record(record)))
    }

    fn set_signed_out(&mut self) {
        self.user = None;
        self.client = self.anonymous.clone();
        self.initializing = false;
    }
}
