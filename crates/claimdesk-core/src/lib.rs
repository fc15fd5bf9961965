//! # ClaimDesk Core
//!
//! The network-free half of the ClaimDesk client.
//!
//! ClaimDesk talks to a document-chat and claims-analytics backend. Every piece
//! of real work happens on that backend; this crate holds what the client owns:
//!
//! - [`session`]: the signed-in identity and the administrator guard
//! - [`storage`]: the durable key-value store the session record lives in
//! - [`failure`]: the flat failure taxonomy shown to the user
//! - [`validate`]: checks that reject input before any request is sent
//! - [`api`]: request and response bodies shared with the SDK
//! - [`views`]: sans-IO view state for each screen of the client
//!
//! ## Sans-IO Views
//!
//! ```text
//! ┌──────────────┐  begin_*()  ┌──────────────┐   HTTP    ┌──────────────┐
//! │ View (core)  │ ──────────► │ Driver (app) │ ────────► │   Backend    │
//! │              │ ◄────────── │              │ ◄──────── │              │
//! └──────────────┘ complete()  └──────────────┘           └──────────────┘
//!                  / fail()
//! ```
//!
//! A view never performs a request itself. It validates, hands the caller the
//! body to send, and folds the outcome back into renderable state.

pub mod api;
pub mod failure;
pub mod session;
pub mod storage;
pub mod validate;
pub mod views;

pub use failure::Failure;
pub use session::{CurrentUser, Role, SessionRecord, UserId, UserProfile};
pub use storage::{KeyValueStore, MemoryStore, RedbStore, StoreError};
pub use validate::SelectedFile;
