//! # ClaimDesk Library
//!
//! This library exposes the ClaimDesk modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod auth;
pub mod cli;
pub mod config;
pub mod drive;
pub mod error;
pub mod logging;

pub use error::AppError;

// Re-export the core and SDK for convenience
pub use claimdesk_core;
pub use claimdesk_sdk;
