// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Cadence loader bot.

use thiserror::Error;

/// The primary error type used across all Cadence crates.
#[derive(Debug, Error)]
pub enum CadenceError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed dialogue input (bad delay, empty required field). Recovered
    /// locally as a re-prompt in the same state; never advances the loader.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced loader, user, or session does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The external message sink rejected or failed a delivery.
    #[error("sink error: {message}")]
    Sink {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An explicit identifier is required by policy and none was supplied.
    #[error("identity required: supply an identifier or session token")]
    IdentityRequired,

    /// Identity store I/O or serialization errors.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CadenceError {
    /// Convenience constructor for not-found errors.
    pub fn not_found(what: impl Into<String>) -> Self {
        CadenceError::NotFound { what: what.into() }
    }
}
