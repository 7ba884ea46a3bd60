//! # AppError
//!
//! Centralized error handling for the Tinyboard ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all tb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Post, Todo, Board, Attachment)
    #[error("{0} not found")]
    NotFound(String),

    /// Submitted credentials did not match any registered user,
    /// or a session token failed signature/expiry verification.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Per-client request threshold crossed within the current window.
    /// Origin rejection has no variant here: it surfaces as the CORS
    /// layer's negotiation error, with no body.
    #[error("too many requests: {0} within the current window")]
    RateLimited(u32),

    /// Infrastructure failure (e.g., DB down, filesystem error)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Tinyboard logic.
pub type Result<T> = std::result::Result<T, AppError>;
