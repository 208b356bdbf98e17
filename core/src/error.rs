//! Error types for the post API client.
//!
//! # Design
//! A 404 on a by-id read is not an error at all (the client returns `None`),
//! so there is no `NotFound` variant. Every other non-2xx response becomes
//! `Request`, whose `Display` is exactly the user-facing message so callers
//! can surface it in a notification unchanged.

use thiserror::Error;

/// Errors returned by `PostClient` parse methods and `PostStore` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The response body did not match the route's schema (contract drift).
    #[error("response for `{route}` failed validation: {reason}")]
    Validation { route: &'static str, reason: String },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// No response was received.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A path template placeholder had no value.
    #[error("missing path parameter `{0}`")]
    MissingParam(String),

    /// Caller-supplied input was rejected before any request was built.
    #[error("{0}")]
    InvalidInput(String),

    /// A mutation of the same kind is still pending.
    #[error("a {0} request is already in flight")]
    MutationInFlight(&'static str),
}

impl ApiError {
    /// HTTP status of a `Request` failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation { .. })
    }
}
