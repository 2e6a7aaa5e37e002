// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Outlet support channel.

use serde::Serialize;
use strum::{Display, EnumString};
use thiserror::Error;

/// The primary error type used across all Outlet adapter traits and domain operations.
///
/// The first five variants are the domain kinds callers are expected to branch on.
/// `Forbidden` means the requester may never perform the operation, while
/// `InvalidOperation` means the session's current kind or state does not allow it.
#[derive(Debug, Error)]
pub enum OutletError {
    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The requester's role or identity does not grant this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The session's kind or lifecycle state does not allow this operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An external collaborator (reply generator, notification sink) failed.
    #[error("dependency `{service}` failed: {message}")]
    Dependency {
        service: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, row decoding).
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

/// Closed classification of [`OutletError`] used for transport mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidOperation,
    ValidationError,
    DependencyError,
    Timeout,
    Internal,
}

impl OutletError {
    /// Shorthand for a missing session.
    pub fn session_not_found(id: impl Into<String>) -> Self {
        OutletError::NotFound {
            entity: "session",
            id: id.into(),
        }
    }

    /// Wrap a collaborator failure.
    pub fn dependency<E>(service: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        OutletError::Dependency {
            service: service.into(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Returns the closed kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OutletError::NotFound { .. } => ErrorKind::NotFound,
            OutletError::Forbidden(_) => ErrorKind::Forbidden,
            OutletError::InvalidOperation(_) => ErrorKind::InvalidOperation,
            OutletError::Validation(_) => ErrorKind::ValidationError,
            OutletError::Dependency { .. } => ErrorKind::DependencyError,
            OutletError::Timeout { .. } => ErrorKind::Timeout,
            OutletError::Config(_) | OutletError::Storage { .. } | OutletError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_kinds_are_distinct() {
        let forbidden = OutletError::Forbidden("not staff".into());
        let invalid = OutletError::InvalidOperation("session is closed".into());
        assert_eq!(forbidden.kind(), ErrorKind::Forbidden);
        assert_eq!(invalid.kind(), ErrorKind::InvalidOperation);
        assert_ne!(forbidden.kind(), invalid.kind());
    }

    #[test]
    fn dependency_error_keeps_source() {
        let err = OutletError::dependency("reply", std::io::Error::other("connection reset"));
        assert_eq!(err.kind(), ErrorKind::DependencyError);
        assert!(err.to_string().contains("connection reset"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn infrastructure_errors_map_to_internal() {
        let storage = OutletError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert_eq!(storage.kind(), ErrorKind::Internal);
        assert_eq!(OutletError::Config("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn error_kind_renders_snake_case() {
        assert_eq!(ErrorKind::InvalidOperation.to_string(), "invalid_operation");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        let json = serde_json::to_string(&ErrorKind::DependencyError).unwrap();
        assert_eq!(json, "\"dependency_error\"");
    }

    #[test]
    fn session_not_found_message() {
        let err = OutletError::session_not_found("s-1");
        assert_eq!(err.to_string(), "session not found: s-1");
    }
}
