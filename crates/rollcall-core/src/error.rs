// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rollcall attendance subsystem.

use thiserror::Error;

use crate::date::SessionDate;
use crate::types::{ClassId, UserId};

/// The primary error type used across all Rollcall ports and workflows.
#[derive(Debug, Error)]
pub enum RollcallError {
    /// Malformed input (missing ids, bad dates, non-positive session counts).
    #[error("validation error: {0}")]
    Validation(String),

    /// A class, enrollment, record, or session does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Mutation attempted on a session date whose attendance is finalized.
    #[error("attendance for class {class_id} on {session_date} is locked")]
    Locked {
        class_id: ClassId,
        session_date: SessionDate,
    },

    /// Network or remote-store failure. `message` is safe to show to users;
    /// raw transport detail stays in `source`.
    #[error("{message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Aggregate of a batch where some per-student writes failed.
    #[error("batch partially failed: {succeeded} saved, {} failed", .failed.len())]
    PartialBatch {
        succeeded: usize,
        failed: Vec<(UserId, String)>,
    },

    /// Configuration errors (invalid TOML, bad URLs, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RollcallError {
    /// Builds a [`RollcallError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Builds a [`RollcallError::Transport`] wrapping the underlying cause.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true for [`RollcallError::Locked`].
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    /// Short message suitable for a toast or CLI line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::NotFound { entity, .. } => format!("{entity} not found"),
            Self::Locked { session_date, .. } => {
                format!("attendance for {session_date} has been finalized and can no longer be changed")
            }
            Self::Transport { message, .. } => message.clone(),
            Self::PartialBatch { succeeded, failed } => {
                format!("saved {succeeded}, failed {}", failed.len())
            }
            Self::Config(_) | Self::Internal(_) => "something went wrong, please try again".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_display_hides_source_detail() {
        let err = RollcallError::transport(
            "could not reach the attendance service",
            std::io::Error::other("connection reset by peer (os error 104)"),
        );
        assert_eq!(err.to_string(), "could not reach the attendance service");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn partial_batch_counts_in_message() {
        let err = RollcallError::PartialBatch {
            succeeded: 4,
            failed: vec![(UserId::from("u5"), "timeout".into())],
        };
        assert_eq!(err.to_string(), "batch partially failed: 4 saved, 1 failed");
        assert_eq!(err.user_message(), "saved 4, failed 1");
    }

    #[test]
    fn locked_is_detectable() {
        let err = RollcallError::Locked {
            class_id: ClassId::from("c1"),
            session_date: "2024-01-03".parse().unwrap(),
        };
        assert!(err.is_locked());
        assert!(err.to_string().contains("2024-01-03"));
        assert!(!RollcallError::Validation("x".into()).is_locked());
    }
}
