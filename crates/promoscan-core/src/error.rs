// SPDX-FileCopyrightText: 2026 Promoscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the Promoscan harvester.
//!
//! Failures are handled at the narrowest scope that can safely continue:
//! a corrupt message skips that message, an unavailable source skips that
//! source, and only configuration or unrecoverable persistence failures
//! surface as run outcomes.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Promoscan components.
#[derive(Debug, Error)]
pub enum PromoscanError {
    /// Configuration errors (missing credentials, invalid values).
    /// Fatal before any network access.
    #[error("configuration error: {0}")]
    Config(String),

    /// A source cannot be reached or authenticated. Fatal for that
    /// source only; remaining sources continue.
    #[error("source unavailable: {reason}")]
    SourceUnavailable {
        reason: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The provider asked us to slow down. Recoverable: the pacer
    /// suspends exactly `retry_after` and the same call is retried.
    #[error("source throttled, retry after {retry_after:?}")]
    Throttled { retry_after: Duration },

    /// A single message could not be decoded or fetched. The scan of the
    /// owning source continues.
    #[error("corrupt message {message_id}: {reason}")]
    CorruptMessage { message_id: String, reason: String },

    /// A media download failed. Degrades `media_paths` for one message;
    /// the message itself is still processed.
    #[error("media fetch failed for {file_id}: {reason}")]
    MediaFetch { file_id: String, reason: String },

    /// The durable store could not be written or read back.
    #[error("persistence error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PromoscanError {
    /// Builds a [`PromoscanError::SourceUnavailable`] from a reason and a
    /// causing error.
    pub fn unavailable(
        reason: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SourceUnavailable {
            reason: reason.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Builds a [`PromoscanError::Persistence`] from a causing error.
    pub fn persistence(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence {
            source: Box::new(cause),
        }
    }

    /// Whether this error is fatal for the source that produced it.
    pub fn is_source_fatal(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_render_descriptive_messages() {
        let config = PromoscanError::Config("keywords must not be empty".into());
        assert!(config.to_string().contains("configuration error"));

        let throttled = PromoscanError::Throttled {
            retry_after: Duration::from_secs(30),
        };
        assert!(throttled.to_string().contains("30"));

        let corrupt = PromoscanError::CorruptMessage {
            message_id: "42".into(),
            reason: "truncated RFC822 payload".into(),
        };
        assert!(corrupt.to_string().contains("42"));
    }

    #[test]
    fn only_unavailable_is_source_fatal() {
        let unavailable =
            PromoscanError::unavailable("login rejected", std::io::Error::other("boom"));
        assert!(unavailable.is_source_fatal());

        let throttled = PromoscanError::Throttled {
            retry_after: Duration::from_secs(1),
        };
        assert!(!throttled.is_source_fatal());

        let corrupt = PromoscanError::CorruptMessage {
            message_id: "1".into(),
            reason: "bad header".into(),
        };
        assert!(!corrupt.is_source_fatal());
    }

    #[test]
    fn persistence_carries_cause() {
        let err = PromoscanError::persistence(std::io::Error::other("disk full"));
        assert!(err.to_string().contains("disk full"));
    }
}
