//! Error types shared across vault crates

use thiserror::Error;

/// Failure reported by a resolver while answering a deferred query.
///
/// The registry never hands these to the caller of a query. They only reach
/// the host's diagnostics sink.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("resolver backend failed: {0}")]
    Backend(String),

    #[error("resolver backend unavailable: {0}")]
    Unavailable(String),

    #[error("resolver panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResolverError {
    /// Build a [`ResolverError::Panicked`] from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

/// Errors converting between UUID text and byte forms
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UuidFormatError {
    #[error("expected {expected} characters, got {actual}: {input}")]
    Length {
        expected: usize,
        actual: usize,
        input: String,
    },

    #[error("expected 16 bytes, got {0}")]
    ByteLength(usize),

    #[error("invalid uuid text: {0}")]
    Parse(String),
}
