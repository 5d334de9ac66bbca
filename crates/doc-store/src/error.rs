//! # Store Errors
//!
//! Common error type returned by every collection operation. Document-specific
//! failures travel inside [`StoreError::DocumentError`] so callers can downcast
//! them back to their own error type.

use std::time::Duration;

/// Errors that can occur while talking to a collection.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Collection closed")]
    Closed,
    #[error("Collection dropped response channel")]
    Dropped,
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Duplicate document id: {0}")]
    DuplicateId(String),
    #[error("Document error: {0}")]
    DocumentError(Box<dyn std::error::Error + Send + Sync>),
}
