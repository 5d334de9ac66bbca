//! Error types for the product collection.

use thiserror::Error;

/// Errors that can occur during product operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// A positional variant update named a variant the product does not have.
    #[error("Variant {variant} not found on product {product}")]
    VariantNotFound { product: String, variant: String },

    /// An increment would overflow a counter; the product was left untouched.
    #[error("Counter overflow on {field} of product {product}")]
    CounterOverflow { product: String, field: &'static str },

    /// The attribute key is not part of the configured attribute schema.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// The attribute key names a structural variant field.
    #[error("Reserved attribute: {0}")]
    ReservedAttribute(String),

    /// The prune value does not fit the requested match mode.
    #[error("Invalid prune value: {0}")]
    InvalidPruneValue(String),

    /// The collection could not serve the request (closed, timed out, ...).
    #[error("Product store error: {0}")]
    StoreError(String),
}

impl From<String> for ProductError {
    fn from(msg: String) -> Self {
        ProductError::StoreError(msg)
    }
}
