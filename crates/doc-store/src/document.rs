//! # Document Trait
//!
//! The `Document` trait defines the contract every record type stored in a
//! collection must implement to be managed by the generic `CollectionActor`.
//! It names the identifier, the filter language and the update language of the
//! collection, and the error an update may fail with.
//!
//! # Architecture Note
//! The collection task never interprets filters or updates itself. It asks the
//! document whether it [`matches`](Document::matches) a filter and asks it to
//! [`apply`](Document::apply) an update. This keeps the request loop written
//! *once* while each collection brings its own query semantics.
//!
//! We use associated types (`Id`, `Filter`, `Update`) so a `Product` collection
//! can only ever receive product filters; the compiler rejects anything else.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record type must implement to be stored in a `CollectionActor`.
///
/// # Atomicity
/// The collection applies an update to a *copy* of the stored document and swaps
/// the copy in only when [`apply`](Document::apply) returns `Ok`. An
/// implementation may therefore bail out half way through with an error; the
/// stored document is left exactly as it was.
pub trait Document: Clone + Debug + Send + Sync + 'static {
    /// The unique identifier of a document within its collection.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// Query predicate selecting documents.
    type Filter: Clone + Send + Sync + Debug;

    /// Mutation applied to a matched document.
    type Update: Clone + Send + Sync + Debug;

    /// The error type an update may fail with.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the document's identifier.
    fn id(&self) -> &Self::Id;

    /// Returns `true` when this document is selected by `filter`.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Applies `update` in place.
    ///
    /// Returns `Ok(true)` when the document changed and `Ok(false)` when the
    /// update was a no-op for this document.
    fn apply(&mut self, update: &Self::Update) -> Result<bool, Self::Error>;
}
