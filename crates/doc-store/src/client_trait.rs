//! # CollectionHandle Trait
//!
//! Provides a common interface for collection-specific clients, adding default
//! read methods built on top of a generic `CollectionClient`.
use crate::{CollectionClient, Document, StoreError};
use async_trait::async_trait;

/// Trait for collection-specific clients to inherit the standard reads.
///
/// # Example
///
/// ```rust
/// use doc_store::{CollectionClient, CollectionHandle, Document, StoreError};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Tag { id: u32, label: String }
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("tag error: {0}")]
/// struct TagError(String);
///
/// impl From<String> for TagError {
///     fn from(s: String) -> Self { TagError(s) }
/// }
///
/// impl Document for Tag {
///     type Id = u32;
///     type Filter = u32;
///     type Update = String;
///     type Error = TagError;
///
///     fn id(&self) -> &u32 { &self.id }
///     fn matches(&self, filter: &u32) -> bool { self.id == *filter }
///     fn apply(&mut self, label: &String) -> Result<bool, TagError> {
///         let changed = self.label != *label;
///         self.label = label.clone();
///         Ok(changed)
///     }
/// }
///
/// struct TagClient {
///     inner: CollectionClient<Tag>,
/// }
///
/// #[async_trait]
/// impl CollectionHandle<Tag> for TagClient {
///     type Error = TagError;
///
///     fn inner(&self) -> &CollectionClient<Tag> {
///         &self.inner
///     }
///
///     fn map_error(e: StoreError) -> Self::Error {
///         TagError(e.to_string())
///     }
/// }
///
/// async fn usage(client: TagClient) {
///     // find_one() and find() are provided automatically!
///     let _ = client.find_one(1).await;
///     let _ = client.find(1).await;
/// }
/// ```
#[async_trait]
pub trait CollectionHandle<D: Document>: Send + Sync {
    /// The collection-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic CollectionClient.
    fn inner(&self) -> &CollectionClient<D>;

    /// Map store errors to the collection-specific error type.
    fn map_error(e: StoreError) -> Self::Error;

    /// Fetch the first document matching `filter`.
    #[tracing::instrument(skip(self))]
    async fn find_one(&self, filter: D::Filter) -> Result<Option<D>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().find_one(filter).await.map_err(Self::map_error)
    }

    /// Fetch every document matching `filter`.
    #[tracing::instrument(skip(self))]
    async fn find(&self, filter: D::Filter) -> Result<Vec<D>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().find(filter).await.map_err(Self::map_error)
    }
}
