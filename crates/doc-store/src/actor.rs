//! # Collection Task
//!
//! This module defines the `CollectionActor`, the component that owns the
//! documents of one collection. It implements the "Server" side of the actor
//! model: requests are processed one at a time, so every single-document update
//! is atomic with respect to every other request without any locking.

use crate::client::{ClientOptions, CollectionClient};
use crate::document::Document;
use crate::error::StoreError;
use crate::message::{ReturnDocument, StoreRequest, UpdateResult};
use std::collections::HashMap;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// The actor that owns one collection of documents.
///
/// # Architecture Note
/// This struct holds the state (`store`) and the receiver end of the channel.
/// Two concurrent orders decrementing the same product are serialized here:
/// each `FindOneAndUpdate` sees the result of the previous one, so no decrement
/// is ever lost.
///
/// Documents are kept in insertion order, which is the order `find` returns
/// them in and the order `find_one` scans them in.
///
/// Every insert or update that changes a document bumps a revision counter
/// published on [`CollectionActor::changes`].
///
/// # Usage Pattern
///
/// ```rust
/// use doc_store::{CollectionActor, Document};
///
/// #[derive(Clone, Debug)]
/// struct Counter { id: u32, value: i64 }
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("overflow")]
/// struct Overflow;
///
/// impl Document for Counter {
///     type Id = u32;
///     type Filter = u32;
///     type Update = i64;
///     type Error = Overflow;
///
///     fn id(&self) -> &u32 { &self.id }
///     fn matches(&self, filter: &u32) -> bool { self.id == *filter }
///     fn apply(&mut self, delta: &i64) -> Result<bool, Overflow> {
///         self.value = self.value.checked_add(*delta).ok_or(Overflow)?;
///         Ok(*delta != 0)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = CollectionActor::<Counter>::new(10);
///     tokio::spawn(actor.run());
///
///     client.insert_many(vec![Counter { id: 1, value: 0 }]).await.unwrap();
///     let result = client.update_one(1, 5).await.unwrap();
///     assert_eq!(result.modified_count, 1);
/// }
/// ```
pub struct CollectionActor<D: Document> {
    receiver: mpsc::Receiver<StoreRequest<D>>,
    store: HashMap<D::Id, D>,
    order: Vec<D::Id>,
    changes: watch::Sender<u64>,
}

impl<D: Document> CollectionActor<D> {
    /// Creates a collection with a request buffer of `buffer_size`, an equally
    /// sized request pool and no socket timeout.
    pub fn new(buffer_size: usize) -> (Self, CollectionClient<D>) {
        Self::with_options(ClientOptions {
            max_pool_size: buffer_size,
            socket_timeout: None,
        })
    }

    /// Creates a collection whose client is configured by `options`.
    ///
    /// The channel buffer is sized to `options.max_pool_size`, so a full pool
    /// never has to wait on the channel as well.
    pub fn with_options(options: ClientOptions) -> (Self, CollectionClient<D>) {
        let (sender, receiver) = mpsc::channel(options.max_pool_size.max(1));
        let actor = Self {
            receiver,
            store: HashMap::new(),
            order: Vec::new(),
            changes: watch::channel(0).0,
        };
        let client = CollectionClient::with_options(sender, options);
        (actor, client)
    }

    /// Receives the collection's revision, bumped after every change.
    ///
    /// The channel closes when the request loop ends.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Runs the request loop until every client is dropped or a `Shutdown`
    /// request arrives.
    pub async fn run(mut self) {
        // Extract just the type name (e.g., "Product" instead of "stock_sync::model::product::Product")
        let collection = std::any::type_name::<D>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(collection, "Collection opened");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::InsertMany {
                    documents,
                    respond_to,
                } => {
                    debug!(collection, count = documents.len(), "InsertMany");
                    let result = self.insert_many(documents);
                    match &result {
                        Ok(count) => info!(collection, count, size = self.store.len(), "Inserted"),
                        Err(e) => warn!(collection, error = %e, "Insert failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::FindOne { filter, respond_to } => {
                    let found = self.first_match(&filter).map(|id| self.store[&id].clone());
                    debug!(collection, ?filter, found = found.is_some(), "FindOne");
                    let _ = respond_to.send(Ok(found));
                }
                StoreRequest::Find { filter, respond_to } => {
                    let found: Vec<D> = self
                        .order
                        .iter()
                        .map(|id| &self.store[id])
                        .filter(|doc| doc.matches(&filter))
                        .cloned()
                        .collect();
                    debug!(collection, ?filter, count = found.len(), "Find");
                    let _ = respond_to.send(Ok(found));
                }
                StoreRequest::FindOneAndUpdate {
                    filter,
                    update,
                    return_document,
                    respond_to,
                } => {
                    debug!(collection, ?filter, ?update, "FindOneAndUpdate");
                    let Some(id) = self.first_match(&filter) else {
                        debug!(collection, ?filter, "No match");
                        let _ = respond_to.send(Ok(None));
                        continue;
                    };
                    let result = self.apply(&id, &update).map(|(before, _)| {
                        Some(match return_document {
                            ReturnDocument::Before => before,
                            ReturnDocument::After => self.store[&id].clone(),
                        })
                    });
                    match &result {
                        Ok(_) => info!(collection, %id, "Updated"),
                        Err(e) => warn!(collection, %id, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::UpdateOne {
                    filter,
                    update,
                    respond_to,
                } => {
                    debug!(collection, ?filter, ?update, "UpdateOne");
                    let result = match self.first_match(&filter) {
                        Some(id) => self.apply(&id, &update).map(|(_, modified)| UpdateResult {
                            matched_count: 1,
                            modified_count: u64::from(modified),
                        }),
                        None => Ok(UpdateResult::default()),
                    };
                    match &result {
                        Ok(r) => info!(collection, matched = r.matched_count, modified = r.modified_count, "UpdateOne ok"),
                        Err(e) => warn!(collection, error = %e, "UpdateOne failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::UpdateMany {
                    filter,
                    update,
                    respond_to,
                } => {
                    debug!(collection, ?filter, ?update, "UpdateMany");
                    let result = self.update_many(&filter, &update);
                    match &result {
                        Ok(r) => info!(collection, matched = r.matched_count, modified = r.modified_count, "UpdateMany ok"),
                        Err(e) => warn!(collection, error = %e, "UpdateMany failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Ping { respond_to } => {
                    debug!(collection, "Ping");
                    let _ = respond_to.send(Ok(()));
                }
                StoreRequest::Shutdown { respond_to } => {
                    info!(collection, "Shutdown requested");
                    let _ = respond_to.send(Ok(()));
                    break;
                }
            }
        }

        info!(collection, size = self.store.len(), "Collection closed");
    }

    fn insert_many(&mut self, documents: Vec<D>) -> Result<usize, StoreError> {
        // Validate the whole batch first so a duplicate inserts nothing.
        let mut incoming = std::collections::HashSet::new();
        for doc in &documents {
            if self.store.contains_key(doc.id()) || !incoming.insert(doc.id().clone()) {
                return Err(StoreError::DuplicateId(doc.id().to_string()));
            }
        }
        let count = documents.len();
        for doc in documents {
            self.order.push(doc.id().clone());
            self.store.insert(doc.id().clone(), doc);
        }
        if count > 0 {
            self.mark_changed();
        }
        Ok(count)
    }

    fn first_match(&self, filter: &D::Filter) -> Option<D::Id> {
        self.order
            .iter()
            .find(|id| self.store[*id].matches(filter))
            .cloned()
    }

    /// Applies `update` to a copy of the document and swaps it in on success.
    ///
    /// Returns the previous version and whether the update changed anything.
    fn apply(&mut self, id: &D::Id, update: &D::Update) -> Result<(D, bool), StoreError> {
        let Some(current) = self.store.get_mut(id) else {
            return Err(StoreError::DocumentError(
                format!("document {id} vanished").into(),
            ));
        };
        let mut next = current.clone();
        let modified = next
            .apply(update)
            .map_err(|e| StoreError::DocumentError(Box::new(e)))?;
        let before = std::mem::replace(current, next);
        if modified {
            self.mark_changed();
        }
        Ok((before, modified))
    }

    fn mark_changed(&self) {
        self.changes
            .send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    /// Updates every match in order. Stops at the first failing document;
    /// documents updated before it keep their changes.
    fn update_many(
        &mut self,
        filter: &D::Filter,
        update: &D::Update,
    ) -> Result<UpdateResult, StoreError> {
        let matched: Vec<D::Id> = self
            .order
            .iter()
            .filter(|id| self.store[*id].matches(filter))
            .cloned()
            .collect();
        let mut result = UpdateResult::default();
        for id in matched {
            let (_, modified) = self.apply(&id, update)?;
            result.matched_count += 1;
            result.modified_count += u64::from(modified);
        }
        Ok(result)
    }
}
