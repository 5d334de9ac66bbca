//! # Collection Client
//!
//! This module defines the pooled client used to talk to a `CollectionActor`.

use crate::document::Document;
use crate::error::StoreError;
use crate::message::{Response, ReturnDocument, StoreRequest, UpdateResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Semaphore};

/// Pool and timeout settings shared by every clone of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Maximum number of requests in flight across all clones.
    pub max_pool_size: usize,
    /// How long a single request may wait for its reply. `None` waits forever.
    pub socket_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            max_pool_size: 100,
            socket_timeout: None,
        }
    }
}

/// ## CollectionClient
///
/// The `CollectionClient<D>` provides a type-safe, async API over a
/// `CollectionActor<D>`. It forwards requests over a Tokio mpsc channel and
/// receives results via oneshot channels.
///
/// * **Cloneable**: holds a sender and a shared pool, so cloning is cheap.
/// * **Pooled**: at most `max_pool_size` requests are in flight; further
///   callers wait for a slot.
/// * **Bounded**: with a socket timeout configured, a request whose reply does
///   not arrive in time fails with [`StoreError::Timeout`].
#[derive(Clone)]
pub struct CollectionClient<D: Document> {
    sender: mpsc::Sender<StoreRequest<D>>,
    pool: Arc<Semaphore>,
    socket_timeout: Option<Duration>,
}

impl<D: Document> CollectionClient<D> {
    pub fn new(sender: mpsc::Sender<StoreRequest<D>>) -> Self {
        Self::with_options(sender, ClientOptions::default())
    }

    pub fn with_options(sender: mpsc::Sender<StoreRequest<D>>, options: ClientOptions) -> Self {
        Self {
            sender,
            pool: Arc::new(Semaphore::new(options.max_pool_size.max(1))),
            socket_timeout: options.socket_timeout,
        }
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(Response<R>) -> StoreRequest<D>,
    ) -> Result<R, StoreError> {
        let _permit = self.pool.acquire().await.map_err(|_| StoreError::Closed)?;
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| StoreError::Closed)?;
        match self.socket_timeout {
            Some(limit) => tokio::time::timeout(limit, response)
                .await
                .map_err(|_| StoreError::Timeout(limit))?
                .map_err(|_| StoreError::Dropped)?,
            None => response.await.map_err(|_| StoreError::Dropped)?,
        }
    }

    /// Inserts `documents`; returns how many were inserted.
    pub async fn insert_many(&self, documents: Vec<D>) -> Result<usize, StoreError> {
        self.request(|respond_to| StoreRequest::InsertMany {
            documents,
            respond_to,
        })
        .await
    }

    pub async fn find_one(&self, filter: D::Filter) -> Result<Option<D>, StoreError> {
        self.request(|respond_to| StoreRequest::FindOne { filter, respond_to })
            .await
    }

    pub async fn find(&self, filter: D::Filter) -> Result<Vec<D>, StoreError> {
        self.request(|respond_to| StoreRequest::Find { filter, respond_to })
            .await
    }

    /// Atomically updates the first match. `Ok(None)` means nothing matched.
    pub async fn find_one_and_update(
        &self,
        filter: D::Filter,
        update: D::Update,
        return_document: ReturnDocument,
    ) -> Result<Option<D>, StoreError> {
        self.request(|respond_to| StoreRequest::FindOneAndUpdate {
            filter,
            update,
            return_document,
            respond_to,
        })
        .await
    }

    pub async fn update_one(
        &self,
        filter: D::Filter,
        update: D::Update,
    ) -> Result<UpdateResult, StoreError> {
        self.request(|respond_to| StoreRequest::UpdateOne {
            filter,
            update,
            respond_to,
        })
        .await
    }

    pub async fn update_many(
        &self,
        filter: D::Filter,
        update: D::Update,
    ) -> Result<UpdateResult, StoreError> {
        self.request(|respond_to| StoreRequest::UpdateMany {
            filter,
            update,
            respond_to,
        })
        .await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Ping { respond_to })
            .await
    }

    /// Asks the collection task to stop. Later requests fail with
    /// [`StoreError::Closed`].
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Shutdown { respond_to })
            .await
    }

    /// Returns `true` once the collection task has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
