//! # Collection Messages
//!
//! This module defines the request types exchanged between a
//! `CollectionClient` and its `CollectionActor`.

use crate::document::Document;
use crate::error::StoreError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by collections.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Which version of the document `find_one_and_update` hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnDocument {
    /// The document as it was before the update.
    Before,
    /// The document as stored after the update.
    #[default]
    After,
}

/// Outcome of an `update_one` / `update_many` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    /// Documents selected by the filter.
    pub matched_count: u64,
    /// Documents that actually changed.
    pub modified_count: u64,
}

/// Internal message type sent to the collection task.
///
/// # The Query Pattern
/// The variants map onto the handful of operations a document store exposes:
///
/// - **InsertMany**: Seed documents. Fails as a whole on a duplicate id.
/// - **FindOne / Find**: Read documents selected by a [`Document::Filter`].
/// - **FindOneAndUpdate**: Atomically update the first match and return it.
/// - **UpdateOne / UpdateMany**: Atomically update matches, report counts.
/// - **Ping**: Round trip used to verify the collection is serving.
/// - **Shutdown**: Stop serving even while client clones are still alive.
///
/// Every variant carries its own typed responder, so a reply can never be sent
/// with the wrong payload.
#[derive(Debug)]
pub enum StoreRequest<D: Document> {
    InsertMany {
        documents: Vec<D>,
        respond_to: Response<usize>,
    },
    FindOne {
        filter: D::Filter,
        respond_to: Response<Option<D>>,
    },
    Find {
        filter: D::Filter,
        respond_to: Response<Vec<D>>,
    },
    FindOneAndUpdate {
        filter: D::Filter,
        update: D::Update,
        return_document: ReturnDocument,
        respond_to: Response<Option<D>>,
    },
    UpdateOne {
        filter: D::Filter,
        update: D::Update,
        respond_to: Response<UpdateResult>,
    },
    UpdateMany {
        filter: D::Filter,
        update: D::Update,
        respond_to: Response<UpdateResult>,
    },
    Ping {
        respond_to: Response<()>,
    },
    Shutdown {
        respond_to: Response<()>,
    },
}
