//! # Mock Collections & Testing Guide
//!
//! `MockCollection<D>` hands out a real [`CollectionClient<D>`] whose requests
//! are answered from a queue of expectations instead of a collection task. It
//! lets you test code that *uses* a collection (retry loops, failure policies,
//! report building) deterministically, including failures that are hard to
//! provoke against real data.
//!
//! ## When to use Mocks vs a Real Collection
//!
//! | Feature | MockCollection | CollectionActor |
//! |---------|----------------|-----------------|
//! | **State** | None (scripted replies) | Real documents |
//! | **Error Injection** | Easy (`return_err`) | Needs crafted data |
//! | **Use Case** | Logic *around* the client | Query semantics, concurrency |
//!
//! ## Simulating a failure on the n-th update
//!
//! ```rust
//! use doc_store::mock::MockCollection;
//! use doc_store::{Document, ReturnDocument, StoreError};
//!
//! #[derive(Clone, Debug)] struct Counter { id: u32, value: i64 }
//! #[derive(Debug, thiserror::Error)] #[error("overflow")] struct Overflow;
//!
//! impl Document for Counter {
//!     type Id = u32; type Filter = u32; type Update = i64; type Error = Overflow;
//!     fn id(&self) -> &u32 { &self.id }
//!     fn matches(&self, f: &u32) -> bool { self.id == *f }
//!     fn apply(&mut self, d: &i64) -> Result<bool, Overflow> { self.value += d; Ok(true) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockCollection::<Counter>::new();
//!     mock.expect_find_one_and_update().return_ok(Some(Counter { id: 1, value: 4 }));
//!     mock.expect_find_one_and_update().return_err(StoreError::Closed);
//!     let client = mock.client();
//!
//!     assert!(client.find_one_and_update(1, -1, ReturnDocument::After).await.is_ok());
//!     let second = client.find_one_and_update(2, -1, ReturnDocument::After).await;
//!     assert!(matches!(second, Err(StoreError::Closed)));
//!
//!     mock.verify();
//!     assert_eq!(mock.requests().len(), 2);
//! }
//! ```
//!
//! A request that arrives without a matching expectation panics the mock task;
//! the caller then observes [`StoreError::Dropped`].

use crate::{CollectionClient, Document, StoreError, StoreRequest, UpdateResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Scripted reply for one expected request.
enum Expectation<D: Document> {
    InsertMany(Result<usize, StoreError>),
    FindOne(Result<Option<D>, StoreError>),
    Find(Result<Vec<D>, StoreError>),
    FindOneAndUpdate(Result<Option<D>, StoreError>),
    UpdateOne(Result<UpdateResult, StoreError>),
    UpdateMany(Result<UpdateResult, StoreError>),
}

/// A request observed by the mock, kept for assertions.
#[derive(Debug, Clone)]
pub enum RecordedRequest<D: Document> {
    InsertMany(Vec<D>),
    FindOne(D::Filter),
    Find(D::Filter),
    FindOneAndUpdate(D::Filter, D::Update),
    UpdateOne(D::Filter, D::Update),
    UpdateMany(D::Filter, D::Update),
    Ping,
    Shutdown,
}

/// A mock collection with expectation tracking for fluent testing.
///
/// `Ping` and `Shutdown` are always answered with `Ok(())` and need no
/// expectation.
pub struct MockCollection<D: Document> {
    client: CollectionClient<D>,
    expectations: Arc<Mutex<VecDeque<Expectation<D>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest<D>>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<D: Document> MockCollection<D> {
    /// Creates a new mock collection with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<D>>(100);
        let expectations = Arc::new(Mutex::new(VecDeque::new()));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let requests_clone = requests.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                match request {
                    StoreRequest::Ping { respond_to } => {
                        requests_clone.lock().unwrap().push(RecordedRequest::Ping);
                        let _ = respond_to.send(Ok(()));
                        continue;
                    }
                    StoreRequest::Shutdown { respond_to } => {
                        requests_clone.lock().unwrap().push(RecordedRequest::Shutdown);
                        let _ = respond_to.send(Ok(()));
                        break;
                    }
                    _ => {}
                }

                let expectation = expectations_clone.lock().unwrap().pop_front();
                let mut log = requests_clone.lock().unwrap();

                match (request, expectation) {
                    (
                        StoreRequest::InsertMany { documents, respond_to },
                        Some(Expectation::InsertMany(response)),
                    ) => {
                        log.push(RecordedRequest::InsertMany(documents));
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::FindOne { filter, respond_to },
                        Some(Expectation::FindOne(response)),
                    ) => {
                        log.push(RecordedRequest::FindOne(filter));
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Find { filter, respond_to },
                        Some(Expectation::Find(response)),
                    ) => {
                        log.push(RecordedRequest::Find(filter));
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::FindOneAndUpdate { filter, update, respond_to, .. },
                        Some(Expectation::FindOneAndUpdate(response)),
                    ) => {
                        log.push(RecordedRequest::FindOneAndUpdate(filter, update));
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::UpdateOne { filter, update, respond_to },
                        Some(Expectation::UpdateOne(response)),
                    ) => {
                        log.push(RecordedRequest::UpdateOne(filter, update));
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::UpdateMany { filter, update, respond_to },
                        Some(Expectation::UpdateMany(response)),
                    ) => {
                        log.push(RecordedRequest::UpdateMany(filter, update));
                        let _ = respond_to.send(response);
                    }
                    _ => {
                        drop(log);
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: CollectionClient::new(sender),
            expectations,
            requests,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> CollectionClient<D> {
        self.client.clone()
    }

    pub fn expect_insert_many(&mut self) -> ExpectationBuilder<D, usize> {
        self.builder(Expectation::InsertMany)
    }

    pub fn expect_find_one(&mut self) -> ExpectationBuilder<D, Option<D>> {
        self.builder(Expectation::FindOne)
    }

    pub fn expect_find(&mut self) -> ExpectationBuilder<D, Vec<D>> {
        self.builder(Expectation::Find)
    }

    pub fn expect_find_one_and_update(&mut self) -> ExpectationBuilder<D, Option<D>> {
        self.builder(Expectation::FindOneAndUpdate)
    }

    pub fn expect_update_one(&mut self) -> ExpectationBuilder<D, UpdateResult> {
        self.builder(Expectation::UpdateOne)
    }

    pub fn expect_update_many(&mut self) -> ExpectationBuilder<D, UpdateResult> {
        self.builder(Expectation::UpdateMany)
    }

    fn builder<R>(
        &self,
        wrap: fn(Result<R, StoreError>) -> Expectation<D>,
    ) -> ExpectationBuilder<D, R> {
        ExpectationBuilder {
            wrap,
            expectations: self.expectations.clone(),
        }
    }

    /// Returns every request answered so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest<D>> {
        self.requests.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

impl<D: Document> Default for MockCollection<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder queuing the reply for one expected request.
pub struct ExpectationBuilder<D: Document, R> {
    wrap: fn(Result<R, StoreError>) -> Expectation<D>,
    expectations: Arc<Mutex<VecDeque<Expectation<D>>>>,
}

impl<D: Document, R> ExpectationBuilder<D, R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, StoreError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back((self.wrap)(response));
    }
}

// =============================================================================
// RECEIVER HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// # Testing Strategy
/// Use this when a test needs to inspect a request *before* deciding the reply,
/// or needs to hold a reply back (e.g. to exercise socket timeouts).
pub fn create_mock_client<D: Document>(
    buffer_size: usize,
) -> (CollectionClient<D>, mpsc::Receiver<StoreRequest<D>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (CollectionClient::new(sender), receiver)
}

/// Helper to verify that the next message is a FindOneAndUpdate request.
pub async fn expect_find_one_and_update<D: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<D>>,
) -> Option<(D::Filter, D::Update, oneshot::Sender<Result<Option<D>, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::FindOneAndUpdate {
            filter,
            update,
            respond_to,
            ..
        }) => Some((filter, update, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Find request.
pub async fn expect_find<D: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<D>>,
) -> Option<(D::Filter, oneshot::Sender<Result<Vec<D>, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Find { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an UpdateOne request.
pub async fn expect_update_one<D: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<D>>,
) -> Option<(D::Filter, D::Update, oneshot::Sender<Result<UpdateResult, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::UpdateOne {
            filter,
            update,
            respond_to,
        }) => Some((filter, update, respond_to)),
        _ => None,
    }
}
