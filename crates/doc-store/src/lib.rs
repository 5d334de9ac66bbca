//! # Document Store
//!
//! This crate provides an in-process document collection built on the actor
//! model. One Tokio task owns the documents of a collection and processes
//! requests sequentially; any number of cheap, cloneable clients talk to it over
//! a channel.
//!
//! ## Why an Actor per Collection?
//!
//! - **Atomic single-document updates**: the owning task applies one request at
//!   a time, so two concurrent decrements of the same counter can never
//!   interleave. No locks guard the documents.
//! - **Pluggable query semantics**: the task only asks documents whether they
//!   [`match`](Document::matches) a filter and asks them to
//!   [`apply`](Document::apply) an update. Each collection brings its own filter
//!   and update languages as plain Rust enums.
//! - **Bounded resources**: the [`CollectionClient`] caps in-flight requests
//!   (`max_pool_size`) and can bound how long a reply may take
//!   (`socket_timeout`).
//!
//! ## Architecture Overview
//!
//! 1. **Document Layer** ([`Document`]) - your record type and its query semantics
//! 2. **Runtime Layer** ([`CollectionActor`]) - request processing and ownership
//! 3. **Interface Layer** ([`CollectionClient`], [`CollectionHandle`]) - typed access
//!
//! ## Example
//!
//! ```rust
//! use doc_store::{CollectionActor, Document, ReturnDocument};
//!
//! #[derive(Clone, Debug)]
//! struct Counter { id: u32, value: i64 }
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("overflow")]
//! struct Overflow;
//!
//! impl Document for Counter {
//!     type Id = u32;
//!     type Filter = u32;
//!     type Update = i64;
//!     type Error = Overflow;
//!
//!     fn id(&self) -> &u32 { &self.id }
//!     fn matches(&self, filter: &u32) -> bool { self.id == *filter }
//!     fn apply(&mut self, delta: &i64) -> Result<bool, Overflow> {
//!         self.value = self.value.checked_add(*delta).ok_or(Overflow)?;
//!         Ok(*delta != 0)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = CollectionActor::<Counter>::new(10);
//!     tokio::spawn(actor.run());
//!
//!     client.insert_many(vec![Counter { id: 1, value: 10 }]).await.unwrap();
//!     let after = client
//!         .find_one_and_update(1, -4, ReturnDocument::After)
//!         .await
//!         .unwrap()
//!         .unwrap();
//!     assert_eq!(after.value, 6);
//! }
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module provides `MockCollection`, which answers requests from
//! scripted expectations so failure paths can be tested without real data.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod document;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

// Re-export core types for convenience
pub use actor::CollectionActor;
pub use client::{ClientOptions, CollectionClient};
pub use client_trait::CollectionHandle;
pub use document::Document;
pub use error::StoreError;
pub use message::{Response, ReturnDocument, StoreRequest, UpdateResult};
