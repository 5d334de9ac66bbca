//! Product collection: filters, updates, predicates and the `Document` impl.

mod document;
pub mod error;
pub mod predicate;
pub mod query;

pub use error::*;
pub use predicate::*;
pub use query::*;

use crate::clients::ProductClient;
use crate::model::Product;
use doc_store::{ClientOptions, CollectionActor};

/// Creates a new Product collection and its client.
pub fn new(options: ClientOptions) -> (CollectionActor<Product>, ProductClient) {
    let (actor, generic_client) = CollectionActor::with_options(options);
    let client = ProductClient::new(generic_client);

    (actor, client)
}
