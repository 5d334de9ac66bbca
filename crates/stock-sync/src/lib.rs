//! # Stock Sync
//!
//! Post-order catalog maintenance on top of the [`doc_store`] collection:
//!
//! - **[connection]**: opens the product collection and owns its lifecycle.
//! - **[stock_adjuster]**: applies a placed order's cart to `stock`, `sales`
//!   and variant quantities.
//! - **[attribute_pruner]**: removes variants carrying a retired attribute
//!   value from every combination product.
//!
//! Both operations return a [`report::UpdateReport`] with one outcome per
//! item instead of stopping silently at the first error.

pub mod attribute_pruner;
pub mod clients;
pub mod config;
pub mod connection;
pub mod model;
pub mod product_store;
pub mod report;
pub mod stock_adjuster;

pub use attribute_pruner::AttributePruner;
pub use connection::{Connection, ConnectionError, ConnectionEvent};
pub use report::{FailurePolicy, ItemOutcome, PruneReport, StockReport};
pub use stock_adjuster::StockAdjuster;
