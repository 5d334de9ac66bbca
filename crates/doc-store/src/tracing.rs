//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging for a process that hosts
//! collections. The format is compact and hides the module prefix
//! (`with_target(false)`); the collection name travels as a structured field
//! instead.
//!
//! ## What Gets Traced
//!
//! - **Collection lifecycle**: opened, shutdown requested, closed with final size
//! - **Requests**: every request at `debug`, with its filter and update
//! - **Writes**: successful updates at `info`, failed ones at `warn`
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle and writes only
//! RUST_LOG=info cargo run
//!
//! # Every request with its filter and update
//! RUST_LOG=debug cargo run
//!
//! # Only the collection task
//! RUST_LOG=doc_store=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug` an order touching one combination product reads:
//!
//! ```text
//! DEBUG FindOneAndUpdate collection="Product" filter=IdWithVariant { .. } update=Increment(..)
//! INFO Updated collection="Product" id=p-100
//! ```

/// Initializes the global `tracing` subscriber, filtered by `RUST_LOG`.
///
/// Calling it twice panics, as with any global subscriber; call it once from
/// `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
