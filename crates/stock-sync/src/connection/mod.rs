//! # Connection Manager
//!
//! Opens the product collection described by a [`StoreConfig`] and owns its
//! lifetime. A [`Connection`] is created explicitly, handed to whatever needs
//! the catalog, and closed explicitly:
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), stock_sync::connection::ConnectionError> {
//! use stock_sync::config::StoreConfig;
//! use stock_sync::connection::Connection;
//!
//! let connection = Connection::open(&StoreConfig::default()).await?;
//! let products = connection.products();
//! // ... hand `products` to the stock adjuster or attribute pruner ...
//! connection.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Lifecycle events
//!
//! Every transition is logged and broadcast as a [`ConnectionEvent`]:
//! `Connected` once the store answered, `Error` when opening fails or the
//! collection task dies, and `Disconnected` when the collection task stops.
//! Subscribe before opening with [`Connection::open_with_events`] to observe
//! `Connected` itself.
//!
//! ## Durability
//!
//! With `store.data_path` set, the collection is loaded from that file at open
//! and written back after every change, so stock and variant updates survive a
//! restart. Without it the collection lives only as long as the process.

mod events;
mod persist;

pub use events::ConnectionEvent;

use crate::clients::ProductClient;
use crate::config::StoreConfig;
use crate::model::Product;
use crate::product_store::{self, ProductError};
use events::emit;
use persist::Persister;
use std::fmt::Display;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

const DEFAULT_DATABASE: &str = "catalog";
const EVENT_CAPACITY: usize = 16;

/// Errors raised while opening or closing a connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Unsupported store scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid store uri: {0}")]
    InvalidUri(String),

    #[error("Store did not answer within {0:?}")]
    ConnectTimeout(Duration),

    #[error("Failed to load seed data: {0}")]
    Seed(String),

    #[error("Failed to persist catalog: {0}")]
    Persist(String),

    #[error(transparent)]
    Store(#[from] ProductError),

    #[error("Collection task failed: {0}")]
    TaskFailed(String),
}

/// A parsed `<scheme>://[credentials@]<host>[/<database>]` uri.
///
/// Credentials are dropped, so an endpoint is safe to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub database: String,
}

impl Endpoint {
    pub fn parse(uri: &str) -> Result<Self, ConnectionError> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| ConnectionError::InvalidUri("missing scheme".into()))?;
        if scheme != "memory" {
            return Err(ConnectionError::UnsupportedScheme(scheme.to_string()));
        }

        let (authority, path) = split_authority(rest);
        let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
        if host.is_empty() {
            return Err(ConnectionError::InvalidUri("missing host".into()));
        }
        let database = path
            .strip_prefix('/')
            .and_then(|path| path.split('?').next())
            .unwrap_or_default();

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            database: if database.is_empty() {
                DEFAULT_DATABASE.to_string()
            } else {
                database.to_string()
            },
        })
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.host, self.database)
    }
}

/// An open product collection and the task that serves it.
pub struct Connection {
    products: ProductClient,
    endpoint: Endpoint,
    events: broadcast::Sender<ConnectionEvent>,
    monitor: JoinHandle<Result<(), String>>,
    persister: Option<Persister>,
}

impl Connection {
    /// Opens a connection; events go to a fresh channel, see [`Connection::subscribe`].
    pub async fn open(config: &StoreConfig) -> Result<Self, ConnectionError> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self::open_with_events(config, events).await
    }

    /// Opens a connection that reports lifecycle events on `events`.
    ///
    /// The store must answer a ping, and the data or seed file, when
    /// configured, must be loaded within `connect_timeout_ms`. On failure an
    /// `Error` event is emitted, the collection is shut down and the error
    /// returned.
    #[instrument(skip(config, events), fields(uri = %redact(&config.uri)))]
    pub async fn open_with_events(
        config: &StoreConfig,
        events: broadcast::Sender<ConnectionEvent>,
    ) -> Result<Self, ConnectionError> {
        let endpoint = match Endpoint::parse(&config.uri) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                emit(&events, ConnectionEvent::Error { message: e.to_string() });
                return Err(e);
            }
        };

        let (actor, products) = product_store::new(config.client_options());
        let changes = actor.changes();
        let collection = tokio::spawn(actor.run());
        debug!(%endpoint, pool = config.max_pool_size, "Collection task started");

        Self::establish(config, endpoint, products, collection, changes, events).await
    }

    /// Brings up a running collection: watches its task, waits for it to
    /// answer, loads the initial catalog and starts write-through.
    async fn establish(
        config: &StoreConfig,
        endpoint: Endpoint,
        products: ProductClient,
        collection: JoinHandle<()>,
        changes: watch::Receiver<u64>,
        events: broadcast::Sender<ConnectionEvent>,
    ) -> Result<Self, ConnectionError> {
        let monitor = tokio::spawn(monitor(collection, events.clone()));

        let connect_timeout = config.connect_timeout();
        let ready = tokio::time::timeout(connect_timeout, async {
            products.ping().await?;
            if let Some(path) = initial_catalog(config).await? {
                load(&products, path).await?;
            }
            Ok::<_, ConnectionError>(())
        })
        .await
        .unwrap_or(Err(ConnectionError::ConnectTimeout(connect_timeout)));

        if let Err(e) = ready {
            emit(&events, ConnectionEvent::Error { message: e.to_string() });
            if let Err(shutdown_error) = products.shutdown().await {
                warn!(error = %shutdown_error, "Shutdown after failed open");
            }
            let _ = monitor.await;
            return Err(e);
        }

        let persister = config
            .data_path
            .clone()
            .map(|path| Persister::spawn(products.clone(), path, changes));

        emit(
            &events,
            ConnectionEvent::Connected {
                database: endpoint.database.clone(),
            },
        );
        Ok(Self {
            products,
            endpoint,
            events,
            monitor,
            persister,
        })
    }

    /// The shared handle to the product collection. Clones are cheap.
    pub fn products(&self) -> ProductClient {
        self.products.clone()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn database(&self) -> &str {
        &self.endpoint.database
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    /// Writes the collection to `store.data_path` now.
    ///
    /// Returns the number of products written, or `None` without a data path.
    pub async fn flush(&self) -> Result<Option<usize>, ConnectionError> {
        match &self.persister {
            Some(persister) => persister.flush().await.map(Some),
            None => Ok(None),
        }
    }

    /// Writes a final snapshot, stops the collection task and waits for it
    /// to finish.
    ///
    /// The collection is stopped even when the snapshot fails. Outstanding
    /// [`ProductClient`] clones fail with a store error afterwards.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn close(self) -> Result<(), ConnectionError> {
        info!("Closing connection");
        let flushed = self.flush().await;
        if let Ok(Some(count)) = &flushed {
            info!(count, "Final snapshot written");
        }

        if let Err(e) = self.products.shutdown().await {
            // Already stopped; the monitor has the reason.
            debug!(error = %e, "Shutdown request not delivered");
        }
        let stopped = match self.monitor.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(message)) => Err(ConnectionError::TaskFailed(message)),
            Err(e) => Err(ConnectionError::TaskFailed(e.to_string())),
        };
        if let Some(persister) = self.persister {
            persister.finish().await;
        }
        stopped.and(flushed.map(|_| ()))
    }
}

/// Waits for the collection task and reports how it ended.
async fn monitor(
    collection: JoinHandle<()>,
    events: broadcast::Sender<ConnectionEvent>,
) -> Result<(), String> {
    let result = collection.await.map_err(|e| e.to_string());
    if let Err(message) = &result {
        emit(
            &events,
            ConnectionEvent::Error {
                message: message.clone(),
            },
        );
    }
    emit(&events, ConnectionEvent::Disconnected);
    result
}

/// The file the collection starts from: the data file once it exists,
/// otherwise the seed file.
async fn initial_catalog(config: &StoreConfig) -> Result<Option<&Path>, ConnectionError> {
    if let Some(path) = &config.data_path {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| ConnectionError::Persist(format!("{}: {e}", path.display())))?;
        if exists {
            return Ok(Some(path));
        }
    }
    Ok(config.seed_path.as_deref())
}

async fn load(products: &ProductClient, path: &Path) -> Result<(), ConnectionError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConnectionError::Seed(format!("{}: {e}", path.display())))?;
    let catalog: Vec<Product> = serde_json::from_str(&raw)
        .map_err(|e| ConnectionError::Seed(format!("{}: {e}", path.display())))?;
    let count = products.insert_products(catalog).await?;
    info!(count, path = %path.display(), "Loaded catalog");
    Ok(())
}

/// Splits the part after `://` into the authority and the `/path?query` rest.
fn split_authority(rest: &str) -> (&str, &str) {
    let end = rest.find(|c: char| c == '/' || c == '?').unwrap_or(rest.len());
    rest.split_at(end)
}

/// The uri with credentials masked.
fn redact(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    let (authority, path) = split_authority(rest);
    match authority.rsplit_once('@') {
        Some((_, host)) => format!("{scheme}://***@{host}{path}"),
        None => uri.to_string(),
    }
}
