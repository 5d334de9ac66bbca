//! Settings loaded from `.env`, `config/stock-sync.toml` and `STOCK_SYNC__*`
//! environment variables, in increasing order of precedence.
//!
//! ```bash
//! STOCK_SYNC__STORE__URI=memory://localhost/catalog
//! STOCK_SYNC__STORE__MAX_POOL_SIZE=50
//! STOCK_SYNC__STORE__DATA_PATH=var/catalog.json
//! STOCK_SYNC__CATALOG__ATTRIBUTES=color,size
//! STOCK_SYNC__CATALOG__FAILURE_POLICY=continue_on_error
//! ```

use crate::product_store::{AttributeSchema, ProductError};
use crate::report::FailurePolicy;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use doc_store::ClientOptions;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_FILE: &str = "config/stock-sync.toml";
const ENV_PREFIX: &str = "STOCK_SYNC";

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Where the product collection lives and how clients talk to it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_socket_timeout_ms")]
    pub socket_timeout_ms: u64,
    /// JSON array of products inserted when the connection opens, unless
    /// `data_path` already holds a catalog.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
    /// Durable copy of the collection: loaded at open when the file exists,
    /// rewritten after every change and once more on close.
    #[serde(default)]
    pub data_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogConfig {
    /// Attribute keys variants may carry; the only keys a prune can address.
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_uri() -> String {
    "memory://localhost/catalog".to_string()
}

fn default_max_pool_size() -> usize {
    100
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_socket_timeout_ms() -> u64 {
    30_000
}

fn default_attributes() -> Vec<String> {
    vec!["color".into(), "size".into(), "material".into()]
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            max_pool_size: default_max_pool_size(),
            connect_timeout_ms: default_connect_timeout_ms(),
            socket_timeout_ms: default_socket_timeout_ms(),
            seed_path: None,
            data_path: None,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            attributes: default_attributes(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            max_pool_size: self.max_pool_size,
            socket_timeout: Some(self.socket_timeout()),
        }
    }
}

impl CatalogConfig {
    pub fn schema(&self) -> Result<AttributeSchema, ProductError> {
        AttributeSchema::new(self.attributes.iter().cloned())
    }
}

impl Settings {
    /// Loads settings from `.env`, the optional config file and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is fine.
        let _ = dotenvy::dotenv();

        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(environment());
        Self::from_builder(builder)
    }

    /// Builds and validates settings from prepared sources.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.max_pool_size == 0 {
            return Err(ConfigError::Message(
                "store.max_pool_size must be positive".into(),
            ));
        }
        if self.store.connect_timeout_ms == 0 || self.store.socket_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "store timeouts must be positive".into(),
            ));
        }
        self.catalog
            .schema()
            .map_err(|e| ConfigError::Message(format!("catalog.attributes: {e}")))?;
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("catalog.attributes")
}
