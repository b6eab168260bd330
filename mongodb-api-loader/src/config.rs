//! Configuration types for the document store connection and the loader.

use crate::error::{LoaderError, Result};
use crate::request::ParameterContainer;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default event name the collection phase is registered under.
pub const COLLECTION_EVENT_NAME: &str = "loader.collection";

/// Default event name the item phase is registered under.
pub const ITEM_EVENT_NAME: &str = "loader.item";

/// Default key under which the orchestrator stores the load result.
pub const RESULT_KEY: &str = "loader.result";

/// Configuration for the document store connection.
///
/// # Security
/// This struct intentionally does NOT store passwords. Credentials stay in
/// the connection string handed to the driver and are never logged or
/// serialized.
///
/// # Example
/// ```rust
/// use mongodb_api_loader::config::ConnectionConfig;
///
/// let config = ConnectionConfig::new("localhost".to_string())
///     .with_port(27017)
///     .with_database("apidb".to_string());
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Store host address.
    pub host: String,
    /// Optional port number.
    pub port: Option<u16>,
    /// Optional database name.
    pub database: Option<String>,
    /// Optional username (password handled separately).
    pub username: Option<String>,
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Server selection / query timeout duration.
    pub query_timeout: Duration,
    /// Maximum number of pooled connections.
    pub max_pool_size: u32,
    /// Minimum number of idle pooled connections.
    pub min_pool_size: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            database: None,
            username: None,
            connect_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(30),
            max_pool_size: 10,
            min_pool_size: 0,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}{}{})",
            self.host,
            self.port.map_or_else(String::new, |p| format!(":{p}")),
            self.database
                .as_ref()
                .map_or_else(String::new, |db| format!("/{db}"))
        )
        // Username and credentials are intentionally omitted
    }
}

impl ConnectionConfig {
    /// Creates a configuration for the given host with default timeouts.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Self::default()
        }
    }

    /// Sets the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the database name.
    #[must_use]
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Sets the username.
    #[must_use]
    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns a configuration error if any value is invalid or unsafe.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(LoaderError::configuration("host cannot be empty"));
        }

        if let Some(port) = self.port {
            if port == 0 {
                return Err(LoaderError::configuration(
                    "port must be greater than 0",
                ));
            }
        }

        if self.max_pool_size == 0 {
            return Err(LoaderError::configuration(
                "max_pool_size must be greater than 0",
            ));
        }

        if self.max_pool_size > 100 {
            return Err(LoaderError::configuration(
                "max_pool_size should not exceed 100",
            ));
        }

        if self.min_pool_size > self.max_pool_size {
            return Err(LoaderError::configuration(
                "min_pool_size cannot exceed max_pool_size",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(LoaderError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.query_timeout.is_zero() {
            return Err(LoaderError::configuration(
                "query_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

fn default_collection_event() -> String {
    COLLECTION_EVENT_NAME.to_string()
}

fn default_item_event() -> String {
    ITEM_EVENT_NAME.to_string()
}

fn default_result_key() -> String {
    RESULT_KEY.to_string()
}

/// Immutable loader configuration.
///
/// Wires the loader to one collection, one identifier field, and one request
/// parameter location, plus the event names its two phases are registered
/// under and the key the orchestrator stores results to. Created once at
/// construction; never mutated afterwards.
///
/// # Example
/// ```rust
/// use mongodb_api_loader::config::LoaderConfig;
/// use mongodb_api_loader::request::ParameterContainer;
///
/// let config = LoaderConfig::new(
///     "articles".to_string(),
///     "_id".to_string(),
///     ParameterContainer::Attributes,
///     "id".to_string(),
/// );
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Target collection (the document type identifier).
    pub collection: String,
    /// Document field the item filter matches on.
    pub identifier_field: String,
    /// Request container the identifier value is read from.
    pub parameter_container: ParameterContainer,
    /// Key inside the container holding the identifier value.
    pub parameter_key: String,
    /// Event name the collection phase answers to.
    #[serde(default = "default_collection_event")]
    pub collection_event: String,
    /// Event name the item phase answers to.
    #[serde(default = "default_item_event")]
    pub item_event: String,
    /// Key the orchestrator stores the final result under.
    #[serde(default = "default_result_key")]
    pub result_key: String,
}

impl LoaderConfig {
    /// Creates a configuration with default phase event names.
    pub fn new(
        collection: String,
        identifier_field: String,
        parameter_container: ParameterContainer,
        parameter_key: String,
    ) -> Self {
        Self {
            collection,
            identifier_field,
            parameter_container,
            parameter_key,
            collection_event: default_collection_event(),
            item_event: default_item_event(),
            result_key: default_result_key(),
        }
    }

    /// Sets the collection phase event name.
    #[must_use]
    pub fn with_collection_event(mut self, event_name: String) -> Self {
        self.collection_event = event_name;
        self
    }

    /// Sets the item phase event name.
    #[must_use]
    pub fn with_item_event(mut self, event_name: String) -> Self {
        self.item_event = event_name;
        self
    }

    /// Sets the result storage key.
    #[must_use]
    pub fn with_result_key(mut self, result_key: String) -> Self {
        self.result_key = result_key;
        self
    }

    /// Validates the loader configuration.
    ///
    /// # Errors
    /// Returns a configuration error when any name is empty or both phases
    /// share the same event name.
    pub fn validate(&self) -> Result<()> {
        if self.collection.is_empty() {
            return Err(LoaderError::configuration("collection cannot be empty"));
        }

        if self.identifier_field.is_empty() {
            return Err(LoaderError::configuration(
                "identifier_field cannot be empty",
            ));
        }

        if self.parameter_key.is_empty() {
            return Err(LoaderError::configuration("parameter_key cannot be empty"));
        }

        if self.collection_event.is_empty() || self.item_event.is_empty() {
            return Err(LoaderError::configuration(
                "phase event names cannot be empty",
            ));
        }

        if self.collection_event == self.item_event {
            return Err(LoaderError::configuration(
                "collection and item phases cannot share an event name",
            ));
        }

        if self.result_key.is_empty() {
            return Err(LoaderError::configuration("result_key cannot be empty"));
        }

        Ok(())
    }
}
