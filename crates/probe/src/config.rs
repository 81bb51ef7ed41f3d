//! Probe configuration.
//!
//! Every setting can come from a command line flag or an environment
//! variable.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `STRONGBOX_HOST` | localhost | Server host |
//! | `STRONGBOX_PORT` | 27017 | Server port |
//! | `STRONGBOX_USERNAME` | username | User to authenticate as |
//! | `STRONGBOX_PASSWORD` | password | Password |
//! | `STRONGBOX_AUTH_SOURCE` | admin | Database holding the credentials |
//! | `STRONGBOX_DATABASE` | test | Database under test |
//! | `STRONGBOX_COLLECTION` | collection | Collection for test records |
//! | `STRONGBOX_BUCKET` | files | GridFS bucket for test blobs |
//! | `STRONGBOX_TEST_NAME` | test | Name of the record and the blob |
//! | `STRONGBOX_BACKEND` | mongodb | `mongodb` or `memory` |
//! | `STRONGBOX_RESOLVE_IPV4` | true | Connect through the host's IPv4 address |
//! | `STRONGBOX_CONNECT_TIMEOUT` | 10 | Connect timeout (seconds) |
//! | `STRONGBOX_SERVER_SELECTION_TIMEOUT` | 10 | Server selection timeout (seconds) |
//! | `STRONGBOX_MAX_COLLECTION_SIZE` | 4 | Exclusive bound on list and dictionary sizes |
//! | `STRONGBOX_IMAGE_SIZE` | 16 | Edge length of the test image |
//! | `STRONGBOX_SEED` | | Seed for reproducible runs |
//! | `STRONGBOX_LOG_LEVEL` | info | Log level |
//!
//! # Example
//!
//! ```rust
//! use strongbox_probe::ProbeConfig;
//!
//! let config = ProbeConfig {
//!     host: "db.internal".to_string(),
//!     seed: Some(7),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! assert_eq!(config.store_config().host, "db.internal");
//! ```

use std::fmt;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use strongbox_persistence::StoreConfig;
use strongbox_persistence::record::{COLLECTION_MAX_COUNT, RecordGenerator};

use crate::probe::DEFAULT_IMAGE_SIZE;

/// Largest accepted image edge length.
pub const MAX_IMAGE_SIZE: u32 = 1024;

/// Which store implementation the probe runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackendMode {
    /// A MongoDB server with GridFS.
    #[default]
    Mongodb,
    /// An in-process store, for dry runs.
    Memory,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendMode::Mongodb => write!(f, "mongodb"),
            BackendMode::Memory => write!(f, "memory"),
        }
    }
}

/// Configuration for one probe run.
#[derive(Debug, Clone, Parser)]
#[command(name = "strongbox")]
#[command(about = "Round-trip probe for a MongoDB collection and GridFS bucket")]
pub struct ProbeConfig {
    /// Server host name or address.
    #[arg(long, env = "STRONGBOX_HOST", default_value = "localhost")]
    pub host: String,

    /// Server port.
    #[arg(short, long, env = "STRONGBOX_PORT", default_value = "27017")]
    pub port: u16,

    /// User to authenticate as.
    #[arg(long, env = "STRONGBOX_USERNAME", default_value = "username")]
    pub username: String,

    /// Password for the user.
    #[arg(long, env = "STRONGBOX_PASSWORD", default_value = "password", hide_env_values = true)]
    pub password: String,

    /// Database holding the user's credentials.
    #[arg(long, env = "STRONGBOX_AUTH_SOURCE", default_value = "admin")]
    pub auth_source: String,

    /// Database holding the collection and bucket.
    #[arg(long, env = "STRONGBOX_DATABASE", default_value = "test")]
    pub database: String,

    /// Collection receiving the test record.
    #[arg(long, env = "STRONGBOX_COLLECTION", default_value = "collection")]
    pub collection: String,

    /// GridFS bucket receiving the test blob.
    #[arg(long, env = "STRONGBOX_BUCKET", default_value = "files")]
    pub bucket: String,

    /// Name shared by the test record and the test blob.
    #[arg(short, long, env = "STRONGBOX_TEST_NAME", default_value = "test")]
    pub test_name: String,

    /// Store implementation to probe.
    #[arg(long, env = "STRONGBOX_BACKEND", value_enum, default_value_t = BackendMode::Mongodb)]
    pub backend: BackendMode,

    /// Connect through the host's IPv4 address instead of its name.
    #[arg(long, env = "STRONGBOX_RESOLVE_IPV4", default_value_t = true, action = ArgAction::Set)]
    pub resolve_ipv4: bool,

    /// Connect timeout in seconds.
    #[arg(long, env = "STRONGBOX_CONNECT_TIMEOUT", default_value = "10")]
    pub connect_timeout: u64,

    /// Server selection timeout in seconds.
    #[arg(long, env = "STRONGBOX_SERVER_SELECTION_TIMEOUT", default_value = "10")]
    pub server_selection_timeout: u64,

    /// Exclusive upper bound on generated list and dictionary sizes.
    #[arg(long, env = "STRONGBOX_MAX_COLLECTION_SIZE", default_value = "4")]
    pub max_collection_size: usize,

    /// Edge length of the generated image, in pixels.
    #[arg(long, env = "STRONGBOX_IMAGE_SIZE", default_value = "16")]
    pub image_size: u32,

    /// Seed for the random generator. Runs with the same seed generate the
    /// same records and image.
    #[arg(long, env = "STRONGBOX_SEED")]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "STRONGBOX_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            host: store.host,
            port: store.port,
            username: store.username,
            password: store.password,
            auth_source: store.auth_source,
            database: store.database,
            collection: store.collection,
            bucket: store.bucket,
            test_name: "test".to_string(),
            backend: BackendMode::Mongodb,
            resolve_ipv4: store.resolve_ipv4,
            connect_timeout: store.connect_timeout.as_secs(),
            server_selection_timeout: store.server_selection_timeout.as_secs(),
            max_collection_size: COLLECTION_MAX_COUNT,
            image_size: DEFAULT_IMAGE_SIZE,
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl ProbeConfig {
    /// Validates the configuration and returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("Host", &self.host),
            ("Auth source", &self.auth_source),
            ("Database", &self.database),
            ("Collection", &self.collection),
            ("Bucket", &self.bucket),
            ("Test name", &self.test_name),
        ] {
            if value.is_empty() {
                errors.push(format!("{} cannot be empty", field));
            }
        }

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.connect_timeout == 0 {
            errors.push("Connect timeout cannot be 0".to_string());
        }

        if self.server_selection_timeout == 0 {
            errors.push("Server selection timeout cannot be 0".to_string());
        }

        if self.max_collection_size < 2 {
            errors.push("Max collection size must be at least 2".to_string());
        }

        if self.image_size == 0 || self.image_size > MAX_IMAGE_SIZE {
            errors.push(format!(
                "Image size must be between 1 and {}",
                MAX_IMAGE_SIZE
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Returns the store connection descriptor.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            auth_source: self.auth_source.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
            bucket: self.bucket.clone(),
            resolve_ipv4: self.resolve_ipv4,
            connect_timeout: Duration::from_secs(self.connect_timeout),
            server_selection_timeout: Duration::from_secs(self.server_selection_timeout),
        }
    }

    /// Returns the record generator, falling back to the default bound when
    /// `max_collection_size` is out of range.
    pub fn record_generator(&self) -> RecordGenerator {
        RecordGenerator::new(self.max_collection_size).unwrap_or_default()
    }
}
