//! Store backend implementations.
//!
//! Each backend implements [`DocumentStore`](crate::core::DocumentStore) and
//! [`BlobStore`](crate::core::BlobStore). Network backends are gated behind a
//! feature flag.
//!
//! # Available Backends
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | always | In-process store with the same lookup semantics, for tests and dry runs |
//! | MongoDB | `mongodb` | MongoDB collection plus a GridFS bucket |
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "mongodb")]
//! use strongbox_persistence::backends::mongodb::MongoStore;
//! use strongbox_persistence::config::StoreConfig;
//! use strongbox_persistence::resolve::SystemResolver;
//!
//! # #[cfg(feature = "mongodb")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MongoStore::connect(&StoreConfig::default(), &SystemResolver).await?;
//! # Ok(())
//! # }
//! ```

pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongodb;
