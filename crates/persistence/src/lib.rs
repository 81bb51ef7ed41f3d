//! Strongbox Persistence Layer
//!
//! This crate provides the store clients exercised by the Strongbox probe: a
//! document collection holding test records and a blob bucket holding binary
//! objects, behind async traits with interchangeable backends.
//!
//! # Backend Features
//!
//! Enable backends with feature flags in `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! strongbox-persistence = { version = "0.1", features = ["mongodb"] }
//! ```
//!
//! Available backend features:
//! - `mongodb` (default) - MongoDB collection plus GridFS bucket
//!
//! The in-memory backend is always available.
//!
//! # Architecture
//!
//! - [`record`] - The test record, its random generator and its BSON codec
//! - [`core`] - Document and blob store traits
//! - [`backends`] - Backend implementations (MongoDB, in-memory)
//! - [`config`] - Connection descriptor and connection string formatting
//! - [`resolve`] - Host resolution with IPv4 preference
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use strongbox_persistence::record::RecordGenerator;
//!
//! let generator = RecordGenerator::new(4).unwrap();
//! let record = generator.generate("test", &mut StdRng::seed_from_u64(3));
//!
//! assert!((1..4).contains(&record.items.len()));
//! assert!((1..4).contains(&record.attributes.len()));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod record;
pub mod resolve;

// Re-export commonly used types at crate root
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use record::{Attribute, Item, Record, RecordGenerator};

// Re-export core traits
pub use core::{BackendKind, BlobId, BlobMeta, BlobStore, DocumentStore, Store};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
