//! MongoDB backend implementation.
//!
//! Records live in a regular collection, encoded with the explicit record
//! codec. Blobs live in a GridFS bucket of the same database.

mod errors;
mod store;

pub use store::MongoStore;
