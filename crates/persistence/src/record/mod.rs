//! The probe's test record.
//!
//! A [`Record`] is the unit pushed through the document store during a probe
//! run. It carries a handful of scalar fields plus a nested list and a keyed
//! map, so that a round trip exercises every shape the store has to encode.
//!
//! - [`generator`] builds random records from an injected random source
//! - [`codec`] maps records to and from their BSON wire form

use std::collections::BTreeMap;
use std::fmt;

pub mod codec;
pub mod generator;

pub use generator::{COLLECTION_MAX_COUNT, RecordGenerator, generate};

/// A test record.
///
/// Records are looked up, replaced and deleted by [`name`](Record::name); the
/// store does not enforce uniqueness, so the first match wins.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use strongbox_persistence::record::generate;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let record = generate("test", &mut rng);
///
/// assert_eq!(record.name, "test");
/// assert!(record.attributes.contains_key("test_0"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Logical identifier, also used as the blob filename.
    pub name: String,

    /// Scalar boolean payload.
    pub flag: bool,

    /// Scalar integer payload.
    pub number: i32,

    /// Ordered, non-empty list of items.
    pub items: Vec<Item>,

    /// Non-empty map of attributes keyed by `"{name}_{index}"`.
    pub attributes: BTreeMap<String, Attribute>,
}

/// An entry in [`Record::items`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    /// A value in `[0, 1)`.
    pub value: f32,
}

/// A value in [`Record::attributes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// Any `i32`.
    pub value: i32,
}

impl Record {
    /// Returns the key used for the attribute at `index` of a record named
    /// `name`.
    pub fn attribute_key(name: &str, index: usize) -> String {
        format!("{}_{}", name, index)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_document())
    }
}
