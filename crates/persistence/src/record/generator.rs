//! Random record generation.
//!
//! Generation is pure apart from the random source, which callers inject so
//! that runs can be reproduced from a seed.

use std::collections::BTreeMap;

use rand::Rng;
use rand::distributions::Standard;

use super::{Attribute, Item, Record};

/// Default upper bound (exclusive) for the size of generated collections.
pub const COLLECTION_MAX_COUNT: usize = 4;

/// Builds random [`Record`]s.
///
/// `items` and `attributes` each get an independently drawn length in
/// `[1, max_collection_size - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordGenerator {
    max_collection_size: usize,
}

impl Default for RecordGenerator {
    fn default() -> Self {
        Self {
            max_collection_size: COLLECTION_MAX_COUNT,
        }
    }
}

impl RecordGenerator {
    /// Creates a generator with the given exclusive collection size bound.
    ///
    /// Returns `None` if `max_collection_size` is below 2, since no non-empty
    /// collection would fit.
    pub fn new(max_collection_size: usize) -> Option<Self> {
        (max_collection_size >= 2).then_some(Self {
            max_collection_size,
        })
    }

    /// Returns the exclusive collection size bound.
    pub fn max_collection_size(&self) -> usize {
        self.max_collection_size
    }

    /// Generates a record named `name`.
    pub fn generate<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Record {
        let list_size = rng.gen_range(1..self.max_collection_size);
        let items = (0..list_size)
            .map(|_| Item {
                value: rng.sample(Standard),
            })
            .collect();

        let dict_size = rng.gen_range(1..self.max_collection_size);
        let attributes: BTreeMap<String, Attribute> = (0..dict_size)
            .map(|i| {
                (
                    Record::attribute_key(name, i),
                    Attribute {
                        value: rng.sample(Standard),
                    },
                )
            })
            .collect();

        Record {
            name: name.to_string(),
            flag: rng.gen_bool(0.5),
            number: rng.sample(Standard),
            items,
            attributes,
        }
    }
}

/// Generates a record named `name` with the default collection size bound.
pub fn generate<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Record {
    RecordGenerator::default().generate(name, rng)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_collection_sizes_within_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let record = generate("test", &mut rng);
            assert!((1..COLLECTION_MAX_COUNT).contains(&record.items.len()));
            assert!((1..COLLECTION_MAX_COUNT).contains(&record.attributes.len()));
        }
    }

    #[test]
    fn test_sizes_reach_both_ends_of_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let sizes: Vec<usize> = (0..200)
            .map(|_| generate("test", &mut rng).items.len())
            .collect();
        assert!(sizes.contains(&1));
        assert!(sizes.contains(&(COLLECTION_MAX_COUNT - 1)));
    }

    #[test]
    fn test_attribute_keys_derive_from_index() {
        let mut rng = StdRng::seed_from_u64(3);
        for name in ["test", "", "a_b", "名前"] {
            let record = generate(name, &mut rng);
            let size = record.attributes.len();
            let expected: std::collections::BTreeSet<String> =
                (0..size).map(|i| format!("{}_{}", name, i)).collect();
            let actual: std::collections::BTreeSet<String> =
                record.attributes.keys().cloned().collect();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_item_values_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let record = generate("test", &mut rng);
            assert!(record.items.iter().all(|i| (0.0..1.0).contains(&i.value)));
        }
    }

    #[test]
    fn test_same_seed_same_record() {
        let a = generate("test", &mut StdRng::seed_from_u64(42));
        let b = generate("test", &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_bound() {
        let generator = RecordGenerator::new(2).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let record = generator.generate("one", &mut rng);
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.attributes.len(), 1);
        assert!(record.attributes.contains_key("one_0"));
    }

    #[test]
    fn test_rejects_degenerate_bound() {
        assert!(RecordGenerator::new(0).is_none());
        assert!(RecordGenerator::new(1).is_none());
        assert_eq!(RecordGenerator::new(8).unwrap().max_collection_size(), 8);
    }
}
