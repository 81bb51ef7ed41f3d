//! Explicit BSON encoding for [`Record`].
//!
//! The mapping is written out field by field instead of being derived, so the
//! wire contract stays fixed no matter how the Rust types evolve. Key names
//! match documents written by earlier clients of the same collection:
//!
//! | Field | Key | BSON type |
//! |-------|-----|-----------|
//! | `name` | `name` | string |
//! | `flag` | `someBool` | boolean |
//! | `number` | `number` | int32 |
//! | `items` | `list` | array of `{ value: double }` |
//! | `attributes` | `dictionary` | document of `{ value: int32 }` |
//!
//! Unknown keys, including the store-assigned `_id`, are ignored on decode.

use std::collections::BTreeMap;

use bson::{Bson, Document, doc};

use super::{Attribute, Item, Record};
use crate::error::RecordError;

/// Key of the record name in the encoded document.
pub const NAME_KEY: &str = "name";
const FLAG_KEY: &str = "someBool";
const NUMBER_KEY: &str = "number";
const ITEMS_KEY: &str = "list";
const ATTRIBUTES_KEY: &str = "dictionary";
const VALUE_KEY: &str = "value";

impl Record {
    /// Encodes this record as a BSON document.
    pub fn to_document(&self) -> Document {
        let items: Vec<Bson> = self
            .items
            .iter()
            .map(|item| Bson::Document(doc! { "value": f64::from(item.value) }))
            .collect();

        let mut attributes = Document::new();
        for (key, attribute) in &self.attributes {
            attributes.insert(key.clone(), doc! { "value": attribute.value });
        }

        doc! {
            "name": self.name.as_str(),
            "someBool": self.flag,
            "number": self.number,
            "list": items,
            "dictionary": attributes,
        }
    }

    /// Decodes a record from a BSON document.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Decode`] naming the first field that is missing
    /// or has an incompatible type.
    pub fn from_document(document: &Document) -> Result<Self, RecordError> {
        let name = match document.get(NAME_KEY) {
            Some(Bson::String(name)) => name.clone(),
            other => return Err(unexpected(NAME_KEY, "string", other)),
        };

        let flag = match document.get(FLAG_KEY) {
            Some(Bson::Boolean(flag)) => *flag,
            other => return Err(unexpected(FLAG_KEY, "boolean", other)),
        };

        let number = int32(NUMBER_KEY, document.get(NUMBER_KEY))?;

        let items = match document.get(ITEMS_KEY) {
            Some(Bson::Array(values)) => values
                .iter()
                .enumerate()
                .map(|(index, value)| decode_item(index, value))
                .collect::<Result<Vec<_>, _>>()?,
            other => return Err(unexpected(ITEMS_KEY, "array", other)),
        };

        let attributes = match document.get(ATTRIBUTES_KEY) {
            Some(Bson::Document(entries)) => {
                let mut attributes = BTreeMap::new();
                for (key, value) in entries {
                    let field = format!("{}.{}", ATTRIBUTES_KEY, key);
                    let value = match value {
                        Bson::Document(entry) => int32(&field, entry.get(VALUE_KEY))?,
                        other => return Err(unexpected(&field, "document", Some(other))),
                    };
                    attributes.insert(key.clone(), Attribute { value });
                }
                attributes
            }
            other => return Err(unexpected(ATTRIBUTES_KEY, "document", other)),
        };

        Ok(Record {
            name,
            flag,
            number,
            items,
            attributes,
        })
    }
}

fn decode_item(index: usize, value: &Bson) -> Result<Item, RecordError> {
    let field = format!("{}.{}", ITEMS_KEY, index);
    let entry = match value {
        Bson::Document(entry) => entry,
        other => return Err(unexpected(&field, "document", Some(other))),
    };
    let value = match entry.get(VALUE_KEY) {
        Some(Bson::Double(v)) => *v as f32,
        Some(Bson::Int32(v)) => *v as f32,
        other => return Err(unexpected(&field, "double", other)),
    };
    Ok(Item { value })
}

/// Reads an int32, accepting wider numeric types when the value fits exactly.
fn int32(field: &str, value: Option<&Bson>) -> Result<i32, RecordError> {
    match value {
        Some(Bson::Int32(v)) => Ok(*v),
        Some(Bson::Int64(v)) => i32::try_from(*v).map_err(|_| RecordError::Decode {
            field: field.to_string(),
            message: format!("{} does not fit in int32", v),
        }),
        Some(Bson::Double(v))
            if v.fract() == 0.0 && *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX) =>
        {
            Ok(*v as i32)
        }
        other => Err(unexpected(field, "int32", other)),
    }
}

fn unexpected(field: &str, expected: &str, found: Option<&Bson>) -> RecordError {
    let message = match found {
        None => "missing".to_string(),
        Some(value) => format!("expected {}, found {:?}", expected, value.element_type()),
    };
    RecordError::Decode {
        field: field.to_string(),
        message,
    }
}
