//! Field extraction for the normalization pass.

use normstate_types::{is_truthy, kind_of, Record};
use serde_json::Value;

use crate::error::{MergeError, MergeResult};

/// Values moved out of one field across a batch.
#[derive(Debug, Default, PartialEq)]
pub struct Extracted {
    pub children: Vec<Record>,
    /// JSON kind of each moved value that was not an object.
    pub skipped: Vec<&'static str>,
}

impl Extracted {
    fn push(&mut self, value: Value) {
        match value {
            Value::Object(map) => self.children.push(Record::from(map)),
            other => self.skipped.push(kind_of(&other)),
        }
    }
}

/// Move the contents of `field` out of every record.
///
/// An array field contributes all of its elements; any other truthy value
/// contributes itself. Falsy values (`null`, `false`, `0`, `""`) are left on
/// the record. Children come back in record order, then element order.
/// Moved values that are not objects are dropped and reported in
/// [`Extracted::skipped`].
pub fn extract_field(records: &mut [Record], field: &str) -> Extracted {
    let mut extracted = Extracted::default();
    for record in records.iter_mut() {
        let movable = match record.get(field) {
            Some(Value::Array(_)) => true,
            Some(value) => is_truthy(value),
            None => false,
        };
        if !movable {
            continue;
        }
        match record.remove(field) {
            Some(Value::Array(items)) => {
                extracted.children.reserve(items.len());
                for item in items {
                    extracted.push(item);
                }
            }
            Some(value) => extracted.push(value),
            None => {}
        }
    }
    extracted
}

/// Turn a JSON payload into records: an object is one record, an array is
/// one record per element.
pub fn records_from_value(payload: Value) -> MergeResult<Vec<Record>> {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .map(|item| Record::try_from(item).map_err(MergeError::from))
            .collect(),
        other => Ok(vec![Record::try_from(other)?]),
    }
}
