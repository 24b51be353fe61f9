use std::collections::HashMap;
use std::fmt;

use crate::value::{FieldValue, Record};

/// 2^63; whole floats below this magnitude convert to `i64` without saturating.
const I64_EXACT_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A typed join key; `"1"` and `1` never join each other, but `1.0` and `1` do.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    Text(String),
    Integer(i64),
    Reference(String),
    Other(String),
}

impl JoinKey {
    /// Extracts the key stored under `field`, or `None` when the field is absent or blank.
    pub fn from_record(record: &Record, field: &str) -> Option<Self> {
        let value = record.get(field)?;
        if value.is_blank() {
            return None;
        }
        Some(match value {
            FieldValue::Text(s) => JoinKey::Text(s.clone()),
            FieldValue::Integer(i) => JoinKey::Integer(*i),
            // Whole floats compare equal to the integer they hold.
            FieldValue::Float(f) if f.fract() == 0.0 && f.abs() < I64_EXACT_BOUND => {
                JoinKey::Integer(*f as i64)
            }
            FieldValue::Reference(s) => JoinKey::Reference(s.clone()),
            other => JoinKey::Other(other.display_text()),
        })
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKey::Text(s) | JoinKey::Reference(s) | JoinKey::Other(s) => f.write_str(s),
            JoinKey::Integer(i) => write!(f, "{i}"),
        }
    }
}

/// Buckets `records` by their `field` value. Records without the key are left out.
pub fn partition_by_key<'a>(records: &'a [Record], field: &str) -> HashMap<JoinKey, Vec<&'a Record>> {
    let mut partitions: HashMap<JoinKey, Vec<&'a Record>> = HashMap::new();
    for record in records {
        if let Some(key) = JoinKey::from_record(record, field) {
            partitions.entry(key).or_default().push(record);
        }
    }
    partitions
}
