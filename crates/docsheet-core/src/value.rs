// crates/docsheet-core/src/value.rs

use std::fmt;
use std::io;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Number, Value};

/// Fixed, locale-independent rendering used for every timestamp cell.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single field value as pulled from the document store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Canonical text form of a globally unique reference (e.g. an ObjectId in hex).
    Reference(String),
    Binary(Vec<u8>),
    Nested(Record),
    ScalarList(Vec<FieldValue>),
    RecordList(Vec<FieldValue>),
}

impl FieldValue {
    /// Builds a sequence value, classifying it as a record list when any element is a
    /// container and as a scalar list otherwise.
    pub fn list(items: Vec<FieldValue>) -> Self {
        if items.iter().any(FieldValue::is_container) {
            FieldValue::RecordList(items)
        } else {
            FieldValue::ScalarList(items)
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            FieldValue::Nested(_) | FieldValue::ScalarList(_) | FieldValue::RecordList(_)
        )
    }

    /// Mirrors the "truthiness" check used to decide whether a join key is present.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Bool(b) => !b,
            FieldValue::Integer(i) => *i == 0,
            FieldValue::Float(f) => *f == 0.0,
            FieldValue::Text(s) | FieldValue::Reference(s) => s.is_empty(),
            FieldValue::Binary(bytes) => bytes.is_empty(),
            FieldValue::Nested(record) => record.is_empty(),
            FieldValue::ScalarList(items) | FieldValue::RecordList(items) => items.is_empty(),
            FieldValue::Timestamp(_) => false,
        }
    }

    /// Human-readable text for this value, used for list elements and file naming.
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(true) => "True".to_string(),
            FieldValue::Bool(false) => "False".to_string(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => float_text(*f),
            FieldValue::Text(s) | FieldValue::Reference(s) => s.clone(),
            FieldValue::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
            FieldValue::Binary(bytes) => binary_placeholder(bytes.len()),
            FieldValue::Nested(_) | FieldValue::RecordList(_) => json_text(&self.to_json()),
            FieldValue::ScalarList(items) => join_scalars(items),
        }
    }

    /// JSON rendering used when a whole sequence of records is collapsed into one cell.
    /// Values without a JSON counterpart fall back to their display text.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Integer(i) => Value::Number((*i).into()),
            FieldValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string())),
            FieldValue::Text(s) | FieldValue::Reference(s) => Value::String(s.clone()),
            FieldValue::Timestamp(_) | FieldValue::Binary(_) => Value::String(self.display_text()),
            FieldValue::Nested(record) => record.to_json(),
            FieldValue::ScalarList(items) | FieldValue::RecordList(items) => {
                Value::Array(items.iter().map(FieldValue::to_json).collect())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        FieldValue::Nested(value)
    }
}

pub(crate) fn binary_placeholder(len: usize) -> String {
    format!("<Binary data: {len} bytes>")
}

/// Shortest round-trip text for a float; whole values keep a trailing `.0` and very large or
/// small magnitudes use a signed two-digit exponent (`1e+16`, `1.5e-07`).
pub(crate) fn float_text(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let rendered = format!("{f:e}");
        return match rendered.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => rendered,
        };
    }
    if f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

/// Serializes JSON with a space after every `,` and `:`.
pub(crate) fn json_text(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

pub(crate) fn join_scalars(items: &[FieldValue]) -> String {
    items
        .iter()
        .map(FieldValue::display_text)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An ordered, read-only snapshot of one stored document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field append; field order is preserved.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Returns the first field with the given name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.to_json());
        }
        Value::Object(map)
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A displayable scalar written into one spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Bool(true) => f.write_str("TRUE"),
            Cell::Bool(false) => f.write_str("FALSE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn list_classification_follows_element_shape() {
        let scalars = FieldValue::list(vec!["a".into(), 1i64.into()]);
        assert!(matches!(scalars, FieldValue::ScalarList(_)));

        let records = FieldValue::list(vec![Record::new().with("x", 1i64).into()]);
        assert!(matches!(records, FieldValue::RecordList(_)));
    }

    #[test]
    fn record_list_json_uses_display_text_for_special_types() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let value = FieldValue::list(vec![Record::new()
            .with("at", FieldValue::Timestamp(ts))
            .with("blob", FieldValue::Binary(vec![0; 3]))
            .into()]);

        assert_eq!(
            json_text(&value.to_json()),
            r#"[{"at": "2025-03-01 09:30:00", "blob": "<Binary data: 3 bytes>"}]"#
        );
    }

    #[test]
    fn floats_render_like_their_shortest_repr() {
        assert_eq!(float_text(1.0), "1.0");
        assert_eq!(float_text(-3.0), "-3.0");
        assert_eq!(float_text(2.5), "2.5");
        assert_eq!(float_text(0.1), "0.1");
        assert_eq!(float_text(1e16), "1e+16");
        assert_eq!(float_text(1.5e-7), "1.5e-07");
        assert_eq!(float_text(f64::INFINITY), "inf");
        assert_eq!(float_text(f64::NAN), "nan");
    }

    #[test]
    fn list_elements_use_capitalised_booleans() {
        let list = FieldValue::list(vec![
            FieldValue::Float(1.0),
            true.into(),
            FieldValue::Bool(false),
        ]);
        assert_eq!(list.display_text(), "1.0, True, False");
    }

    #[test]
    fn blank_values_match_missing_join_keys() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::text("").is_blank());
        assert!(FieldValue::Integer(0).is_blank());
        assert!(!FieldValue::text("E1").is_blank());
    }
}
