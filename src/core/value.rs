//! Owned value tree and the date marker recognised by the walker.
//!
//! Anything implementing [`serde::Serialize`] can be encoded. [`Value`] is a
//! convenience for callers that build rows dynamically instead of deriving
//! `Serialize` on their own types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer, ser::SerializeMap, ser::SerializeSeq};

/// Newtype-struct name under which [`CsvDate`] travels through serde.
pub(crate) const DATE_TOKEN: &str = "$csv_flatten::private::Date";

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Date(DateTime<Utc>),
    Bytes(Vec<u8>),
}

/// A node of a value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Named fields, in insertion order.
    Record(Vec<(String, Value)>),
    Sequence(Vec<Value>),
    Scalar(Scalar),
}

impl Value {
    /// Builds a record from `(name, value)` pairs, keeping their order.
    ///
    /// ```
    /// use csv_flatten::core::value::Value;
    ///
    /// let person = Value::record([("id", Value::from(1)), ("name", Value::from("Ann"))]);
    /// assert_eq!(csv_flatten::to_string(&person).unwrap(), "id,name\n1,Ann\n");
    /// ```
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn sequence<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Sequence(items.into_iter().collect())
    }

    pub fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Scalar(Scalar::Bool(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Scalar(Scalar::Int(v.into()))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Scalar(Scalar::Int(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Scalar(Scalar::UInt(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(Scalar::Float(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(Scalar::String(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Scalar(Scalar::String(v))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Scalar(Scalar::Date(v))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Scalar(Scalar::Bytes(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or_else(Value::null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Record(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_none(),
            Scalar::Bool(v) => serializer.serialize_bool(*v),
            Scalar::Int(v) => serializer.serialize_i64(*v),
            Scalar::UInt(v) => serializer.serialize_u64(*v),
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::String(v) => serializer.serialize_str(v),
            Scalar::Date(v) => CsvDate(*v).serialize(serializer),
            Scalar::Bytes(v) => serializer.serialize_bytes(v),
        }
    }
}

/// A date that the encoder renders through the configured date strategy.
///
/// Plain `chrono::DateTime` fields serialize themselves as strings and are
/// written as-is; wrap them in `CsvDate`, or annotate the field with
/// `#[serde(serialize_with = "csv_flatten::core::value::serialize_date")]`,
/// to opt into the strategy. Other human-readable serde formats see an
/// RFC 3339 string, compact ones a `(seconds, nanoseconds)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CsvDate(pub DateTime<Utc>);

impl From<DateTime<Utc>> for CsvDate {
    fn from(date: DateTime<Utc>) -> Self {
        CsvDate(date)
    }
}

impl Serialize for CsvDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(DATE_TOKEN, &DatePayload(&self.0))
    }
}

/// Content of the date newtype. The walker captures it through a compact
/// serializer and rebuilds the instant from seconds and nanoseconds, so every
/// `DateTime<Utc>` chrono can hold survives the trip, leap seconds included.
struct DatePayload<'a>(&'a DateTime<Utc>);

impl Serialize for DatePayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        } else {
            (self.0.timestamp(), self.0.timestamp_subsec_nanos()).serialize(serializer)
        }
    }
}

pub fn serialize_date<S: Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    CsvDate(*date).serialize(serializer)
}
