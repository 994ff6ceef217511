use std::fmt::Write;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, SecondsFormat, Utc, format::StrftimeItems};

use crate::{
    core::{
        column::KeyPath,
        config::{DataStrategy, DateStrategy, EncoderConfig, NonConformingFloat},
    },
    error::{EncodeError, EncodeResult},
};

/// A borrowed leaf value, as seen by the walker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarRef<'a> {
    Null,
    Bool(bool),
    Int(i128),
    UInt(u128),
    F32(f32),
    F64(f64),
    Char(char),
    Str(&'a str),
    Date(&'a DateTime<Utc>),
    Bytes(&'a [u8]),
}

/// Renders scalars to cell text under the strategies of one configuration.
///
/// Formatting is pure: the same scalar and configuration always give the
/// same text. Quoting is left to the sink.
#[derive(Debug, Clone, Copy)]
pub struct ScalarFormatter<'c> {
    config: &'c EncoderConfig,
}

impl<'c> ScalarFormatter<'c> {
    pub fn new(config: &'c EncoderConfig) -> Self {
        Self { config }
    }

    pub fn format(&self, scalar: &ScalarRef<'_>, key_path: &KeyPath) -> EncodeResult<String> {
        match *scalar {
            ScalarRef::Null => Ok(String::new()),
            ScalarRef::Bool(v) => Ok(v.to_string()),
            ScalarRef::Int(v) => Ok(v.to_string()),
            ScalarRef::UInt(v) => Ok(v.to_string()),
            ScalarRef::F32(v) if v.is_finite() => Ok(format!("{:?}", v)),
            ScalarRef::F32(v) => self.non_conforming(v.into(), key_path),
            ScalarRef::F64(v) if v.is_finite() => Ok(format!("{:?}", v)),
            ScalarRef::F64(v) => self.non_conforming(v, key_path),
            ScalarRef::Char(v) => Ok(v.to_string()),
            ScalarRef::Str(v) => Ok(v.to_string()),
            ScalarRef::Date(date) => self.format_date(date, key_path),
            ScalarRef::Bytes(bytes) => self.format_data(bytes, key_path),
        }
    }

    fn non_conforming(&self, value: f64, key_path: &KeyPath) -> EncodeResult<String> {
        match self.config.float_strategy() {
            NonConformingFloat::Fail => Err(EncodeError::Encoding {
                key_path: key_path.to_string(),
                message: format!("non-conforming float value {}", value),
            }),
            NonConformingFloat::Substitute {
                positive_infinity,
                negative_infinity,
                nan,
            } => Ok(if value.is_nan() {
                nan.clone()
            } else if value.is_sign_positive() {
                positive_infinity.clone()
            } else {
                negative_infinity.clone()
            }),
        }
    }

    fn format_date(&self, date: &DateTime<Utc>, key_path: &KeyPath) -> EncodeResult<String> {
        match self.config.date_strategy() {
            DateStrategy::Deferred => Ok(date.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            DateStrategy::Iso8601 => Ok(date.to_rfc3339_opts(SecondsFormat::Secs, true)),
            DateStrategy::SecondsSince1970 => {
                let nanos = date.timestamp_subsec_nanos();
                if nanos == 0 {
                    Ok(date.timestamp().to_string())
                } else {
                    let seconds = date.timestamp() as f64 + f64::from(nanos) / 1e9;
                    Ok(format!("{:?}", seconds))
                }
            }
            DateStrategy::MillisecondsSince1970 => Ok(date.timestamp_millis().to_string()),
            DateStrategy::Formatted(pattern) => {
                let mut text = String::new();
                let items = StrftimeItems::new(pattern);
                write!(text, "{}", date.format_with_items(items)).map_err(|_| {
                    EncodeError::Encoding {
                        key_path: key_path.to_string(),
                        message: format!("date {} does not fit pattern '{}'", date, pattern),
                    }
                })?;
                Ok(text)
            }
            DateStrategy::Custom(formatter) => {
                formatter(date).map_err(|message| EncodeError::Encoding {
                    key_path: key_path.to_string(),
                    message: format!("date {}: {}", date, message),
                })
            }
        }
    }

    fn format_data(&self, bytes: &[u8], key_path: &KeyPath) -> EncodeResult<String> {
        match self.config.data_strategy() {
            DataStrategy::Base64 => Ok(STANDARD.encode(bytes)),
            DataStrategy::Hex => Ok(hex::encode(bytes)),
            DataStrategy::Custom(formatter) => {
                formatter(bytes).map_err(|message| EncodeError::Encoding {
                    key_path: key_path.to_string(),
                    message: format!("{} byte(s) of binary data: {}", bytes.len(), message),
                })
            }
        }
    }
}
