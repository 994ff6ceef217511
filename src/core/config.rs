use std::{fmt, sync::Arc};

use chrono::{
    DateTime, Utc,
    format::{Item, StrftimeItems},
};

use crate::error::{EncodeError, EncodeResult};

/// Caller supplied date renderer.
pub type DateFormatter = Arc<dyn Fn(&DateTime<Utc>) -> Result<String, String> + Send + Sync>;

/// Caller supplied binary renderer.
pub type DataFormatter = Arc<dyn Fn(&[u8]) -> Result<String, String> + Send + Sync>;

/// Row delimiter written after every row, header included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminator {
    #[default]
    Lf,
    Crlf,
    Byte(u8),
}

impl Terminator {
    pub(crate) fn to_csv(self) -> csv::Terminator {
        match self {
            Terminator::Lf => csv::Terminator::Any(b'\n'),
            Terminator::Crlf => csv::Terminator::CRLF,
            Terminator::Byte(byte) => csv::Terminator::Any(byte),
        }
    }
}

/// Whether and how the first output line names the columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeaderStrategy {
    /// Data rows only.
    None,
    /// Dot-joined key-paths of the schema frozen by the first row.
    #[default]
    FirstLine,
    /// Caller supplied names, one per schema column.
    Explicit(Vec<String>),
}

#[derive(Clone, Default)]
pub enum DateStrategy {
    /// RFC 3339 in UTC, sub-second digits only when present.
    #[default]
    Deferred,
    SecondsSince1970,
    MillisecondsSince1970,
    /// RFC 3339 in UTC truncated to whole seconds.
    Iso8601,
    /// A chrono `strftime` pattern, e.g. `%Y-%m-%d`.
    Formatted(String),
    Custom(DateFormatter),
}

impl DateStrategy {
    pub fn custom<F>(formatter: F) -> Self
    where
        F: Fn(&DateTime<Utc>) -> Result<String, String> + Send + Sync + 'static,
    {
        DateStrategy::Custom(Arc::new(formatter))
    }
}

impl fmt::Debug for DateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateStrategy::Deferred => f.write_str("Deferred"),
            DateStrategy::SecondsSince1970 => f.write_str("SecondsSince1970"),
            DateStrategy::MillisecondsSince1970 => f.write_str("MillisecondsSince1970"),
            DateStrategy::Iso8601 => f.write_str("Iso8601"),
            DateStrategy::Formatted(pattern) => f.debug_tuple("Formatted").field(pattern).finish(),
            DateStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Clone, Default)]
pub enum DataStrategy {
    /// Standard alphabet, padded.
    #[default]
    Base64,
    /// Lowercase hexadecimal.
    Hex,
    Custom(DataFormatter),
}

impl DataStrategy {
    pub fn custom<F>(formatter: F) -> Self
    where
        F: Fn(&[u8]) -> Result<String, String> + Send + Sync + 'static,
    {
        DataStrategy::Custom(Arc::new(formatter))
    }
}

impl fmt::Debug for DataStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataStrategy::Base64 => f.write_str("Base64"),
            DataStrategy::Hex => f.write_str("Hex"),
            DataStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// What to do with `NaN` and the infinities, which have no decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NonConformingFloat {
    #[default]
    Fail,
    Substitute {
        positive_infinity: String,
        negative_infinity: String,
        nan: String,
    },
}

impl NonConformingFloat {
    pub fn substitute(
        positive_infinity: impl Into<String>,
        negative_infinity: impl Into<String>,
        nan: impl Into<String>,
    ) -> Self {
        NonConformingFloat::Substitute {
            positive_infinity: positive_infinity.into(),
            negative_infinity: negative_infinity.into(),
            nan: nan.into(),
        }
    }
}

/// Immutable set of options read by every stage of an encode call.
///
/// A configuration is built once through [`EncoderConfigBuilder`] and then
/// only ever borrowed, so one instance can serve any number of concurrent
/// encode calls.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    delimiter: u8,
    quote: u8,
    terminator: Terminator,
    header: HeaderStrategy,
    date_strategy: DateStrategy,
    data_strategy: DataStrategy,
    float_strategy: NonConformingFloat,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            terminator: Terminator::Lf,
            header: HeaderStrategy::FirstLine,
            date_strategy: DateStrategy::Deferred,
            data_strategy: DataStrategy::Base64,
            float_strategy: NonConformingFloat::Fail,
        }
    }
}

impl EncoderConfig {
    pub fn builder() -> EncoderConfigBuilder {
        EncoderConfigBuilder::new()
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn quote(&self) -> u8 {
        self.quote
    }

    pub fn terminator(&self) -> Terminator {
        self.terminator
    }

    pub fn header(&self) -> &HeaderStrategy {
        &self.header
    }

    pub fn date_strategy(&self) -> &DateStrategy {
        &self.date_strategy
    }

    pub fn data_strategy(&self) -> &DataStrategy {
        &self.data_strategy
    }

    pub fn float_strategy(&self) -> &NonConformingFloat {
        &self.float_strategy
    }
}

/// Builder for [`EncoderConfig`].
///
/// # Examples
///
/// ```
/// use csv_flatten::core::config::{EncoderConfig, HeaderStrategy, NonConformingFloat, Terminator};
///
/// let config = EncoderConfig::builder()
///     .delimiter(b';')
///     .terminator(Terminator::Crlf)
///     .header(HeaderStrategy::None)
///     .float_strategy(NonConformingFloat::substitute("inf", "-inf", "nan"))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.delimiter(), b';');
/// ```
#[derive(Debug, Default)]
pub struct EncoderConfigBuilder {
    config: EncoderConfig,
}

impl EncoderConfigBuilder {
    pub fn new() -> EncoderConfigBuilder {
        EncoderConfigBuilder {
            config: EncoderConfig::default(),
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> EncoderConfigBuilder {
        self.config.delimiter = delimiter;
        self
    }

    pub fn quote(mut self, quote: u8) -> EncoderConfigBuilder {
        self.config.quote = quote;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> EncoderConfigBuilder {
        self.config.terminator = terminator;
        self
    }

    pub fn header(mut self, header: HeaderStrategy) -> EncoderConfigBuilder {
        self.config.header = header;
        self
    }

    /// Shortcut for `header(HeaderStrategy::FirstLine)` / `header(HeaderStrategy::None)`.
    pub fn has_headers(self, yes: bool) -> EncoderConfigBuilder {
        self.header(if yes {
            HeaderStrategy::FirstLine
        } else {
            HeaderStrategy::None
        })
    }

    pub fn date_strategy(mut self, strategy: DateStrategy) -> EncoderConfigBuilder {
        self.config.date_strategy = strategy;
        self
    }

    pub fn data_strategy(mut self, strategy: DataStrategy) -> EncoderConfigBuilder {
        self.config.data_strategy = strategy;
        self
    }

    pub fn float_strategy(mut self, strategy: NonConformingFloat) -> EncoderConfigBuilder {
        self.config.float_strategy = strategy;
        self
    }

    pub fn build(self) -> EncodeResult<EncoderConfig> {
        let config = self.config;

        for (name, byte) in [("delimiter", config.delimiter), ("quote", config.quote)] {
            if !byte.is_ascii() || byte == b'\n' || byte == b'\r' {
                return Err(EncodeError::Config(format!(
                    "{} must be an ASCII character other than a line break, got {:#04x}",
                    name, byte
                )));
            }
        }

        if config.delimiter == config.quote {
            return Err(EncodeError::Config("delimiter and quote must differ".to_string()));
        }

        if let Terminator::Byte(byte) = config.terminator {
            if !byte.is_ascii() || byte == config.delimiter || byte == config.quote {
                return Err(EncodeError::Config(format!(
                    "terminator {:#04x} must be ASCII and differ from the delimiter and quote",
                    byte
                )));
            }
        }

        if let DateStrategy::Formatted(pattern) = &config.date_strategy {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(EncodeError::Config(format!("invalid date pattern '{}'", pattern)));
            }
        }

        if let HeaderStrategy::Explicit(names) = &config.header {
            if names.is_empty() {
                return Err(EncodeError::Config(
                    "explicit header needs at least one name".to_string(),
                ));
            }
        }

        Ok(config)
    }
}
