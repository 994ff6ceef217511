use std::{io::Write, path::Path};

use log::{debug, error};
use serde::Serialize;

use crate::{
    core::{
        config::{
            DataStrategy, DateStrategy, EncoderConfig, EncoderConfigBuilder, HeaderStrategy,
            NonConformingFloat, Terminator,
        },
        walker,
    },
    error::{EncodeError, EncodeResult},
    sink::{CsvSink, Destination},
};

/// Encodes serializable values as CSV.
///
/// The encoder only holds its [`EncoderConfig`]; every call builds its own
/// walker and sink, so one encoder can be shared between threads.
///
/// # Examples
///
/// ```
/// use csv_flatten::CsvEncoder;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Row<'a> {
///     city: &'a str,
///     country: &'a str,
///     #[serde(rename = "popcount")]
///     population: u64,
/// }
///
/// let encoder = CsvEncoder::default();
/// let rows = vec![
///     Row { city: "Boston", country: "United States", population: 4628910 },
///     Row { city: "Concord", country: "United States", population: 42695 },
/// ];
///
/// let data = encoder.encode_to_string(&rows).unwrap();
/// assert_eq!(data, "\
/// city,country,popcount
/// Boston,United States,4628910
/// Concord,United States,42695
/// ");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvEncoder {
    config: EncoderConfig,
}

impl CsvEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn builder() -> CsvEncoderBuilder {
        CsvEncoderBuilder::new()
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encodes `value` into an in-memory buffer.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> EncodeResult<Vec<u8>> {
        let mut sink = CsvSink::new(Destination::buffer(), &self.config);
        let rows = walker::walk(value, &self.config, &mut sink)?;
        let bytes = sink.into_inner()?.close()?.unwrap_or_default();

        debug!("Encoded {} row(s) into a {} byte buffer", rows, bytes.len());
        Ok(bytes)
    }

    pub fn encode_to_string<T: Serialize + ?Sized>(&self, value: &T) -> EncodeResult<String> {
        let bytes = self.encode(value)?;
        String::from_utf8(bytes).map_err(|err| EncodeError::Custom(err.to_string()))
    }

    /// Encodes `value` into the file at `path`, truncating it first.
    ///
    /// Rows are written as they are completed. The file is flushed and closed
    /// whether or not the encode succeeds; on failure it holds whatever rows
    /// were written before the error.
    pub fn encode_to_path<T, P>(&self, value: &T, path: P) -> EncodeResult<()>
    where
        T: Serialize + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let destination = Destination::create(path).inspect_err(|err| {
            error!("Failed to create CSV file {}: {}", path.display(), err);
        })?;
        debug!("Encoding into {} {}", destination.kind(), path.display());

        let mut sink = CsvSink::new(destination, &self.config);
        let walked = walker::walk(value, &self.config, &mut sink);
        let closed = sink
            .into_inner()
            .and_then(|destination| destination.close().map_err(Into::into));

        match walked {
            Ok(rows) => {
                closed?;
                debug!("Encoded {} row(s) into {}", rows, path.display());
                Ok(())
            }
            Err(err) => {
                error!("Encoding into {} aborted: {}", path.display(), err);
                if let Err(close_err) = closed {
                    error!("Failed to close {}: {}", path.display(), close_err);
                }
                Err(err)
            }
        }
    }

    /// Encodes `value` into any writer and hands the writer back, flushed.
    pub fn encode_to_writer<T, W>(&self, value: &T, wtr: W) -> EncodeResult<W>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        let mut sink = CsvSink::new(wtr, &self.config);
        let rows = walker::walk(value, &self.config, &mut sink)?;
        debug!("Encoded {} row(s) into writer", rows);
        sink.into_inner()
    }
}

/// Builder for [`CsvEncoder`], forwarding to [`EncoderConfigBuilder`].
#[derive(Debug, Default)]
pub struct CsvEncoderBuilder {
    config: EncoderConfigBuilder,
}

impl CsvEncoderBuilder {
    pub fn new() -> CsvEncoderBuilder {
        CsvEncoderBuilder {
            config: EncoderConfigBuilder::new(),
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> CsvEncoderBuilder {
        self.config = self.config.delimiter(delimiter);
        self
    }

    pub fn quote(mut self, quote: u8) -> CsvEncoderBuilder {
        self.config = self.config.quote(quote);
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> CsvEncoderBuilder {
        self.config = self.config.terminator(terminator);
        self
    }

    pub fn has_headers(mut self, yes: bool) -> CsvEncoderBuilder {
        self.config = self.config.has_headers(yes);
        self
    }

    pub fn header(mut self, header: HeaderStrategy) -> CsvEncoderBuilder {
        self.config = self.config.header(header);
        self
    }

    pub fn date_strategy(mut self, strategy: DateStrategy) -> CsvEncoderBuilder {
        self.config = self.config.date_strategy(strategy);
        self
    }

    pub fn data_strategy(mut self, strategy: DataStrategy) -> CsvEncoderBuilder {
        self.config = self.config.data_strategy(strategy);
        self
    }

    pub fn float_strategy(mut self, strategy: NonConformingFloat) -> CsvEncoderBuilder {
        self.config = self.config.float_strategy(strategy);
        self
    }

    pub fn build(self) -> EncodeResult<CsvEncoder> {
        Ok(CsvEncoder::new(self.config.build()?))
    }
}

/// Encodes `value` with the default configuration.
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> EncodeResult<Vec<u8>> {
    CsvEncoder::default().encode(value)
}

/// Encodes `value` with the default configuration, as a `String`.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> EncodeResult<String> {
    CsvEncoder::default().encode_to_string(value)
}
