//! Row sinks: the last stage of an encode call.
//!
//! The walker hands every completed row to a [`RowSink`]. The provided
//! implementation, [`csv_sink::CsvSink`], serializes rows with the `csv`
//! crate so quoting follows RFC 4180: a cell containing the delimiter, the
//! quote character or a line break is wrapped in quotes and inner quotes
//! are doubled.
//!
//! # Destinations
//!
//! [`destination::Destination`] is the tagged union of places the encoder
//! knows how to write to:
//!
//! - `Buffer`: a growable in-memory byte vector, returned to the caller.
//! - `File`: a truncated file written incrementally, so memory use stays
//!   bounded by the sink's internal buffer and one row.
//!
//! Any other `std::io::Write` can be used through
//! [`crate::CsvEncoder::encode_to_writer`].
use crate::error::EncodeResult;

/// A module providing the destination enum (buffer or file).
pub mod destination;

/// A module providing the CSV row serializer.
pub mod csv_sink;

pub use csv_sink::CsvSink;
pub use destination::Destination;

/// Receives rows in output order.
pub trait RowSink {
    /// Writes the header row. Called at most once, before any data row.
    fn write_header(&mut self, names: &[String]) -> EncodeResult<()>;

    fn write_row(&mut self, cells: &[String]) -> EncodeResult<()>;

    fn flush(&mut self) -> EncodeResult<()> {
        Ok(())
    }
}
