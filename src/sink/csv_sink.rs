use std::io::Write;

use csv::{QuoteStyle, Writer, WriterBuilder};

use crate::{
    core::config::EncoderConfig,
    error::{EncodeError, EncodeResult},
    sink::RowSink,
};

/// Serializes rows as CSV into any [`Write`] destination.
pub struct CsvSink<W: Write> {
    writer: Writer<W>,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(wtr: W, config: &EncoderConfig) -> CsvSink<W> {
        let writer = WriterBuilder::new()
            .flexible(false)
            .has_headers(false)
            .delimiter(config.delimiter())
            .quote(config.quote())
            .double_quote(true)
            .quote_style(QuoteStyle::Necessary)
            .terminator(config.terminator().to_csv())
            .from_writer(wtr);

        CsvSink {
            writer,
            header_written: false,
        }
    }

    /// Flushes buffered rows and returns the underlying destination.
    pub fn into_inner(self) -> EncodeResult<W> {
        self.writer
            .into_inner()
            .map_err(|error| EncodeError::Io(error.into_error()))
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_header(&mut self, names: &[String]) -> EncodeResult<()> {
        if self.header_written {
            return Err(EncodeError::Structural {
                key_path: "<header>".to_string(),
                message: "header row already written".to_string(),
            });
        }
        self.writer.write_record(names)?;
        self.header_written = true;
        Ok(())
    }

    fn write_row(&mut self, cells: &[String]) -> EncodeResult<()> {
        self.writer.write_record(cells)?;
        Ok(())
    }

    fn flush(&mut self) -> EncodeResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::core::config::Terminator;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn rows_are_joined_by_delimiter_and_terminator() -> Result<(), Box<dyn Error>> {
        let config = EncoderConfig::default();
        let mut sink = CsvSink::new(vec![], &config);

        sink.write_header(&cells(&["city", "pop"]))?;
        sink.write_row(&cells(&["Boston", "4628910"]))?;
        sink.write_row(&cells(&["Concord", "42695"]))?;

        let data = String::from_utf8(sink.into_inner()?)?;
        assert_eq!(data, "city,pop\nBoston,4628910\nConcord,42695\n");
        Ok(())
    }

    #[test]
    fn cells_needing_quotes_are_quoted() -> Result<(), Box<dyn Error>> {
        let config = EncoderConfig::default();
        let mut sink = CsvSink::new(vec![], &config);

        sink.write_row(&cells(&["a,b", "say \"hi\"", "two\nlines", "plain"]))?;

        let data = String::from_utf8(sink.into_inner()?)?;
        assert_eq!(data, "\"a,b\",\"say \"\"hi\"\"\",\"two\nlines\",plain\n");
        Ok(())
    }

    #[test]
    fn custom_delimiter_and_terminator() -> Result<(), Box<dyn Error>> {
        let config = EncoderConfig::builder()
            .delimiter(b';')
            .terminator(Terminator::Crlf)
            .build()?;
        let mut sink = CsvSink::new(vec![], &config);

        sink.write_row(&cells(&["1", "a;b", "c,d"]))?;

        let data = String::from_utf8(sink.into_inner()?)?;
        assert_eq!(data, "1;\"a;b\";c,d\r\n");
        Ok(())
    }

    #[test]
    fn header_is_written_at_most_once() {
        let config = EncoderConfig::default();
        let mut sink = CsvSink::new(vec![], &config);

        sink.write_header(&cells(&["a"])).unwrap();
        assert!(sink.write_header(&cells(&["a"])).is_err());
    }

    #[test]
    fn rows_with_a_different_width_are_rejected() {
        let config = EncoderConfig::default();
        let mut sink = CsvSink::new(vec![], &config);

        sink.write_row(&cells(&["1", "2"])).unwrap();
        assert!(sink.write_row(&cells(&["1"])).is_err());
    }
}
