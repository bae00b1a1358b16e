//! Timing row emission as headerless CSV.

use std::io;

use csv::WriterBuilder;
use serde::Serialize;

use crate::harness::HarnessError;

/// One timing observation: `label,benchmark,query_id,value`.
#[derive(Debug, Clone, Serialize)]
pub struct TimingRow {
    /// Engine or configuration label.
    pub label: String,
    /// Benchmark family name.
    pub benchmark: String,
    /// Query identifier, usually the file stem.
    pub query_id: String,
    /// Observed timing value.
    pub value: f64,
}

/// CSV emitter for [`TimingRow`]s. Rows carry no header so output from
/// several runs concatenates cleanly.
pub struct RowWriter<W: io::Write> {
    inner: csv::Writer<W>,
}

impl<W: io::Write> RowWriter<W> {
    /// Wraps `out` in a headerless CSV writer.
    pub fn new(out: W) -> Self {
        let inner = WriterBuilder::new().has_headers(false).from_writer(out);
        Self { inner }
    }

    /// Appends one row.
    pub fn write_row(&mut self, row: &TimingRow) -> Result<(), HarnessError> {
        self.inner.serialize(row)?;
        Ok(())
    }

    /// Flushes buffered rows to the underlying stream.
    pub fn flush(&mut self) -> Result<(), HarnessError> {
        self.inner.flush()?;
        Ok(())
    }
}
