use crate::error::{StreamError, StreamResult};

/// Settings shared, read-only, by every row of one read or write operation.
///
/// A `Config` is assembled through the pipeline builders and is immutable
/// once the reader or writer has been constructed.
#[derive(Debug, Clone)]
pub struct Config {
    /// String used to split cells on read and join them on write.
    pub column_delimiter: String,
    /// Whether a header line is emitted on write and expected on read.
    pub include_header: bool,
    /// Forces header names to lower-case on output only; decoding still
    /// matches the original column names.
    pub lowercase_headers_on_write: bool,
    /// Number of raw lines buffered per internal read cycle. Purely an
    /// allocation knob: batching never reorders, drops or duplicates rows.
    pub batch_size: usize,
    /// Pre-allocation hint for accumulating collections.
    pub initial_capacity: usize,
    /// Whether per-cell conversion failures produce `log` diagnostics.
    pub log_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            column_delimiter: ",".to_string(),
            include_header: true,
            lowercase_headers_on_write: false,
            batch_size: 64,
            initial_capacity: 16,
            log_errors: true,
        }
    }
}

impl Config {
    pub(crate) fn validate(&self) -> StreamResult<()> {
        if self.column_delimiter.is_empty() {
            return Err(StreamError::Configuration(
                "column delimiter must not be empty".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(StreamError::Configuration(
                "batch size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
