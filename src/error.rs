use thiserror::Error;

/// Convenient alias for pipeline results.
pub type StreamResult<T> = Result<T, StreamError>;

#[derive(Error, Debug)]
/// Pipeline error
///
/// Per-cell conversion failures and short rows are deliberately not errors:
/// they degrade to default values (see the codec modules) and never abort a
/// stream. Only misconfiguration and I/O failures of the underlying stream
/// surface here.
pub enum StreamError {
    /// Structurally invalid setup, detected before any I/O happens.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Failure of the underlying character stream, propagated unmodified.
    #[error("stream failure: {0}")]
    Stream(#[from] std::io::Error),
}
