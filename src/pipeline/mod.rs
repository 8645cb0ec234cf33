//! Streaming pipelines: drive a codec over a character stream, line by
//! line, with batching.
//!
//! Readers produce a finite, single-pass, non-restartable sequence of
//! decoded rows in input order; writers consume rows and emit delimited
//! lines. Both exist in a fully synchronous form and, behind the `async`
//! feature, in a cooperatively suspending form that yields at each I/O
//! boundary.
//!
//! Each pipeline instance owns its underlying stream exclusively; sharing
//! one stream across two instances is not guarded against. The stream is
//! released when the pipeline is dropped or explicitly closed, on every
//! exit path.

mod reader;
mod writer;

#[cfg(feature = "async")]
mod async_reader;
#[cfg(feature = "async")]
mod async_writer;

pub use reader::{
    DictReader, DictReaderBuilder, RecordReader, RecordReaderBuilder, StreamReader,
};
pub use writer::{
    DictWriter, DictWriterBuilder, RecordWriter, RecordWriterBuilder, StreamWriter,
};

#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub use async_reader::{
    AsyncDictReader, AsyncDictReaderBuilder, AsyncRecordReader, AsyncRecordReaderBuilder,
    AsyncStreamReader,
};
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub use async_writer::{
    AsyncDictWriter, AsyncDictWriterBuilder, AsyncRecordWriter, AsyncRecordWriterBuilder,
    AsyncStreamWriter,
};

/// Lifecycle of one pipeline instance.
///
/// Readers move `NotStarted -> HeaderRead -> Streaming -> Drained`; writers
/// move `NotStarted -> HeaderRead -> Streaming -> Closed`. Once a reader is
/// `Drained` it never produces again; a fresh pipeline must be constructed
/// to iterate a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    HeaderRead,
    Streaming,
    Drained,
    Closed,
}
