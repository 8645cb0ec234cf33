use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio_util::sync::CancellationToken;

use crate::codec::{DictionaryCodec, HeaderColumns, RecordCodec, RowDecoder};
use crate::config::Config;
use crate::error::{StreamError, StreamResult};
use crate::pipeline::PipelineState;
use crate::schema::RecordSchema;

/// A suspending reader producing typed records.
pub type AsyncRecordReader<R, T> = AsyncStreamReader<R, RecordCodec<T>>;

/// A suspending reader producing
/// [`RowDictionary`](crate::codec::RowDictionary) rows.
pub type AsyncDictReader<R> = AsyncStreamReader<R, DictionaryCodec>;

/// Suspending counterpart of [`StreamReader`](crate::pipeline::StreamReader).
///
/// Yields control at each line read instead of blocking, with otherwise
/// identical semantics: same state machine, same batching, same
/// degrade-to-default data policies, same single-pass output in input
/// order.
///
/// Cancellation is cooperative: an optional [`CancellationToken`] is
/// checked before each batch fill, so a batch whose lines were already read
/// is still yielded to completion before the reader drains.
pub struct AsyncStreamReader<R, C>
where
    R: AsyncRead + Unpin,
    C: RowDecoder,
{
    lines: Lines<BufReader<R>>,
    codec: C,
    config: Config,
    batch: VecDeque<String>,
    state: PipelineState,
    // stream failure hit mid-fill, delivered after the rows read before it
    failure: Option<StreamError>,
    cancel: Option<CancellationToken>,
}

impl<R, C> AsyncStreamReader<R, C>
where
    R: AsyncRead + Unpin,
    C: RowDecoder,
{
    fn new(source: R, codec: C, config: Config, cancel: Option<CancellationToken>) -> Self {
        let batch = VecDeque::with_capacity(config.batch_size);
        Self {
            lines: BufReader::new(source).lines(),
            codec,
            config,
            batch,
            state: PipelineState::NotStarted,
            failure: None,
            cancel,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Pulls the next decoded row, suspending on I/O.
    ///
    /// Returns `None` once the stream is drained or cancellation was
    /// observed at a batch boundary.
    pub async fn next_row(&mut self) -> Option<StreamResult<C::Item>> {
        if self.state == PipelineState::NotStarted {
            if let Err(error) = self.read_header().await {
                return Some(Err(error));
            }
        }
        if self.batch.is_empty() {
            if matches!(self.state, PipelineState::Drained | PipelineState::Closed) {
                return None;
            }
            if self.failure.is_none() {
                if let Some(token) = &self.cancel {
                    if token.is_cancelled() {
                        debug!("cancellation observed at batch boundary");
                        self.state = PipelineState::Drained;
                        return None;
                    }
                }
                self.fill_batch().await;
            }
            if self.batch.is_empty() {
                if let Some(error) = self.failure.take() {
                    self.state = PipelineState::Drained;
                    return Some(Err(error));
                }
                return None;
            }
            self.state = PipelineState::Streaming;
        }
        let line = self.batch.pop_front()?;
        let cells: Vec<&str> = line.split(self.config.column_delimiter.as_str()).collect();
        Some(Ok(self.codec.decode(&cells)))
    }

    /// Drains the remaining rows into a vector, pre-sized from
    /// `initial_capacity`. Stops at the first stream failure.
    pub async fn read_all(&mut self) -> StreamResult<Vec<C::Item>> {
        let mut items = Vec::with_capacity(self.config.initial_capacity);
        while let Some(item) = self.next_row().await {
            items.push(item?);
        }
        Ok(items)
    }

    async fn read_header(&mut self) -> StreamResult<()> {
        if !self.config.include_header {
            self.codec.bind(&HeaderColumns::default());
            self.state = PipelineState::HeaderRead;
            return Ok(());
        }
        match self.lines.next_line().await {
            Ok(Some(line)) => {
                let header = HeaderColumns::parse(&line, &self.config.column_delimiter);
                debug!("header read: {} columns", header.len());
                self.codec.bind(&header);
                self.state = PipelineState::HeaderRead;
            }
            Ok(None) => {
                self.codec.bind(&HeaderColumns::default());
                self.state = PipelineState::Drained;
            }
            Err(error) => {
                self.state = PipelineState::Drained;
                return Err(error.into());
            }
        }
        Ok(())
    }

    async fn fill_batch(&mut self) {
        debug!("filling batch of up to {} lines", self.config.batch_size);
        while self.batch.len() < self.config.batch_size {
            match self.lines.next_line().await {
                Ok(Some(line)) => self.batch.push_back(line),
                Ok(None) => {
                    if self.batch.is_empty() {
                        self.state = PipelineState::Drained;
                    }
                    break;
                }
                Err(error) => {
                    // Lines already buffered precede the failure in the
                    // input, so they are yielded before it.
                    self.failure = Some(error.into());
                    break;
                }
            }
        }
    }
}

/// Builder for suspending typed-record readers.
pub struct AsyncRecordReaderBuilder<T> {
    schema: Arc<RecordSchema<T>>,
    config: Config,
    cancel: Option<CancellationToken>,
}

impl<T: Default> AsyncRecordReaderBuilder<T> {
    pub fn new(schema: Arc<RecordSchema<T>>) -> Self {
        Self {
            schema,
            config: Config::default(),
            cancel: None,
        }
    }

    /// Sets the string cells are split on. Defaults to a single comma.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.column_delimiter = delimiter.into();
        self
    }

    /// Whether the first line of input is a header. When disabled, no line
    /// is consumed as a header and columns bind positionally.
    pub fn include_header(mut self, yes: bool) -> Self {
        self.config.include_header = yes;
        self
    }

    /// Number of raw lines buffered per read cycle.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Pre-allocation hint for accumulating collections.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Whether rejected cells produce `log::warn!` diagnostics.
    pub fn log_errors(mut self, yes: bool) -> Self {
        self.config.log_errors = yes;
        self
    }

    /// Token checked between batch fills; cancelling stops the reader at
    /// the next batch boundary.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Builds a reader over any async source.
    pub fn from_reader<R: AsyncRead + Unpin>(
        self,
        source: R,
    ) -> StreamResult<AsyncRecordReader<R, T>> {
        self.config.validate()?;
        let codec = RecordCodec::new(self.schema, self.config.clone());
        Ok(AsyncStreamReader::new(source, codec, self.config, self.cancel))
    }

    /// Builds a reader over a file.
    pub async fn from_path(
        self,
        path: impl AsRef<Path>,
    ) -> StreamResult<AsyncRecordReader<File, T>> {
        let file = File::open(path).await?;
        self.from_reader(file)
    }
}

/// Builder for suspending dictionary readers. The header line is always
/// expected, as with the synchronous builder.
#[derive(Default)]
pub struct AsyncDictReaderBuilder {
    config: Config,
    cancel: Option<CancellationToken>,
}

impl AsyncDictReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the string cells are split on. Defaults to a single comma.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.column_delimiter = delimiter.into();
        self
    }

    /// Number of raw lines buffered per read cycle.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Pre-allocation hint for accumulating collections.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Token checked between batch fills.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Builds a reader over any async source.
    pub fn from_reader<R: AsyncRead + Unpin>(self, source: R) -> StreamResult<AsyncDictReader<R>> {
        self.config.validate()?;
        Ok(AsyncStreamReader::new(
            source,
            DictionaryCodec::new(),
            self.config,
            self.cancel,
        ))
    }

    /// Builds a reader over a file.
    pub async fn from_path(self, path: impl AsRef<Path>) -> StreamResult<AsyncDictReader<File>> {
        let file = File::open(path).await?;
        self.from_reader(file)
    }
}
