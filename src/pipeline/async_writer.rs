use std::path::Path;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::codec::{DictionaryCodec, RecordCodec, RowEncoder};
use crate::config::Config;
use crate::error::StreamResult;
use crate::pipeline::PipelineState;
use crate::schema::RecordSchema;

/// A suspending writer consuming typed records.
pub type AsyncRecordWriter<W, T> = AsyncStreamWriter<W, RecordCodec<T>>;

/// A suspending writer consuming
/// [`RowDictionary`](crate::codec::RowDictionary) rows.
pub type AsyncDictWriter<W> = AsyncStreamWriter<W, DictionaryCodec>;

/// Suspending counterpart of [`StreamWriter`](crate::pipeline::StreamWriter):
/// same header policy, line format and lifecycle, yielding at each write
/// instead of blocking.
pub struct AsyncStreamWriter<W, C>
where
    W: AsyncWrite + Unpin,
    C: RowEncoder,
{
    sink: BufWriter<W>,
    codec: C,
    config: Config,
    state: PipelineState,
    line: String,
}

impl<W, C> AsyncStreamWriter<W, C>
where
    W: AsyncWrite + Unpin,
    C: RowEncoder,
{
    fn new(sink: W, codec: C, config: Config) -> Self {
        let line = String::with_capacity(config.initial_capacity);
        Self {
            sink: BufWriter::new(sink),
            codec,
            config,
            state: PipelineState::NotStarted,
            line,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Writes one row, emitting the header first if configured.
    pub async fn write(&mut self, item: &C::Item) -> StreamResult<()> {
        if self.state == PipelineState::NotStarted {
            self.codec.prepare(item);
        }
        self.ensure_header().await?;
        let cells = self.codec.encode(item);
        self.write_line(&cells).await?;
        self.state = PipelineState::Streaming;
        Ok(())
    }

    /// Writes every row of an iterator.
    pub async fn write_all<'a, I>(&mut self, items: I) -> StreamResult<()>
    where
        I: IntoIterator<Item = &'a C::Item>,
        C::Item: 'a,
    {
        for item in items {
            self.write(item).await?;
        }
        Ok(())
    }

    /// Flushes the internal buffer to the underlying sink.
    pub async fn flush(&mut self) -> StreamResult<()> {
        self.sink.flush().await?;
        Ok(())
    }

    /// Emits a pending header (record writers only), flushes and shuts the
    /// sink down.
    pub async fn close(mut self) -> StreamResult<()> {
        self.ensure_header().await?;
        self.state = PipelineState::Closed;
        self.sink.flush().await?;
        self.sink.shutdown().await?;
        Ok(())
    }

    /// Flushes and returns the underlying sink.
    pub async fn into_inner(mut self) -> StreamResult<W> {
        self.ensure_header().await?;
        self.sink.flush().await?;
        Ok(self.sink.into_inner())
    }

    async fn ensure_header(&mut self) -> StreamResult<()> {
        if self.state != PipelineState::NotStarted
            || !self.config.include_header
            || !self.codec.header_known()
        {
            return Ok(());
        }
        let mut names = self.codec.header_row();
        if self.config.lowercase_headers_on_write {
            for name in &mut names {
                *name = name.to_lowercase();
            }
        }
        self.write_line(&names).await?;
        self.state = PipelineState::HeaderRead;
        Ok(())
    }

    async fn write_line(&mut self, cells: &[String]) -> StreamResult<()> {
        self.line.clear();
        for (index, cell) in cells.iter().enumerate() {
            if index > 0 {
                self.line.push_str(&self.config.column_delimiter);
            }
            self.line.push_str(cell);
        }
        self.line.push('\n');
        self.sink.write_all(self.line.as_bytes()).await?;
        Ok(())
    }
}

/// Builder for suspending typed-record writers.
pub struct AsyncRecordWriterBuilder<T> {
    schema: Arc<RecordSchema<T>>,
    config: Config,
}

impl<T> AsyncRecordWriterBuilder<T> {
    pub fn new(schema: Arc<RecordSchema<T>>) -> Self {
        Self {
            schema,
            config: Config::default(),
        }
    }

    /// Sets the string cells are joined with. Defaults to a single comma.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.column_delimiter = delimiter.into();
        self
    }

    /// Whether a header line is emitted before the first row.
    pub fn include_header(mut self, yes: bool) -> Self {
        self.config.include_header = yes;
        self
    }

    /// Forces header names to lower-case on output.
    pub fn lowercase_headers(mut self, yes: bool) -> Self {
        self.config.lowercase_headers_on_write = yes;
        self
    }

    /// Pre-allocation hint for the line buffer.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Builds a writer over any async sink.
    pub fn from_writer<W: AsyncWrite + Unpin>(
        self,
        sink: W,
    ) -> StreamResult<AsyncRecordWriter<W, T>> {
        self.config.validate()?;
        let codec = RecordCodec::new(self.schema, self.config.clone());
        Ok(AsyncStreamWriter::new(sink, codec, self.config))
    }

    /// Builds a writer creating (or truncating) a file.
    pub async fn from_path(
        self,
        path: impl AsRef<Path>,
    ) -> StreamResult<AsyncRecordWriter<File, T>> {
        let file = File::create(path).await?;
        self.from_writer(file)
    }
}

/// Builder for suspending dictionary writers.
#[derive(Default)]
pub struct AsyncDictWriterBuilder {
    config: Config,
}

impl AsyncDictWriterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the string cells are joined with. Defaults to a single comma.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.column_delimiter = delimiter.into();
        self
    }

    /// Whether a header line is emitted before the first row.
    pub fn include_header(mut self, yes: bool) -> Self {
        self.config.include_header = yes;
        self
    }

    /// Forces header names to lower-case on output.
    pub fn lowercase_headers(mut self, yes: bool) -> Self {
        self.config.lowercase_headers_on_write = yes;
        self
    }

    /// Pre-allocation hint for the line buffer.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Builds a writer over any async sink.
    pub fn from_writer<W: AsyncWrite + Unpin>(self, sink: W) -> StreamResult<AsyncDictWriter<W>> {
        self.config.validate()?;
        Ok(AsyncStreamWriter::new(
            sink,
            DictionaryCodec::new(),
            self.config,
        ))
    }

    /// Builds a writer creating (or truncating) a file.
    pub async fn from_path(self, path: impl AsRef<Path>) -> StreamResult<AsyncDictWriter<File>> {
        let file = File::create(path).await?;
        self.from_writer(file)
    }
}
