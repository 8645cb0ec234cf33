use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::codec::{DictionaryCodec, HeaderColumns, RecordCodec, RowDecoder};
use crate::config::Config;
use crate::error::{StreamError, StreamResult};
use crate::pipeline::PipelineState;
use crate::schema::RecordSchema;

/// A reader producing typed records from a delimited stream.
pub type RecordReader<R, T> = StreamReader<BufReader<R>, RecordCodec<T>>;

/// A reader producing [`RowDictionary`](crate::codec::RowDictionary) rows.
pub type DictReader<R> = StreamReader<BufReader<R>, DictionaryCodec>;

/// Lazy, single-pass reader driving a codec over buffered lines.
///
/// Implements `Iterator`; each pulled item is decoded from one input line,
/// in input order. Up to `batch_size` raw lines are buffered per internal
/// read cycle purely to amortize allocation: batching never reorders, drops
/// or duplicates rows. An I/O failure of the underlying stream aborts the
/// operation at its position in the input: rows read before it are still
/// yielded, then the failure as `Err`, then nothing. Data problems never
/// surface as errors.
///
/// # Examples
///
/// ```
/// use rowstream::pipeline::DictReaderBuilder;
///
/// let data = "id,name\n1,John\n2,Jane\n";
/// let reader = DictReaderBuilder::new()
///     .from_reader(data.as_bytes())
///     .unwrap();
///
/// let rows: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0].get("name"), Some("John"));
/// ```
pub struct StreamReader<B, C>
where
    B: BufRead,
    C: RowDecoder,
{
    lines: Lines<B>,
    codec: C,
    config: Config,
    batch: VecDeque<String>,
    state: PipelineState,
    // stream failure hit mid-fill, delivered after the rows read before it
    failure: Option<StreamError>,
}

impl<B, C> StreamReader<B, C>
where
    B: BufRead,
    C: RowDecoder,
{
    fn new(source: B, codec: C, config: Config) -> Self {
        let batch = VecDeque::with_capacity(config.batch_size);
        Self {
            lines: source.lines(),
            codec,
            config,
            batch,
            state: PipelineState::NotStarted,
            failure: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Drains the remaining rows into a vector, pre-sized from
    /// `initial_capacity`. Stops at the first stream failure.
    pub fn read_all(&mut self) -> StreamResult<Vec<C::Item>> {
        let mut items = Vec::with_capacity(self.config.initial_capacity);
        for item in self {
            items.push(item?);
        }
        Ok(items)
    }

    fn read_header(&mut self) -> StreamResult<()> {
        if !self.config.include_header {
            // Header-less input is a real mode: no line is consumed and the
            // codec binds positionally.
            self.codec.bind(&HeaderColumns::default());
            self.state = PipelineState::HeaderRead;
            return Ok(());
        }
        match self.lines.next() {
            Some(Ok(line)) => {
                let header = HeaderColumns::parse(&line, &self.config.column_delimiter);
                debug!("header read: {} columns", header.len());
                self.codec.bind(&header);
                self.state = PipelineState::HeaderRead;
            }
            Some(Err(error)) => {
                self.state = PipelineState::Drained;
                return Err(error.into());
            }
            None => {
                // Empty stream: empty header set, nothing to yield.
                self.codec.bind(&HeaderColumns::default());
                self.state = PipelineState::Drained;
            }
        }
        Ok(())
    }

    fn fill_batch(&mut self) {
        debug!("filling batch of up to {} lines", self.config.batch_size);
        while self.batch.len() < self.config.batch_size {
            match self.lines.next() {
                Some(Ok(line)) => self.batch.push_back(line),
                Some(Err(error)) => {
                    // Lines already buffered precede the failure in the
                    // input, so they are yielded before it.
                    self.failure = Some(error.into());
                    break;
                }
                None => {
                    if self.batch.is_empty() {
                        self.state = PipelineState::Drained;
                    }
                    break;
                }
            }
        }
    }

    fn decode_line(&self, line: &str) -> C::Item {
        let cells: Vec<&str> = line.split(self.config.column_delimiter.as_str()).collect();
        self.codec.decode(&cells)
    }
}

impl<B, C> Iterator for StreamReader<B, C>
where
    B: BufRead,
    C: RowDecoder,
{
    type Item = StreamResult<C::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == PipelineState::NotStarted {
            if let Err(error) = self.read_header() {
                return Some(Err(error));
            }
        }
        if self.batch.is_empty() {
            if matches!(self.state, PipelineState::Drained | PipelineState::Closed) {
                return None;
            }
            if self.failure.is_none() {
                self.fill_batch();
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
        Some(Ok(self.decode_line(&line)))
    }
}

/// Builder for typed-record readers.
///
/// # Examples
///
/// ```
/// use rowstream::pipeline::RecordReaderBuilder;
/// use rowstream::schema::RecordSchema;
///
/// #[derive(Debug, Default)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let schema = RecordSchema::builder()
///     .column("Name", |p: &Person| p.name.clone(), |p, v| p.name = v)
///     .column("Age", |p: &Person| p.age, |p, v| p.age = v)
///     .build()
///     .unwrap();
///
/// let data = "Name;Age\nJohn;30\nJane;25";
/// let reader = RecordReaderBuilder::new(schema)
///     .delimiter(";")
///     .from_reader(data.as_bytes())
///     .unwrap();
///
/// let people: Vec<Person> = reader.collect::<Result<_, _>>().unwrap();
/// assert_eq!(people.len(), 2);
/// assert_eq!(people[0].name, "John");
/// assert_eq!(people[0].age, 30);
/// ```
pub struct RecordReaderBuilder<T> {
    schema: Arc<RecordSchema<T>>,
    config: Config,
}

impl<T: Default> RecordReaderBuilder<T> {
    pub fn new(schema: Arc<RecordSchema<T>>) -> Self {
        Self {
            schema,
            config: Config::default(),
        }
    }

    /// Sets the string cells are split on. Defaults to a single comma.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.column_delimiter = delimiter.into();
        self
    }

    /// Whether the first line of input is a header. When disabled, no line
    /// is consumed as a header and columns bind positionally in schema
    /// registration order.
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

    /// Builds a reader over any `Read` source.
    pub fn from_reader<R: Read>(self, source: R) -> StreamResult<RecordReader<R, T>> {
        self.config.validate()?;
        let codec = RecordCodec::new(self.schema, self.config.clone());
        Ok(StreamReader::new(BufReader::new(source), codec, self.config))
    }

    /// Builds a reader over a file.
    pub fn from_path(self, path: impl AsRef<Path>) -> StreamResult<RecordReader<File, T>> {
        let file = File::open(path)?;
        self.from_reader(file)
    }
}

/// Builder for dictionary readers.
///
/// Dictionary rows take their keys from the header, so this builder has no
/// `include_header` switch: the header line is always expected.
#[derive(Default)]
pub struct DictReaderBuilder {
    config: Config,
}

impl DictReaderBuilder {
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

    /// Builds a reader over any `Read` source.
    pub fn from_reader<R: Read>(self, source: R) -> StreamResult<DictReader<R>> {
        self.config.validate()?;
        Ok(StreamReader::new(
            BufReader::new(source),
            DictionaryCodec::new(),
            self.config,
        ))
    }

    /// Builds a reader over a file.
    pub fn from_path(self, path: impl AsRef<Path>) -> StreamResult<DictReader<File>> {
        let file = File::open(path)?;
        self.from_reader(file)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{DictReaderBuilder, RecordReaderBuilder};
    use crate::error::StreamError;
    use crate::pipeline::PipelineState;
    use crate::schema::{RecordSchema, RecordSchemaBuilder};

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        name: String,
        age: u32,
    }

    fn person_schema() -> Arc<RecordSchema<Person>> {
        RecordSchemaBuilder::new()
            .column("Name", |p: &Person| p.name.clone(), |p, v| p.name = v)
            .column("Age", |p: &Person| p.age, |p, v| p.age = v)
            .build()
            .unwrap()
    }

    #[test]
    fn reads_records_lazily_in_input_order() {
        let data = "Name;Age\nJohn;30\nJane;25";
        let mut reader = RecordReaderBuilder::new(person_schema())
            .delimiter(";")
            .from_reader(data.as_bytes())
            .unwrap();

        assert_eq!(reader.state(), PipelineState::NotStarted);

        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.name, "John");
        assert_eq!(first.age, 30);

        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.name, "Jane");

        assert!(reader.next().is_none());
        assert_eq!(reader.state(), PipelineState::Drained);
        // Single pass: once drained, the reader stays drained.
        assert!(reader.next().is_none());
    }

    #[test]
    fn empty_stream_drains_without_error() {
        let mut reader = RecordReaderBuilder::new(person_schema())
            .from_reader("".as_bytes())
            .unwrap();
        assert!(reader.next().is_none());
        assert_eq!(reader.state(), PipelineState::Drained);
    }

    #[test]
    fn headerless_input_keeps_its_first_row() {
        let data = "John,30\nJane,25";
        let mut reader = RecordReaderBuilder::new(person_schema())
            .include_header(false)
            .from_reader(data.as_bytes())
            .unwrap();

        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.name, "John");
        assert_eq!(first.age, 30);
        assert_eq!(reader.read_all().unwrap().len(), 1);
    }

    #[test]
    fn zero_batch_size_is_a_configuration_error() {
        let result = RecordReaderBuilder::new(person_schema())
            .batch_size(0)
            .from_reader("Name,Age".as_bytes());
        assert!(matches!(result, Err(StreamError::Configuration(_))));
    }

    #[test]
    fn dictionary_reader_normalizes_empty_cells() {
        let data = "a,b\n1,\n";
        let mut reader = DictReaderBuilder::new().from_reader(data.as_bytes()).unwrap();
        let row = reader.next().unwrap().unwrap();
        assert_eq!(row.get("a"), Some("1"));
        assert_eq!(row.get("b"), None);
    }
}
