use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::codec::{DictionaryCodec, RecordCodec, RowEncoder};
use crate::config::Config;
use crate::error::{StreamError, StreamResult};
use crate::pipeline::PipelineState;
use crate::schema::RecordSchema;

/// A writer consuming typed records.
pub type RecordWriter<W, T> = StreamWriter<W, RecordCodec<T>>;

/// A writer consuming [`RowDictionary`](crate::codec::RowDictionary) rows.
pub type DictWriter<W> = StreamWriter<W, DictionaryCodec>;

/// Writer driving a codec over a buffered character sink, one delimited
/// line per row.
///
/// The header (when configured) is emitted before the first data line:
/// immediately for record writers, whose column order comes from the
/// schema, and on the first row written for dictionary writers, whose
/// column order comes from that row's keys. Lines are `\n` terminated and
/// carry no trailing delimiter.
///
/// # Examples
///
/// ```
/// use rowstream::codec::RowDictionary;
/// use rowstream::pipeline::DictWriterBuilder;
///
/// let mut writer = DictWriterBuilder::new()
///     .delimiter(";")
///     .from_writer(Vec::new())
///     .unwrap();
///
/// let row: RowDictionary = [("id", Some("1")), ("name", Some("John"))]
///     .into_iter()
///     .collect();
/// writer.write(&row).unwrap();
///
/// let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(text, "id;name\n1;John\n");
/// ```
pub struct StreamWriter<W, C>
where
    W: Write,
    C: RowEncoder,
{
    sink: BufWriter<W>,
    codec: C,
    config: Config,
    state: PipelineState,
    // reused per line
    line: String,
}

impl<W, C> StreamWriter<W, C>
where
    W: Write,
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
    pub fn write(&mut self, item: &C::Item) -> StreamResult<()> {
        if self.state == PipelineState::NotStarted {
            self.codec.prepare(item);
        }
        self.ensure_header()?;
        let cells = self.codec.encode(item);
        self.write_line(&cells)?;
        self.state = PipelineState::Streaming;
        Ok(())
    }

    /// Writes every row of an iterator.
    pub fn write_all<'a, I>(&mut self, items: I) -> StreamResult<()>
    where
        I: IntoIterator<Item = &'a C::Item>,
        C::Item: 'a,
    {
        for item in items {
            self.write(item)?;
        }
        Ok(())
    }

    /// Flushes the internal buffer to the underlying sink.
    pub fn flush(&mut self) -> StreamResult<()> {
        self.sink.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying sink.
    ///
    /// For a record writer with headers enabled this also emits the header
    /// when no row was ever written, so an empty input still produces a
    /// header line.
    pub fn into_inner(mut self) -> StreamResult<W> {
        self.ensure_header()?;
        self.sink.flush()?;
        self.sink
            .into_inner()
            .map_err(|error| StreamError::Stream(error.into_error()))
    }

    /// Flushes and releases the writer, emitting a pending header the same
    /// way as [`into_inner`](Self::into_inner).
    pub fn close(mut self) -> StreamResult<()> {
        self.ensure_header()?;
        self.state = PipelineState::Closed;
        self.sink.flush()?;
        Ok(())
    }

    fn ensure_header(&mut self) -> StreamResult<()> {
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
        self.write_line(&names)?;
        self.state = PipelineState::HeaderRead;
        Ok(())
    }

    fn write_line(&mut self, cells: &[String]) -> StreamResult<()> {
        self.line.clear();
        for (index, cell) in cells.iter().enumerate() {
            if index > 0 {
                self.line.push_str(&self.config.column_delimiter);
            }
            self.line.push_str(cell);
        }
        self.line.push('\n');
        self.sink.write_all(self.line.as_bytes())?;
        Ok(())
    }
}

/// Builder for typed-record writers.
///
/// # Examples
///
/// ```
/// use rowstream::pipeline::RecordWriterBuilder;
/// use rowstream::schema::RecordSchema;
///
/// #[derive(Default)]
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
/// let mut writer = RecordWriterBuilder::new(schema)
///     .lowercase_headers(true)
///     .from_writer(Vec::new())
///     .unwrap();
///
/// writer.write(&Person { name: "John".to_string(), age: 30 }).unwrap();
///
/// let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(text, "name,age\nJohn,30\n");
/// ```
pub struct RecordWriterBuilder<T> {
    schema: Arc<RecordSchema<T>>,
    config: Config,
}

impl<T> RecordWriterBuilder<T> {
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

    /// Forces header names to lower-case on output. Decoding is unaffected:
    /// readers still match the original column names.
    pub fn lowercase_headers(mut self, yes: bool) -> Self {
        self.config.lowercase_headers_on_write = yes;
        self
    }

    /// Pre-allocation hint for the line buffer.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Builds a writer over any `Write` sink.
    pub fn from_writer<W: Write>(self, sink: W) -> StreamResult<RecordWriter<W, T>> {
        self.config.validate()?;
        let codec = RecordCodec::new(self.schema, self.config.clone());
        Ok(StreamWriter::new(sink, codec, self.config))
    }

    /// Builds a writer creating (or truncating) a file.
    pub fn from_path(self, path: impl AsRef<Path>) -> StreamResult<RecordWriter<File, T>> {
        let file = File::create(path)?;
        self.from_writer(file)
    }
}

/// Builder for dictionary writers.
#[derive(Default)]
pub struct DictWriterBuilder {
    config: Config,
}

impl DictWriterBuilder {
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

    /// Builds a writer over any `Write` sink.
    pub fn from_writer<W: Write>(self, sink: W) -> StreamResult<DictWriter<W>> {
        self.config.validate()?;
        Ok(StreamWriter::new(sink, DictionaryCodec::new(), self.config))
    }

    /// Builds a writer creating (or truncating) a file.
    pub fn from_path(self, path: impl AsRef<Path>) -> StreamResult<DictWriter<File>> {
        let file = File::create(path)?;
        self.from_writer(file)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{DictWriterBuilder, RecordWriterBuilder};
    use crate::codec::RowDictionary;
    use crate::schema::{RecordSchema, RecordSchemaBuilder};

    #[derive(Default)]
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
    fn emits_header_then_rows() {
        let mut writer = RecordWriterBuilder::new(person_schema())
            .delimiter(";")
            .from_writer(Vec::new())
            .unwrap();

        writer
            .write(&Person {
                name: "John".to_string(),
                age: 30,
            })
            .unwrap();
        writer
            .write(&Person {
                name: "Jane".to_string(),
                age: 25,
            })
            .unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "Name;Age\nJohn;30\nJane;25\n");
    }

    #[test]
    fn empty_record_input_still_emits_the_header() {
        let writer = RecordWriterBuilder::new(person_schema())
            .from_writer(Vec::new())
            .unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "Name,Age\n");
    }

    #[test]
    fn header_can_be_disabled() {
        let mut writer = RecordWriterBuilder::new(person_schema())
            .include_header(false)
            .from_writer(Vec::new())
            .unwrap();
        writer
            .write(&Person {
                name: "John".to_string(),
                age: 30,
            })
            .unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "John,30\n");
    }

    #[test]
    fn dictionary_writer_with_no_rows_emits_nothing() {
        let writer = DictWriterBuilder::new().from_writer(Vec::new()).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn later_rows_follow_the_first_rows_key_order() {
        let mut writer = DictWriterBuilder::new().from_writer(Vec::new()).unwrap();

        let first: RowDictionary =
            [("id", Some("1")), ("name", Some("John"))].into_iter().collect();
        let second: RowDictionary =
            [("name", Some("Jane")), ("id", Some("2"))].into_iter().collect();

        writer.write_all([&first, &second]).unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "id,name\n1,John\n2,Jane\n");
    }
}
