mod common;

use std::io::{self, Read};

use common::{person_schema, sample_people};
use rowstream::pipeline::{RecordReaderBuilder, RecordWriterBuilder};
use rowstream::schema::RecordSchemaBuilder;
use rowstream::StreamError;

/// Yields a few well-formed lines, then fails with an I/O error.
struct FailingSource {
    data: io::Cursor<Vec<u8>>,
    failed: bool,
}

impl FailingSource {
    fn new(text: &str) -> Self {
        Self {
            data: io::Cursor::new(text.as_bytes().to_vec()),
            failed: false,
        }
    }
}

impl Read for FailingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.data.read(buf)?;
        if read == 0 && !self.failed {
            self.failed = true;
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection lost"));
        }
        Ok(read)
    }
}

#[test]
fn empty_column_name_is_rejected_at_build_time() {
    let result = RecordSchemaBuilder::new()
        .column(
            "",
            |p: &common::Person| p.name.clone(),
            |p, v| p.name = v,
        )
        .build();
    assert!(matches!(result, Err(StreamError::Configuration(_))));
}

#[test]
fn zero_batch_size_is_rejected_before_any_io() {
    let result = RecordReaderBuilder::new(person_schema())
        .batch_size(0)
        .from_reader("Name,Age,Email".as_bytes());
    assert!(matches!(result, Err(StreamError::Configuration(_))));
}

#[test]
fn empty_delimiter_is_rejected_before_any_io() {
    let result = RecordWriterBuilder::new(person_schema())
        .delimiter("")
        .from_writer(Vec::new());
    assert!(matches!(result, Err(StreamError::Configuration(_))));
}

#[test]
fn missing_input_file_surfaces_as_stream_failure() {
    let result = RecordReaderBuilder::new(person_schema())
        .from_path("/nonexistent/people.csv");
    assert!(matches!(result, Err(StreamError::Stream(_))));
}

#[test]
fn malformed_cells_never_abort_the_stream() {
    let input = "Name,Age,Email\nJohn,not-a-number,john@example.com\nJane,25,";
    let mut reader = RecordReaderBuilder::new(person_schema())
        .log_errors(false)
        .from_reader(input.as_bytes())
        .unwrap();

    let people = reader.read_all().unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[0].name, "John");
    assert_eq!(people[0].age, 0);
    assert_eq!(people[1].age, 25);
}

#[test]
fn rows_buffered_before_a_failure_are_yielded_before_it() {
    // The batch is larger than the input, so the failure lands in the same
    // fill cycle as the rows preceding it.
    let source = FailingSource::new("Name,Age,Email\nJohn,30,\nJane,25,\n");
    let mut reader = RecordReaderBuilder::new(person_schema())
        .batch_size(8)
        .from_reader(source)
        .unwrap();

    let first = reader.next().unwrap().unwrap();
    assert_eq!(first.name, "John");
    let second = reader.next().unwrap().unwrap();
    assert_eq!(second.name, "Jane");

    // The failure comes after every row that precedes it in the input,
    // and nothing follows it.
    let failure = reader.next().unwrap();
    assert!(matches!(failure, Err(StreamError::Stream(_))));
    assert!(reader.next().is_none());
}

#[test]
fn io_failure_mid_stream_aborts_and_drains() {
    let source = FailingSource::new("Name,Age,Email\nJohn,30,\n");
    let mut reader = RecordReaderBuilder::new(person_schema())
        .batch_size(1)
        .from_reader(source)
        .unwrap();

    let first = reader.next().unwrap().unwrap();
    assert_eq!(first.name, "John");

    let failure = reader.next().unwrap();
    assert!(matches!(failure, Err(StreamError::Stream(_))));

    // No partial-result recovery: the reader stays drained.
    assert!(reader.next().is_none());
}

#[test]
fn close_flushes_every_buffered_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let mut writer = RecordWriterBuilder::new(person_schema())
        .from_path(&path)
        .unwrap();
    writer.write_all(&sample_people()).unwrap();
    writer.close().unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 4);
}
