#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # rowstream

 A toolkit for streaming delimited flat-file records: line-by-line readers
 and writers that bind columns to the fields of your own types, with
 configurable batching and both blocking and suspending execution.

 ## Core Concepts

 - **Schema:** a cached set of column bindings for one record type, built
   once through [`schema::RecordSchemaBuilder`] by registering
   `(column name, getter, setter)` triples. Registration order drives
   header order on write.
 - **Codec:** the paired decode/encode logic for one row representation —
   typed records ([`codec::RecordCodec`]) or ordered name/value maps
   ([`codec::DictionaryCodec`] over [`codec::RowDictionary`]). The two are
   distinct constructor surfaces; nothing is inferred from type shape.
 - **Pipeline:** the orchestration layer driving a codec over a character
   stream ([`pipeline::StreamReader`], [`pipeline::StreamWriter`] and, with
   the `async` feature, their suspending counterparts). Readers are lazy,
   single-pass and yield rows in input order.

 Data problems never abort a stream: a column missing from the header, a
 row shorter than expected or a cell its parser rejects all leave the
 target field at its default value, optionally reported through the
 [`log`] facade. Only misconfiguration and I/O failures surface as
 [`error::StreamError`].

 The format is deliberately naive: one logical row per line, cells split
 on the configured delimiter string, no quoting or escaping of embedded
 delimiters or line breaks. Lines are `\n` terminated on write.

 ## Features

 | **Feature** | **Description**                                                    |
 |-------------|--------------------------------------------------------------------|
 | async       | Suspending readers/writers on tokio, with cooperative cancellation |
 | chrono      | Date and datetime cell parsers                                     |
 | full        | Enables all available features                                     |

 ## Getting Started

```rust
use rowstream::pipeline::{RecordReaderBuilder, RecordWriterBuilder};
use rowstream::schema::RecordSchema;

#[derive(Debug, Default, PartialEq)]
struct Person {
    name: String,
    age: u32,
}

fn main() -> Result<(), rowstream::StreamError> {
    let schema = RecordSchema::builder()
        .column("Name", |p: &Person| p.name.clone(), |p, v| p.name = v)
        .column("Age", |p: &Person| p.age, |p, v| p.age = v)
        .build()?;

    let input = "Name;Age\nJohn;30\nJane;25";
    let mut reader = RecordReaderBuilder::new(schema.clone())
        .delimiter(";")
        .from_reader(input.as_bytes())?;
    let people = reader.read_all()?;
    assert_eq!(people.len(), 2);
    assert_eq!(people[0], Person { name: "John".to_string(), age: 30 });

    let mut writer = RecordWriterBuilder::new(schema)
        .delimiter(";")
        .from_writer(Vec::new())?;
    writer.write_all(&people)?;
    let text = String::from_utf8(writer.into_inner()?).unwrap();
    assert_eq!(text, "Name;Age\nJohn;30\nJane;25\n");

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
 -   MIT license

 at your option.
*/

/// Typed cell parsers and formatters.
pub mod cell;

/// Row codecs for typed records and dictionaries.
pub mod codec;

/// Shared pipeline configuration.
pub mod config;

/// Error types for the crate.
pub mod error;

/// Streaming readers and writers.
pub mod pipeline;

/// Column binding schemas for record types.
pub mod schema;

pub use config::Config;
pub use error::{StreamError, StreamResult};
