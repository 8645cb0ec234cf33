//! Streams schema-less rows from one delimiter convention to another
//! without declaring a record type.
//!
//! Run with: `cargo run --example dictionary_stream`

use rowstream::pipeline::{DictReaderBuilder, DictWriterBuilder};
use rowstream::StreamError;

fn main() -> Result<(), StreamError> {
    env_logger::init();

    let input = "id;name;city
1;John;Boston
2;Jane;Concord
3;;Cambridge";

    let reader = DictReaderBuilder::new()
        .delimiter(";")
        .from_reader(input.as_bytes())?;

    let mut writer = DictWriterBuilder::new()
        .delimiter(",")
        .from_writer(Vec::new())?;

    for row in reader {
        let row = row?;
        // Absent and empty cells are the same state.
        if row.get("name").is_some() {
            writer.write(&row)?;
        }
    }

    let text = String::from_utf8(writer.into_inner()?).expect("utf-8 output");
    println!("{text}");

    Ok(())
}
