//! Reads typed records from an in-memory CSV string, filters them, and
//! writes the survivors back out with lowercased headers.
//!
//! Run with: `cargo run --example record_roundtrip`

use rowstream::pipeline::{RecordReaderBuilder, RecordWriterBuilder};
use rowstream::schema::RecordSchema;
use rowstream::StreamError;

#[derive(Debug, Default)]
struct Car {
    year: u16,
    make: String,
    model: String,
}

fn main() -> Result<(), StreamError> {
    env_logger::init();

    let schema = RecordSchema::builder()
        .column("Year", |c: &Car| c.year, |c, v| c.year = v)
        .column("Make", |c: &Car| c.make.clone(), |c, v| c.make = v)
        .column("Model", |c: &Car| c.model.clone(), |c, v| c.model = v)
        .build()?;

    let csv = "Year,Make,Model
1948,Porsche,356
1995,Peugeot,205
2021,Mazda,CX-30
1967,Ford,Mustang";

    let reader = RecordReaderBuilder::new(schema.clone())
        .batch_size(2)
        .from_reader(csv.as_bytes())?;

    let mut writer = RecordWriterBuilder::new(schema)
        .delimiter(";")
        .lowercase_headers(true)
        .from_writer(Vec::new())?;

    for car in reader {
        let car = car?;
        if car.year < 2000 {
            writer.write(&car)?;
        }
    }

    let text = String::from_utf8(writer.into_inner()?).expect("utf-8 output");
    println!("{text}");

    Ok(())
}
