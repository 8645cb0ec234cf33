//! Streams records from a file asynchronously and stops early through a
//! cancellation token.
//!
//! Run with: `cargo run --example async_cancellation --features async`

use std::env::temp_dir;

use rowstream::pipeline::{AsyncRecordReaderBuilder, AsyncRecordWriterBuilder};
use rowstream::schema::RecordSchema;
use rowstream::StreamError;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Reading {
    sensor: String,
    value: f64,
}

#[tokio::main]
async fn main() -> Result<(), StreamError> {
    env_logger::init();

    let schema = RecordSchema::builder()
        .column("Sensor", |r: &Reading| r.sensor.clone(), |r, v| r.sensor = v)
        .column("Value", |r: &Reading| r.value, |r, v| r.value = v)
        .build()?;

    let path = temp_dir().join("readings.csv");
    let mut writer = AsyncRecordWriterBuilder::new(schema.clone())
        .from_path(&path)
        .await?;
    for index in 0..1000 {
        writer
            .write(&Reading {
                sensor: format!("sensor-{}", index % 4),
                value: f64::from(index) / 10.0,
            })
            .await?;
    }
    writer.close().await?;

    let token = CancellationToken::new();
    let mut reader = AsyncRecordReaderBuilder::new(schema)
        .batch_size(100)
        .cancel_token(token.clone())
        .from_path(&path)
        .await?;

    let mut seen = 0usize;
    while let Some(reading) = reader.next_row().await {
        let reading = reading?;
        seen += 1;
        if reading.value > 25.0 {
            // Takes effect at the next batch boundary; the current batch is
            // still yielded.
            token.cancel();
        }
    }

    println!("stopped after {seen} rows");

    Ok(())
}
