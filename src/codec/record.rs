use std::any::type_name;
use std::sync::Arc;

use log::warn;

use crate::codec::{HeaderColumns, RowDecoder, RowEncoder};
use crate::config::Config;
use crate::schema::RecordSchema;

/// Typed-record codec.
///
/// Decoding populates a fresh `T::default()` per row through the schema's
/// bindings; encoding reads each record field by field in registration
/// order. The codec never fails on data: a column absent from the header, a
/// row shorter than a resolved index, an empty cell or a cell its parser
/// rejects all leave the field at its default. Rejected cells are reported
/// through `log::warn!` when `log_errors` is set.
pub struct RecordCodec<T> {
    schema: Arc<RecordSchema<T>>,
    config: Config,
    // binding index -> cell index, resolved once per operation
    positions: Vec<Option<usize>>,
}

impl<T> RecordCodec<T> {
    pub fn new(schema: Arc<RecordSchema<T>>, config: Config) -> Self {
        Self {
            schema,
            config,
            positions: Vec::new(),
        }
    }
}

impl<T: Default> RowDecoder for RecordCodec<T> {
    type Item = T;

    fn bind(&mut self, header: &HeaderColumns) {
        self.positions = if self.config.include_header {
            self.schema
                .bindings()
                .iter()
                .map(|binding| header.position(binding.name()))
                .collect()
        } else {
            // Header-less input: cells map to bindings positionally, in
            // registration order.
            (0..self.schema.len()).map(Some).collect()
        };
    }

    fn decode(&self, cells: &[&str]) -> T {
        let mut record = T::default();
        for (binding, position) in self.schema.bindings().iter().zip(&self.positions) {
            // Column absent from the header: leave the field at its default.
            let Some(index) = *position else { continue };
            // Row shorter than expected: same skip policy as a missing column.
            let Some(cell) = cells.get(index) else { continue };
            // Empty cell counts as missing, not as a conversion failure.
            if cell.is_empty() {
                continue;
            }
            if let Err(error) = binding.assign(&mut record, cell) {
                if self.config.log_errors {
                    warn!(
                        "conversion failed for column '{}' of {}: {}",
                        binding.name(),
                        type_name::<T>(),
                        error
                    );
                }
            }
        }
        record
    }
}

impl<T> RowEncoder for RecordCodec<T> {
    type Item = T;

    fn header_known(&self) -> bool {
        true
    }

    fn prepare(&mut self, _first: &T) {}

    fn header_row(&self) -> Vec<String> {
        self.schema
            .bindings()
            .iter()
            .map(|binding| binding.name().to_owned())
            .collect()
    }

    fn encode(&self, item: &T) -> Vec<String> {
        self.schema
            .bindings()
            .iter()
            .map(|binding| binding.format(item))
            .collect()
    }
}
