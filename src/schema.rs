//! Column bindings: the association between logical header names and the
//! fields of a record type.
//!
//! Bindings are registered explicitly through [`RecordSchemaBuilder`], one
//! `(column name, getter, setter)` triple per field. The cell conversion a
//! binding performs is fixed at registration time by the field's
//! [`CellValue`] type, and registration order drives header order on write.
//!
//! Build the schema once per record type and share the resulting
//! [`RecordSchema`] (it is handed out as an `Arc`) across every pipeline
//! that reads or writes the type.
//!
//! # Examples
//!
//! ```
//! use rowstream::schema::RecordSchema;
//!
//! #[derive(Default)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let schema = RecordSchema::builder()
//!     .column("Name", |p: &Person| p.name.clone(), |p, v| p.name = v)
//!     .column("Age", |p: &Person| p.age, |p, v| p.age = v)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.column_names().collect::<Vec<_>>(), ["Name", "Age"]);
//! ```

use std::sync::Arc;

use crate::cell::{CellError, CellValue};
use crate::error::{StreamError, StreamResult};

type FormatFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type AssignFn<T> = Box<dyn Fn(&mut T, &str) -> Result<(), CellError> + Send + Sync>;

/// One column: a logical header name paired with a typed getter/setter for
/// a field of `T`.
pub struct ColumnBinding<T> {
    name: String,
    format: FormatFn<T>,
    assign: AssignFn<T>,
}

impl<T> ColumnBinding<T> {
    /// The column name as it must appear in the header row.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn format(&self, record: &T) -> String {
        (self.format)(record)
    }

    pub(crate) fn assign(&self, record: &mut T, cell: &str) -> Result<(), CellError> {
        (self.assign)(record, cell)
    }
}

/// The cached binding set for one record type.
pub struct RecordSchema<T> {
    bindings: Vec<ColumnBinding<T>>,
}

impl<T> RecordSchema<T> {
    /// Starts an empty schema builder.
    pub fn builder() -> RecordSchemaBuilder<T> {
        RecordSchemaBuilder::new()
    }

    /// All bindings, in registration order.
    pub fn bindings(&self) -> &[ColumnBinding<T>] {
        &self.bindings
    }

    /// Column names in registration order; this is the header emitted on
    /// write (before any lowercasing).
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|binding| binding.name())
    }

    /// Number of bound columns.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the schema has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Builder registering `(column name, getter, setter)` triples for `T`.
pub struct RecordSchemaBuilder<T> {
    bindings: Vec<ColumnBinding<T>>,
}

impl<T> Default for RecordSchemaBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordSchemaBuilder<T> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Registers one column.
    ///
    /// `V` selects the typed parser used for the field; the getter produces
    /// the value written out and the setter stores the value decoded from a
    /// cell. Registration order becomes header order on write.
    pub fn column<V, G, S>(mut self, name: impl Into<String>, get: G, set: S) -> Self
    where
        V: CellValue + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.bindings.push(ColumnBinding {
            name: name.into(),
            format: Box::new(move |record| get(record).format_cell()),
            assign: Box::new(move |record, cell| {
                V::parse_cell(cell).map(|value| set(record, value))
            }),
        });
        self
    }

    /// Finishes the schema.
    ///
    /// Validation is eager: an empty column name is a configuration error
    /// here, not at first use.
    pub fn build(self) -> StreamResult<Arc<RecordSchema<T>>> {
        if self.bindings.iter().any(|binding| binding.name.is_empty()) {
            return Err(StreamError::Configuration(
                "column name must not be empty".to_string(),
            ));
        }
        Ok(Arc::new(RecordSchema {
            bindings: self.bindings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::RecordSchema;
    use crate::error::StreamError;

    #[derive(Default)]
    struct Sample {
        id: u32,
        label: String,
    }

    #[test]
    fn registration_order_is_preserved() {
        let schema = RecordSchema::builder()
            .column("id", |s: &Sample| s.id, |s, v| s.id = v)
            .column("label", |s: &Sample| s.label.clone(), |s, v| s.label = v)
            .build()
            .unwrap();

        assert_eq!(schema.column_names().collect::<Vec<_>>(), ["id", "label"]);
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn empty_column_name_fails_eagerly() {
        let result = RecordSchema::builder()
            .column("", |s: &Sample| s.id, |s, v| s.id = v)
            .build();

        assert!(matches!(result, Err(StreamError::Configuration(_))));
    }

    #[test]
    fn bindings_round_trip_one_field() {
        let schema = RecordSchema::builder()
            .column("id", |s: &Sample| s.id, |s, v| s.id = v)
            .build()
            .unwrap();

        let mut sample = Sample::default();
        schema.bindings()[0].assign(&mut sample, "17").unwrap();
        assert_eq!(sample.id, 17);
        assert_eq!(schema.bindings()[0].format(&sample), "17");
    }
}
