//! Row codecs: the paired decode/encode logic for one row representation.
//!
//! Two representations are supported, each behind its own codec so the
//! choice is made at construction time rather than inferred from type shape:
//!
//! 1. **[`RecordCodec`]**: typed records bound through a
//!    [`RecordSchema`](crate::schema::RecordSchema).
//! 2. **[`DictionaryCodec`]**: schema-less rows as ordered
//!    [`RowDictionary`] maps keyed by header column name.
//!
//! A codec is driven by a pipeline (see [`crate::pipeline`]): the decoding
//! half is bound to the header once per operation and then turns split rows
//! into items; the encoding half fixes its column order from the schema or
//! the first row and then turns items back into cells.

mod dictionary;
mod record;

pub use dictionary::{DictionaryCodec, RowDictionary};
pub use record::RecordCodec;

/// The ordered list of column names for one operation.
///
/// On read this is parsed from the first line of input; on write it is
/// derived from the schema's bindings or the first dictionary's keys. It is
/// computed once per operation and consulted per row to resolve
/// column-to-index positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderColumns {
    names: Vec<String>,
}

impl HeaderColumns {
    /// Splits a raw header line on the configured delimiter. Column names
    /// are trimmed; cells of data rows are not.
    pub fn parse(line: &str, delimiter: &str) -> Self {
        Self {
            names: line.split(delimiter).map(|name| name.trim().to_owned()).collect(),
        }
    }

    /// Index of a column name; the first occurrence wins when a name is
    /// duplicated.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    /// Column names in input order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Decoding half of a codec.
pub trait RowDecoder {
    /// The row representation this codec produces.
    type Item;

    /// Called exactly once per operation, after the header line has been
    /// read. For header-less input the header is empty and columns resolve
    /// positionally.
    fn bind(&mut self, header: &HeaderColumns);

    /// Decodes one split row into an item.
    ///
    /// Infallible by design: a missing column, a row shorter than expected
    /// or a malformed cell all degrade to the field's default value.
    fn decode(&self, cells: &[&str]) -> Self::Item;
}

/// Encoding half of a codec.
pub trait RowEncoder {
    /// The row representation this codec consumes.
    type Item;

    /// Whether the header row can be produced before any item has been
    /// seen. True for schema-backed codecs; false for dictionaries, whose
    /// column order comes from the first row.
    fn header_known(&self) -> bool;

    /// Called once with the first item written; fixes column order for the
    /// rest of the operation.
    fn prepare(&mut self, first: &Self::Item);

    /// Header names in output order, before any lowercasing.
    fn header_row(&self) -> Vec<String>;

    /// One item's cells in output order; absent values become empty
    /// strings.
    fn encode(&self, item: &Self::Item) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::HeaderColumns;

    #[test]
    fn header_names_are_trimmed() {
        let header = HeaderColumns::parse(" Name ; Age ", ";");
        assert_eq!(header.names(), ["Name", "Age"]);
    }

    #[test]
    fn first_occurrence_wins_for_duplicates() {
        let header = HeaderColumns::parse("a,b,a", ",");
        assert_eq!(header.position("a"), Some(0));
        assert_eq!(header.position("missing"), None);
    }

    #[test]
    fn multi_character_delimiters_are_supported() {
        let header = HeaderColumns::parse("a||b||c", "||");
        assert_eq!(header.len(), 3);
    }
}
