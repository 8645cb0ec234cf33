use crate::codec::{HeaderColumns, RowDecoder, RowEncoder};

/// Ordered column-name to cell-value map for schema-less rows.
///
/// Insertion order is preserved and drives column order on write. Absent
/// and empty cells are the same state, `None`; there is deliberately no
/// "empty but present" value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowDictionary {
    entries: Vec<(String, Option<String>)>,
}

impl RowDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Inserts or replaces a value. A replaced key keeps its original
    /// position.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The cell value for a key, `None` when the key is unknown or the cell
    /// was absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for RowDictionary
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        let mut row = RowDictionary::new();
        for (key, value) in iter {
            row.insert(key, value.map(Into::into));
        }
        row
    }
}

/// Schema-less codec: header columns become dictionary keys directly.
///
/// Decoding zips the header with the cells positionally; an index beyond
/// the cell array and an empty cell both map to `None`. Encoding fixes its
/// key order from the first row written; later rows are emitted in that
/// order, with keys they lack as empty cells.
#[derive(Default)]
pub struct DictionaryCodec {
    header: HeaderColumns,
    key_order: Vec<String>,
}

impl DictionaryCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowDecoder for DictionaryCodec {
    type Item = RowDictionary;

    fn bind(&mut self, header: &HeaderColumns) {
        self.header = header.clone();
    }

    fn decode(&self, cells: &[&str]) -> RowDictionary {
        let mut row = RowDictionary::with_capacity(self.header.len());
        for (index, name) in self.header.names().iter().enumerate() {
            let value = cells
                .get(index)
                .filter(|cell| !cell.is_empty())
                .map(|cell| (*cell).to_owned());
            row.insert(name.clone(), value);
        }
        row
    }
}

impl RowEncoder for DictionaryCodec {
    type Item = RowDictionary;

    fn header_known(&self) -> bool {
        !self.key_order.is_empty()
    }

    fn prepare(&mut self, first: &RowDictionary) {
        self.key_order = first.keys().map(str::to_owned).collect();
    }

    fn header_row(&self) -> Vec<String> {
        self.key_order.clone()
    }

    fn encode(&self, item: &RowDictionary) -> Vec<String> {
        self.key_order
            .iter()
            .map(|key| item.get(key).unwrap_or_default().to_owned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{DictionaryCodec, RowDictionary};
    use crate::codec::{HeaderColumns, RowDecoder, RowEncoder};

    #[test]
    fn insertion_order_is_preserved() {
        let row: RowDictionary =
            [("b", Some("2")), ("a", Some("1"))].into_iter().collect();
        assert_eq!(row.keys().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(row.get("a"), Some("1"));
    }

    #[test]
    fn replacing_a_value_keeps_the_key_position() {
        let mut row = RowDictionary::new();
        row.insert("a", Some("1".to_string()));
        row.insert("b", Some("2".to_string()));
        row.insert("a", Some("3".to_string()));
        assert_eq!(row.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(row.get("a"), Some("3"));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn decode_zips_header_with_cells() {
        let mut codec = DictionaryCodec::new();
        codec.bind(&HeaderColumns::parse("id;name", ";"));
        let row = codec.decode(&["1", "John"]);
        assert_eq!(row.get("id"), Some("1"));
        assert_eq!(row.get("name"), Some("John"));
    }

    #[test]
    fn short_rows_and_empty_cells_become_absent() {
        let mut codec = DictionaryCodec::new();
        codec.bind(&HeaderColumns::parse("a,b,c", ","));
        let row = codec.decode(&["1", ""]);
        assert_eq!(row.get("a"), Some("1"));
        assert_eq!(row.get("b"), None);
        assert_eq!(row.get("c"), None);
        assert!(row.contains_key("c"));
    }

    #[test]
    fn encode_uses_first_row_key_order() {
        let mut codec = DictionaryCodec::new();
        assert!(!codec.header_known());

        let first: RowDictionary =
            [("id", Some("1")), ("name", Some("John"))].into_iter().collect();
        codec.prepare(&first);

        assert!(codec.header_known());
        assert_eq!(codec.header_row(), ["id", "name"]);
        assert_eq!(codec.encode(&first), ["1", "John"]);

        // A later row missing a key yields an empty cell for it.
        let second: RowDictionary = [("name", Some("Jane"))].into_iter().collect();
        assert_eq!(codec.encode(&second), ["", "Jane"]);
    }
}
