//! The typed parser table: conversions between one cell of delimited text
//! and a typed field value.
//!
//! The set of [`CellValue`] implementations is finite and explicit. The
//! conversion a column uses is fixed when its binding is registered (see
//! [`crate::schema`]), and a failed conversion is a value, never a panic:
//! the codecs turn it into a diagnostic and leave the field at its default.

use thiserror::Error;

/// A single cell failed to convert to its declared type.
#[derive(Debug, Error)]
#[error("cannot convert {value:?} to {expected}")]
pub struct CellError {
    /// The offending cell text.
    pub value: String,
    /// Human-readable name of the target type.
    pub expected: &'static str,
}

impl CellError {
    fn new(value: &str, expected: &'static str) -> Self {
        Self {
            value: value.to_owned(),
            expected,
        }
    }
}

/// Conversion between cell text and a field value.
///
/// Implementations never see an empty cell: the codecs treat an empty cell
/// as absent and leave the target field at its default, so `parse_cell` may
/// assume at least one character of input. `Option<V>` is the exception and
/// encodes the null policy itself: `None` formats to the empty string.
pub trait CellValue: Sized {
    /// Type name used in conversion diagnostics.
    const EXPECTED: &'static str;

    /// Parses one cell. Failure is reported, not thrown.
    fn parse_cell(cell: &str) -> Result<Self, CellError>;

    /// Formats the value back to cell text.
    fn format_cell(&self) -> String;
}

impl CellValue for String {
    const EXPECTED: &'static str = "string";

    fn parse_cell(cell: &str) -> Result<Self, CellError> {
        Ok(cell.to_owned())
    }

    fn format_cell(&self) -> String {
        self.clone()
    }
}

impl CellValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn parse_cell(cell: &str) -> Result<Self, CellError> {
        let cell = cell.trim();
        if cell.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if cell.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(CellError::new(cell, Self::EXPECTED))
        }
    }

    fn format_cell(&self) -> String {
        self.to_string()
    }
}

macro_rules! parsed_cell {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl CellValue for $ty {
                const EXPECTED: &'static str = $expected;

                fn parse_cell(cell: &str) -> Result<Self, CellError> {
                    cell.trim()
                        .parse()
                        .map_err(|_| CellError::new(cell, $expected))
                }

                fn format_cell(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

parsed_cell! {
    i8 => "integer",
    i16 => "integer",
    i32 => "integer",
    i64 => "integer",
    u8 => "unsigned integer",
    u16 => "unsigned integer",
    u32 => "unsigned integer",
    u64 => "unsigned integer",
    usize => "unsigned integer",
    f32 => "float",
    f64 => "float",
}

/// Null policy: an absent or empty cell is `None`, and `None` is written as
/// the empty string.
impl<V: CellValue> CellValue for Option<V> {
    const EXPECTED: &'static str = V::EXPECTED;

    fn parse_cell(cell: &str) -> Result<Self, CellError> {
        if cell.is_empty() {
            Ok(None)
        } else {
            V::parse_cell(cell).map(Some)
        }
    }

    fn format_cell(&self) -> String {
        match self {
            Some(value) => value.format_cell(),
            None => String::new(),
        }
    }
}

#[cfg(feature = "chrono")]
impl CellValue for chrono::NaiveDate {
    const EXPECTED: &'static str = "date";

    fn parse_cell(cell: &str) -> Result<Self, CellError> {
        chrono::NaiveDate::parse_from_str(cell.trim(), "%Y-%m-%d")
            .map_err(|_| CellError::new(cell, Self::EXPECTED))
    }

    fn format_cell(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

#[cfg(feature = "chrono")]
impl CellValue for chrono::NaiveDateTime {
    const EXPECTED: &'static str = "datetime";

    fn parse_cell(cell: &str) -> Result<Self, CellError> {
        chrono::NaiveDateTime::parse_from_str(cell.trim(), "%Y-%m-%dT%H:%M:%S")
            .map_err(|_| CellError::new(cell, Self::EXPECTED))
    }

    fn format_cell(&self) -> String {
        self.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::CellValue;

    #[test]
    fn integers_parse_and_format() {
        assert_eq!(i32::parse_cell("42").unwrap(), 42);
        assert_eq!(i32::parse_cell(" 42 ").unwrap(), 42);
        assert_eq!(42i32.format_cell(), "42");
        assert!(i32::parse_cell("forty-two").is_err());
    }

    #[test]
    fn strings_pass_through_untrimmed() {
        assert_eq!(String::parse_cell(" hello ").unwrap(), " hello ");
        assert_eq!("hello".to_string().format_cell(), "hello");
    }

    #[test]
    fn booleans_are_case_insensitive() {
        assert!(bool::parse_cell("True").unwrap());
        assert!(!bool::parse_cell("FALSE").unwrap());
        assert!(bool::parse_cell("yes").is_err());
    }

    #[test]
    fn options_encode_the_null_policy() {
        assert_eq!(Option::<i32>::parse_cell("").unwrap(), None);
        assert_eq!(Option::<i32>::parse_cell("7").unwrap(), Some(7));
        assert_eq!(None::<i32>.format_cell(), "");
        assert_eq!(Some(7).format_cell(), "7");
    }

    #[test]
    fn conversion_errors_name_the_target_type() {
        let err = u8::parse_cell("300").unwrap_err();
        assert_eq!(err.expected, "unsigned integer");
        assert_eq!(err.value, "300");
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn dates_use_iso_format() {
        let date = chrono::NaiveDate::parse_cell("2024-03-01").unwrap();
        assert_eq!(date.format_cell(), "2024-03-01");
        assert!(chrono::NaiveDate::parse_cell("03/01/2024").is_err());
    }
}
