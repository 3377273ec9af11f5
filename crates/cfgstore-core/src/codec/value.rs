//! Scalar literal formatting.
//!
//! Renders one [`ConfigValue`] scalar, or one [`Key`], as PHP literal text:
//!
//! | Value                 | Literal                          |
//! |-----------------------|----------------------------------|
//! | `String("it's")`      | `'it\'s'`                        |
//! | `Bool(true)`          | `true`                           |
//! | `Null`                | `null`                           |
//! | `Int(-3)`             | `-3`                             |
//! | `Float(0.25)`         | `0.25`                           |
//! | `Float(2.0)`          | `2.0` (stays a float on re-read) |
//!
//! Floats use Rust's shortest round-trip representation, which never switches
//! to scientific notation.

use thiserror::Error;

use crate::domain::document::{ConfigValue, Key};

/// Errors that can occur while rendering a document.
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    /// The value has no literal form in a config file.
    #[error("unsupported value type {type_name}: {reason}")]
    UnsupportedValueType {
        type_name: &'static str,
        reason: &'static str,
    },
}

/// Formats a scalar value as literal source text.
///
/// # Errors
///
/// Returns [`FormatError::UnsupportedValueType`] for a nested document (it is
/// not a scalar) and for NaN or infinite floats (they have no literal).
///
/// # Examples
///
/// ```rust
/// use cfgstore_core::{format_value, ConfigValue};
///
/// assert_eq!(format_value(&ConfigValue::from("db")).unwrap(), "'db'");
/// assert_eq!(format_value(&ConfigValue::Int(5432)).unwrap(), "5432");
/// assert_eq!(format_value(&ConfigValue::Bool(false)).unwrap(), "false");
/// ```
pub fn format_value(value: &ConfigValue) -> Result<String, FormatError> {
    match value {
        ConfigValue::Null => Ok("null".to_string()),
        ConfigValue::Bool(true) => Ok("true".to_string()),
        ConfigValue::Bool(false) => Ok("false".to_string()),
        ConfigValue::Int(i) => Ok(i.to_string()),
        ConfigValue::Float(f) => format_float(*f),
        ConfigValue::String(s) => Ok(quote(s)),
        ConfigValue::Document(_) => Err(FormatError::UnsupportedValueType {
            type_name: value.type_name(),
            reason: "only scalars have a literal form",
        }),
    }
}

/// Formats a key as it appears before `=>`.
pub fn format_key(key: &Key) -> String {
    match key {
        Key::Int(i) => i.to_string(),
        Key::Str(s) => quote(s),
    }
}

fn format_float(f: f64) -> Result<String, FormatError> {
    if !f.is_finite() {
        return Err(FormatError::UnsupportedValueType {
            type_name: "float",
            reason: "NaN and infinity have no literal form",
        });
    }
    let mut text = f.to_string();
    // `Display` prints 2.0 as "2", which would read back as an integer.
    if !text.contains('.') {
        text.push_str(".0");
    }
    Ok(text)
}

/// Single-quotes `s`, escaping backslashes and single quotes.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\\' || ch == '\'' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::ConfigDocument;

    #[test]
    fn test_string_is_single_quoted() {
        assert_eq!(format_value(&"localhost".into()).unwrap(), "'localhost'");
    }

    #[test]
    fn test_string_escapes_quote_and_backslash() {
        // Arrange
        let value = ConfigValue::from(r"C:\it's");

        // Act
        let text = format_value(&value).unwrap();

        // Assert
        assert_eq!(text, r"'C:\\it\'s'");
    }

    #[test]
    fn test_string_keeps_newlines_verbatim() {
        assert_eq!(format_value(&"a\nb".into()).unwrap(), "'a\nb'");
    }

    #[test]
    fn test_bool_and_null_tokens() {
        assert_eq!(format_value(&ConfigValue::Bool(true)).unwrap(), "true");
        assert_eq!(format_value(&ConfigValue::Bool(false)).unwrap(), "false");
        assert_eq!(format_value(&ConfigValue::Null).unwrap(), "null");
    }

    #[test]
    fn test_integers_are_unquoted() {
        assert_eq!(format_value(&ConfigValue::Int(5432)).unwrap(), "5432");
        assert_eq!(format_value(&ConfigValue::Int(-1)).unwrap(), "-1");
        assert_eq!(
            format_value(&ConfigValue::Int(i64::MIN)).unwrap(),
            "-9223372036854775808"
        );
    }

    #[test]
    fn test_floats_use_shortest_representation() {
        assert_eq!(format_value(&ConfigValue::Float(0.25)).unwrap(), "0.25");
        assert_eq!(format_value(&ConfigValue::Float(-1.5)).unwrap(), "-1.5");
        assert_eq!(format_value(&ConfigValue::Float(0.1)).unwrap(), "0.1");
    }

    #[test]
    fn test_integral_float_keeps_decimal_point() {
        assert_eq!(format_value(&ConfigValue::Float(2.0)).unwrap(), "2.0");
        assert_eq!(format_value(&ConfigValue::Float(1e21)).unwrap(), "1000000000000000000000.0");
    }

    #[test]
    fn test_very_small_float_is_not_scientific() {
        let text = format_value(&ConfigValue::Float(1e-7)).unwrap();
        assert_eq!(text, "0.0000001");
    }

    #[test]
    fn test_non_finite_float_is_unsupported() {
        for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = format_value(&ConfigValue::Float(f));
            assert!(
                matches!(result, Err(FormatError::UnsupportedValueType { type_name: "float", .. })),
                "{f} must be rejected"
            );
        }
    }

    #[test]
    fn test_document_is_not_a_scalar() {
        let result = format_value(&ConfigValue::Document(ConfigDocument::new()));
        assert!(matches!(result, Err(FormatError::UnsupportedValueType { .. })));
    }

    #[test]
    fn test_key_literals() {
        assert_eq!(format_key(&Key::Int(3)), "3");
        assert_eq!(format_key(&Key::from("db")), "'db'");
        assert_eq!(format_key(&Key::from("o'clock")), r"'o\'clock'");
    }
}
