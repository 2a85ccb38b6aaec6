//! Field value representation.
//!
//! A value tree is an ordered list of [`ValueNode`]s, positionally
//! aligned with the layout table: entry *i* of each describes the same
//! struct field. The enum is closed — exactly three field shapes are
//! legal, and the encoder matches them exhaustively. Loose input that
//! fits none of them is rejected here, at the parsing boundary, with
//! [`Error::UnrecognizedValue`].

use crate::error::{Error, Result};
use serde_json::Value;

/// Input value for one struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueNode {
    /// Literal bytes placed at the field's offset. Oversized input is
    /// silently truncated to the field width; short input leaves the
    /// remainder of the field zero.
    RawBytes(Vec<u8>),
    /// A field that is a pointer to an array: one native block is
    /// allocated per element and the handles are surfaced to the
    /// caller. The field's own bytes in the packed buffer stay zero.
    PointerList(Vec<Vec<u8>>),
    /// A null pointer; the field is explicitly zero-filled.
    NullPointer,
}

/// Parses a loosely-typed JSON value description into a value tree.
///
/// The description must be a JSON array with one element per field:
/// - an array of byte values (0..=255) → [`ValueNode::RawBytes`],
/// - an array of such arrays → [`ValueNode::PointerList`],
/// - `null` → [`ValueNode::NullPointer`].
///
/// Anything else fails with [`Error::UnrecognizedValue`]; an
/// unrecognized field cannot be skipped without corrupting the offsets
/// the native callee expects. An empty array is read as empty raw
/// bytes, not as an empty pointer list.
pub fn parse_values(desc: &Value) -> Result<Vec<ValueNode>> {
    let fields = desc.as_array().ok_or_else(|| {
        Error::unrecognized(
            0,
            format!("value description must be an array, got {}", describe(desc)),
        )
    })?;

    fields
        .iter()
        .enumerate()
        .map(|(index, field)| parse_node(index, field))
        .collect()
}

fn parse_node(index: usize, field: &Value) -> Result<ValueNode> {
    match field {
        Value::Null => Ok(ValueNode::NullPointer),
        Value::Array(items) => {
            // Disambiguate on the first element: numbers → raw bytes,
            // arrays → pointer list. Empty → empty raw bytes.
            match items.first() {
                None => Ok(ValueNode::RawBytes(Vec::new())),
                Some(Value::Array(_)) => {
                    let blobs = items
                        .iter()
                        .map(|item| match item {
                            Value::Array(bytes) => parse_bytes(index, bytes),
                            other => Err(Error::unrecognized(index, describe(other))),
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok(ValueNode::PointerList(blobs))
                }
                Some(_) => Ok(ValueNode::RawBytes(parse_bytes(index, items)?)),
            }
        }
        other => Err(Error::unrecognized(index, describe(other))),
    }
}

fn parse_bytes(index: usize, items: &[Value]) -> Result<Vec<u8>> {
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| Error::unrecognized(index, describe(item)))
        })
        .collect()
}

/// Kurzbeschreibung eines JSON-Werts fuer Fehlermeldungen.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string \"{s}\""),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_is_null_pointer() {
        let tree = parse_values(&json!([null])).unwrap();
        assert_eq!(tree, vec![ValueNode::NullPointer]);
    }

    #[test]
    fn byte_array_is_raw_bytes() {
        let tree = parse_values(&json!([[1, 2, 3]])).unwrap();
        assert_eq!(tree, vec![ValueNode::RawBytes(vec![1, 2, 3])]);
    }

    #[test]
    fn nested_arrays_are_pointer_list() {
        let tree = parse_values(&json!([[[1, 2], [3, 4, 5]]])).unwrap();
        assert_eq!(
            tree,
            vec![ValueNode::PointerList(vec![vec![1, 2], vec![3, 4, 5]])]
        );
    }

    /// Leeres Array → leere RawBytes (nicht leere PointerList).
    #[test]
    fn empty_array_is_empty_raw_bytes() {
        let tree = parse_values(&json!([[]])).unwrap();
        assert_eq!(tree, vec![ValueNode::RawBytes(Vec::new())]);
    }

    #[test]
    fn mixed_tree_parses_in_order() {
        let tree = parse_values(&json!([[255], null, [[0]]])).unwrap();
        assert_eq!(
            tree,
            vec![
                ValueNode::RawBytes(vec![255]),
                ValueNode::NullPointer,
                ValueNode::PointerList(vec![vec![0]]),
            ]
        );
    }

    #[test]
    fn string_field_rejected() {
        let err = parse_values(&json!([[1, 2], "abc"])).unwrap_err();
        assert!(
            matches!(err, Error::UnrecognizedValue { index: 1, .. }),
            "{err:?}"
        );
        assert!(err.to_string().contains("abc"), "{err}");
    }

    #[test]
    fn out_of_range_byte_rejected() {
        assert!(parse_values(&json!([[256]])).is_err());
        assert!(parse_values(&json!([[-1]])).is_err());
    }

    #[test]
    fn mixed_element_kinds_rejected() {
        // Erste Elemente Arrays, dann eine Zahl → keine gueltige Form.
        let err = parse_values(&json!([[[1], 2]])).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedValue { index: 0, .. }), "{err:?}");
    }

    #[test]
    fn number_field_rejected() {
        let err = parse_values(&json!([42])).unwrap_err();
        assert!(err.to_string().contains("number 42"), "{err}");
    }

    /// Die Fehlermeldung benennt das Dokument, nicht ein Feld 0.
    #[test]
    fn non_array_description_rejected() {
        let err = parse_values(&json!("nope")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("value description must be an array"), "{msg}");
        assert!(msg.contains("string \"nope\""), "{msg}");
    }

    #[test]
    fn empty_description_is_empty_tree() {
        assert_eq!(parse_values(&json!([])).unwrap(), Vec::new());
    }
}
