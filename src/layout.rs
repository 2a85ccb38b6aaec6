//! Layout table parsing and validation.
//!
//! The layout table is supplied by the caller as a loosely-typed JSON
//! description, one entry per struct field in declaration order. Offsets,
//! sizes and padding are assumed to have been derived from the struct
//! definition already (C11 6.7.2.1); this module only checks that every
//! entry is structurally well-formed. Validation is strict: a single
//! malformed entry rejects the whole table.

use crate::error::{Error, Result};
use serde_json::Value;

/// Layout descriptor for one struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    /// Array shape of the field, e.g. `[1]` for a scalar or `[4]` for
    /// `int[4]`. A JSON `null` in the description means "unspecified"
    /// and defaults to `[1]`.
    pub shape: Vec<u64>,
    /// Byte offset of the field within the struct.
    pub start: usize,
    /// Byte width of the field. Always greater than zero.
    pub size: usize,
    /// Padding bytes inserted before this field. Informational only;
    /// the offsets in `start` already account for it.
    pub padding_previous: usize,
}

/// The four sub-fields every layout entry must carry.
const ENTRY_KEYS: [&str; 4] = ["shape", "start", "size", "padding_previous"];

/// Parses a loosely-typed layout description into a strict entry list.
///
/// The description must be a JSON array of objects, each carrying exactly
/// the sub-fields `shape`, `start`, `size` and `padding_previous`. Order
/// is preserved; entries are never merged or reordered. Any malformed
/// entry aborts parsing of the entire table.
///
/// ```
/// use cstruct::parse_layout;
///
/// let desc = serde_json::json!([
///     { "shape": [1], "start": 0, "size": 4, "padding_previous": 0 },
///     { "shape": null, "start": 8, "size": 8, "padding_previous": 4 },
/// ]);
/// let table = parse_layout(&desc).unwrap();
/// assert_eq!(table[1].shape, vec![1]); // null shape defaults to [1]
/// assert_eq!(table[1].start, 8);
/// ```
pub fn parse_layout(desc: &Value) -> Result<Vec<LayoutEntry>> {
    let entries = desc
        .as_array()
        .ok_or_else(|| Error::layout(0, "layout description must be an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(index, entry))
        .collect()
}

/// Parses a single layout entry; `index` is only used for error context.
fn parse_entry(index: usize, entry: &Value) -> Result<LayoutEntry> {
    let map = entry
        .as_object()
        .ok_or_else(|| Error::layout(index, "entry must be an object"))?;

    for key in map.keys() {
        if !ENTRY_KEYS.contains(&key.as_str()) {
            return Err(Error::layout(index, format!("unknown sub-field '{key}'")));
        }
    }

    let shape = parse_shape(index, required(index, map, "shape")?)?;
    let start = parse_offset(index, map, "start")?;
    let size = parse_offset(index, map, "size")?;
    if size == 0 {
        return Err(Error::layout(index, "size must be greater than zero"));
    }
    let padding_previous = parse_offset(index, map, "padding_previous")?;

    Ok(LayoutEntry { shape, start, size, padding_previous })
}

fn required<'a>(
    index: usize,
    map: &'a serde_json::Map<String, Value>,
    key: &'static str,
) -> Result<&'a Value> {
    map.get(key)
        .ok_or_else(|| Error::layout(index, format!("missing sub-field '{key}'")))
}

/// `shape` is an array of positive dimensions; JSON `null` is the
/// explicit none-sentinel and becomes `[1]`. Anything else is malformed.
fn parse_shape(index: usize, value: &Value) -> Result<Vec<u64>> {
    match value {
        Value::Null => Ok(vec![1]),
        Value::Array(dims) => {
            if dims.is_empty() {
                return Err(Error::layout(index, "shape must not be empty"));
            }
            dims.iter()
                .map(|d| match d.as_u64() {
                    Some(n) if n > 0 => Ok(n),
                    _ => Err(Error::layout(index, "shape dimensions must be positive integers")),
                })
                .collect()
        }
        _ => Err(Error::layout(index, "shape must be an array or null")),
    }
}

/// Parses a non-negative byte count sub-field into `usize`.
fn parse_offset(
    index: usize,
    map: &serde_json::Map<String, Value>,
    key: &'static str,
) -> Result<usize> {
    let value = required(index, map, key)?;
    let n = value
        .as_u64()
        .ok_or_else(|| Error::layout(index, format!("'{key}' must be a non-negative integer")))?;
    usize::try_from(n)
        .map_err(|_| Error::layout(index, format!("'{key}' does not fit the platform word size")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Vollstaendiger Eintrag mit allen vier Sub-Feldern.
    #[test]
    fn full_entry_parses() {
        let desc = json!([{ "shape": [2, 3], "start": 4, "size": 24, "padding_previous": 0 }]);
        let table = parse_layout(&desc).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].shape, vec![2, 3]);
        assert_eq!(table[0].start, 4);
        assert_eq!(table[0].size, 24);
        assert_eq!(table[0].padding_previous, 0);
    }

    /// null shape ist der explizite none-Sentinel → [1].
    #[test]
    fn null_shape_defaults_to_one() {
        let desc = json!([{ "shape": null, "start": 0, "size": 8, "padding_previous": 0 }]);
        let table = parse_layout(&desc).unwrap();
        assert_eq!(table[0].shape, vec![1]);
    }

    /// Entry order is preserved verbatim.
    #[test]
    fn order_preserved() {
        let desc = json!([
            { "shape": [1], "start": 0, "size": 4, "padding_previous": 0 },
            { "shape": [1], "start": 4, "size": 2, "padding_previous": 0 },
            { "shape": [1], "start": 8, "size": 8, "padding_previous": 2 },
        ]);
        let table = parse_layout(&desc).unwrap();
        let starts: Vec<usize> = table.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![0, 4, 8]);
    }

    #[test]
    fn empty_table_is_valid() {
        assert_eq!(parse_layout(&json!([])).unwrap(), Vec::new());
    }

    #[test]
    fn non_array_description_rejected() {
        let err = parse_layout(&json!({ "start": 0 })).unwrap_err();
        assert!(matches!(err, Error::Layout { .. }));
    }

    #[test]
    fn missing_shape_rejected() {
        let desc = json!([{ "start": 0, "size": 4, "padding_previous": 0 }]);
        let err = parse_layout(&desc).unwrap_err();
        assert!(err.to_string().contains("shape"), "{err}");
    }

    #[test]
    fn missing_start_rejected() {
        let desc = json!([{ "shape": [1], "size": 4, "padding_previous": 0 }]);
        let err = parse_layout(&desc).unwrap_err();
        assert!(err.to_string().contains("start"), "{err}");
    }

    #[test]
    fn missing_padding_rejected() {
        let desc = json!([{ "shape": [1], "start": 0, "size": 4 }]);
        let err = parse_layout(&desc).unwrap_err();
        assert!(err.to_string().contains("padding_previous"), "{err}");
    }

    #[test]
    fn unknown_sub_field_rejected() {
        let desc = json!([{ "shape": [1], "start": 0, "size": 4, "padding_previous": 0, "align": 4 }]);
        let err = parse_layout(&desc).unwrap_err();
        assert!(err.to_string().contains("align"), "{err}");
    }

    #[test]
    fn zero_size_rejected() {
        let desc = json!([{ "shape": [1], "start": 0, "size": 0, "padding_previous": 0 }]);
        let err = parse_layout(&desc).unwrap_err();
        assert!(err.to_string().contains("greater than zero"), "{err}");
    }

    #[test]
    fn negative_start_rejected() {
        let desc = json!([{ "shape": [1], "start": -1, "size": 4, "padding_previous": 0 }]);
        assert!(parse_layout(&desc).is_err());
    }

    #[test]
    fn string_shape_rejected() {
        let desc = json!([{ "shape": "1", "start": 0, "size": 4, "padding_previous": 0 }]);
        assert!(parse_layout(&desc).is_err());
    }

    #[test]
    fn empty_shape_rejected() {
        let desc = json!([{ "shape": [], "start": 0, "size": 4, "padding_previous": 0 }]);
        let err = parse_layout(&desc).unwrap_err();
        assert!(err.to_string().contains("empty"), "{err}");
    }

    #[test]
    fn zero_shape_dimension_rejected() {
        let desc = json!([{ "shape": [0], "start": 0, "size": 4, "padding_previous": 0 }]);
        assert!(parse_layout(&desc).is_err());
    }

    /// Ein defekter Eintrag verwirft die gesamte Tabelle, auch wenn
    /// fruehere Eintraege gueltig waren.
    #[test]
    fn one_bad_entry_rejects_whole_table() {
        let desc = json!([
            { "shape": [1], "start": 0, "size": 4, "padding_previous": 0 },
            { "shape": [1], "start": 4, "size": 0, "padding_previous": 0 },
        ]);
        let err = parse_layout(&desc).unwrap_err();
        assert!(matches!(err, Error::Layout { index: 1, .. }), "{err:?}");
    }
}
