//! Struct encoder: value tree × layout table → packed buffer.
//!
//! Walks the two sequences in lockstep and writes each field into a
//! zero-initialized buffer at the offset its layout entry dictates.
//! Pointer-typed fields get their elements materialized as separate
//! native blocks; the handles are accumulated in encounter order and
//! returned alongside the buffer.
//!
//! The call is all-or-nothing: a failure partway through releases every
//! native block allocated in this call and discards the partial buffer.
//!
//! # Beispiel
//!
//! ```
//! use cstruct::{pack, free, LayoutEntry, ValueNode};
//!
//! // struct { uint32_t tag; uint8_t *data; }
//! let layout = vec![
//!     LayoutEntry { shape: vec![1], start: 0, size: 4, padding_previous: 0 },
//!     LayoutEntry { shape: vec![1], start: 8, size: 8, padding_previous: 4 },
//! ];
//! let values = vec![
//!     ValueNode::RawBytes(vec![1, 0, 0, 0]),
//!     ValueNode::PointerList(vec![vec![0xAA, 0xBB]]),
//! ];
//! let (buffer, handles) = pack(&values, &layout, 16).unwrap();
//! assert_eq!(buffer.len(), 16);
//! assert_eq!(handles.len(), 1);
//! assert_eq!(handles[0].size, 2);
//! for h in handles {
//!     free(h.address).unwrap();
//! }
//! ```

use crate::alloc::{allocate_blocks, AllocGuard, AllocationHandle};
use crate::error::{Error, Result};
use crate::layout::LayoutEntry;
use crate::value::ValueNode;
use log::debug;

/// Packs a value tree into a flat buffer of exactly `struct_total_size`
/// bytes, following the caller-supplied layout table.
///
/// Entry *i* of `layout` and `values` describe the same field; the two
/// slices must have equal length. An empty value tree is a valid
/// degenerate case and returns a zero-length buffer and no handles
/// without consulting the layout table at all.
///
/// Returned handles (one per pointer-list element, in encounter order)
/// are owned by the caller, who must pass each address to
/// [`free`](crate::free) exactly once. Pointer fields are NOT
/// back-patched into the buffer; their regions stay zero-filled and the
/// caller wires in addresses from the handle list if it wants them.
pub fn pack(
    values: &[ValueNode],
    layout: &[LayoutEntry],
    struct_total_size: usize,
) -> Result<(Vec<u8>, Vec<AllocationHandle>)> {
    if values.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }
    if layout.len() != values.len() {
        return Err(Error::FieldCountMismatch { layout: layout.len(), values: values.len() });
    }

    // Every field must fit before anything is written or allocated. A
    // field end that overflows usize can never fit any declarable size.
    let mut required = 0usize;
    for entry in layout {
        let end = entry.start.checked_add(entry.size).ok_or(Error::SizeMismatch {
            required: usize::MAX,
            declared: struct_total_size,
        })?;
        required = required.max(end);
    }
    if required > struct_total_size {
        return Err(Error::SizeMismatch { required, declared: struct_total_size });
    }

    let mut buffer = vec![0u8; struct_total_size];
    let mut guard = AllocGuard::new();

    for (entry, value) in layout.iter().zip(values) {
        match value {
            ValueNode::RawBytes(bytes) => {
                // Oversized input truncates silently to the field width;
                // short input leaves the tail zero.
                let n = entry.size.min(bytes.len());
                buffer[entry.start..entry.start + n].copy_from_slice(&bytes[..n]);
            }
            ValueNode::PointerList(blobs) => {
                // The field's own region stays zero; the caller decides
                // whether to patch an address in after seeing the handles.
                guard.extend(allocate_blocks(blobs)?);
            }
            ValueNode::NullPointer => {
                // Already zero from initialization; explicit in case a
                // reused buffer ever reaches this path.
                buffer[entry.start..entry.start + entry.size].fill(0);
            }
        }
    }

    let handles = guard.commit();
    debug!(
        "packed {} field(s) into {} bytes, {} native block(s)",
        values.len(),
        struct_total_size,
        handles.len()
    );
    Ok((buffer, handles))
}
