//! cstruct – layout-driven C struct packing for FFI.
//!
//! Encodes a description of a native (C-ABI) struct value into a flat
//! byte buffer matching that struct's memory layout, so the buffer's
//! address can be handed to foreign code expecting a pointer to such a
//! struct. Fields that are pointers to arrays get separate native
//! blocks: the engine allocates them, copies the element bytes in, and
//! returns each block's address and size so the caller can release it
//! later (and optionally patch the address into the buffer).
//!
//! The engine is synchronous and stateless per call; layout derivation,
//! buffer decoding and host-term marshaling live outside it.
//!
//! # Beispiel
//!
//! ```
//! use cstruct::{pack, parse_layout, free, ValueNode};
//!
//! // struct { uint32_t id; char name[8]; void *blob; }
//! let layout = parse_layout(&serde_json::json!([
//!     { "shape": [1], "start": 0,  "size": 4, "padding_previous": 0 },
//!     { "shape": [8], "start": 4,  "size": 8, "padding_previous": 0 },
//!     { "shape": [1], "start": 16, "size": 8, "padding_previous": 4 },
//! ])).unwrap();
//!
//! let values = vec![
//!     ValueNode::RawBytes(vec![42, 0, 0, 0]),
//!     ValueNode::RawBytes(b"abc".to_vec()),
//!     ValueNode::PointerList(vec![vec![1, 2, 3]]),
//! ];
//!
//! let (buffer, handles) = pack(&values, &layout, 24).unwrap();
//! assert_eq!(buffer.len(), 24);
//! assert_eq!(buffer[0], 42);
//! assert_eq!(&buffer[4..7], b"abc");
//! assert_eq!(handles.len(), 1);
//!
//! for h in handles {
//!     free(h.address).unwrap();
//! }
//! ```

pub mod alloc;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod value;

pub use error::{Error, Result};

// Public API: packing
pub use encoder::pack;

// Public API: layout and values
pub use layout::{parse_layout, LayoutEntry};
pub use value::{parse_values, ValueNode};

// Public API: native memory
pub use alloc::{allocate_blocks, free, pointer_width, AllocationHandle};
