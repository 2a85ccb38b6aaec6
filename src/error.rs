//! Central error types for the struct packing engine.
//!
//! Every failure surfaces at the call boundary as one of these variants;
//! no partially written buffer or leaked allocation is ever observable
//! alongside an `Err`.

use core::fmt;
use std::borrow::Cow;

/// All errors the packing engine can return.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A layout entry is missing a required sub-field or has the wrong
    /// shape. The whole table is rejected; no partial table is used.
    Layout {
        /// Index of the offending entry in the layout description.
        index: usize,
        /// What was wrong with it (leer wenn nicht verfügbar).
        reason: Cow<'static, str>,
    },
    /// Layout table and value tree have different lengths. Entry *i* of
    /// each must describe the same struct field, so the call is refused.
    FieldCountMismatch { layout: usize, values: usize },
    /// The declared total struct size is smaller than required by some
    /// entry's `start + size`. Buffer allocation is refused.
    SizeMismatch { required: usize, declared: usize },
    /// The platform allocator could not satisfy a request. Every block
    /// allocated earlier in the same call has already been released.
    AllocationFailed { size: usize },
    /// A loosely-typed field value matches none of the three legal
    /// shapes (raw bytes, pointer list, null pointer). Skipping it would
    /// corrupt the offsets the native callee expects, so the call aborts.
    UnrecognizedValue {
        /// Index of the offending value.
        index: usize,
        /// Short description of what was found (leer wenn nicht verfügbar).
        found: Cow<'static, str>,
    },
    /// Releasing a native address failed (the address was null or not
    /// recognized by the platform allocator).
    FreeFailed { address: u64 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout { index, reason } => {
                if reason.is_empty() {
                    write!(f, "malformed layout entry at index {index}")
                } else {
                    write!(f, "malformed layout entry at index {index}: {reason}")
                }
            }
            Self::FieldCountMismatch { layout, values } => write!(
                f,
                "layout table has {layout} entries but value tree has {values}"
            ),
            Self::SizeMismatch { required, declared } => write!(
                f,
                "declared struct size {declared} is smaller than required {required}"
            ),
            Self::AllocationFailed { size } => {
                write!(f, "native allocation of {size} bytes failed")
            }
            Self::UnrecognizedValue { index, found } => {
                if found.is_empty() {
                    write!(f, "unrecognized field value at index {index}")
                } else {
                    write!(f, "unrecognized field value at index {index}: {found}")
                }
            }
            Self::FreeFailed { address } => {
                write!(f, "cannot free native address {address:#x}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Erstellt einen `Layout` Fehler mit Kontext.
    pub fn layout(index: usize, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Layout { index, reason: reason.into() }
    }

    /// Erstellt einen `UnrecognizedValue` Fehler mit Kontext.
    pub fn unrecognized(index: usize, found: impl Into<Cow<'static, str>>) -> Self {
        Self::UnrecognizedValue { index, found: found.into() }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_display_with_reason() {
        let e = Error::layout(3, "size must be > 0");
        let msg = e.to_string();
        assert!(msg.contains("index 3"), "{msg}");
        assert!(msg.contains("size must be > 0"), "{msg}");
    }

    #[test]
    fn layout_display_without_reason() {
        let e = Error::layout(0, "");
        assert_eq!(e.to_string(), "malformed layout entry at index 0");
    }

    #[test]
    fn field_count_mismatch_display() {
        let e = Error::FieldCountMismatch { layout: 4, values: 2 };
        let msg = e.to_string();
        assert!(msg.contains('4'), "{msg}");
        assert!(msg.contains('2'), "{msg}");
    }

    #[test]
    fn size_mismatch_display() {
        let e = Error::SizeMismatch { required: 16, declared: 8 };
        let msg = e.to_string();
        assert!(msg.contains("16"), "{msg}");
        assert!(msg.contains('8'), "{msg}");
    }

    #[test]
    fn allocation_failed_display() {
        let e = Error::AllocationFailed { size: 1024 };
        let msg = e.to_string();
        assert!(msg.contains("1024"), "{msg}");
        assert!(msg.contains("failed"), "{msg}");
    }

    #[test]
    fn unrecognized_value_display() {
        let e = Error::unrecognized(1, "string \"abc\"");
        let msg = e.to_string();
        assert!(msg.contains("index 1"), "{msg}");
        assert!(msg.contains("abc"), "{msg}");
    }

    #[test]
    fn free_failed_display_is_hex() {
        let e = Error::FreeFailed { address: 0xdead };
        let msg = e.to_string();
        assert!(msg.contains("0xdead"), "{msg}");
    }
}
