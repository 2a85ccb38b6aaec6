//! Native memory allocation for pointer-typed fields.
//!
//! Blocks handed out here cross the FFI boundary: the native consumer
//! outlives the packing call, so ownership transfers to the caller as
//! raw `(address, size)` handles instead of any Rust-managed pointer.
//! Blocks come from `malloc` (C11 7.22.3.4) and go back through `free`
//! (C11 7.22.3.3); Rust's global allocator is never involved.
//!
//! Allocation is all-or-nothing per call. `malloc` is not transactional,
//! so every block allocated within the current call is tracked in an
//! [`AllocGuard`] that releases them on drop; only the success path
//! commits and hands the handles to the caller.

use crate::error::{Error, Result};
use log::{debug, warn};
use std::ffi::c_void;

/// One native allocation, owned by the caller from the moment it is
/// returned. `address` must be passed to [`free`] exactly once; the
/// engine keeps no record of handles it has handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationHandle {
    /// Native address of the block.
    pub address: u64,
    /// Byte length of the source blob. May be zero (see [`allocate_blocks`]).
    pub size: u64,
}

/// Returns the native pointer width in bytes for this platform.
pub fn pointer_width() -> u64 {
    std::mem::size_of::<*const c_void>() as u64
}

/// Allocates one native block per blob and copies the blob bytes in.
///
/// On success every block's ownership transfers to the caller via the
/// returned handles, in blob order. If any single allocation fails, all
/// blocks allocated so far in this call are released before the error
/// surfaces; a partial handle list is never observable.
///
/// A zero-length blob still produces a handle: the block is allocated
/// with a minimum size of one byte so the address is always valid and
/// freeable, while the handle reports size 0.
///
/// Blob contents are not interpreted; this is a plain byte copy.
pub fn allocate_blocks(blobs: &[Vec<u8>]) -> Result<Vec<AllocationHandle>> {
    let mut guard = AllocGuard::new();
    for blob in blobs {
        let ptr = raw_alloc(blob.len());
        if ptr.is_null() {
            warn!("native allocation of {} bytes failed", blob.len());
            return Err(Error::AllocationFailed { size: blob.len() });
        }
        if !blob.is_empty() {
            // Freshly malloc'd block, cannot overlap the blob.
            unsafe { std::ptr::copy_nonoverlapping(blob.as_ptr(), ptr, blob.len()) };
        }
        guard.push(AllocationHandle { address: ptr as u64, size: blob.len() as u64 });
    }
    Ok(guard.commit())
}

/// Releases a native block previously returned by [`allocate_blocks`].
///
/// The engine performs no provenance tracking: the caller is the sole
/// authority on which addresses are still valid, and passing anything
/// other than a live handle address is undefined behavior. A null
/// address is the one thing that can be rejected here.
pub fn free(address: u64) -> Result<()> {
    if address == 0 {
        return Err(Error::FreeFailed { address });
    }
    debug!("freeing native block {address:#x}");
    raw_free(address as *mut u8);
    Ok(())
}

/// Tracks every block allocated within one engine call and releases
/// them on drop. [`commit`](Self::commit) disarms the guard and hands
/// the handles to the caller; from that moment the blocks are theirs.
pub(crate) struct AllocGuard {
    handles: Vec<AllocationHandle>,
}

impl AllocGuard {
    pub(crate) fn new() -> Self {
        Self { handles: Vec::new() }
    }

    pub(crate) fn push(&mut self, handle: AllocationHandle) {
        self.handles.push(handle);
    }

    pub(crate) fn extend(&mut self, handles: Vec<AllocationHandle>) {
        self.handles.extend(handles);
    }

    /// Consumes the guard without freeing anything and returns the
    /// accumulated handles in allocation order.
    pub(crate) fn commit(mut self) -> Vec<AllocationHandle> {
        std::mem::take(&mut self.handles)
    }
}

impl Drop for AllocGuard {
    fn drop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        warn!("rolling back {} native allocation(s) from failed call", self.handles.len());
        for handle in self.handles.drain(..) {
            raw_free(handle.address as *mut u8);
        }
    }
}

/// `malloc` wrapper. Requests at least one byte so a zero-length blob
/// still yields a real, freeable address (`malloc(0)` may return null).
fn raw_alloc(size: usize) -> *mut u8 {
    #[cfg(test)]
    if testing::take_injected_failure() {
        return std::ptr::null_mut();
    }

    let ptr = unsafe { libc::malloc(size.max(1)) } as *mut u8;

    #[cfg(test)]
    if !ptr.is_null() {
        testing::LIVE_BLOCKS.with(|l| l.set(l.get() + 1));
    }

    ptr
}

fn raw_free(ptr: *mut u8) {
    #[cfg(test)]
    testing::LIVE_BLOCKS.with(|l| l.set(l.get() - 1));

    unsafe { libc::free(ptr as *mut c_void) }
}
