//! Lock-based atomic access for arbitrary-sized objects.
//!
//! Every routine here acquires the spinlock slot for the object's base
//! address, performs a plain memory copy (and for compare-exchange, a byte
//! comparison) inside that one critical section, and releases the slot. The
//! copies themselves are ordinary non-atomic operations; the mutual exclusion
//! is what makes them atomic with respect to every other fallback caller on
//! the same object.
//!
//! The `offset`/`size` pair addresses a byte range inside the object while
//! the lock slot is always derived from the base pointer, so concurrent
//! accesses to different fields of one object still serialize.
//!
//! # Safety
//!
//! All functions require that `obj + offset` through `obj + offset + size` is
//! valid for the access, that the caller-side buffers are valid for `size`
//! bytes and do not overlap the object, and that *every* concurrent access to
//! the object goes through this module (a racing lock-free or plain access
//! would bypass the lock and tear).

use core::ptr;
use core::slice;

use crate::lock::lock_for;

/// Atomically copies `size` bytes out of `obj + offset` into `dest`.
#[inline]
pub unsafe fn lock_and_load(obj: *const u8, dest: *mut u8, offset: usize, size: usize) {
    let _guard = lock_for(obj as usize);
    ptr::copy_nonoverlapping(obj.add(offset), dest, size);
}

/// Atomically copies `size` bytes from `desired` into `obj + offset`.
#[inline]
pub unsafe fn lock_and_store(obj: *mut u8, desired: *const u8, offset: usize, size: usize) {
    let _guard = lock_for(obj as usize);
    ptr::copy_nonoverlapping(desired, obj.add(offset), size);
}

/// Atomically replaces `size` bytes at `obj + offset` with `desired`,
/// copying the previous contents into `dest`.
///
/// The read-out and write-in happen inside a single critical section, so no
/// other fallback caller can observe or interleave between them.
#[inline]
pub unsafe fn lock_and_exchange(
    obj: *mut u8,
    dest: *mut u8,
    desired: *const u8,
    offset: usize,
    size: usize,
) {
    let _guard = lock_for(obj as usize);
    ptr::copy_nonoverlapping(obj.add(offset), dest, size);
    ptr::copy_nonoverlapping(desired, obj.add(offset), size);
}

/// Atomically compares `size` bytes at `obj + offset` against `expected` and,
/// if they match byte-for-byte, replaces them with `desired`.
///
/// Returns `true` on success. On failure the current contents are copied into
/// `expected` and the object is left untouched. The compare and the
/// conditional write form one critical section; this never fails spuriously.
#[inline]
pub unsafe fn lock_and_compare_exchange(
    obj: *mut u8,
    expected: *mut u8,
    desired: *const u8,
    offset: usize,
    size: usize,
) -> bool {
    let _guard = lock_for(obj as usize);
    let current = slice::from_raw_parts(obj.add(offset) as *const u8, size);
    if current == slice::from_raw_parts(expected as *const u8, size) {
        ptr::copy_nonoverlapping(desired, obj.add(offset), size);
        true
    } else {
        ptr::copy_nonoverlapping(obj.add(offset), expected, size);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_store_roundtrip() {
        let mut obj = [0u8; 24];
        let src: [u8; 24] = [0xAB; 24];
        let mut out = [0u8; 24];
        unsafe {
            lock_and_store(obj.as_mut_ptr(), src.as_ptr(), 0, 24);
            lock_and_load(obj.as_ptr(), out.as_mut_ptr(), 0, 24);
        }
        assert_eq!(out, src);
    }

    #[test]
    fn exchange_returns_previous() {
        let mut obj = [1u8; 16];
        let desired = [2u8; 16];
        let mut prev = [0u8; 16];
        unsafe {
            lock_and_exchange(obj.as_mut_ptr(), prev.as_mut_ptr(), desired.as_ptr(), 0, 16);
        }
        assert_eq!(prev, [1u8; 16]);
        assert_eq!(obj, [2u8; 16]);
    }

    #[test]
    fn compare_exchange_success_and_failure() {
        let mut obj = [7u8; 12];
        let mut expected = [7u8; 12];
        let desired = [9u8; 12];
        let ok = unsafe {
            lock_and_compare_exchange(
                obj.as_mut_ptr(),
                expected.as_mut_ptr(),
                desired.as_ptr(),
                0,
                12,
            )
        };
        assert!(ok);
        assert_eq!(obj, [9u8; 12]);
        assert_eq!(expected, [7u8; 12]);

        // Stale expected value: fails and writes back what is actually there.
        let ok = unsafe {
            lock_and_compare_exchange(
                obj.as_mut_ptr(),
                expected.as_mut_ptr(),
                desired.as_ptr(),
                0,
                12,
            )
        };
        assert!(!ok);
        assert_eq!(obj, [9u8; 12]);
        assert_eq!(expected, [9u8; 12]);
    }

    #[test]
    fn offset_addresses_inner_range() {
        let mut obj = [0u8; 8];
        let src = [0xEEu8; 4];
        unsafe {
            lock_and_store(obj.as_mut_ptr(), src.as_ptr(), 2, 4);
        }
        assert_eq!(obj, [0, 0, 0xEE, 0xEE, 0xEE, 0xEE, 0, 0]);
    }
}
