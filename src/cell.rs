//! A generic atomic memory location for trivially-copyable payloads.

use core::cell::UnsafeCell;
use core::fmt;
use core::mem::{self, MaybeUninit};
use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU8, Ordering};

#[cfg(all(
    feature = "atomic64",
    not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
))]
use core::sync::atomic::AtomicU64;

use crate::fallback;
use crate::order::{validate_failure_order, validate_load_order, validate_store_order};
use crate::raw;

/// A thread-safe memory location holding any `Copy` type.
///
/// Operations dispatch on the payload's size and alignment: if it matches a
/// native atomic width, a single lock-free instruction is used; otherwise the
/// access is serialized through the process-wide spinlock table. Call
/// [`is_lock_free`](AtomicCell::is_lock_free) to find out which path a type
/// takes.
///
/// The in-memory representation is exactly `T` (a transparent `UnsafeCell`),
/// so an `AtomicCell<f32>` has the ABI of an `f32`.
///
/// Compare-exchange uses *byte-wise* equality, not `PartialEq`: padding bytes
/// participate and `-0.0` does not match `+0.0`.
///
/// # Example
///
/// ```
/// # use atomic_access::AtomicCell;
/// # use core::sync::atomic::Ordering::Relaxed;
/// static FLAG: AtomicCell<u32> = AtomicCell::new(0);
///
/// FLAG.store(7, Relaxed);
/// assert_eq!(FLAG.load(Relaxed), 7);
/// assert_eq!(FLAG.swap(9, Relaxed), 7);
/// ```
#[repr(transparent)]
pub struct AtomicCell<T> {
    value: UnsafeCell<T>,
}

// SAFETY: every shared access goes through an atomic instruction or the
// spinlock table, so exposing the cell across threads cannot race.
unsafe impl<T: Send> Send for AtomicCell<T> {}
unsafe impl<T: Send> Sync for AtomicCell<T> {}

/// `T` can ride on the atomic type `A` if the sizes match and `T` is at least
/// as strictly aligned. `A` must be the atomic itself, not its primitive:
/// `AtomicU64` is align-8 on every target, while `u64` may be align-4 on
/// 32-bit ones, and refcasting a 4-aligned cell would be unsound.
fn can_transmute<T, A>() -> bool {
    mem::size_of::<T>() == mem::size_of::<A>() && mem::align_of::<T>() >= mem::align_of::<A>()
}

impl<T> AtomicCell<T> {
    /// Creates a new cell holding `value`.
    #[inline]
    pub const fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    /// Returns a mutable reference to the payload.
    ///
    /// Safe because the exclusive borrow proves no other thread is accessing
    /// the cell.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        unsafe { &mut *self.value.get() }
    }

    /// Consumes the cell, returning the payload.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }

    /// Returns `true` if operations on this cell use native atomic
    /// instructions rather than the spinlock table.
    ///
    /// # Example
    ///
    /// ```
    /// # use atomic_access::AtomicCell;
    /// assert!(AtomicCell::<u32>::is_lock_free());
    /// assert!(!AtomicCell::<[u8; 24]>::is_lock_free());
    /// ```
    #[inline]
    pub fn is_lock_free() -> bool {
        raw::is_lock_free(mem::size_of::<T>(), mem::align_of::<T>())
    }
}

impl<T: Copy> AtomicCell<T> {
    /// Atomically loads the payload.
    ///
    /// # Panics
    ///
    /// Panics if `order` is `Release` or `AcqRel`.
    pub fn load(&self, order: Ordering) -> T {
        validate_load_order(order);
        let src = self.value.get();
        unsafe {
            if can_transmute::<T, AtomicU8>() {
                let bits = raw::load_u8(src as *const u8, order);
                return mem::transmute_copy(&bits);
            }
            if can_transmute::<T, AtomicU16>() {
                let bits = raw::load_u16(src as *const u16, order);
                return mem::transmute_copy(&bits);
            }
            if can_transmute::<T, AtomicU32>() {
                let bits = raw::load_u32(src as *const u32, order);
                return mem::transmute_copy(&bits);
            }
            #[cfg(all(
                feature = "atomic64",
                not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
            ))]
            if can_transmute::<T, AtomicU64>() {
                let bits = raw::load_u64(src as *const u64, order);
                return mem::transmute_copy(&bits);
            }
            let mut out = MaybeUninit::<T>::uninit();
            fallback::lock_and_load(
                src as *const u8,
                out.as_mut_ptr().cast(),
                0,
                mem::size_of::<T>(),
            );
            out.assume_init()
        }
    }

    /// Atomically stores `value` into the cell.
    ///
    /// # Panics
    ///
    /// Panics if `order` is `Acquire` or `AcqRel`.
    pub fn store(&self, value: T, order: Ordering) {
        validate_store_order(order);
        let dst = self.value.get();
        unsafe {
            if can_transmute::<T, AtomicU8>() {
                return raw::store_u8(dst.cast(), bits_of(&value), order);
            }
            if can_transmute::<T, AtomicU16>() {
                return raw::store_u16(dst.cast(), bits_of(&value), order);
            }
            if can_transmute::<T, AtomicU32>() {
                return raw::store_u32(dst.cast(), bits_of(&value), order);
            }
            #[cfg(all(
                feature = "atomic64",
                not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
            ))]
            if can_transmute::<T, AtomicU64>() {
                return raw::store_u64(dst.cast(), bits_of(&value), order);
            }
            fallback::lock_and_store(
                dst.cast(),
                (&value as *const T).cast(),
                0,
                mem::size_of::<T>(),
            );
        }
    }

    /// Atomically replaces the payload with `value`, returning the previous
    /// payload. All orderings are allowed.
    pub fn swap(&self, value: T, order: Ordering) -> T {
        let dst = self.value.get();
        unsafe {
            if can_transmute::<T, AtomicU8>() {
                let prev = raw::exchange_u8(dst.cast(), bits_of(&value), order);
                return mem::transmute_copy(&prev);
            }
            if can_transmute::<T, AtomicU16>() {
                let prev = raw::exchange_u16(dst.cast(), bits_of(&value), order);
                return mem::transmute_copy(&prev);
            }
            if can_transmute::<T, AtomicU32>() {
                let prev = raw::exchange_u32(dst.cast(), bits_of(&value), order);
                return mem::transmute_copy(&prev);
            }
            #[cfg(all(
                feature = "atomic64",
                not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
            ))]
            if can_transmute::<T, AtomicU64>() {
                let prev = raw::exchange_u64(dst.cast(), bits_of(&value), order);
                return mem::transmute_copy(&prev);
            }
            let mut prev = MaybeUninit::<T>::uninit();
            fallback::lock_and_exchange(
                dst.cast(),
                prev.as_mut_ptr().cast(),
                (&value as *const T).cast(),
                0,
                mem::size_of::<T>(),
            );
            prev.assume_init()
        }
    }

    /// Atomically compares the payload byte-for-byte against `current` and,
    /// if equal, replaces it with `new`.
    ///
    /// Returns `Ok(current)` on success and `Err(actual)` with the observed
    /// payload on failure; a failing call leaves the cell unchanged. Never
    /// fails spuriously. `failure` orders the load on the failing path and
    /// must be legal for a load.
    ///
    /// # Panics
    ///
    /// Panics if `failure` is `Release` or `AcqRel`.
    ///
    /// # Example
    ///
    /// ```
    /// # use atomic_access::AtomicCell;
    /// # use core::sync::atomic::Ordering::{SeqCst, Relaxed};
    /// let cell = AtomicCell::new(1u32);
    /// assert_eq!(cell.compare_exchange(1, 2, SeqCst, Relaxed), Ok(1));
    /// assert_eq!(cell.compare_exchange(1, 3, SeqCst, Relaxed), Err(2));
    /// assert_eq!(cell.load(Relaxed), 2);
    /// ```
    pub fn compare_exchange(
        &self,
        current: T,
        new: T,
        success: Ordering,
        failure: Ordering,
    ) -> Result<T, T> {
        validate_failure_order(failure);
        let dst = self.value.get();
        unsafe {
            if can_transmute::<T, AtomicU8>() {
                let mut expected: u8 = bits_of(&current);
                return if raw::compare_exchange_u8(
                    dst.cast(),
                    &mut expected,
                    bits_of(&new),
                    success,
                    failure,
                ) {
                    Ok(current)
                } else {
                    Err(mem::transmute_copy(&expected))
                };
            }
            if can_transmute::<T, AtomicU16>() {
                let mut expected: u16 = bits_of(&current);
                return if raw::compare_exchange_u16(
                    dst.cast(),
                    &mut expected,
                    bits_of(&new),
                    success,
                    failure,
                ) {
                    Ok(current)
                } else {
                    Err(mem::transmute_copy(&expected))
                };
            }
            if can_transmute::<T, AtomicU32>() {
                let mut expected: u32 = bits_of(&current);
                return if raw::compare_exchange_u32(
                    dst.cast(),
                    &mut expected,
                    bits_of(&new),
                    success,
                    failure,
                ) {
                    Ok(current)
                } else {
                    Err(mem::transmute_copy(&expected))
                };
            }
            #[cfg(all(
                feature = "atomic64",
                not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
            ))]
            if can_transmute::<T, AtomicU64>() {
                let mut expected: u64 = bits_of(&current);
                return if raw::compare_exchange_u64(
                    dst.cast(),
                    &mut expected,
                    bits_of(&new),
                    success,
                    failure,
                ) {
                    Ok(current)
                } else {
                    Err(mem::transmute_copy(&expected))
                };
            }
            let mut expected = current;
            if fallback::lock_and_compare_exchange(
                dst.cast(),
                (&mut expected as *mut T).cast(),
                (&new as *const T).cast(),
                0,
                mem::size_of::<T>(),
            ) {
                Ok(current)
            } else {
                Err(expected)
            }
        }
    }

    /// Weak variant of [`compare_exchange`](AtomicCell::compare_exchange):
    /// may fail spuriously even when the comparison would succeed, so it
    /// belongs in a retry loop.
    pub fn compare_exchange_weak(
        &self,
        current: T,
        new: T,
        success: Ordering,
        failure: Ordering,
    ) -> Result<T, T> {
        validate_failure_order(failure);
        let dst = self.value.get();
        unsafe {
            if can_transmute::<T, AtomicU8>() {
                let mut expected: u8 = bits_of(&current);
                return if raw::compare_exchange_weak_u8(
                    dst.cast(),
                    &mut expected,
                    bits_of(&new),
                    success,
                    failure,
                ) {
                    Ok(current)
                } else {
                    Err(mem::transmute_copy(&expected))
                };
            }
            if can_transmute::<T, AtomicU16>() {
                let mut expected: u16 = bits_of(&current);
                return if raw::compare_exchange_weak_u16(
                    dst.cast(),
                    &mut expected,
                    bits_of(&new),
                    success,
                    failure,
                ) {
                    Ok(current)
                } else {
                    Err(mem::transmute_copy(&expected))
                };
            }
            if can_transmute::<T, AtomicU32>() {
                let mut expected: u32 = bits_of(&current);
                return if raw::compare_exchange_weak_u32(
                    dst.cast(),
                    &mut expected,
                    bits_of(&new),
                    success,
                    failure,
                ) {
                    Ok(current)
                } else {
                    Err(mem::transmute_copy(&expected))
                };
            }
            #[cfg(all(
                feature = "atomic64",
                not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
            ))]
            if can_transmute::<T, AtomicU64>() {
                let mut expected: u64 = bits_of(&current);
                return if raw::compare_exchange_weak_u64(
                    dst.cast(),
                    &mut expected,
                    bits_of(&new),
                    success,
                    failure,
                ) {
                    Ok(current)
                } else {
                    Err(mem::transmute_copy(&expected))
                };
            }
            // The locked path has no spurious-failure mode to exploit.
            let mut expected = current;
            if fallback::lock_and_compare_exchange(
                dst.cast(),
                (&mut expected as *mut T).cast(),
                (&new as *const T).cast(),
                0,
                mem::size_of::<T>(),
            ) {
                Ok(current)
            } else {
                Err(expected)
            }
        }
    }
}

/// Reinterprets `value`'s bytes as the same-sized unsigned integer.
///
/// Callers have already checked `can_transmute::<T, B>()`.
#[inline]
fn bits_of<T, B: Copy>(value: &T) -> B {
    debug_assert_eq!(mem::size_of::<T>(), mem::size_of::<B>());
    unsafe { mem::transmute_copy(value) }
}

impl<T: Copy + Default> Default for AtomicCell<T> {
    #[inline]
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for AtomicCell<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// Compares the current payloads (`SeqCst` loads). Uses `T`'s equality, not
/// the byte-wise comparison of the CaS family.
impl<T: Copy + PartialEq> PartialEq for AtomicCell<T> {
    fn eq(&self, other: &Self) -> bool {
        self.load(Ordering::SeqCst) == other.load(Ordering::SeqCst)
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for AtomicCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicCell")
            .field("value", &self.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(feature = "serde")]
impl<T: Copy + serde::Serialize> serde::Serialize for AtomicCell<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.load(Ordering::SeqCst).serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T: Copy + serde::Deserialize<'de>> serde::Deserialize<'de> for AtomicCell<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::Ordering::{Relaxed, SeqCst};

    #[test]
    fn lock_free_dispatch() {
        assert!(AtomicCell::<u8>::is_lock_free());
        assert!(AtomicCell::<i16>::is_lock_free());
        assert!(AtomicCell::<u32>::is_lock_free());
        assert!(AtomicCell::<f32>::is_lock_free());
        assert!(!AtomicCell::<[u8; 3]>::is_lock_free());
        assert!(!AtomicCell::<[u64; 4]>::is_lock_free());
    }

    #[test]
    fn dispatch_agrees_with_is_lock_free() {
        // The dispatch predicate must never claim the lock-free path for a
        // type is_lock_free rejects; on 32-bit x86 u64 is align-4 while
        // AtomicU64 is align-8, so the atomic's alignment is what counts.
        fn consistent<T>() -> bool {
            let native = can_transmute::<T, AtomicU8>()
                || can_transmute::<T, AtomicU16>()
                || can_transmute::<T, AtomicU32>()
                || {
                    #[cfg(all(
                        feature = "atomic64",
                        not(any(
                            target_arch = "powerpc",
                            target_arch = "mips",
                            force_disable_atomic64
                        ))
                    ))]
                    {
                        can_transmute::<T, AtomicU64>()
                    }
                    #[cfg(not(all(
                        feature = "atomic64",
                        not(any(
                            target_arch = "powerpc",
                            target_arch = "mips",
                            force_disable_atomic64
                        ))
                    )))]
                    {
                        false
                    }
                };
            native == AtomicCell::<T>::is_lock_free()
        }

        #[derive(Clone, Copy)]
        #[repr(C, align(4))]
        struct HalfAligned([u32; 2]);

        assert!(consistent::<u8>());
        assert!(consistent::<u32>());
        assert!(consistent::<u64>());
        assert!(consistent::<f64>());
        assert!(consistent::<HalfAligned>());
        // Size 8 but align 4: never eligible for the 8-byte refcast.
        assert!(!can_transmute::<HalfAligned, AtomicU32>());
        #[cfg(all(
            feature = "atomic64",
            not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
        ))]
        assert!(!can_transmute::<HalfAligned, AtomicU64>());

        // And the locked path still serves such a type correctly.
        let cell = AtomicCell::new(HalfAligned([1, 2]));
        cell.store(HalfAligned([3, 4]), SeqCst);
        assert_eq!(cell.load(SeqCst).0, [3, 4]);
    }

    #[test]
    fn cas_accepts_failure_stronger_than_success() {
        use core::sync::atomic::Ordering::Acquire;

        let cell = AtomicCell::new(5u32);
        assert_eq!(cell.compare_exchange(9, 1, Ordering::Relaxed, Acquire), Err(5));
        assert_eq!(cell.compare_exchange(5, 1, Ordering::Relaxed, Acquire), Ok(5));
        assert_eq!(cell.load(Relaxed), 1);
    }

    #[test]
    fn oversized_payload_roundtrip() {
        #[derive(Clone, Copy, PartialEq, Debug)]
        struct Wide([u64; 3]);

        let cell = AtomicCell::new(Wide([1, 2, 3]));
        assert_eq!(cell.load(SeqCst), Wide([1, 2, 3]));
        cell.store(Wide([4, 5, 6]), SeqCst);
        assert_eq!(cell.swap(Wide([7, 8, 9]), SeqCst), Wide([4, 5, 6]));
        assert_eq!(
            cell.compare_exchange(Wide([7, 8, 9]), Wide([0, 0, 0]), SeqCst, Relaxed),
            Ok(Wide([7, 8, 9]))
        );
        assert_eq!(
            cell.compare_exchange(Wide([7, 8, 9]), Wide([1, 1, 1]), SeqCst, Relaxed),
            Err(Wide([0, 0, 0]))
        );
    }

    #[test]
    fn byte_wise_comparison_distinguishes_signed_zero() {
        let cell = AtomicCell::new(-0.0f32);
        assert!(cell.compare_exchange(0.0, 1.0, SeqCst, Relaxed).is_err());
        assert!(cell.compare_exchange(-0.0, 1.0, SeqCst, Relaxed).is_ok());
        assert_eq!(cell.load(Relaxed), 1.0);
    }

    #[test]
    fn weak_retry_loop() {
        let cell = AtomicCell::new(100u8);
        let mut cur = cell.load(Relaxed);
        loop {
            match cell.compare_exchange_weak(cur, cur + 1, SeqCst, Relaxed) {
                Ok(_) => break,
                Err(v) => cur = v,
            }
        }
        assert_eq!(cell.load(Relaxed), 101);
    }

    #[test]
    fn get_mut_and_into_inner() {
        let mut cell = AtomicCell::new(3u64);
        *cell.get_mut() += 1;
        assert_eq!(cell.into_inner(), 4);
    }

    #[test]
    #[should_panic(expected = "not a valid ordering for an atomic load")]
    fn load_rejects_release() {
        AtomicCell::new(0u32).load(Ordering::Release);
    }
}
