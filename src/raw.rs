//! Lock-free scalar access routines on raw pointers.
//!
//! One family per scalar width, generated from a single macro: load, store,
//! exchange, compare-exchange (strong and weak), fetch-ops returning the old
//! value, and op-fetch variants returning the new value. Floating-point
//! variants operate on the same-width integer cell by bit-casting, so a
//! bitwise comparison backs their compare-exchange and a CAS loop backs their
//! arithmetic.
//!
//! These are the primitives the typed wrappers ([`AtomicCell`],
//! [`AtomicF32`]) dispatch to; they are also usable directly when the caller
//! owns the memory layout, which is why they take raw pointers rather than
//! references to atomic types.
//!
//! [`AtomicCell`]: crate::AtomicCell
//! [`AtomicF32`]: crate::AtomicF32
//!
//! # Safety
//!
//! Every function here requires:
//!
//! - the pointer is non-null and valid for reads and writes of its width;
//! - the pointer is naturally aligned for the width (checked only by a debug
//!   assertion; the release path trusts the caller, matching the zero-cost
//!   contract of an intrinsics layer);
//! - all concurrent access to the location is performed through atomic
//!   operations of the same width.
//!
//! Ordering arguments follow the std atomics contract: `load` panics on
//! `Release`/`AcqRel`, `store` panics on `Acquire`/`AcqRel`, and
//! compare-exchange takes separate success and failure orderings, the failure
//! one legal for a load. The RMW loops derive the ordering for their initial
//! load with [`fail_order_for`](crate::order::fail_order_for).

#![allow(clippy::missing_safety_doc)]

use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU8, Ordering};

#[cfg(all(
    feature = "atomic64",
    not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
))]
use core::sync::atomic::AtomicU64;

use crate::order::fail_order_for;

macro_rules! int_family {
    ($int:ty, $uns:ty, $atomic:ident =>
        $load:ident $store:ident $exchange:ident
        $cas:ident $cas_weak:ident
        $fetch_add:ident $fetch_sub:ident $fetch_and:ident $fetch_or:ident $fetch_xor:ident
        $add_fetch:ident $sub_fetch:ident $and_fetch:ident $or_fetch:ident $xor_fetch:ident
        $mul_fetch:ident $div_fetch:ident $rem_fetch:ident
    ) => {
        #[doc = concat!("Atomically loads the `", stringify!($int), "` at `src`.")]
        #[inline]
        pub unsafe fn $load(src: *const $int, order: Ordering) -> $int {
            debug_assert_eq!(src as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(src as *const $atomic);
            a.load(order) as $int
        }

        #[doc = concat!("Atomically stores `val` to the `", stringify!($int), "` at `dst`.")]
        #[inline]
        pub unsafe fn $store(dst: *mut $int, val: $int, order: Ordering) {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            a.store(val as $uns, order);
        }

        #[doc = concat!("Atomically replaces the `", stringify!($int), "` at `dst` with `val`, returning the previous value.")]
        #[inline]
        pub unsafe fn $exchange(dst: *mut $int, val: $int, order: Ordering) -> $int {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            a.swap(val as $uns, order) as $int
        }

        #[doc = concat!("Strong compare-exchange on the `", stringify!($int), "` at `dst`.")]
        ///
        /// On success returns `true`. On failure returns `false` and writes
        /// the observed value through `expected`; the location is left
        /// unchanged. Never fails spuriously: if the observed value equals
        /// `*expected` at the instant of the attempt, the exchange commits.
        /// `failure` orders the load on the failing path and must be legal
        /// for a load.
        #[inline]
        pub unsafe fn $cas(
            dst: *mut $int,
            expected: &mut $int,
            desired: $int,
            success: Ordering,
            failure: Ordering,
        ) -> bool {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            match a.compare_exchange(
                *expected as $uns,
                desired as $uns,
                success,
                failure,
            ) {
                Ok(_) => true,
                Err(actual) => {
                    *expected = actual as $int;
                    false
                }
            }
        }

        #[doc = concat!("Weak compare-exchange on the `", stringify!($int), "` at `dst`.")]
        ///
        /// Identical to the strong variant except that it may fail spuriously
        /// (returning `false` with `*expected` unchanged in value), so it
        /// must be called in a retry loop.
        #[inline]
        pub unsafe fn $cas_weak(
            dst: *mut $int,
            expected: &mut $int,
            desired: $int,
            success: Ordering,
            failure: Ordering,
        ) -> bool {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            match a.compare_exchange_weak(
                *expected as $uns,
                desired as $uns,
                success,
                failure,
            ) {
                Ok(_) => true,
                Err(actual) => {
                    *expected = actual as $int;
                    false
                }
            }
        }

        #[doc = concat!("Atomic wrapping add on the `", stringify!($int), "` at `dst`, returning the previous value.")]
        #[inline]
        pub unsafe fn $fetch_add(dst: *mut $int, val: $int, order: Ordering) -> $int {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            a.fetch_add(val as $uns, order) as $int
        }

        #[doc = concat!("Atomic wrapping subtract on the `", stringify!($int), "` at `dst`, returning the previous value.")]
        #[inline]
        pub unsafe fn $fetch_sub(dst: *mut $int, val: $int, order: Ordering) -> $int {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            a.fetch_sub(val as $uns, order) as $int
        }

        #[doc = concat!("Atomic bitwise AND on the `", stringify!($int), "` at `dst`, returning the previous value.")]
        #[inline]
        pub unsafe fn $fetch_and(dst: *mut $int, val: $int, order: Ordering) -> $int {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            a.fetch_and(val as $uns, order) as $int
        }

        #[doc = concat!("Atomic bitwise OR on the `", stringify!($int), "` at `dst`, returning the previous value.")]
        #[inline]
        pub unsafe fn $fetch_or(dst: *mut $int, val: $int, order: Ordering) -> $int {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            a.fetch_or(val as $uns, order) as $int
        }

        #[doc = concat!("Atomic bitwise XOR on the `", stringify!($int), "` at `dst`, returning the previous value.")]
        #[inline]
        pub unsafe fn $fetch_xor(dst: *mut $int, val: $int, order: Ordering) -> $int {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            a.fetch_xor(val as $uns, order) as $int
        }

        #[doc = concat!("Atomic wrapping add on the `", stringify!($int), "` at `dst`, returning the new value.")]
        #[inline]
        pub unsafe fn $add_fetch(dst: *mut $int, val: $int, order: Ordering) -> $int {
            $fetch_add(dst, val, order).wrapping_add(val)
        }

        #[doc = concat!("Atomic wrapping subtract on the `", stringify!($int), "` at `dst`, returning the new value.")]
        #[inline]
        pub unsafe fn $sub_fetch(dst: *mut $int, val: $int, order: Ordering) -> $int {
            $fetch_sub(dst, val, order).wrapping_sub(val)
        }

        #[doc = concat!("Atomic bitwise AND on the `", stringify!($int), "` at `dst`, returning the new value.")]
        #[inline]
        pub unsafe fn $and_fetch(dst: *mut $int, val: $int, order: Ordering) -> $int {
            $fetch_and(dst, val, order) & val
        }

        #[doc = concat!("Atomic bitwise OR on the `", stringify!($int), "` at `dst`, returning the new value.")]
        #[inline]
        pub unsafe fn $or_fetch(dst: *mut $int, val: $int, order: Ordering) -> $int {
            $fetch_or(dst, val, order) | val
        }

        #[doc = concat!("Atomic bitwise XOR on the `", stringify!($int), "` at `dst`, returning the new value.")]
        #[inline]
        pub unsafe fn $xor_fetch(dst: *mut $int, val: $int, order: Ordering) -> $int {
            $fetch_xor(dst, val, order) ^ val
        }

        #[doc = concat!("Atomic wrapping multiply on the `", stringify!($int), "` at `dst`, returning the new value.")]
        ///
        /// Implemented as a weak compare-exchange loop; there is no native
        /// multiply instruction at any width.
        #[inline]
        pub unsafe fn $mul_fetch(dst: *mut $int, val: $int, order: Ordering) -> $int {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            let mut cur = a.load(fail_order_for(order));
            loop {
                let new = (cur as $int).wrapping_mul(val) as $uns;
                match a.compare_exchange_weak(cur, new, order, fail_order_for(order)) {
                    Ok(_) => return new as $int,
                    Err(next) => cur = next,
                }
            }
        }

        #[doc = concat!("Atomic divide on the `", stringify!($int), "` at `dst`, returning the new value.")]
        ///
        /// # Panics
        ///
        /// Panics if `val` is zero, matching ordinary integer division.
        #[inline]
        pub unsafe fn $div_fetch(dst: *mut $int, val: $int, order: Ordering) -> $int {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            let mut cur = a.load(fail_order_for(order));
            loop {
                let new = (cur as $int).wrapping_div(val) as $uns;
                match a.compare_exchange_weak(cur, new, order, fail_order_for(order)) {
                    Ok(_) => return new as $int,
                    Err(next) => cur = next,
                }
            }
        }

        #[doc = concat!("Atomic remainder on the `", stringify!($int), "` at `dst`, returning the new value.")]
        ///
        /// # Panics
        ///
        /// Panics if `val` is zero, matching ordinary integer division.
        #[inline]
        pub unsafe fn $rem_fetch(dst: *mut $int, val: $int, order: Ordering) -> $int {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            let mut cur = a.load(fail_order_for(order));
            loop {
                let new = (cur as $int).wrapping_rem(val) as $uns;
                match a.compare_exchange_weak(cur, new, order, fail_order_for(order)) {
                    Ok(_) => return new as $int,
                    Err(next) => cur = next,
                }
            }
        }
    };
}

int_family! { u8, u8, AtomicU8 =>
    load_u8 store_u8 exchange_u8
    compare_exchange_u8 compare_exchange_weak_u8
    fetch_add_u8 fetch_sub_u8 fetch_and_u8 fetch_or_u8 fetch_xor_u8
    add_fetch_u8 sub_fetch_u8 and_fetch_u8 or_fetch_u8 xor_fetch_u8
    mul_fetch_u8 div_fetch_u8 rem_fetch_u8
}

int_family! { i8, u8, AtomicU8 =>
    load_i8 store_i8 exchange_i8
    compare_exchange_i8 compare_exchange_weak_i8
    fetch_add_i8 fetch_sub_i8 fetch_and_i8 fetch_or_i8 fetch_xor_i8
    add_fetch_i8 sub_fetch_i8 and_fetch_i8 or_fetch_i8 xor_fetch_i8
    mul_fetch_i8 div_fetch_i8 rem_fetch_i8
}

int_family! { u16, u16, AtomicU16 =>
    load_u16 store_u16 exchange_u16
    compare_exchange_u16 compare_exchange_weak_u16
    fetch_add_u16 fetch_sub_u16 fetch_and_u16 fetch_or_u16 fetch_xor_u16
    add_fetch_u16 sub_fetch_u16 and_fetch_u16 or_fetch_u16 xor_fetch_u16
    mul_fetch_u16 div_fetch_u16 rem_fetch_u16
}

int_family! { i16, u16, AtomicU16 =>
    load_i16 store_i16 exchange_i16
    compare_exchange_i16 compare_exchange_weak_i16
    fetch_add_i16 fetch_sub_i16 fetch_and_i16 fetch_or_i16 fetch_xor_i16
    add_fetch_i16 sub_fetch_i16 and_fetch_i16 or_fetch_i16 xor_fetch_i16
    mul_fetch_i16 div_fetch_i16 rem_fetch_i16
}

int_family! { u32, u32, AtomicU32 =>
    load_u32 store_u32 exchange_u32
    compare_exchange_u32 compare_exchange_weak_u32
    fetch_add_u32 fetch_sub_u32 fetch_and_u32 fetch_or_u32 fetch_xor_u32
    add_fetch_u32 sub_fetch_u32 and_fetch_u32 or_fetch_u32 xor_fetch_u32
    mul_fetch_u32 div_fetch_u32 rem_fetch_u32
}

int_family! { i32, u32, AtomicU32 =>
    load_i32 store_i32 exchange_i32
    compare_exchange_i32 compare_exchange_weak_i32
    fetch_add_i32 fetch_sub_i32 fetch_and_i32 fetch_or_i32 fetch_xor_i32
    add_fetch_i32 sub_fetch_i32 and_fetch_i32 or_fetch_i32 xor_fetch_i32
    mul_fetch_i32 div_fetch_i32 rem_fetch_i32
}

#[cfg(all(
    feature = "atomic64",
    not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
))]
int_family! { u64, u64, AtomicU64 =>
    load_u64 store_u64 exchange_u64
    compare_exchange_u64 compare_exchange_weak_u64
    fetch_add_u64 fetch_sub_u64 fetch_and_u64 fetch_or_u64 fetch_xor_u64
    add_fetch_u64 sub_fetch_u64 and_fetch_u64 or_fetch_u64 xor_fetch_u64
    mul_fetch_u64 div_fetch_u64 rem_fetch_u64
}

#[cfg(all(
    feature = "atomic64",
    not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
))]
int_family! { i64, u64, AtomicU64 =>
    load_i64 store_i64 exchange_i64
    compare_exchange_i64 compare_exchange_weak_i64
    fetch_add_i64 fetch_sub_i64 fetch_and_i64 fetch_or_i64 fetch_xor_i64
    add_fetch_i64 sub_fetch_i64 and_fetch_i64 or_fetch_i64 xor_fetch_i64
    mul_fetch_i64 div_fetch_i64 rem_fetch_i64
}

macro_rules! float_family {
    ($float:ty, $bits:ty, $atomic:ident =>
        $load:ident $store:ident $exchange:ident
        $cas:ident $cas_weak:ident
        $fetch_add:ident $fetch_sub:ident $add_fetch:ident $sub_fetch:ident
    ) => {
        #[doc = concat!("Atomically loads the `", stringify!($float), "` at `src`.")]
        #[inline]
        pub unsafe fn $load(src: *const $float, order: Ordering) -> $float {
            debug_assert_eq!(src as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(src as *const $atomic);
            <$float>::from_bits(a.load(order))
        }

        #[doc = concat!("Atomically stores `val` to the `", stringify!($float), "` at `dst`.")]
        #[inline]
        pub unsafe fn $store(dst: *mut $float, val: $float, order: Ordering) {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            a.store(val.to_bits(), order);
        }

        #[doc = concat!("Atomically replaces the `", stringify!($float), "` at `dst` with `val`, returning the previous value.")]
        #[inline]
        pub unsafe fn $exchange(dst: *mut $float, val: $float, order: Ordering) -> $float {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            <$float>::from_bits(a.swap(val.to_bits(), order))
        }

        #[doc = concat!("Strong compare-exchange on the `", stringify!($float), "` at `dst`.")]
        ///
        /// The comparison is *bitwise*, not numeric: `-0.0` does not match
        /// `+0.0` and NaN payloads matter. On failure the observed value is
        /// written through `expected`.
        #[inline]
        pub unsafe fn $cas(
            dst: *mut $float,
            expected: &mut $float,
            desired: $float,
            success: Ordering,
            failure: Ordering,
        ) -> bool {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            match a.compare_exchange(
                expected.to_bits(),
                desired.to_bits(),
                success,
                failure,
            ) {
                Ok(_) => true,
                Err(actual) => {
                    *expected = <$float>::from_bits(actual);
                    false
                }
            }
        }

        #[doc = concat!("Weak compare-exchange on the `", stringify!($float), "` at `dst`; may fail spuriously.")]
        #[inline]
        pub unsafe fn $cas_weak(
            dst: *mut $float,
            expected: &mut $float,
            desired: $float,
            success: Ordering,
            failure: Ordering,
        ) -> bool {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            match a.compare_exchange_weak(
                expected.to_bits(),
                desired.to_bits(),
                success,
                failure,
            ) {
                Ok(_) => true,
                Err(actual) => {
                    *expected = <$float>::from_bits(actual);
                    false
                }
            }
        }

        #[doc = concat!("Atomic add on the `", stringify!($float), "` at `dst`, returning the previous value.")]
        ///
        /// There is no native floating-point RMW instruction, so this is a
        /// weak compare-exchange loop over the integer cell; expect it to be
        /// slower than the integer `fetch_add`.
        #[inline]
        pub unsafe fn $fetch_add(dst: *mut $float, val: $float, order: Ordering) -> $float {
            debug_assert_eq!(dst as usize % core::mem::align_of::<$atomic>(), 0);
            let a = &*(dst as *const $atomic);
            let mut cur = a.load(fail_order_for(order));
            loop {
                let new = (<$float>::from_bits(cur) + val).to_bits();
                match a.compare_exchange_weak(cur, new, order, fail_order_for(order)) {
                    Ok(prev) => return <$float>::from_bits(prev),
                    Err(next) => cur = next,
                }
            }
        }

        #[doc = concat!("Atomic subtract on the `", stringify!($float), "` at `dst`, returning the previous value.")]
        #[inline]
        pub unsafe fn $fetch_sub(dst: *mut $float, val: $float, order: Ordering) -> $float {
            $fetch_add(dst, -val, order)
        }

        #[doc = concat!("Atomic add on the `", stringify!($float), "` at `dst`, returning the new value.")]
        #[inline]
        pub unsafe fn $add_fetch(dst: *mut $float, val: $float, order: Ordering) -> $float {
            $fetch_add(dst, val, order) + val
        }

        #[doc = concat!("Atomic subtract on the `", stringify!($float), "` at `dst`, returning the new value.")]
        #[inline]
        pub unsafe fn $sub_fetch(dst: *mut $float, val: $float, order: Ordering) -> $float {
            $fetch_sub(dst, val, order) - val
        }
    };
}

float_family! { f32, u32, AtomicU32 =>
    load_f32 store_f32 exchange_f32
    compare_exchange_f32 compare_exchange_weak_f32
    fetch_add_f32 fetch_sub_f32 add_fetch_f32 sub_fetch_f32
}

#[cfg(all(
    feature = "atomic64",
    not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
))]
float_family! { f64, u64, AtomicU64 =>
    load_f64 store_f64 exchange_f64
    compare_exchange_f64 compare_exchange_weak_f64
    fetch_add_f64 fetch_sub_f64 add_fetch_f64 sub_fetch_f64
}

/// Returns `true` if an object of the given size and alignment can be
/// accessed with a single native atomic instruction.
///
/// # Example
///
/// ```
/// # use atomic_access::raw::is_lock_free;
/// assert!(is_lock_free(4, 4));
/// assert!(!is_lock_free(3, 1));
/// assert!(!is_lock_free(4, 2)); // under-aligned
/// ```
#[inline]
pub fn is_lock_free(size: usize, align: usize) -> bool {
    #[allow(unused_mut)]
    let mut native = matches!(size, 1 | 2 | 4);
    #[cfg(all(
        feature = "atomic64",
        not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
    ))]
    {
        native = native || size == 8;
    }
    native && align >= size
}
