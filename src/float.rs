//! Typed atomic floats built on the same-width integer atomics.
//!
//! `AtomicF32` and `AtomicF64` have the in-memory representation of `f32` and
//! `f64`; atomic operations are performed by refcasting to the matching
//! `AtomicU32`/`AtomicU64`. Load/store/swap are single instructions;
//! arithmetic RMW needs a compare-exchange loop, so it is slower than the
//! integer equivalents. Sign-bit operations (`fetch_abs`, `fetch_neg`) work
//! directly on the bit pattern and stay single-instruction.
//!
//! CaS-family comparisons are *bitwise*: `-0.0` does not match `+0.0`, and
//! NaN payloads are significant. Avoid deriving the `current` argument
//! arithmetically.

use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::Ordering;

use crate::order::fail_order_for;
use crate::raw;

macro_rules! atomic_float {
    (
        $(#[$attr:meta])*
        $name:ident, $float:ty, $bits:ty, $atomic:ident,
        $load:ident, $store:ident, $exchange:ident, $fetch_add:ident, $fetch_sub:ident,
        $abs_mask:expr, $sign_mask:expr
    ) => {
        $(#[$attr])*
        #[doc = concat!("A `", stringify!($float), "` which can be safely shared between threads.")]
        ///
        /// Has the same in-memory representation as the underlying float.
        ///
        /// # Example
        ///
        /// ```
        #[doc = concat!("# use atomic_access::", stringify!($name), ";")]
        /// # use core::sync::atomic::Ordering;
        #[doc = concat!("static SCALE: ", stringify!($name), " = ", stringify!($name), "::new(1.0);")]
        ///
        /// SCALE.store(0.5, Ordering::Release);
        /// let s = SCALE.load(Ordering::Acquire);
        /// assert_eq!(s, 0.5);
        /// ```
        #[repr(transparent)]
        pub struct $name(UnsafeCell<$float>);

        $(#[$attr])*
        // SAFETY: all shared access refcasts to the integer atomic of the
        // same width, which rules out data races.
        unsafe impl Send for $name {}
        $(#[$attr])*
        unsafe impl Sync for $name {}

        $(#[$attr])*
        // Layout must match the integer atomic we refcast to.
        const _: [(); core::mem::size_of::<core::sync::atomic::$atomic>()] =
            [(); core::mem::size_of::<UnsafeCell<$float>>()];
        $(#[$attr])*
        const _: [(); core::mem::align_of::<core::sync::atomic::$atomic>()] =
            [(); core::mem::align_of::<UnsafeCell<$float>>()];

        $(#[$attr])*
        impl $name {
            /// Creates a new atomic float.
            ///
            /// Usable in `const` and `static` initializers.
            #[inline]
            pub const fn new(float: $float) -> Self {
                Self(UnsafeCell::new(float))
            }

            /// Returns a mutable reference to the underlying float.
            ///
            /// Safe because the exclusive borrow proves no concurrent access.
            #[inline]
            pub fn get_mut(&mut self) -> &mut $float {
                unsafe { &mut *self.0.get() }
            }

            /// Consumes the atomic and returns the contained float.
            #[inline]
            pub fn into_inner(self) -> $float {
                self.0.into_inner()
            }

            /// Loads the value.
            ///
            /// # Panics
            ///
            /// Panics if `order` is `Release` or `AcqRel`.
            #[inline]
            pub fn load(&self, order: Ordering) -> $float {
                // SAFETY: self.0 is valid and aligned for the atomic width.
                unsafe { raw::$load(self.0.get(), order) }
            }

            /// Stores a value.
            ///
            /// # Panics
            ///
            /// Panics if `order` is `Acquire` or `AcqRel`.
            #[inline]
            pub fn store(&self, value: $float, order: Ordering) {
                unsafe { raw::$store(self.0.get(), value, order) }
            }

            /// Stores a value, returning the previous one. All orderings are
            /// allowed.
            #[inline]
            pub fn swap(&self, value: $float, order: Ordering) -> $float {
                unsafe { raw::$exchange(self.0.get(), value, order) }
            }

            /// Stores `new` if the current value is *bitwise identical* to
            /// `current`.
            ///
            /// Returns `Ok(previous)` on success, `Err(actual)` on failure;
            /// a failing call leaves the value unchanged. Never fails
            /// spuriously.
            #[inline]
            pub fn compare_exchange(
                &self,
                current: $float,
                new: $float,
                success: Ordering,
                failure: Ordering,
            ) -> Result<$float, $float> {
                match self.as_atomic_bits().compare_exchange(
                    current.to_bits(),
                    new.to_bits(),
                    success,
                    failure,
                ) {
                    Ok(v) => Ok(<$float>::from_bits(v)),
                    Err(v) => Err(<$float>::from_bits(v)),
                }
            }

            /// Weak variant of [`compare_exchange`](Self::compare_exchange);
            /// may fail spuriously, so call it in a retry loop.
            #[inline]
            pub fn compare_exchange_weak(
                &self,
                current: $float,
                new: $float,
                success: Ordering,
                failure: Ordering,
            ) -> Result<$float, $float> {
                match self.as_atomic_bits().compare_exchange_weak(
                    current.to_bits(),
                    new.to_bits(),
                    success,
                    failure,
                ) {
                    Ok(v) => Ok(<$float>::from_bits(v)),
                    Err(v) => Err(<$float>::from_bits(v)),
                }
            }

            /// Fetches the value and applies `update` to it until the result
            /// commits, returning `Ok(previous)` once `update` returns
            /// `Some` and the exchange succeeds, or `Err(previous)` the
            /// first time `update` returns `None`.
            ///
            /// `update` may be called multiple times under contention.
            #[inline]
            pub fn fetch_update<F>(
                &self,
                set_order: Ordering,
                fetch_order: Ordering,
                mut update: F,
            ) -> Result<$float, $float>
            where
                F: FnMut($float) -> Option<$float>,
            {
                let res = self
                    .as_atomic_bits()
                    .fetch_update(set_order, fetch_order, |prev| {
                        update(<$float>::from_bits(prev)).map(<$float>::to_bits)
                    });
                match res {
                    Ok(v) => Ok(<$float>::from_bits(v)),
                    Err(v) => Err(<$float>::from_bits(v)),
                }
            }

            /// Adds to the current value, returning the previous value.
            ///
            /// Compare-exchange loop under the hood; slower than integer
            /// `fetch_add`.
            #[inline]
            pub fn fetch_add(&self, val: $float, order: Ordering) -> $float {
                unsafe { raw::$fetch_add(self.0.get(), val, order) }
            }

            /// Subtracts from the current value, returning the previous
            /// value.
            #[inline]
            pub fn fetch_sub(&self, val: $float, order: Ordering) -> $float {
                unsafe { raw::$fetch_sub(self.0.get(), val, order) }
            }

            /// Replaces the current value with its absolute value, returning
            /// the previous value. Single sign-bit AND, no loop.
            #[inline]
            pub fn fetch_abs(&self, order: Ordering) -> $float {
                <$float>::from_bits(self.as_atomic_bits().fetch_and($abs_mask, order))
            }

            /// Negates the current value, returning the previous value.
            /// Single sign-bit XOR, no loop.
            #[inline]
            pub fn fetch_neg(&self, order: Ordering) -> $float {
                <$float>::from_bits(self.as_atomic_bits().fetch_xor($sign_mask, order))
            }

            /// Minimum of the current value and `val`, returning the previous
            /// value.
            #[inline]
            pub fn fetch_min(&self, val: $float, order: Ordering) -> $float {
                self.update_with(order, |f| f.min(val))
            }

            /// Maximum of the current value and `val`, returning the previous
            /// value.
            #[inline]
            pub fn fetch_max(&self, val: $float, order: Ordering) -> $float {
                self.update_with(order, |f| f.max(val))
            }

            #[inline]
            fn update_with<F>(&self, order: Ordering, mut update: F) -> $float
            where
                F: FnMut($float) -> $float,
            {
                // The unwrap cannot fail: the closure never returns None.
                self.fetch_update(order, fail_order_for(order), |f| Some(update(f)))
                    .unwrap()
            }

            /// Returns a reference to the integer atomic sharing this
            /// float's storage, for callers that want to operate on the raw
            /// bits (e.g. to sidestep NaN canonicalization issues in
            /// CaS-family calls).
            #[inline]
            pub fn as_atomic_bits(&self) -> &core::sync::atomic::$atomic {
                // SAFETY: the layout assertions above guarantee the cast is
                // valid, and all shared mutation goes through atomics.
                unsafe { &*(&self.0 as *const _ as *const core::sync::atomic::$atomic) }
            }
        }

        $(#[$attr])*
        /// Returns a zero-initialized atomic.
        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::new(0.0)
            }
        }

        $(#[$attr])*
        #[doc = concat!("Equivalent to `", stringify!($name), "::new`.")]
        impl From<$float> for $name {
            #[inline]
            fn from(f: $float) -> Self {
                Self::new(f)
            }
        }

        $(#[$attr])*
        /// Compares the current values (`SeqCst` loads). Numeric equality,
        /// unlike the CaS family: `-0.0 == 0.0` here.
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.load(Ordering::SeqCst) == other.load(Ordering::SeqCst)
            }
        }

        $(#[$attr])*
        /// Formats the current value (`SeqCst` load).
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.load(Ordering::SeqCst).fmt(f)
            }
        }

        $(#[$attr])*
        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.load(Ordering::SeqCst).serialize(serializer)
            }
        }

        $(#[$attr])*
        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                <$float>::deserialize(deserializer).map(Self::new)
            }
        }
    };
}

atomic_float! {
    AtomicF32, f32, u32, AtomicU32,
    load_f32, store_f32, exchange_f32, fetch_add_f32, fetch_sub_f32,
    0x7fff_ffff, 0x8000_0000
}

atomic_float! {
    #[cfg(all(
        feature = "atomic64",
        not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
    ))]
    AtomicF64, f64, u64, AtomicU64,
    load_f64, store_f64, exchange_f64, fetch_add_f64, fetch_sub_f64,
    0x7fff_ffff_ffff_ffff, 0x8000_0000_0000_0000
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::Ordering::{Relaxed, SeqCst};

    #[test]
    fn rmw_family_f32() {
        let x = AtomicF32::new(7.0);
        assert_eq!(x.fetch_add(2.0, Relaxed), 7.0);
        assert_eq!(x.fetch_sub(1.0, SeqCst), 9.0);
        assert_eq!(x.swap(-4.0, Relaxed), 8.0);
        assert_eq!(x.fetch_abs(Relaxed), -4.0);
        assert_eq!(x.fetch_neg(Relaxed), 4.0);
        assert_eq!(x.load(Relaxed), -4.0);
        assert_eq!(x.fetch_max(1.0, Relaxed), -4.0);
        assert_eq!(x.fetch_min(0.5, Relaxed), 1.0);
        assert_eq!(x.load(Relaxed), 0.5);
    }

    #[test]
    fn fetch_update_stops_on_none() {
        let x = AtomicF32::new(7.0);
        assert_eq!(x.fetch_update(SeqCst, SeqCst, |_| None), Err(7.0));
        assert_eq!(x.fetch_update(SeqCst, SeqCst, |v| Some(v + 1.0)), Ok(7.0));
        assert_eq!(x.load(SeqCst), 8.0);
    }

    #[test]
    fn bitwise_cas_distinguishes_nan_payloads() {
        let x = AtomicF32::new(1.0);
        assert_eq!(x.compare_exchange(1.0, 2.0, SeqCst, Relaxed), Ok(1.0));
        assert!(x.compare_exchange(1.0, 3.0, SeqCst, Relaxed).is_err());
        assert_eq!(x.load(Relaxed), 2.0);
    }

    #[cfg(all(
        feature = "atomic64",
        not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
    ))]
    #[test]
    fn rmw_family_f64() {
        let x = AtomicF64::new(1.5);
        assert_eq!(x.fetch_add(0.25, Relaxed), 1.5);
        assert_eq!(x.fetch_neg(SeqCst), 1.75);
        assert_eq!(x.load(Relaxed), -1.75);
        let bits = x.as_atomic_bits().load(Relaxed);
        assert_eq!(f64::from_bits(bits), -1.75);
    }
}
