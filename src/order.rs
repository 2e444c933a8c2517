//! Memory-order validation and normalization.
//!
//! Atomic operations in this crate take the standard
//! [`Ordering`](core::sync::atomic::Ordering) tags. C11's `consume` has no
//! Rust spelling; callers wanting consume semantics pass `Acquire`, which is
//! what every mainstream compiler promotes it to anyway.
//!
//! Two kinds of handling live here and they are deliberately different:
//!
//! - Deriving a load order from an RMW order (`Release → Relaxed`,
//!   `AcqRel → Acquire`) is normalization mandated by the language standard,
//!   never an error. The compare-exchange loops behind the arithmetic RMWs
//!   use it for their loads; callers may use it to pick a default
//!   compare-exchange failure order.
//! - Asking a pure load for release semantics (or a pure store for acquire
//!   semantics) is a bug in the caller. Those combinations panic rather than
//!   silently downgrading, so the bug surfaces at the call site instead of as
//!   a missing synchronization edge three modules away.

use core::sync::atomic::Ordering;

/// Returns the strongest load ordering an operation with the given RMW
/// ordering may use, e.g. as a compare-exchange failure order derived from
/// the success order.
///
/// # Example
///
/// ```
/// # use atomic_access::order::fail_order_for;
/// # use core::sync::atomic::Ordering::*;
/// assert_eq!(fail_order_for(AcqRel), Acquire);
/// assert_eq!(fail_order_for(Release), Relaxed);
/// assert_eq!(fail_order_for(SeqCst), SeqCst);
/// ```
#[inline]
pub fn fail_order_for(order: Ordering) -> Ordering {
    match order {
        Ordering::Release | Ordering::Relaxed => Ordering::Relaxed,
        Ordering::Acquire | Ordering::AcqRel => Ordering::Acquire,
        Ordering::SeqCst => Ordering::SeqCst,
        o => o,
    }
}

/// Checks that `order` is legal for a pure atomic load.
///
/// # Panics
///
/// Panics if `order` is [`Release`](Ordering::Release) or
/// [`AcqRel`](Ordering::AcqRel).
#[inline]
pub fn validate_load_order(order: Ordering) {
    match order {
        Ordering::Release | Ordering::AcqRel => {
            panic!("{:?} is not a valid ordering for an atomic load", order)
        }
        _ => {}
    }
}

/// Checks that `order` is legal for a pure atomic store.
///
/// # Panics
///
/// Panics if `order` is [`Acquire`](Ordering::Acquire) or
/// [`AcqRel`](Ordering::AcqRel).
#[inline]
pub fn validate_store_order(order: Ordering) {
    match order {
        Ordering::Acquire | Ordering::AcqRel => {
            panic!("{:?} is not a valid ordering for an atomic store", order)
        }
        _ => {}
    }
}

/// Checks that `order` is legal as a compare-exchange failure ordering.
///
/// The failure path of a compare-exchange performs no store, so it can never
/// carry release semantics.
///
/// # Panics
///
/// Panics if `order` is [`Release`](Ordering::Release) or
/// [`AcqRel`](Ordering::AcqRel).
#[inline]
pub fn validate_failure_order(order: Ordering) {
    match order {
        Ordering::Release | Ordering::AcqRel => {
            panic!("{:?} is not a valid failure ordering for compare-exchange", order)
        }
        _ => {}
    }
}
