//! Atomic memory-access primitives.
//!
//! This crate is the support layer a compiler or runtime leans on to
//! implement atomic objects: per-width lock-free routines over raw pointers
//! ([`raw`]), a spinlock-backed fallback for payloads no native instruction
//! covers ([`fallback`]), fence primitives ([`fence`]), memory-order
//! validation ([`order`]), and the typed front ends built from those pieces:
//! [`AtomicCell`] for arbitrary `Copy` payloads and [`AtomicF32`]/`AtomicF64`
//! for floats. With the `std` feature, [`wait`] adds blocking wait/notify on
//! 32-bit atomics.
//!
//! ```
//! use atomic_access::AtomicCell;
//! use core::sync::atomic::Ordering::{Acquire, Release};
//!
//! static LIMIT: AtomicCell<u32> = AtomicCell::new(100);
//!
//! // One native instruction: u32 matches an atomic width.
//! LIMIT.store(250, Release);
//! assert_eq!(LIMIT.load(Acquire), 250);
//!
//! // Too big for any native width: serialized through the lock table.
//! let config = AtomicCell::new([0u64; 4]);
//! assert!(!AtomicCell::<[u64; 4]>::is_lock_free());
//! config.store([1, 2, 3, 4], Release);
//! ```
//!
//! # Which path does an access take?
//!
//! Objects of size 1, 2, 4, or 8 bytes (8 requires the `atomic64` feature)
//! with at least natural alignment go lock-free; everything else acquires a
//! slot in a process-wide spinlock table keyed by the object's address and is
//! copied under that lock. The mapping from address to slot is deterministic,
//! so conflicting accesses always contend on the same slot; the table lives
//! for the whole process and is never torn down.
//!
//! # Portability
//!
//! As portable as `core::sync::atomic` for the widths involved. Not every
//! architecture has 64-bit atomics, so the 64-bit families sit behind the
//! on-by-default `atomic64` feature and are force-disabled on 32-bit MIPS and
//! PowerPC targets. If some dependency enabled the feature and your target
//! lacks the instructions, build with
//! `RUSTFLAGS="--cfg=force_disable_atomic64"`.
//!
//! # Ordering misuse
//!
//! Nonsensical order/operation combinations (a `Release` load, an `Acquire`
//! store) panic rather than silently downgrade; see [`order`]. Operations
//! that need a load ordering derived from an RMW ordering (the
//! compare-exchange loops behind `fetch_add` on floats, for instance) use
//! the standard-mandated mapping in [`order::fail_order_for`].
#![no_std]
#![deny(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

pub mod fallback;
pub mod fence;
pub mod order;
pub mod raw;

mod backoff;
mod cell;
mod float;
mod lock;

#[cfg(feature = "std")]
pub mod wait;

pub use backoff::Backoff;
pub use cell::AtomicCell;
pub use float::AtomicF32;

#[cfg(all(
    feature = "atomic64",
    not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
))]
pub use float::AtomicF64;
