//! The process-wide spinlock table backing the lock-based fallback path.
//!
//! Objects too large (or too weakly aligned) for a native atomic instruction
//! are serialized through a fixed table of lock words. The slot for an object
//! is picked from its address, so two threads touching the same object always
//! contend on the same slot; unrelated objects may collide, which costs
//! contention but never correctness.
//!
//! The table is a `static`, initialized before `main` and never torn down:
//! other threads may still be inside a critical section at process exit.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::backoff::Backoff;

// Prime, so that strided address patterns spread across slots.
const LEN: usize = 127;

const UNLOCKED: AtomicBool = AtomicBool::new(false);
static LOCKS: [AtomicBool; LEN] = [UNLOCKED; LEN];

/// Releases the held slot when dropped.
pub(crate) struct LockGuard {
    slot: &'static AtomicBool,
}

impl Drop for LockGuard {
    #[inline]
    fn drop(&mut self) {
        self.slot.store(false, Ordering::Release);
    }
}

/// Acquires the lock slot guarding the object at `addr`.
///
/// Spins with exponential backoff until the slot is free. The critical
/// sections this protects are small fixed-size memory copies, so hold times
/// are short, but there is no fairness guarantee.
#[inline]
pub(crate) fn lock_for(addr: usize) -> LockGuard {
    let slot = &LOCKS[addr % LEN];
    let backoff = Backoff::new();
    while slot
        .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
        .is_err()
    {
        backoff.wait();
    }
    LockGuard { slot }
}
