//! Exponential backoff for spin loops.
//!
//! Keeps contended spin loops from hammering the cache line: each failed
//! attempt spins a little longer than the last, and once the spin count grows
//! past a threshold the thread yields to the scheduler (with `std` only;
//! without it the loop keeps spinning, which is all a bare-metal target can
//! do anyway).

use core::cell::Cell;
use core::hint::spin_loop;

const START: u32 = 1 << 3;
const MAX: u32 = 1 << 16;

#[cfg(feature = "std")]
const YIELD_THRESHOLD: u32 = 1 << 8;

/// An exponential backoff counter for one acquisition attempt sequence.
///
/// Create one per spin loop, call [`wait`](Backoff::wait) on each failed
/// attempt, and drop it once the attempt succeeds.
///
/// # Example
///
/// ```
/// # use atomic_access::Backoff;
/// # fn try_acquire() -> bool { true }
/// let backoff = Backoff::new();
/// while !try_acquire() {
///     backoff.wait();
/// }
/// ```
pub struct Backoff {
    spin: Cell<u32>,
}

impl Backoff {
    /// Creates a backoff counter at the starting spin count.
    #[inline]
    pub const fn new() -> Self {
        Self {
            spin: Cell::new(START),
        }
    }

    /// Spins for the current count, then doubles it (saturating at a cap).
    ///
    /// Under the `std` feature, once the count passes the yield threshold the
    /// slot's owner is probably preempted rather than briefly busy, so this
    /// also yields the thread.
    #[inline]
    pub fn wait(&self) {
        let spin = self.spin.get();
        for _ in 0..spin {
            spin_loop();
        }
        self.spin.set((spin << 1).min(MAX));

        #[cfg(feature = "std")]
        if spin > YIELD_THRESHOLD {
            std::thread::yield_now();
        }
    }

    /// Resets the counter back to the starting spin count.
    #[inline]
    pub fn reset(&self) {
        self.spin.set(START);
    }
}

impl Default for Backoff {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
