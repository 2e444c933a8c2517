//! Fence primitives.
//!
//! [`thread_fence`] emits a hardware fence and participates in cross-thread
//! happens-before; [`signal_fence`] only constrains the compiler and is meant
//! for synchronizing with an asynchronous signal handler running on the same
//! thread. On x86 the acquire/release/acq-rel flavors of `thread_fence`
//! compile to no CPU barrier at all (the TSO model already provides them),
//! while weakly-ordered targets get the corresponding `dmb`-style barrier.

use core::sync::atomic::{compiler_fence, fence, Ordering};

/// Issues a cross-thread memory fence with the given ordering.
///
/// `Relaxed` is a no-op: a relaxed fence constrains nothing, and this is the
/// one spot where that tag is normalized away instead of rejected (the
/// standard permits it, [`fence`] itself does not).
///
/// # Example
///
/// ```
/// # use atomic_access::fence::thread_fence;
/// # use core::sync::atomic::Ordering;
/// thread_fence(Ordering::SeqCst);
/// thread_fence(Ordering::Relaxed); // does nothing
/// ```
#[inline]
pub fn thread_fence(order: Ordering) {
    match order {
        Ordering::Relaxed => {}
        o => fence(o),
    }
}

/// Issues a compiler-only reordering barrier with the given ordering.
///
/// No CPU fence instruction is emitted; memory accesses are only prevented
/// from being reordered across this call by the compiler. `Relaxed` is a
/// no-op, as for [`thread_fence`].
#[inline]
pub fn signal_fence(order: Ordering) {
    match order {
        Ordering::Relaxed => {}
        o => compiler_fence(o),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::Ordering::*;

    // Fences have no observable single-threaded effect; these only check that
    // every tag, including Relaxed, is accepted without panicking.
    #[test]
    fn all_orders_accepted() {
        for o in [Relaxed, Acquire, Release, AcqRel, SeqCst] {
            thread_fence(o);
            signal_fence(o);
        }
    }
}
