//! Blocking wait/notify on 32-bit atomics (`std` only).
//!
//! A futex-shaped facility: a thread waits until an atomic's value is no
//! longer the one it last observed, and writers wake it after storing a new
//! value. Portability over speed: the implementation is a fixed table of
//! mutex/condvar parking slots hashed by the atomic's address, not an OS
//! futex call.
//!
//! Slots are shared between unrelated addresses, so every wakeup is
//! conservative: woken threads re-check their own atomic and go back to sleep
//! if its value is unchanged. For the same reason [`notify_one`] may wake
//! more than one waiter; the contract only promises "at least one, if any
//! exist".

use core::sync::atomic::{AtomicU32, Ordering};

use std::sync::{Condvar, Mutex};

struct ParkSlot {
    // Guards the value re-check; bumped on every notify so a waiter that
    // raced with the notifier still observes that something happened.
    generation: Mutex<u64>,
    waiters: Condvar,
}

// Prime, as for the fallback lock table.
const LEN: usize = 61;

#[allow(clippy::declare_interior_mutable_const)]
const SLOT_INIT: ParkSlot = ParkSlot {
    generation: Mutex::new(0),
    waiters: Condvar::new(),
};
static SLOTS: [ParkSlot; LEN] = [SLOT_INIT; LEN];

#[inline]
fn slot_for(atomic: &AtomicU32) -> &'static ParkSlot {
    &SLOTS[(atomic as *const AtomicU32 as usize) % LEN]
}

/// Blocks until the value of `atomic` differs from `old`.
///
/// Returns immediately if it already differs. Otherwise the calling thread
/// sleeps until a [`notify_one`]/[`notify_all`] on the same atomic wakes it
/// and the observed value has actually changed; spurious wakeups never cause
/// a return with the value still equal to `old`.
///
/// # Example
///
/// ```
/// # use core::sync::atomic::{AtomicU32, Ordering};
/// # use atomic_access::wait::wait;
/// static X: AtomicU32 = AtomicU32::new(1);
/// // This returns immediately: the value is not 0.
/// wait(&X, 0);
/// ```
pub fn wait(atomic: &AtomicU32, old: u32) {
    if atomic.load(Ordering::SeqCst) != old {
        return;
    }
    let slot = slot_for(atomic);
    let mut generation = slot.generation.lock().unwrap();
    // The store in the notifier happens-before its generation bump, and the
    // bump is taken under this mutex, so a waiter that sees the old value
    // here cannot miss the wakeup that follows.
    while atomic.load(Ordering::SeqCst) == old {
        generation = slot.waiters.wait(generation).unwrap();
    }
}

/// Wakes at least one thread blocked in [`wait`] on `atomic`, if any.
///
/// Parking slots are address-hashed and shared, so this may wake more than
/// one thread (each re-checks its own value). Call it after storing the new
/// value.
pub fn notify_one(atomic: &AtomicU32) {
    notify_all(atomic);
}

/// Wakes every thread blocked in [`wait`] on `atomic`.
pub fn notify_all(atomic: &AtomicU32) {
    let slot = slot_for(atomic);
    {
        let mut generation = slot.generation.lock().unwrap();
        *generation = generation.wrapping_add(1);
    }
    slot.waiters.notify_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn returns_immediately_when_value_differs() {
        let x = AtomicU32::new(5);
        wait(&x, 4);
    }

    #[test]
    fn blocked_waiter_sees_new_value() {
        static X: AtomicU32 = AtomicU32::new(1);

        let waiter = std::thread::spawn(|| {
            wait(&X, 1);
            X.load(Ordering::SeqCst)
        });

        // Give the waiter a chance to actually block.
        std::thread::sleep(std::time::Duration::from_millis(50));
        X.store(3, Ordering::SeqCst);
        notify_one(&X);

        assert_eq!(waiter.join().unwrap(), 3);
    }

    #[test]
    fn notify_all_wakes_every_waiter() {
        static X: AtomicU32 = AtomicU32::new(0);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    wait(&X, 0);
                    X.load(Ordering::SeqCst)
                })
            })
            .collect();

        std::thread::sleep(std::time::Duration::from_millis(50));
        X.store(9, Ordering::SeqCst);
        notify_all(&X);

        for h in handles {
            assert_eq!(h.join().unwrap(), 9);
        }
    }
}
