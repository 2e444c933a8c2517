//! Torn-write detection: a reader racing two writers must only ever observe
//! one writer's pattern in full, never a byte-level mixture.

use atomic_access::{raw, AtomicCell};
use core::cell::UnsafeCell;
use core::sync::atomic::Ordering::{Relaxed, SeqCst};
use std::thread;

#[cfg(all(
    feature = "atomic64",
    not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
))]
#[test]
fn no_torn_values_at_64_bit_width() {
    const A: u64 = 0x1111_1111_1111_1111;
    const B: u64 = 0x2222_2222_2222_2222;

    let cell = UnsafeCell::new(A);
    let addr = cell.get() as usize;
    static STOP: AtomicCell<u32> = AtomicCell::new(0);
    STOP.store(0, SeqCst);

    thread::scope(|s| {
        s.spawn(move || {
            while STOP.load(Relaxed) == 0 {
                unsafe { raw::store_u64(addr as *mut u64, A, Relaxed) };
            }
        });
        s.spawn(move || {
            while STOP.load(Relaxed) == 0 {
                unsafe { raw::store_u64(addr as *mut u64, B, Relaxed) };
            }
        });
        s.spawn(move || {
            for _ in 0..100_000 {
                let v = unsafe { raw::load_u64(addr as *const u64, Relaxed) };
                assert!(v == A || v == B, "torn 64-bit value: {v:#x}");
            }
            STOP.store(1, SeqCst);
        });
    });
}

#[test]
fn no_torn_values_at_16_bit_width() {
    const A: u16 = 0xAAAA;
    const B: u16 = 0x5555;

    let cell = UnsafeCell::new(A);
    let addr = cell.get() as usize;
    static STOP: AtomicCell<u32> = AtomicCell::new(0);
    STOP.store(0, SeqCst);

    thread::scope(|s| {
        s.spawn(move || {
            while STOP.load(Relaxed) == 0 {
                unsafe { raw::exchange_u16(addr as *mut u16, A, Relaxed) };
            }
        });
        s.spawn(move || {
            while STOP.load(Relaxed) == 0 {
                unsafe { raw::exchange_u16(addr as *mut u16, B, Relaxed) };
            }
        });
        s.spawn(move || {
            for _ in 0..100_000 {
                let v = unsafe { raw::load_u16(addr as *const u16, Relaxed) };
                assert!(v == A || v == B, "torn 16-bit value: {v:#x}");
            }
            STOP.store(1, SeqCst);
        });
    });
}

#[test]
fn no_torn_values_through_the_lock_based_path() {
    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Wide([u64; 3]);
    const A: Wide = Wide([0x1111_1111_1111_1111; 3]);
    const B: Wide = Wide([0x2222_2222_2222_2222; 3]);

    static VALUE: AtomicCell<Wide> = AtomicCell::new(A);
    static STOP: AtomicCell<u32> = AtomicCell::new(0);
    assert!(!AtomicCell::<Wide>::is_lock_free());

    thread::scope(|s| {
        s.spawn(|| {
            while STOP.load(Relaxed) == 0 {
                VALUE.store(A, SeqCst);
            }
        });
        s.spawn(|| {
            while STOP.load(Relaxed) == 0 {
                VALUE.swap(B, SeqCst);
            }
        });
        s.spawn(|| {
            for _ in 0..20_000 {
                let v = VALUE.load(SeqCst);
                assert!(v == A || v == B, "torn oversized value: {v:?}");
            }
            STOP.store(1, SeqCst);
        });
    });
}
