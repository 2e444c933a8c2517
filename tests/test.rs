// Note: most coverage lives in doctests and the per-module unit tests.
use atomic_access::AtomicF32;
use core::sync::atomic::Ordering::*;

#[test]
fn float_api_smoke() {
    static A_STATIC: AtomicF32 = AtomicF32::new(800.0);

    A_STATIC.fetch_add(30.0, Relaxed);
    A_STATIC.fetch_sub(-55.0, Relaxed);

    // Sign-bit operations work on the binary representation directly.
    A_STATIC.fetch_neg(Relaxed);

    assert_eq!(A_STATIC.load(Relaxed), -885.0);
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_cell() {
    serde_test::assert_tokens(
        &atomic_access::AtomicCell::new(7u32),
        &[serde_test::Token::U32(7)],
    );
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_f32() {
    serde_test::assert_tokens(
        &atomic_access::AtomicF32::new(1.0),
        &[serde_test::Token::F32(1.0)],
    );
}

#[cfg(all(
    feature = "atomic64",
    not(any(target_arch = "powerpc", target_arch = "mips", force_disable_atomic64))
))]
#[cfg(feature = "serde")]
#[test]
fn test_serde_f64() {
    serde_test::assert_tokens(
        &atomic_access::AtomicF64::new(1.0),
        &[serde_test::Token::F64(1.0)],
    );
}
