//! Randomized invariants of the curve, accelerator and signature layers.

use proptest::prelude::*;

use edgex_sdk::bigint::BigInt;
use edgex_sdk::curve::field::{CurveOrder, FieldConfig};
use edgex_sdk::{
    hash_elements, hash_elements_fast, scalar_base_mul, sign, verify, CurvePoint, FieldElement,
    ScalarElement, Signature,
};

// ============================================
// Strategies
// ============================================

/// A scalar below 2^251 (and therefore below both moduli), never zero.
fn arb_scalar() -> impl Strategy<Value = ScalarElement> {
    any::<[u8; 32]>()
        .prop_map(|mut bytes| {
            bytes[0] &= 0x07;
            ScalarElement::new(BigInt::from_be_bytes(&bytes).expect("32 bytes fit"))
        })
        .prop_filter("nonzero scalar", |s| !s.is_zero())
}

/// A base-field element below 2^251.
fn arb_felt() -> impl Strategy<Value = FieldElement> {
    any::<[u8; 32]>().prop_map(|mut bytes| {
        bytes[0] &= 0x07;
        FieldElement::new(BigInt::from_be_bytes(&bytes).expect("32 bytes fit"))
    })
}

/// A random point on the curve, as a scalar multiple of G.
fn arb_point() -> impl Strategy<Value = CurvePoint> {
    arb_scalar().prop_map(|k| scalar_base_mul(k.value()).expect("tables load"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: every scalar multiple of G lands on the curve.
    #[test]
    fn scalar_multiples_of_g_stay_on_curve(k in arb_scalar()) {
        let p = CurvePoint::generator().scalar_mul(k.value());
        prop_assert!(p.is_on_curve());
    }

    // Invariant 2: point addition commutes.
    #[test]
    fn addition_commutes(p in arb_point(), q in arb_point()) {
        prop_assert_eq!(p.add(&q), q.add(&p));
    }

    // Invariant 3: a point plus its negation is the identity.
    #[test]
    fn negation_sums_to_zero(p in arb_point()) {
        prop_assert_eq!(p.add(&p.neg()), CurvePoint::Zero);
    }

    // Invariant 4: the window accelerator equals plain double-and-add.
    #[test]
    fn windowed_base_mult_matches_generic(k in arb_scalar()) {
        let fast = scalar_base_mul(k.value()).unwrap();
        let slow = CurvePoint::generator().scalar_mul(k.value());
        prop_assert_eq!(fast, slow);
    }

    // Invariant 5: fast and slow Pedersen agree on every input.
    #[test]
    fn pedersen_fast_matches_slow(a in arb_felt(), b in arb_felt()) {
        prop_assert_eq!(
            hash_elements(&[a, b]).unwrap(),
            hash_elements_fast(&[a, b]).unwrap()
        );
    }

    // Invariant 6: signatures round-trip through verification.
    #[test]
    fn sign_verify_round_trip(d in arb_scalar(), h in arb_felt()) {
        let sig = sign(&d, &h).unwrap();
        let public = scalar_base_mul(d.value()).unwrap();
        prop_assert!(verify(&public, &h, &sig).unwrap());
    }

    // Invariant 7: flipping any bit of r or s breaks the signature.
    #[test]
    fn bit_flips_break_signatures(
        d in arb_scalar(),
        h in arb_felt(),
        bit in 0usize..251,
        flip_r in any::<bool>(),
    ) {
        let sig = sign(&d, &h).unwrap();
        let public = scalar_base_mul(d.value()).unwrap();

        let target = if flip_r { sig.r.value() } else { sig.s.value() };
        let mask = BigInt::one().shl(bit);
        let flipped = if target.get_bit(bit) {
            target.sub_with_borrow(&mask).0
        } else {
            target.add_with_carry(&mask).0
        };
        let flipped = ScalarElement::new(flipped);
        let mangled = if flip_r {
            Signature { r: flipped, s: sig.s }
        } else {
            Signature { r: sig.r, s: flipped }
        };

        // a flipped bit may also push r or s out of range, which is an
        // error rather than a clean false
        prop_assert!(!matches!(verify(&public, &h, &mangled), Ok(true)));
    }
}

// ============================================
// Deterministic spot checks
// ============================================

#[test]
fn curve_order_annihilates_the_generator() {
    let n = CurveOrder::modulus();
    assert_eq!(CurvePoint::generator().scalar_mul(n), CurvePoint::Zero);
}

#[test]
fn n_minus_one_negates_the_generator() {
    let n_minus_1 = CurveOrder::modulus().sub_with_borrow(&BigInt::one()).0;
    assert_eq!(
        CurvePoint::generator().scalar_mul(&n_minus_1),
        CurvePoint::generator().neg()
    );
}

#[test]
fn doubling_chain_matches_scalar_mult() {
    let mut p = *CurvePoint::generator();
    for i in 1..=10 {
        let k = BigInt::<4>::one().shl(i);
        p = p.double();
        assert_eq!(CurvePoint::generator().scalar_mul(&k), p);
    }
}

#[test]
fn accelerator_handles_sparse_and_dense_scalars() {
    for hexval in [
        "ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00",
        "100000000000000000000000000000000000000000000000000000000000",
        "7ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
        "1",
    ] {
        let k = BigInt::from_hex(hexval).unwrap();
        assert_eq!(
            scalar_base_mul(&k).unwrap(),
            CurvePoint::generator().scalar_mul(&k)
        );
    }
}
