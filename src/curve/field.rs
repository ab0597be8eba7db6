//! Prime field arithmetic for the STARK curve
//!
//! Two fields live here: the 252-bit base field mod P and the scalar field
//! mod the curve order N. Both are instances of `PrimeField<C>`, where the
//! phantom config `C` ties each element to its modulus so the two cannot be
//! mixed at compile time.
//!
//! Multiplication runs through a per-modulus Montgomery context; elements
//! themselves always hold the canonical reduced representative, so byte and
//! hex views need no conversion.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Neg, Sub};

use once_cell::sync::Lazy;

use crate::bigint::BigInt;

/// P = 2^251 + 17 * 2^192 + 1
static FIELD_PRIME: BigInt<4> = BigInt::from_limbs([0x1, 0x0, 0x0, 0x0800000000000011]);

/// N, the order of the group generated by the base point.
static CURVE_ORDER: BigInt<4> = BigInt::from_limbs([
    0x1e66a241adc64d2f,
    0xb781126dcae7b232,
    0xffffffffffffffff,
    0x0800000000000010,
]);

static FIELD_CTX: Lazy<MontgomeryCtx> =
    Lazy::new(|| MontgomeryCtx::new(FIELD_PRIME).expect("field prime is odd"));

static ORDER_CTX: Lazy<MontgomeryCtx> =
    Lazy::new(|| MontgomeryCtx::new(CURVE_ORDER).expect("curve order is odd"));

/// Compile-time field selector.
pub trait FieldConfig: 'static + Sized + Clone + Copy + fmt::Debug {
    /// The prime modulus of the field.
    fn modulus() -> &'static BigInt<4>;

    /// Montgomery context for the modulus.
    fn ctx() -> &'static MontgomeryCtx;
}

/// Config of the 252-bit base field mod P.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stark252;

/// Config of the scalar field mod the curve order N.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveOrder;

impl FieldConfig for Stark252 {
    fn modulus() -> &'static BigInt<4> {
        &FIELD_PRIME
    }

    fn ctx() -> &'static MontgomeryCtx {
        &FIELD_CTX
    }
}

impl FieldConfig for CurveOrder {
    fn modulus() -> &'static BigInt<4> {
        &CURVE_ORDER
    }

    fn ctx() -> &'static MontgomeryCtx {
        &ORDER_CTX
    }
}

/// Element of the base field (a "felt"): a canonical integer below P.
pub type FieldElement = PrimeField<Stark252>;

/// Element of the scalar field: private keys, nonces, r and s.
pub type ScalarElement = PrimeField<CurveOrder>;

/// Montgomery multiplication context for a fixed odd 4-limb modulus.
///
/// Immutable after construction and shared freely across threads.
pub struct MontgomeryCtx {
    modulus: BigInt<4>,
    n0: u64,              // -m^{-1} mod 2^64
    r2: BigInt<4>,        // R^2 mod m, R = 2^256
}

impl MontgomeryCtx {
    /// Builds a context; the modulus must be odd and nonzero.
    pub fn new(modulus: BigInt<4>) -> Option<Self> {
        if modulus.is_zero() || modulus.is_even() {
            return None;
        }

        let n0 = inv_mod_2_64_odd(modulus.limbs()[0]).wrapping_neg();

        // R^2 mod m by repeated doubling: 1 * 2^512 mod m.
        let mut r2 = BigInt::<4>::one();
        for _ in 0..512 {
            r2 = r2.mod_add(&r2, &modulus);
        }

        Some(Self { modulus, n0, r2 })
    }

    pub fn modulus(&self) -> &BigInt<4> {
        &self.modulus
    }

    /// CIOS Montgomery product: (a * b * R^{-1}) mod m for a, b in [0, m).
    pub fn mont_mul(&self, a: &BigInt<4>, b: &BigInt<4>) -> BigInt<4> {
        let a = a.limbs();
        let b = b.limbs();
        let m = self.modulus.limbs();
        let mut t = [0u64; 6];

        for i in 0..4 {
            // t += a * b[i]
            let bi = b[i] as u128;
            let mut carry: u128 = 0;
            for j in 0..4 {
                let uv = t[j] as u128 + (a[j] as u128) * bi + carry;
                t[j] = uv as u64;
                carry = uv >> 64;
            }
            let uv = t[4] as u128 + carry;
            t[4] = uv as u64;
            t[5] = (uv >> 64) as u64;

            // t = (t + mi * m) / 2^64
            let mi = t[0].wrapping_mul(self.n0) as u128;
            let uv = t[0] as u128 + mi * (m[0] as u128);
            let mut carry = uv >> 64;
            for j in 1..4 {
                let uv = t[j] as u128 + mi * (m[j] as u128) + carry;
                t[j - 1] = uv as u64;
                carry = uv >> 64;
            }
            let uv = t[4] as u128 + carry;
            t[3] = uv as u64;
            t[4] = t[5].wrapping_add((uv >> 64) as u64);
            t[5] = 0;
        }

        let mut out = BigInt::from_limbs([t[0], t[1], t[2], t[3]]);
        if t[4] != 0 || out.compare(&self.modulus) != Ordering::Less {
            out = out.sub_with_borrow(&self.modulus).0;
        }
        out
    }

    /// (a * b) mod m for canonical a, b in [0, m).
    ///
    /// One conversion suffices: mont_mul(a*R, b) = a*b.
    pub fn mod_mul(&self, a: &BigInt<4>, b: &BigInt<4>) -> BigInt<4> {
        let am = self.mont_mul(a, &self.r2);
        self.mont_mul(&am, b)
    }

    /// base^exp mod m by square-and-multiply, base in [0, m).
    pub fn mod_pow(&self, base: &BigInt<4>, exp: &BigInt<4>) -> BigInt<4> {
        if self.modulus.is_one() {
            return BigInt::zero();
        }

        // R mod m, the Montgomery image of 1
        let one_m = self.mont_mul(&BigInt::one(), &self.r2);
        let mut result = one_m;
        let mut base_m = self.mont_mul(base, &self.r2);

        for i in 0..exp.bit_length() {
            if exp.get_bit(i) {
                result = self.mont_mul(&result, &base_m);
            }
            base_m = self.mont_mul(&base_m, &base_m);
        }

        self.mont_mul(&result, &BigInt::one())
    }
}

/// Inverse of an odd u64 modulo 2^64 by Newton iteration.
fn inv_mod_2_64_odd(a: u64) -> u64 {
    debug_assert!(a & 1 == 1);
    let mut x = 1u64;
    for _ in 0..6 {
        x = x.wrapping_mul(2u64.wrapping_sub(a.wrapping_mul(x)));
    }
    x
}

/// Division-free binary extended Euclid for an odd modulus.
///
/// Returns a^{-1} mod m, or None for a = 0. Requires gcd(a, m) = 1, which
/// holds for any nonzero residue of a prime modulus.
fn mod_inverse(a: &BigInt<4>, m: &BigInt<4>) -> Option<BigInt<4>> {
    if a.is_zero() {
        return None;
    }

    let mut u = *a;
    let mut v = *m;
    let mut x1 = BigInt::<4>::one();
    let mut x2 = BigInt::<4>::zero();

    while !u.is_one() && !v.is_one() {
        while u.is_even() {
            u = u.shr(1);
            x1 = x1.half_mod(m);
        }
        while v.is_even() {
            v = v.shr(1);
            x2 = x2.half_mod(m);
        }
        if u.compare(&v) != Ordering::Less {
            u = u.sub_with_borrow(&v).0;
            x1 = x1.mod_sub(&x2, m);
        } else {
            v = v.sub_with_borrow(&u).0;
            x2 = x2.mod_sub(&x1, m);
        }
    }

    Some(if u.is_one() { x1 } else { x2 })
}

/// Element of a prime field, held in canonical reduced form.
pub struct PrimeField<C: FieldConfig> {
    pub(crate) value: BigInt<4>,
    _config: PhantomData<C>,
}

impl<C: FieldConfig> PrimeField<C> {
    /// Wraps a big integer, reducing it into [0, modulus).
    pub fn new(value: BigInt<4>) -> Self {
        let m = C::modulus();
        let reduced = if value.compare(m) == Ordering::Less {
            value
        } else {
            value.modulo(m)
        };
        Self { value: reduced, _config: PhantomData }
    }

    pub fn zero() -> Self {
        Self { value: BigInt::zero(), _config: PhantomData }
    }

    pub fn one() -> Self {
        Self { value: BigInt::one(), _config: PhantomData }
    }

    pub fn from_u64(val: u64) -> Self {
        Self::new(BigInt::from_u64(val))
    }

    /// Parses big-endian hex (optional `0x` prefix), reducing into range.
    pub fn from_hex(hex: &str) -> Option<Self> {
        BigInt::from_hex(hex).map(Self::new)
    }

    /// Parses big-endian bytes, reducing into range.
    pub fn from_be_bytes(bytes: &[u8]) -> Option<Self> {
        BigInt::from_be_bytes(bytes).map(Self::new)
    }

    /// The canonical integer representative.
    pub fn value(&self) -> &BigInt<4> {
        &self.value
    }

    /// 32 big-endian bytes.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.value.to_be_bytes()
    }

    /// 64 lowercase hex characters (the wire form of r and s).
    pub fn to_hex_padded(&self) -> String {
        self.value.to_hex_padded(32)
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Multiplicative inverse.
    ///
    /// # Panics
    /// Panics on the zero element.
    pub fn inverse(&self) -> Self {
        let inv = mod_inverse(&self.value, C::modulus()).expect("Cannot invert zero");
        Self { value: inv, _config: PhantomData }
    }

    /// self^exp, square-and-multiply.
    pub fn pow(&self, exp: &BigInt<4>) -> Self {
        Self { value: C::ctx().mod_pow(&self.value, exp), _config: PhantomData }
    }

    /// Square root by Tonelli–Shanks, if the element is a quadratic
    /// residue. Returns one of the two roots; the other is its negation.
    pub fn sqrt(&self) -> Option<Self> {
        if self.is_zero() {
            return Some(Self::zero());
        }

        let m = C::modulus();
        let m_minus_1 = m.sub_with_borrow(&BigInt::one()).0;
        let legendre_exp = m_minus_1.shr(1);

        if self.pow(&legendre_exp) != Self::one() {
            return None; // non-residue
        }

        // m - 1 = q * 2^s with q odd
        let mut q = m_minus_1;
        let mut s = 0usize;
        while q.is_even() {
            q = q.shr(1);
            s += 1;
        }

        // Smallest quadratic non-residue as the Tonelli generator. For the
        // STARK field this finds 3, the reference FIELD_GEN.
        let mut z = Self::from_u64(2);
        while z.pow(&legendre_exp) == Self::one() {
            z = z + Self::one();
        }

        let mut m_var = s;
        let mut c = z.pow(&q);
        let mut t = self.pow(&q);
        let q_plus_1_half = q.add_u64(1).shr(1);
        let mut r = self.pow(&q_plus_1_half);

        while t != Self::one() {
            let mut i = 0usize;
            let mut t2 = t;
            while t2 != Self::one() {
                t2 = t2 * t2;
                i += 1;
            }

            // b = c^(2^(m_var - i - 1))
            let mut b = c;
            for _ in 0..(m_var - i - 1) {
                b = b * b;
            }

            m_var = i;
            c = b * b;
            t = t * c;
            r = r * b;
        }

        Some(r)
    }
}

impl<C: FieldConfig> Clone for PrimeField<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: FieldConfig> Copy for PrimeField<C> {}

impl<C: FieldConfig> PartialEq for PrimeField<C> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<C: FieldConfig> Eq for PrimeField<C> {}

impl<C: FieldConfig> Add for PrimeField<C> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            value: self.value.mod_add(&other.value, C::modulus()),
            _config: PhantomData,
        }
    }
}

impl<C: FieldConfig> Sub for PrimeField<C> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            value: self.value.mod_sub(&other.value, C::modulus()),
            _config: PhantomData,
        }
    }
}

impl<C: FieldConfig> Neg for PrimeField<C> {
    type Output = Self;

    fn neg(self) -> Self {
        if self.value.is_zero() {
            return self;
        }
        Self {
            value: C::modulus().sub_with_borrow(&self.value).0,
            _config: PhantomData,
        }
    }
}

impl<C: FieldConfig> Mul for PrimeField<C> {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self {
            value: C::ctx().mod_mul(&self.value, &other.value),
            _config: PhantomData,
        }
    }
}

#[allow(clippy::suspicious_arithmetic_impl)]
impl<C: FieldConfig> Div for PrimeField<C> {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        self * other.inverse()
    }
}

impl<C: FieldConfig> fmt::Debug for PrimeField<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.value.to_hex())
    }
}

impl<C: FieldConfig> fmt::Display for PrimeField<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.value.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulus_limbs_match_reference_hex() {
        assert_eq!(
            FIELD_PRIME,
            BigInt::from_hex("0x800000000000011000000000000000000000000000000000000000000000001")
                .unwrap()
        );
        assert_eq!(
            CURVE_ORDER,
            BigInt::from_hex("0x0800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f")
                .unwrap()
        );
    }

    #[test]
    fn mont_mul_matches_schoolbook() {
        let ctx = Stark252::ctx();
        let a = BigInt::from_hex("deadbeefdeadbeefdeadbeefdeadbeefdeadbeef").unwrap();
        let b = BigInt::from_hex("cafebabecafebabecafebabe").unwrap();
        // double-and-add over mod_add as the multiplication oracle
        let mut oracle = BigInt::<4>::zero();
        let mut addend = a;
        for i in 0..b.bit_length() {
            if b.get_bit(i) {
                oracle = oracle.mod_add(&addend, ctx.modulus());
            }
            addend = addend.mod_add(&addend, ctx.modulus());
        }
        assert_eq!(ctx.mod_mul(&a, &b), oracle);
    }

    #[test]
    fn field_ops_identities() {
        let a = FieldElement::from_hex("123456789abcdef123456789abcdef").unwrap();
        assert_eq!(a + FieldElement::zero(), a);
        assert_eq!(a * FieldElement::one(), a);
        assert_eq!(a - a, FieldElement::zero());
        assert_eq!(a + (-a), FieldElement::zero());
        assert_eq!(a * a.inverse(), FieldElement::one());
        assert_eq!(a / a, FieldElement::one());
    }

    #[test]
    fn inverse_via_fermat_agrees() {
        let a = ScalarElement::from_u64(987654321);
        let m = CurveOrder::modulus();
        let exp = m.sub_with_borrow(&BigInt::from_u64(2)).0;
        assert_eq!(a.inverse(), a.pow(&exp));
    }

    #[test]
    fn pow_small_cases() {
        let three = FieldElement::from_u64(3);
        assert_eq!(three.pow(&BigInt::zero()), FieldElement::one());
        assert_eq!(three.pow(&BigInt::from_u64(5)), FieldElement::from_u64(243));
    }

    #[test]
    fn sqrt_round_trip() {
        let a = FieldElement::from_hex("abcdef0123456789abcdef").unwrap();
        let square = a * a;
        let root = square.sqrt().expect("square must be a residue");
        assert!(root == a || root == -a);
    }

    #[test]
    fn sqrt_rejects_non_residue() {
        // FIELD_GEN = 3 generates the multiplicative group, so it is a
        // non-residue of the base field
        assert!(FieldElement::from_u64(3).sqrt().is_none());
    }

    #[test]
    fn fields_reduce_on_construction() {
        let p_plus_5 = FIELD_PRIME.add_u64(5);
        assert_eq!(FieldElement::new(p_plus_5), FieldElement::from_u64(5));
    }
}
