//! Big integer arithmetic with compile-time sizing
//!
//! `BigInt<N>` is a fixed-width unsigned integer with N 64-bit limbs stored
//! in little-endian order (least significant limb first). The crate works
//! over a 252-bit field, so `BigInt<4>` (256 bits) is used everywhere; the
//! width stays a parameter so intermediate values can grow where needed.
//!
//! Parsing is fallible by design: key and hash material arrives as hex from
//! the wire, and a malformed string has to surface as an error, never a
//! panic.

use std::cmp::Ordering;
use std::fmt;

use zeroize::Zeroize;

/// Fixed-width big integer with N 64-bit limbs (N * 64 bits total).
///
/// Limbs are little-endian (`limbs[0]` is least significant).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BigInt<const N: usize> {
    limbs: [u64; N],
}

impl<const N: usize> BigInt<N> {
    /// Number of bits this integer can represent.
    pub const BITS: usize = N * 64;

    /// The value zero.
    #[inline]
    pub const fn zero() -> Self {
        Self { limbs: [0; N] }
    }

    /// The value one.
    #[inline]
    pub const fn one() -> Self {
        let mut limbs = [0; N];
        limbs[0] = 1;
        Self { limbs }
    }

    /// Creates a value from a single u64.
    #[inline]
    pub const fn from_u64(val: u64) -> Self {
        let mut limbs = [0; N];
        limbs[0] = val;
        Self { limbs }
    }

    /// Creates a value from an array of limbs in little-endian order.
    ///
    /// Const so that field moduli and curve constants can live in statics.
    pub const fn from_limbs(limbs: [u64; N]) -> Self {
        Self { limbs }
    }

    /// Access to the raw limbs, little-endian.
    #[inline]
    pub const fn limbs(&self) -> &[u64; N] {
        &self.limbs
    }

    /// Parses a big-endian hex string, with or without a `0x` prefix.
    ///
    /// Odd-length strings are accepted (an implicit leading zero nibble).
    /// Returns `None` on invalid digits or if the value does not fit in
    /// N * 64 bits.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")).unwrap_or(hex);
        if hex.is_empty() {
            return None;
        }

        let bytes = if hex.len() % 2 == 1 {
            hex::decode(format!("0{}", hex)).ok()?
        } else {
            hex::decode(hex).ok()?
        };

        Self::from_be_bytes(&bytes)
    }

    /// Creates a value from big-endian bytes.
    ///
    /// Returns `None` if the input carries significant bytes beyond the
    /// limb capacity.
    pub fn from_be_bytes(bytes: &[u8]) -> Option<Self> {
        let mut limbs = [0u64; N];

        for (i, &byte) in bytes.iter().rev().enumerate() {
            let limb_idx = i / 8;
            if limb_idx >= N {
                if byte != 0 {
                    return None;
                }
                continue;
            }
            limbs[limb_idx] |= (byte as u64) << ((i % 8) * 8);
        }

        Some(Self { limbs })
    }

    /// Returns exactly N * 8 bytes in big-endian order.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(N * 8);
        for limb_idx in (0..N).rev() {
            for byte_idx in (0..8).rev() {
                bytes.push(((self.limbs[limb_idx] >> (byte_idx * 8)) & 0xFF) as u8);
            }
        }
        bytes
    }

    /// Minimal big-endian bytes (no leading zeros; empty for zero).
    pub fn to_be_bytes_trimmed(&self) -> Vec<u8> {
        let bytes = self.to_be_bytes();
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        bytes[first..].to_vec()
    }

    /// Lowercase hex, zero-padded to `byte_len` bytes.
    pub fn to_hex_padded(&self, byte_len: usize) -> String {
        let bytes = self.to_be_bytes();
        let skip = bytes.len().saturating_sub(byte_len);
        let mut out = String::with_capacity(byte_len * 2);
        for _ in bytes.len()..byte_len {
            out.push_str("00");
        }
        out.push_str(&hex::encode(&bytes[skip..]));
        out
    }

    /// Minimal lowercase hex (a single `0` for zero).
    pub fn to_hex(&self) -> String {
        let trimmed = self.to_be_bytes_trimmed();
        if trimmed.is_empty() {
            return "0".to_string();
        }
        let s = hex::encode(trimmed);
        s.trim_start_matches('0').to_string()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&limb| limb == 0)
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.limbs[0] == 1 && self.limbs[1..].iter().all(|&limb| limb == 0)
    }

    #[inline]
    pub fn is_even(&self) -> bool {
        self.limbs[0] & 1 == 0
    }

    /// Position of the highest set bit plus one; zero for zero.
    pub fn bit_length(&self) -> usize {
        for i in (0..N).rev() {
            if self.limbs[i] != 0 {
                return (i + 1) * 64 - self.limbs[i].leading_zeros() as usize;
            }
        }
        0
    }

    /// Value of bit `i` (little-endian bit order).
    #[inline]
    pub fn get_bit(&self, i: usize) -> bool {
        if i >= Self::BITS {
            return false;
        }
        (self.limbs[i / 64] >> (i % 64)) & 1 == 1
    }

    /// Byte `i` of the little-endian byte representation.
    #[inline]
    pub fn byte(&self, i: usize) -> u8 {
        if i >= N * 8 {
            return 0;
        }
        ((self.limbs[i / 8] >> ((i % 8) * 8)) & 0xFF) as u8
    }

    /// Compares two values, most significant limb first.
    pub fn compare(&self, other: &Self) -> Ordering {
        for i in (0..N).rev() {
            match self.limbs[i].cmp(&other.limbs[i]) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    /// Addition; the flag reports carry out of the top limb.
    pub fn add_with_carry(&self, other: &Self) -> (Self, bool) {
        let mut result = Self::zero();
        let mut carry = 0u64;
        for i in 0..N {
            let (sum1, overflow1) = self.limbs[i].overflowing_add(other.limbs[i]);
            let (sum2, overflow2) = sum1.overflowing_add(carry);
            result.limbs[i] = sum2;
            carry = (overflow1 || overflow2) as u64;
        }
        (result, carry != 0)
    }

    /// Subtraction; the flag reports borrow out of the top limb.
    pub fn sub_with_borrow(&self, other: &Self) -> (Self, bool) {
        let mut result = Self::zero();
        let mut borrow = 0u64;
        for i in 0..N {
            let (diff1, underflow1) = self.limbs[i].overflowing_sub(other.limbs[i]);
            let (diff2, underflow2) = diff1.overflowing_sub(borrow);
            result.limbs[i] = diff2;
            borrow = (underflow1 || underflow2) as u64;
        }
        (result, borrow != 0)
    }

    /// Adds a small value; overflow is discarded (callers pack well below
    /// the limb capacity).
    #[inline]
    pub fn add_u64(&self, val: u64) -> Self {
        self.add_with_carry(&Self::from_u64(val)).0
    }

    /// Left shift; bits shifted past the top limb are discarded.
    pub fn shl(&self, bits: usize) -> Self {
        if bits == 0 {
            return *self;
        }
        if bits >= Self::BITS {
            return Self::zero();
        }

        let limb_shift = bits / 64;
        let bit_shift = bits % 64;
        let mut result = Self::zero();

        for i in (limb_shift..N).rev() {
            let src = i - limb_shift;
            let mut v = self.limbs[src] << bit_shift;
            if bit_shift > 0 && src > 0 {
                v |= self.limbs[src - 1] >> (64 - bit_shift);
            }
            result.limbs[i] = v;
        }
        result
    }

    /// Right shift.
    pub fn shr(&self, bits: usize) -> Self {
        if bits == 0 {
            return *self;
        }
        if bits >= Self::BITS {
            return Self::zero();
        }

        let limb_shift = bits / 64;
        let bit_shift = bits % 64;
        let mut result = Self::zero();

        for i in 0..(N - limb_shift) {
            let src = i + limb_shift;
            result.limbs[i] = self.limbs[src] >> bit_shift;
            if bit_shift > 0 && src + 1 < N {
                result.limbs[i] |= self.limbs[src + 1] << (64 - bit_shift);
            }
        }
        result
    }

    /// Division with remainder by bitwise long division.
    ///
    /// # Panics
    /// Panics if `divisor` is zero.
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        assert!(!divisor.is_zero(), "Division by zero");

        if self.compare(divisor) == Ordering::Less {
            return (Self::zero(), *self);
        }
        if divisor.is_one() {
            return (*self, Self::zero());
        }

        let mut quotient = Self::zero();
        let mut remainder = Self::zero();

        for i in (0..self.bit_length()).rev() {
            remainder = remainder.shl(1);
            if self.get_bit(i) {
                remainder.limbs[0] |= 1;
            }
            if remainder.compare(divisor) != Ordering::Less {
                remainder = remainder.sub_with_borrow(divisor).0;
                quotient.limbs[i / 64] |= 1u64 << (i % 64);
            }
        }

        (quotient, remainder)
    }

    /// Remainder of division by `modulus`.
    pub fn modulo(&self, modulus: &Self) -> Self {
        self.div_rem(modulus).1
    }

    /// (self + other) mod m, assuming both operands are already below m.
    pub fn mod_add(&self, other: &Self, modulus: &Self) -> Self {
        let (sum, carry) = self.add_with_carry(other);
        if carry || sum.compare(modulus) != Ordering::Less {
            sum.sub_with_borrow(modulus).0
        } else {
            sum
        }
    }

    /// (self - other) mod m, assuming both operands are already below m.
    pub fn mod_sub(&self, other: &Self, modulus: &Self) -> Self {
        if self.compare(other) != Ordering::Less {
            self.sub_with_borrow(other).0
        } else {
            let (tmp, _) = self.add_with_carry(modulus);
            tmp.sub_with_borrow(other).0
        }
    }

    /// Halves the value modulo an odd modulus: (self / 2) mod m.
    ///
    /// Used by the binary inverse; the intermediate self + m fits because
    /// the moduli in this crate are 252 bits wide.
    pub(crate) fn half_mod(&self, modulus: &Self) -> Self {
        if self.is_even() {
            self.shr(1)
        } else {
            let (sum, carry) = self.add_with_carry(modulus);
            let mut half = sum.shr(1);
            if carry {
                // restore the bit shifted in from the carry
                half.limbs[N - 1] |= 1u64 << 63;
            }
            half
        }
    }
}

impl<const N: usize> Zeroize for BigInt<N> {
    fn zeroize(&mut self) {
        self.limbs.zeroize();
    }
}

impl<const N: usize> fmt::Debug for BigInt<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl<const N: usize> fmt::Display for BigInt<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}
