//! Deterministic ECDSA over the STARK curve
//!
//! The scheme diverges from textbook ECDSA in three wire-compatible ways:
//! r is the raw x coordinate of k*G and must stay below 2^251 before any
//! mod-N comparison; hashes one nibble short of a byte boundary are scaled
//! by 16 for the nonce derivation only; and the nonce retry counter is a
//! local that starts at 0 and advances only on candidate rejection.

use std::cmp::Ordering;

use zeroize::Zeroize;

use crate::bigint::BigInt;
use crate::curve::field::{CurveOrder, FieldConfig, FieldElement, ScalarElement};
use crate::curve::point::CurvePoint;
use crate::curve::rfc6979;
use crate::curve::window;
use crate::error::CryptoError;

/// Candidate nonces tried before giving up. Rejection probability per
/// candidate is negligible; the bound exists to make failure finite.
const MAX_NONCE_ATTEMPTS: u64 = 32;

/// An (r, s) signature pair. Wire form is 32-byte big-endian r then s.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Signature {
    pub r: ScalarElement,
    pub s: ScalarElement,
}

impl Signature {
    /// 64-byte transport form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.r.to_be_bytes();
        out.extend_from_slice(&self.s.to_be_bytes());
        out
    }

    /// 128 lowercase hex characters, r then s, no separator.
    pub fn to_hex(&self) -> String {
        format!("{}{}", self.r.to_hex_padded(), self.s.to_hex_padded())
    }

    /// Parses the 128-hex transport form. Both halves must lie in [1, N).
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        if hex.len() != 128 {
            return Err(CryptoError::InvalidHash(format!(
                "signature must be 128 hex chars, got {}",
                hex.len()
            )));
        }
        let r = parse_scalar_in_range(&hex[..64], "r")?;
        let s = parse_scalar_in_range(&hex[64..], "s")?;
        Ok(Self { r, s })
    }
}

fn parse_scalar_in_range(hex: &str, what: &str) -> Result<ScalarElement, CryptoError> {
    let value = BigInt::from_hex(hex)
        .ok_or_else(|| CryptoError::InvalidHash(format!("bad hex for {}", what)))?;
    if value.is_zero() || value.compare(CurveOrder::modulus()) != Ordering::Less {
        return Err(CryptoError::InvalidHash(format!("{} out of range", what)));
    }
    Ok(ScalarElement::new(value))
}

/// A private scalar and its derived public point.
///
/// The private limbs are wiped on drop; copies made during arithmetic are
/// not tracked, so this is best-effort hygiene, not a guarantee.
pub struct Keypair {
    private: ScalarElement,
    public: CurvePoint,
}

impl Keypair {
    /// Builds a keypair from the hex form the exchange hands out.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let value = BigInt::from_hex(hex)
            .ok_or_else(|| CryptoError::InvalidKey("not a hex string".into()))?;
        if value.compare(CurveOrder::modulus()) != Ordering::Less {
            return Err(CryptoError::InvalidKey("exceeds the curve order".into()));
        }
        Self::from_scalar(ScalarElement::new(value))
    }

    pub fn from_scalar(private: ScalarElement) -> Result<Self, CryptoError> {
        if private.is_zero() {
            return Err(CryptoError::InvalidKey("zero private key".into()));
        }
        let public = window::scalar_base_mul(private.value())?;
        Ok(Self { private, public })
    }

    /// Fresh random keypair by rejection sampling below the curve order.
    pub fn generate() -> Result<Self, CryptoError> {
        use rand::RngCore;

        let mut rng = rand::rng();
        let mut bytes = [0u8; 32];
        loop {
            rng.fill_bytes(&mut bytes);
            // The order is just above 2^251; mask to 252 bits and reject.
            bytes[0] &= 0x0f;
            if let Some(candidate) = BigInt::from_be_bytes(&bytes) {
                if !candidate.is_zero()
                    && candidate.compare(CurveOrder::modulus()) == Ordering::Less
                {
                    return Self::from_scalar(ScalarElement::new(candidate));
                }
            }
        }
    }

    pub fn public(&self) -> &CurvePoint {
        &self.public
    }

    /// Signs a message hash with this key.
    pub fn sign(&self, msg_hash: &FieldElement) -> Result<Signature, CryptoError> {
        sign(&self.private, msg_hash)
    }
}

impl Drop for Keypair {
    fn drop(&mut self) {
        self.private.value.zeroize();
    }
}

/// Checks that 64 bytes of x then y name a point on the curve.
pub fn is_valid_public_key(bytes: &[u8]) -> bool {
    if bytes.len() != 64 {
        return false;
    }
    match (
        FieldElement::from_be_bytes(&bytes[..32]),
        FieldElement::from_be_bytes(&bytes[32..]),
    ) {
        (Some(x), Some(y)) => CurvePoint::Affine { x, y }.is_on_curve(),
        _ => false,
    }
}

fn two_pow_251() -> BigInt<4> {
    BigInt::one().shl(251)
}

/// Deterministically signs `msg_hash` with the private scalar.
///
/// Rejects hashes of 2^251 or more; the protocol never produces them.
pub fn sign(private: &ScalarElement, msg_hash: &FieldElement) -> Result<Signature, CryptoError> {
    let h = msg_hash.value();
    if h.compare(&two_pow_251()) != Ordering::Less {
        return Err(CryptoError::InvalidHash("hash must stay below 2^251".into()));
    }
    if private.is_zero() {
        return Err(CryptoError::InvalidKey("zero private key".into()));
    }

    let order = CurveOrder::modulus();
    let adjusted = rfc6979::adjust_hash(h);
    let h_scalar = ScalarElement::new(*h);
    let bound = two_pow_251();

    for seed in 0..MAX_NONCE_ATTEMPTS {
        let k = rfc6979::generate_k(order, private.value(), &adjusted, seed);

        let r_point = window::scalar_base_mul(&k)?;
        let r_raw = match r_point.coordinates() {
            Some((x, _)) => *x.value(),
            None => continue,
        };

        // r is the raw x coordinate; the 2^251 bound comes before any
        // reduction or comparison against N.
        if r_raw.is_zero() || r_raw.compare(&bound) != Ordering::Less {
            continue;
        }
        let r = ScalarElement::new(r_raw);

        let folded = h_scalar + r * *private;
        if folded.is_zero() {
            continue;
        }

        let s = ScalarElement::new(k).inverse() * folded;
        if s.is_zero() {
            continue;
        }

        return Ok(Signature { r, s });
    }

    Err(CryptoError::SigningFailure)
}

/// Verifies an (r, s) pair against a public point.
///
/// Malformed inputs are errors; a well-formed signature that simply does
/// not match returns `Ok(false)`.
pub fn verify(
    public: &CurvePoint,
    msg_hash: &FieldElement,
    signature: &Signature,
) -> Result<bool, CryptoError> {
    let h = msg_hash.value();
    if h.compare(&two_pow_251()) != Ordering::Less {
        return Err(CryptoError::InvalidHash("hash must stay below 2^251".into()));
    }
    if signature.r.is_zero() || signature.s.is_zero() {
        return Err(CryptoError::InvalidHash("r and s must lie in [1, N)".into()));
    }
    if !public.is_on_curve() {
        return Err(CryptoError::InvalidKey("public point is not on the curve".into()));
    }

    let w = signature.s.inverse();
    let u1 = ScalarElement::new(*h) * w;
    let u2 = signature.r * w;

    let p1 = window::scalar_base_mul(u1.value())?;
    let p2 = public.scalar_mul(u2.value());
    let sum = p1.add(&p2);

    match sum.coordinates() {
        None => Ok(false),
        Some((x, _)) => Ok(ScalarElement::new(*x.value()) == signature.r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair(hex: &str) -> Keypair {
        Keypair::from_hex(hex).unwrap()
    }

    #[test]
    fn sign_verify_round_trip() {
        let kp = keypair("1");
        let h = FieldElement::from_u64(1);
        let sig = kp.sign(&h).unwrap();
        assert!(verify(kp.public(), &h, &sig).unwrap());
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = keypair("2b1e2b3c4d5e6f708192a3b4c5d6e7f8");
        let h = FieldElement::from_hex("deadbeef").unwrap();
        let s1 = kp.sign(&h).unwrap();
        let s2 = kp.sign(&h).unwrap();
        assert_eq!(s1.to_hex(), s2.to_hex());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let kp = keypair("123456789abcdef");
        let other = keypair("fedcba987654321");
        let h = FieldElement::from_u64(42);
        let sig = kp.sign(&h).unwrap();
        assert!(!verify(other.public(), &h, &sig).unwrap());
    }

    #[test]
    fn wrong_hash_fails_verification() {
        let kp = keypair("123456789abcdef");
        let sig = kp.sign(&FieldElement::from_u64(42)).unwrap();
        assert!(!verify(kp.public(), &FieldElement::from_u64(43), &sig).unwrap());
    }

    #[test]
    fn oversized_hash_is_rejected_on_both_sides() {
        let kp = keypair("1");
        let boundary = FieldElement::new(BigInt::one().shl(251));
        assert!(matches!(kp.sign(&boundary), Err(CryptoError::InvalidHash(_))));
        let sig = kp.sign(&FieldElement::one()).unwrap();
        assert!(matches!(
            verify(kp.public(), &boundary, &sig),
            Err(CryptoError::InvalidHash(_))
        ));
    }

    #[test]
    fn signature_hex_round_trip() {
        let kp = keypair("abcdef123456");
        let sig = kp.sign(&FieldElement::from_u64(7)).unwrap();
        let hex = sig.to_hex();
        assert_eq!(hex.len(), 128);
        let parsed = Signature::from_hex(&hex).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn bad_keys_are_rejected() {
        assert!(matches!(Keypair::from_hex("zz"), Err(CryptoError::InvalidKey(_))));
        assert!(matches!(Keypair::from_hex("0"), Err(CryptoError::InvalidKey(_))));
        // the order itself is out of range
        assert!(matches!(
            Keypair::from_hex("800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f"),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn generated_keys_sign() {
        let kp = Keypair::generate().unwrap();
        assert!(kp.public().is_on_curve());
        let h = FieldElement::from_u64(99);
        let sig = kp.sign(&h).unwrap();
        assert!(verify(kp.public(), &h, &sig).unwrap());
    }

    #[test]
    fn public_key_bytes_validate() {
        let kp = keypair("5");
        let (x, y) = kp.public().coordinates().unwrap();
        let mut bytes = x.to_be_bytes();
        bytes.extend_from_slice(&y.to_be_bytes());
        assert!(is_valid_public_key(&bytes));

        bytes[63] ^= 1;
        assert!(!is_valid_public_key(&bytes));
        assert!(!is_valid_public_key(&bytes[..63]));
    }

    #[test]
    fn r_stays_below_2_251() {
        let kp = keypair("31415926535897932384626433");
        let sig = kp.sign(&FieldElement::from_u64(123)).unwrap();
        assert!(sig.r.value().compare(&BigInt::one().shl(251)) == Ordering::Less);
    }
}
