//! Deterministic nonce derivation after RFC 6979
//!
//! HMAC-SHA256 DRBG seeded with the private key and the (byte-aligned)
//! message hash. Two deliberate departures from the plain RFC, both
//! required for wire compatibility:
//!
//! 1. a hash whose bit length is one nibble short of a byte boundary is
//!    multiplied by 16 before entering the DRBG (the algebraic part of the
//!    signature still uses the original hash);
//! 2. a retry seed is mixed in as section 3.6 additional data. The seed
//!    starts at 0 on every call (no extra entropy) and increments only when
//!    a candidate nonce is rejected, keeping signing fully deterministic.

use sha2::{Digest, Sha256};

use crate::bigint::BigInt;

const HMAC_BLOCK: usize = 64;
const HASH_LEN: usize = 32;

/// HMAC-SHA256 over a multi-part message.
pub(crate) fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> [u8; HASH_LEN] {
    let mut key_block = [0u8; HMAC_BLOCK];
    if key.len() > HMAC_BLOCK {
        key_block[..HASH_LEN].copy_from_slice(&Sha256::digest(key));
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let mut ipad = [0u8; HMAC_BLOCK];
    let mut opad = [0u8; HMAC_BLOCK];
    for i in 0..HMAC_BLOCK {
        ipad[i] = key_block[i] ^ 0x36;
        opad[i] = key_block[i] ^ 0x5c;
    }

    let mut inner = Sha256::new();
    inner.update(ipad);
    for part in parts {
        inner.update(part);
    }
    let inner = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(opad);
    outer.update(inner);
    outer.finalize().into()
}

/// Applies the one-nibble-short adjustment: multiply by 16 when the bit
/// length is 248 or more and 1..=4 bits past a byte boundary.
pub fn adjust_hash(h: &BigInt<4>) -> BigInt<4> {
    let bits = h.bit_length();
    if bits >= 248 && (1..=4).contains(&(bits % 8)) {
        h.shl(4)
    } else {
        *h
    }
}

/// bits2int of RFC 6979 2.3.2: leftmost qlen bits of the input.
fn bits2int(bytes: &[u8], qlen: usize) -> BigInt<4> {
    let v = BigInt::from_be_bytes(bytes).unwrap_or_else(BigInt::zero);
    let vlen = bytes.len() * 8;
    if vlen > qlen {
        v.shr(vlen - qlen)
    } else {
        v
    }
}

/// bits2octets of RFC 6979 2.3.4.
fn bits2octets(bytes: &[u8], q: &BigInt<4>, qlen: usize) -> Vec<u8> {
    let z1 = bits2int(bytes, qlen);
    let z2 = if z1.compare(q) == std::cmp::Ordering::Less {
        z1
    } else {
        z1.sub_with_borrow(q).0
    };
    z2.to_be_bytes()
}

/// Derives the deterministic nonce candidate for the given retry seed.
///
/// Returns k in [1, q). The inner DRBG loop retries on out-of-range
/// candidates per the RFC; the caller bumps `seed` on algebraic rejection.
pub fn generate_k(
    q: &BigInt<4>,
    private_key: &BigInt<4>,
    adjusted_hash: &BigInt<4>,
    seed: u64,
) -> BigInt<4> {
    let qlen = q.bit_length();
    let x_octets = private_key.to_be_bytes();
    let h_bytes = adjusted_hash.to_be_bytes();
    let h_octets = bits2octets(&h_bytes, q, qlen);

    let extra = if seed == 0 {
        Vec::new()
    } else {
        BigInt::<4>::from_u64(seed).to_be_bytes_trimmed()
    };

    let mut v = [0x01u8; HASH_LEN];
    let mut k = [0x00u8; HASH_LEN];

    k = hmac_sha256(&k, &[&v, &[0x00], &x_octets, &h_octets, &extra]);
    v = hmac_sha256(&k, &[&v]);
    k = hmac_sha256(&k, &[&v, &[0x01], &x_octets, &h_octets, &extra]);
    v = hmac_sha256(&k, &[&v]);

    loop {
        v = hmac_sha256(&k, &[&v]);
        let candidate = bits2int(&v, qlen);
        if !candidate.is_zero() && candidate.compare(q) == std::cmp::Ordering::Less {
            return candidate;
        }
        k = hmac_sha256(&k, &[&v, &[0x00]]);
        v = hmac_sha256(&k, &[&v]);
    }
}
