//! Embedded reference parameters and the constant-point table
//!
//! The reference data ships as JSON and is materialized exactly once, at
//! first use. The Pedersen table holds 506 points: the shift point at index
//! 0, the curve generator at index 1, then one 252-entry doubling run per
//! hash input (the low 248 bits and high 4 bits of each input have their
//! own generator, as published). The accelerator table holds the 256 base
//! multiples 2^i * G.
//!
//! Every materialized point is checked against the curve equation, and the
//! parsed field constants are checked against the compiled-in moduli. Any
//! mismatch poisons the core permanently.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::bigint::BigInt;
use crate::curve::field::{CurveOrder, FieldConfig, FieldElement, Stark252};
use crate::curve::point::CurvePoint;
use crate::error::CryptoError;

/// Bits consumed per Pedersen input.
pub const PEDERSEN_INPUT_BITS: usize = 252;

/// Inputs a single table block supports (longer sequences are chained).
pub const PEDERSEN_MAX_INPUTS: usize = 2;

/// Size of the constant-point table: shift, generator, two input runs.
pub const CONSTANT_POINT_COUNT: usize = 2 + PEDERSEN_MAX_INPUTS * PEDERSEN_INPUT_BITS;

/// Reference curve parameters. The hash points are the seed rows of the
/// published constant-point table; the full table is their doubling
/// expansion, split at LOW_PART_BITS within each input run.
const CURVE_PARAMS_JSON: &str = r#"{
    "_comment": "STARK-friendly curve parameters and Pedersen hash generators",
    "FIELD_PRIME": "0x800000000000011000000000000000000000000000000000000000000000001",
    "FIELD_GEN": "0x3",
    "EC_ORDER": "0x800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f",
    "ALPHA": "0x1",
    "BETA": "0x6f21413efbe40de150e596d72f7a8c5609ad26c15c915c1f4cdfcb99cee9e89",
    "SHIFT_POINT": [
        "0x49ee3eba8c1600700ee1b87eb599f16716b0b1022947733551fde4050ca6804",
        "0x3ca0cfe4b3bc6ddf346d49d06ea0ed34e621062c0e056c1d0405d266e10268a"
    ],
    "EC_GEN": [
        "0x1ef15c18599971b7beced415a40f0c7deacfd9b0d1819e03d723d8bc943cfca",
        "0x5668060aa49730b7be4801df46ec62de53ecd11abe43a32873000c36e8dc1f"
    ],
    "LOW_PART_BITS": 248,
    "HASH_POINTS": [
        [
            "0x234287dcbaffe7f969c748655fca9e58fa8120b6d56eb0c1080d17957ebe47b",
            "0x3b056f100f96fb21e889527d41f4e39940135dd7a6c94cc6ed0268ee89e5615"
        ],
        [
            "0x4fa56f376c83db33f9dab2656558f3399099ec1de5e3018b7a6932dba8aa378",
            "0x3fa0984c931c9e38113e0c0e47e4401562761f92a7a23b45168f4e80ff5b54d"
        ],
        [
            "0x4ba4cc166be8dec764910f75b45f74b40c690c74709e90f3aa372f0bd2d6997",
            "0x40301cf5c1751f4b971e46c4ede85fcac5c59a5ce5ae7c48151f27b24b219c"
        ],
        [
            "0x54302dcb0e6cc1c6e44cca8f61a63bb2ca65048d53fb325d36ff12c49a58202",
            "0x1b77b3e37d13504b348046268d8ae25ce98ad783c25561a879dcc77e99c2426"
        ]
    ]
}"#;

/// Accelerator parameters: window width and the span of base multiples.
const ACCEL_PARAMS_JSON: &str = r#"{
    "WINDOW_BITS": 8,
    "BASE_MULTIPLE_COUNT": 256
}"#;

#[derive(Deserialize)]
struct RawCurveParams {
    #[serde(rename = "FIELD_PRIME")]
    field_prime: String,
    #[serde(rename = "FIELD_GEN")]
    field_gen: String,
    #[serde(rename = "EC_ORDER")]
    ec_order: String,
    #[serde(rename = "ALPHA")]
    alpha: String,
    #[serde(rename = "BETA")]
    beta: String,
    #[serde(rename = "SHIFT_POINT")]
    shift_point: [String; 2],
    #[serde(rename = "EC_GEN")]
    ec_gen: [String; 2],
    #[serde(rename = "LOW_PART_BITS")]
    low_part_bits: usize,
    #[serde(rename = "HASH_POINTS")]
    hash_points: Vec<[String; 2]>,
}

#[derive(Deserialize)]
struct RawAccelParams {
    #[serde(rename = "WINDOW_BITS")]
    window_bits: usize,
    #[serde(rename = "BASE_MULTIPLE_COUNT")]
    base_multiple_count: usize,
}

/// The materialized, validated reference tables.
pub struct CurveConstants {
    /// The 506-entry Pedersen table.
    pub points: Vec<CurvePoint>,
    /// 2^i * G for i in 0..256.
    pub base_multiples: Vec<CurvePoint>,
    /// Table index 0, the Pedersen accumulation seed.
    pub shift_point: CurvePoint,
    /// Generator of the multiplicative group of the base field.
    pub field_gen: FieldElement,
    /// Window width of the accelerator tables.
    pub window_bits: usize,
}

static CONSTANTS: Lazy<Result<CurveConstants, CryptoError>> = Lazy::new(load);

/// Forces constant loading and validation, surfacing any failure.
///
/// Optional: every consumer of the tables performs the same check. Calling
/// this at process start turns a malformed build into an orderly startup
/// error instead of a first-request one.
pub fn init() -> Result<(), CryptoError> {
    constants().map(|_| ())
}

/// The loaded tables, or the fatal load error.
pub(crate) fn constants() -> Result<&'static CurveConstants, CryptoError> {
    CONSTANTS.as_ref().map_err(Clone::clone)
}

fn malformed(msg: impl Into<String>) -> CryptoError {
    CryptoError::MalformedConstants(msg.into())
}

fn parse_felt(hex: &str, what: &str) -> Result<FieldElement, CryptoError> {
    let value =
        BigInt::from_hex(hex).ok_or_else(|| malformed(format!("bad hex for {}", what)))?;
    if value.compare(Stark252::modulus()) != std::cmp::Ordering::Less {
        return Err(malformed(format!("{} exceeds the field prime", what)));
    }
    Ok(FieldElement::new(value))
}

fn parse_point(raw: &[String; 2], what: &str) -> Result<CurvePoint, CryptoError> {
    let x = parse_felt(&raw[0], what)?;
    let y = parse_felt(&raw[1], what)?;
    let point = CurvePoint::Affine { x, y };
    if !point.is_on_curve() {
        return Err(malformed(format!("{} is not on the curve", what)));
    }
    Ok(point)
}

fn load() -> Result<CurveConstants, CryptoError> {
    let raw: RawCurveParams =
        serde_json::from_str(CURVE_PARAMS_JSON).map_err(|e| malformed(e.to_string()))?;
    let accel: RawAccelParams =
        serde_json::from_str(ACCEL_PARAMS_JSON).map_err(|e| malformed(e.to_string()))?;

    // The embedded scalars must agree with the compiled-in arithmetic.
    let prime = BigInt::from_hex(&raw.field_prime).ok_or_else(|| malformed("bad FIELD_PRIME"))?;
    if prime != *Stark252::modulus() {
        return Err(malformed("FIELD_PRIME does not match the field modulus"));
    }
    let order = BigInt::from_hex(&raw.ec_order).ok_or_else(|| malformed("bad EC_ORDER"))?;
    if order != *CurveOrder::modulus() {
        return Err(malformed("EC_ORDER does not match the scalar modulus"));
    }
    if BigInt::<4>::from_hex(&raw.alpha) != Some(BigInt::one()) {
        return Err(malformed("ALPHA must be 1"));
    }
    let beta = parse_felt(&raw.beta, "BETA")?;
    if beta != *crate::curve::point::curve_b() {
        return Err(malformed("BETA does not match the curve equation"));
    }
    let field_gen = parse_felt(&raw.field_gen, "FIELD_GEN")?;

    let shift_point = parse_point(&raw.shift_point, "SHIFT_POINT")?;
    let ec_gen = parse_point(&raw.ec_gen, "EC_GEN")?;
    if ec_gen != *CurvePoint::generator() {
        return Err(malformed("EC_GEN does not match the published base point"));
    }

    if raw.hash_points.len() != 2 * PEDERSEN_MAX_INPUTS {
        return Err(malformed("expected one low and one high generator per input"));
    }
    if raw.low_part_bits >= PEDERSEN_INPUT_BITS {
        return Err(malformed("LOW_PART_BITS must split the input run"));
    }

    // Expand the seed rows into the full table by successive doubling.
    let mut points = Vec::with_capacity(CONSTANT_POINT_COUNT);
    points.push(shift_point);
    points.push(ec_gen);

    for input in 0..PEDERSEN_MAX_INPUTS {
        let low = parse_point(&raw.hash_points[2 * input], "hash point")?;
        let high = parse_point(&raw.hash_points[2 * input + 1], "hash point")?;

        let mut current = low;
        for bit in 0..PEDERSEN_INPUT_BITS {
            if bit == raw.low_part_bits {
                current = high;
            }
            if !current.is_on_curve() {
                return Err(malformed(format!("derived hash point {} left the curve", bit)));
            }
            points.push(current);
            current = current.double();
        }
    }

    if points.len() != CONSTANT_POINT_COUNT {
        return Err(malformed("constant point table has the wrong size"));
    }

    if accel.window_bits != 8 {
        return Err(malformed("accelerator window width must be 8 bits"));
    }
    let mut base_multiples = Vec::with_capacity(accel.base_multiple_count);
    let mut current = ec_gen;
    for i in 0..accel.base_multiple_count {
        if !current.is_on_curve() {
            return Err(malformed(format!("base multiple {} left the curve", i)));
        }
        base_multiples.push(current);
        current = current.double();
    }

    Ok(CurveConstants {
        points,
        base_multiples,
        shift_point,
        field_gen,
        window_bits: accel.window_bits,
    })
}
