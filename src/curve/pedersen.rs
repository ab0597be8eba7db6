//! Pedersen hash over the constant-point table
//!
//! The canonical definition accumulates one constant point per set bit of
//! each input, starting from the shift point, and returns the x coordinate
//! of the final sum. The windowed variant produces bit-identical output and
//! is the one the packers use.

use crate::curve::field::FieldElement;
use crate::curve::params::{self, PEDERSEN_INPUT_BITS, PEDERSEN_MAX_INPUTS};
use crate::curve::point::CurvePoint;
use crate::curve::window;
use crate::error::CryptoError;

/// Canonical bit-by-bit Pedersen hash of up to two field elements.
///
/// Fails with `UnhashableInput` if the accumulator ever shares an x
/// coordinate with the constant point being added; no input produced by
/// the protocol's own packing rules does.
pub fn hash_elements(inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
    if inputs.len() > PEDERSEN_MAX_INPUTS {
        return Err(CryptoError::InvalidInstruction(format!(
            "pedersen block takes at most {} elements, got {}",
            PEDERSEN_MAX_INPUTS,
            inputs.len()
        )));
    }

    let constants = params::constants()?;
    let mut point = constants.shift_point;

    for (i, input) in inputs.iter().enumerate() {
        let v = input.value();
        debug_assert!(v.bit_length() <= PEDERSEN_INPUT_BITS);

        for j in 0..PEDERSEN_INPUT_BITS {
            if v.get_bit(j) {
                let pt = &constants.points[2 + i * PEDERSEN_INPUT_BITS + j];
                if let (CurvePoint::Affine { x: ax, .. }, CurvePoint::Affine { x: px, .. }) =
                    (&point, pt)
                {
                    if ax == px {
                        return Err(CryptoError::UnhashableInput);
                    }
                }
                point = point.add(pt);
            }
        }
    }

    match point {
        CurvePoint::Affine { x, .. } => Ok(x),
        CurvePoint::Zero => Err(CryptoError::UnhashableInput),
    }
}

/// Windowed Pedersen hash; bit-identical to `hash_elements`.
pub fn hash_elements_fast(inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
    if inputs.len() > PEDERSEN_MAX_INPUTS {
        return Err(CryptoError::InvalidInstruction(format!(
            "pedersen block takes at most {} elements, got {}",
            PEDERSEN_MAX_INPUTS,
            inputs.len()
        )));
    }

    let constants = params::constants()?;
    let mut point = constants.shift_point;

    for (i, input) in inputs.iter().enumerate() {
        point = window::pedersen_accumulate(point, i, input)?;
    }

    match point {
        CurvePoint::Affine { x, .. } => Ok(x),
        CurvePoint::Zero => Err(CryptoError::UnhashableInput),
    }
}

/// The two-element hash the message packers chain with.
pub fn pedersen_hash(a: &FieldElement, b: &FieldElement) -> Result<FieldElement, CryptoError> {
    hash_elements_fast(&[*a, *b])
}
