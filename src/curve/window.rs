//! 8-bit-window acceleration for base-point and Pedersen multiplication
//!
//! A window table stores `table[i * 256 + v] = v * 2^(8i) * base`, indexed
//! little-endian over the bytes of the scalar so the accumulation loop reads
//! input in natural order. Zero bytes are skipped. Tables are derived from
//! the constant-point table once, at first use, and shared read-only.

use once_cell::sync::Lazy;

use crate::bigint::BigInt;
use crate::curve::field::FieldElement;
use crate::curve::params::{self, PEDERSEN_INPUT_BITS, PEDERSEN_MAX_INPUTS};
use crate::curve::point::CurvePoint;
use crate::error::CryptoError;

const WINDOW_VALUES: usize = 256;

/// Windowed multiples of a fixed sequence of run generators.
pub struct WindowTable {
    entries: Vec<CurvePoint>,
    windows: usize,
}

impl WindowTable {
    /// Builds a table over `windows` 8-bit windows. `base_of` yields the
    /// generator worth 2^(8i) at window i; entries grow by successive
    /// addition so the table is exactly the doubling runs re-grouped.
    fn build(windows: usize, base_of: impl Fn(usize) -> CurvePoint) -> Self {
        let mut entries = Vec::with_capacity(windows * WINDOW_VALUES);
        for i in 0..windows {
            let base = base_of(i);
            entries.push(CurvePoint::Zero);
            let mut acc = CurvePoint::Zero;
            for _ in 1..WINDOW_VALUES {
                acc = acc.add(&base);
                entries.push(acc);
            }
        }
        Self { entries, windows }
    }

    #[inline]
    fn lookup(&self, window: usize, value: u8) -> &CurvePoint {
        &self.entries[window * WINDOW_VALUES + value as usize]
    }

    /// Accumulates `point + sum(windows of k)`, skipping zero bytes.
    ///
    /// The collision guard rejects an accumulator that shares an x
    /// coordinate with the table point about to be added; the sum would
    /// degenerate there.
    fn accumulate(&self, mut point: CurvePoint, k: &BigInt<4>) -> Result<CurvePoint, CryptoError> {
        for i in 0..self.windows {
            let byte = k.byte(i);
            if byte == 0 {
                continue;
            }
            let entry = self.lookup(i, byte);
            if let (CurvePoint::Affine { x: ax, .. }, CurvePoint::Affine { x: ex, .. }) =
                (&point, entry)
            {
                if ax == ex {
                    return Err(CryptoError::UnhashableInput);
                }
            }
            point = point.add(entry);
        }
        Ok(point)
    }
}

/// Base-point windows: 32 windows covering a 256-bit scalar.
static BASE_WINDOWS: Lazy<Result<WindowTable, CryptoError>> = Lazy::new(|| {
    let constants = params::constants()?;
    Ok(WindowTable::build(32, |i| constants.base_multiples[8 * i]))
});

/// Pedersen windows, one table per hash input position.
static HASH_WINDOWS: Lazy<Result<Vec<WindowTable>, CryptoError>> = Lazy::new(|| {
    let constants = params::constants()?;
    let windows = PEDERSEN_INPUT_BITS / 8 + 1; // 31 full windows + the 4 high bits
    let tables = (0..PEDERSEN_MAX_INPUTS)
        .map(|input| {
            WindowTable::build(windows, |i| constants.points[2 + input * PEDERSEN_INPUT_BITS + 8 * i])
        })
        .collect();
    Ok(tables)
});

/// Fast scalar multiplication of the base point via the window table.
///
/// Bit-identical to `CurvePoint::generator().scalar_mul(k)`.
pub fn scalar_base_mul(k: &BigInt<4>) -> Result<CurvePoint, CryptoError> {
    let table = BASE_WINDOWS.as_ref().map_err(Clone::clone)?;
    table.accumulate(CurvePoint::Zero, k)
}

/// One fast Pedersen accumulation step for the input at `position`.
pub(crate) fn pedersen_accumulate(
    point: CurvePoint,
    position: usize,
    value: &FieldElement,
) -> Result<CurvePoint, CryptoError> {
    let tables = HASH_WINDOWS.as_ref().map_err(Clone::clone)?;
    tables[position].accumulate(point, value.value())
}
