//! Affine point arithmetic on the STARK curve y^2 = x^3 + x + B
//!
//! The curve coefficient alpha is 1 throughout. `CurvePoint::Zero` is the
//! additive identity used as a sentinel by `add`; it does not satisfy the
//! curve equation and must never reach signature verification.

use once_cell::sync::Lazy;

use crate::bigint::BigInt;
use crate::curve::field::FieldElement;

/// B, the constant term of the curve equation.
static CURVE_B: Lazy<FieldElement> = Lazy::new(|| {
    FieldElement::new(BigInt::from_limbs([
        0xf4cdfcb99cee9e89,
        0x609ad26c15c915c1,
        0x150e596d72f7a8c5,
        0x06f21413efbe40de,
    ]))
});

/// The published base point G.
static GENERATOR: Lazy<CurvePoint> = Lazy::new(|| CurvePoint::Affine {
    x: FieldElement::new(BigInt::from_limbs([
        0x3d723d8bc943cfca,
        0xdeacfd9b0d1819e0,
        0x7beced415a40f0c7,
        0x01ef15c18599971b,
    ])),
    y: FieldElement::new(BigInt::from_limbs([
        0x2873000c36e8dc1f,
        0xde53ecd11abe43a3,
        0xb7be4801df46ec62,
        0x005668060aa49730,
    ])),
});

pub(crate) fn curve_b() -> &'static FieldElement {
    &CURVE_B
}

/// A point on the curve, or the identity sentinel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CurvePoint {
    /// The identity / point at infinity. Not on the curve itself.
    Zero,
    /// An affine coordinate pair satisfying the curve equation.
    Affine { x: FieldElement, y: FieldElement },
}

impl CurvePoint {
    /// The base point G.
    pub fn generator() -> &'static CurvePoint {
        &GENERATOR
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, CurvePoint::Zero)
    }

    /// The affine coordinates, if not the identity.
    pub fn coordinates(&self) -> Option<(&FieldElement, &FieldElement)> {
        match self {
            CurvePoint::Zero => None,
            CurvePoint::Affine { x, y } => Some((x, y)),
        }
    }

    /// Checks the curve equation. False for the identity sentinel.
    pub fn is_on_curve(&self) -> bool {
        match self {
            CurvePoint::Zero => false,
            CurvePoint::Affine { x, y } => {
                let lhs = *y * *y;
                let rhs = *x * *x * *x + *x + *CURVE_B;
                lhs == rhs
            }
        }
    }

    pub fn neg(&self) -> CurvePoint {
        match self {
            CurvePoint::Zero => CurvePoint::Zero,
            CurvePoint::Affine { x, y } => CurvePoint::Affine { x: *x, y: -*y },
        }
    }

    /// Point addition with the identity and opposite-point cases resolved
    /// before the slope is formed.
    pub fn add(&self, other: &CurvePoint) -> CurvePoint {
        let (x1, y1) = match self {
            CurvePoint::Zero => return *other,
            CurvePoint::Affine { x, y } => (*x, *y),
        };
        let (x2, y2) = match other {
            CurvePoint::Zero => return *self,
            CurvePoint::Affine { x, y } => (*x, *y),
        };

        if x1 == x2 && y1 != y2 {
            return CurvePoint::Zero;
        }
        if x1 == x2 && y1 == y2 {
            return self.double();
        }

        let lambda = (y2 - y1) / (x2 - x1);
        let x3 = lambda * lambda - x1 - x2;
        let y3 = lambda * (x1 - x3) - y1;
        CurvePoint::Affine { x: x3, y: y3 }
    }

    /// Point doubling; the slope numerator carries the curve's alpha = 1.
    pub fn double(&self) -> CurvePoint {
        let (x1, y1) = match self {
            CurvePoint::Zero => return CurvePoint::Zero,
            CurvePoint::Affine { x, y } => (*x, *y),
        };

        // A vertical tangent would send the double to infinity. The group
        // order is odd, so no reachable point has y = 0.
        if y1.is_zero() {
            return CurvePoint::Zero;
        }

        let three = FieldElement::from_u64(3);
        let two = FieldElement::from_u64(2);
        let lambda = (three * x1 * x1 + FieldElement::one()) / (two * y1);
        let x3 = lambda * lambda - x1 - x1;
        let y3 = lambda * (x1 - x3) - y1;
        CurvePoint::Affine { x: x3, y: y3 }
    }

    /// Scalar multiplication, double-and-add from the most significant bit.
    ///
    /// The accumulator stays unset until the first 1-bit so the leading bit
    /// loads the point directly instead of adding into the identity.
    pub fn scalar_mul(&self, k: &BigInt<4>) -> CurvePoint {
        let mut acc: Option<CurvePoint> = None;

        for i in (0..k.bit_length()).rev() {
            if let Some(p) = acc {
                acc = Some(p.double());
            }
            if k.get_bit(i) {
                acc = Some(match acc {
                    None => *self,
                    Some(p) => p.add(self),
                });
            }
        }

        acc.unwrap_or(CurvePoint::Zero)
    }

    /// Recovers the two candidate y coordinates for an x on the curve.
    pub fn y_coordinate(x: &FieldElement) -> Option<(FieldElement, FieldElement)> {
        let rhs = *x * *x * *x + *x + *CURVE_B;
        let y = rhs.sqrt()?;
        Some((y, -y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(CurvePoint::generator().is_on_curve());
        assert!(!CurvePoint::Zero.is_on_curve());
    }

    #[test]
    fn identity_behaviour() {
        let g = CurvePoint::generator();
        assert_eq!(CurvePoint::Zero.add(g), *g);
        assert_eq!(g.add(&CurvePoint::Zero), *g);
        assert_eq!(g.add(&g.neg()), CurvePoint::Zero);
    }

    #[test]
    fn add_matches_double() {
        let g = CurvePoint::generator();
        assert_eq!(g.add(g), g.double());
        assert!(g.double().is_on_curve());
    }

    #[test]
    fn scalar_mul_small_multiples() {
        let g = CurvePoint::generator();
        let two_g = g.scalar_mul(&BigInt::from_u64(2));
        let three_g = g.scalar_mul(&BigInt::from_u64(3));
        assert_eq!(two_g, g.double());
        assert_eq!(three_g, g.double().add(g));
        assert_eq!(g.scalar_mul(&BigInt::zero()), CurvePoint::Zero);
        assert_eq!(g.scalar_mul(&BigInt::one()), *g);
    }

    #[test]
    fn scalar_mul_is_associative_with_add() {
        let g = CurvePoint::generator();
        let five_g = g.scalar_mul(&BigInt::from_u64(5));
        let two_g = g.scalar_mul(&BigInt::from_u64(2));
        let three_g = g.scalar_mul(&BigInt::from_u64(3));
        assert_eq!(two_g.add(&three_g), five_g);
    }

    #[test]
    fn y_recovery_finds_generator() {
        let (x, y) = CurvePoint::generator().coordinates().unwrap();
        let (y1, y2) = CurvePoint::y_coordinate(x).unwrap();
        assert!(*y == y1 || *y == y2);
    }
}
