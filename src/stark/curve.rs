use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{Result, SignerError};

use super::felt::FieldElement;

/// Order of the STARK curve group.
pub static CURVE_ORDER: LazyLock<BigUint> = LazyLock::new(|| {
    BigUint::parse_bytes(
        b"0800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f",
        16,
    )
    .expect("curve order constant")
});

/// Curve equation: y^2 = x^3 + ALPHA * x + BETA
static ALPHA: LazyLock<FieldElement> = LazyLock::new(FieldElement::one);

static BETA: LazyLock<FieldElement> = LazyLock::new(|| {
    felt_const("06f21413efbe40de150e596d72f7a8c5609ad26c15c915c1f4cdfcb99cee9e89")
});

static GENERATOR: LazyLock<CurvePoint> = LazyLock::new(|| CurvePoint::Affine {
    x: felt_const("01ef15c18599971b7beced415a40f0c7deacfd9b0d1819e03d723d8bc943cfca"),
    y: felt_const("005668060aa49730b7be4801df46ec62de53ecd11abe43a32873000c36e8dc1f"),
});

pub(crate) fn felt_const(hex: &str) -> FieldElement {
    FieldElement::from_hex(hex).expect("curve point constant")
}

/// A point on the STARK curve, or the group identity.
///
/// Non-identity points constructed through `new` are checked against the
/// curve equation; the group operations preserve curve membership.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CurvePoint {
    Infinity,
    Affine { x: FieldElement, y: FieldElement },
}

impl CurvePoint {
    pub fn generator() -> &'static CurvePoint {
        &GENERATOR
    }

    /// Construct an affine point, rejecting coordinates off the curve.
    pub fn new(x: FieldElement, y: FieldElement) -> Result<Self> {
        let point = CurvePoint::Affine { x, y };
        if point.is_on_curve() {
            Ok(point)
        } else {
            Err(SignerError::InvalidFieldEncoding(
                "point is not on the curve".to_string(),
            ))
        }
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, CurvePoint::Infinity)
    }

    pub fn x(&self) -> Option<&FieldElement> {
        match self {
            CurvePoint::Infinity => None,
            CurvePoint::Affine { x, .. } => Some(x),
        }
    }

    pub fn y(&self) -> Option<&FieldElement> {
        match self {
            CurvePoint::Infinity => None,
            CurvePoint::Affine { y, .. } => Some(y),
        }
    }

    pub fn is_on_curve(&self) -> bool {
        match self {
            CurvePoint::Infinity => true,
            CurvePoint::Affine { x, y } => {
                let lhs = y * y;
                let rhs = &(&(&(x * x) * x) + &(&*ALPHA * x)) + &*BETA;
                lhs == rhs
            }
        }
    }

    pub fn add(&self, other: &CurvePoint) -> CurvePoint {
        match (self, other) {
            (CurvePoint::Infinity, _) => other.clone(),
            (_, CurvePoint::Infinity) => self.clone(),
            (CurvePoint::Affine { x: x1, y: y1 }, CurvePoint::Affine { x: x2, y: y2 }) => {
                if x1 == x2 {
                    if (y1 + y2).is_zero() {
                        return CurvePoint::Infinity;
                    }
                    return self.double();
                }
                // x2 - x1 is non-zero here, so the inverse exists
                let slope = &(y2 - y1) * &(x2 - x1).invert_unchecked();
                let x3 = &(&(&slope * &slope) - x1) - x2;
                let y3 = &(&slope * &(x1 - &x3)) - y1;
                CurvePoint::Affine { x: x3, y: y3 }
            }
        }
    }

    pub fn double(&self) -> CurvePoint {
        match self {
            CurvePoint::Infinity => CurvePoint::Infinity,
            CurvePoint::Affine { x, y } => {
                if y.is_zero() {
                    return CurvePoint::Infinity;
                }
                let two = FieldElement::from_u64(2);
                let three = FieldElement::from_u64(3);
                let slope =
                    &(&(&three * &(x * x)) + &*ALPHA) * &(&two * y).invert_unchecked();
                let x3 = &(&(&slope * &slope) - x) - x;
                let y3 = &(&slope * &(x - &x3)) - y;
                CurvePoint::Affine { x: x3, y: y3 }
            }
        }
    }

    /// Double-and-add scalar multiplication, most-significant bit first.
    ///
    /// The scalar wraps at the group order: `k = 0` and `k = N` both yield
    /// the identity. Only for public operands; secret scalars go through
    /// `scalar_mul_ladder`.
    pub fn scalar_mul(&self, scalar: &BigUint) -> CurvePoint {
        let k = scalar % &*CURVE_ORDER;
        if k.is_zero() {
            return CurvePoint::Infinity;
        }
        let mut acc = CurvePoint::Infinity;
        for i in (0..k.bits()).rev() {
            acc = acc.double();
            if k.bit(i) {
                acc = acc.add(self);
            }
        }
        acc
    }

    /// Montgomery-ladder scalar multiplication for secret scalars.
    ///
    /// Runs a fixed 252-iteration ladder performing an add and a double on
    /// every step, independent of the scalar's bit pattern.
    pub fn scalar_mul_ladder(&self, scalar: &BigUint) -> CurvePoint {
        let k = scalar % &*CURVE_ORDER;
        let mut r0 = CurvePoint::Infinity;
        let mut r1 = self.clone();
        for i in (0..252u64).rev() {
            if k.bit(i) {
                r0 = r0.add(&r1);
                r1 = r1.double();
            } else {
                r1 = r0.add(&r1);
                r0 = r0.double();
            }
        }
        r0
    }
}
