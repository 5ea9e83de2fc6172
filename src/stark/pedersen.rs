use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::curve::{felt_const, CurvePoint};
use super::felt::FieldElement;

/// Fixed public constants of the Pedersen hash, from the STARK curve
/// parameter set: a shift point and four base points.
static SHIFT_POINT: LazyLock<CurvePoint> = LazyLock::new(|| CurvePoint::Affine {
    x: felt_const("049ee3eba8c1600700ee1b87eb599f16716b0b1022947733551fde4050ca6804"),
    y: felt_const("03ca0cfe4b3bc6ddf346d49d06ea0ed34e621062c0e056c1d0405d266e10268a"),
});

static P0: LazyLock<CurvePoint> = LazyLock::new(|| CurvePoint::Affine {
    x: felt_const("0234287dcbaffe7f969c748655fca9e58fa8120b6d56eb0c1080d17957ebe47b"),
    y: felt_const("03b056f100f96fb21e889527d41f4e39940135dd7a6c94cc6ed0268ee89e5615"),
});

static P1: LazyLock<CurvePoint> = LazyLock::new(|| CurvePoint::Affine {
    x: felt_const("04fa56f376c83db33f9dab2656558f3399099ec1de5e3018b7a6932dba8aa378"),
    y: felt_const("03fa0984c931c9e38113e0c0e47e4401562761f92a7a23b45168f4e80ff5b54d"),
});

static P2: LazyLock<CurvePoint> = LazyLock::new(|| CurvePoint::Affine {
    x: felt_const("04ba4cc166be8dec764910f75b45f74b40c690c74709e90f3aa372f0bd2d6997"),
    y: felt_const("0040301cf5c1751f4b971e46c4ede85fcac5c59a5ce5ae7c48151f27b24b219c"),
});

static P3: LazyLock<CurvePoint> = LazyLock::new(|| CurvePoint::Affine {
    x: felt_const("054302dcb0e6cc1c6e44cca8f61a63bb2ca65048d53fb325d36ff12c49a58202"),
    y: felt_const("01b77b3e37d13504b348046268d8ae25ce98ad783c25561a879dcc77e99c2426"),
});

/// Low 248 bits of an element select multiples of the first base point of a
/// pair, the top 4 bits the second.
const LOW_PART_BITS: u32 = 248;

static LOW_PART_MASK: LazyLock<BigUint> =
    LazyLock::new(|| (BigUint::one() << LOW_PART_BITS) - BigUint::one());

/// The two-input Pedersen compression:
///
/// `H(a, b) = [shift + a_low * P0 + a_high * P1 + b_low * P2 + b_high * P3].x`
pub fn pedersen_hash(a: &FieldElement, b: &FieldElement) -> FieldElement {
    let mut acc = SHIFT_POINT.clone();
    for (element, low_base, high_base) in [(a, &*P0, &*P1), (b, &*P2, &*P3)] {
        let value = element.as_biguint();
        let low = value & &*LOW_PART_MASK;
        let high = value >> LOW_PART_BITS;
        if !low.is_zero() {
            acc = acc.add(&low_base.scalar_mul(&low));
        }
        if !high.is_zero() {
            acc = acc.add(&high_base.scalar_mul(&high));
        }
    }
    // the accumulated sum never lands on the identity for valid inputs
    acc.x().cloned().unwrap_or_else(FieldElement::zero)
}

/// Chain a sequence of elements through the Pedersen compression:
/// start from zero, fold every element, then fold the sequence length.
///
/// `H(..H(H(0, e_0), e_1).., e_{n-1}, n)`
pub fn hash_elements(elements: &[FieldElement]) -> FieldElement {
    let mut state = FieldElement::zero();
    for element in elements {
        state = pedersen_hash(&state, element);
    }
    pedersen_hash(&state, &FieldElement::from_u64(elements.len() as u64))
}
