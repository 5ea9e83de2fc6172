use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{Result, SignerError};

/// The STARK field prime: P = 2^251 + 17 * 2^192 + 1
pub static FIELD_PRIME: LazyLock<BigUint> = LazyLock::new(|| {
    (BigUint::one() << 251u32) + BigUint::from(17u32) * (BigUint::one() << 192u32) + BigUint::one()
});

static PRIME_MINUS_TWO: LazyLock<BigUint> =
    LazyLock::new(|| &*FIELD_PRIME - BigUint::from(2u32));

/// An element of the STARK prime field.
///
/// The stored value is always fully reduced: `0 <= value < P`. Every
/// constructor and every arithmetic operation preserves this invariant.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldElement(BigUint);

impl FieldElement {
    pub fn zero() -> Self {
        FieldElement(BigUint::zero())
    }

    pub fn one() -> Self {
        FieldElement(BigUint::one())
    }

    pub fn from_u64(value: u64) -> Self {
        FieldElement(BigUint::from(value))
    }

    /// Embed a signed integer: negative values map to `P - |value|`.
    pub fn from_i128(value: i128) -> Self {
        if value >= 0 {
            FieldElement(BigUint::from(value.unsigned_abs()))
        } else {
            FieldElement(&*FIELD_PRIME - BigUint::from(value.unsigned_abs()) % &*FIELD_PRIME)
        }
    }

    /// Reduce an arbitrary big integer into the field.
    pub fn from_biguint(value: BigUint) -> Self {
        FieldElement(value % &*FIELD_PRIME)
    }

    /// Parse a big-endian hex string, with or without a `0x`/`0X` prefix.
    ///
    /// Rejects empty bodies and non-hex characters with `InvalidEncoding`,
    /// and values outside `[0, P)` with `InvalidFieldEncoding`.
    pub fn from_hex(input: &str) -> Result<Self> {
        let body = strip_hex_prefix(input)?;
        let value = BigUint::parse_bytes(body.as_bytes(), 16)
            .ok_or_else(|| SignerError::InvalidEncoding(input.to_string()))?;
        if value >= *FIELD_PRIME {
            return Err(SignerError::InvalidFieldEncoding(input.to_string()));
        }
        Ok(FieldElement(value))
    }

    /// Parse a decimal string, accepting a leading `-` for field negation.
    pub fn from_decimal_str(input: &str) -> Result<Self> {
        let (negative, body) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SignerError::InvalidFieldEncoding(input.to_string()));
        }
        let value = BigUint::parse_bytes(body.as_bytes(), 10)
            .ok_or_else(|| SignerError::InvalidFieldEncoding(input.to_string()))?;
        if value >= *FIELD_PRIME {
            return Err(SignerError::InvalidFieldEncoding(input.to_string()));
        }
        if negative && !value.is_zero() {
            Ok(FieldElement(&*FIELD_PRIME - value))
        } else {
            Ok(FieldElement(value))
        }
    }

    /// Encode an ASCII string of at most 31 bytes as a Cairo short string.
    pub fn from_short_string(input: &str) -> Result<Self> {
        let bytes = input.as_bytes();
        if bytes.len() > 31 {
            return Err(SignerError::InvalidFieldEncoding(format!(
                "string longer than 31 bytes: {input}"
            )));
        }
        Ok(FieldElement(BigUint::from_bytes_be(bytes)))
    }

    /// Lower-case hex, `0x`-prefixed, zero-padded to 64 digits.
    pub fn to_hex(&self) -> String {
        format!("0x{:064x}", self.0)
    }

    /// Big-endian bytes, left-padded to 32.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        biguint_to_bytes32(&self.0)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiplicative inverse. Fails with `DivisionByZero` on the zero element.
    pub fn invert(&self) -> Result<Self> {
        if self.0.is_zero() {
            return Err(SignerError::DivisionByZero);
        }
        Ok(self.invert_unchecked())
    }

    /// Inverse via Fermat; the caller guarantees a non-zero operand.
    pub(crate) fn invert_unchecked(&self) -> Self {
        FieldElement(self.0.modpow(&PRIME_MINUS_TWO, &FIELD_PRIME))
    }
}

impl Add for &FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: &FieldElement) -> FieldElement {
        FieldElement((&self.0 + &rhs.0) % &*FIELD_PRIME)
    }
}

impl Sub for &FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: &FieldElement) -> FieldElement {
        FieldElement((&self.0 + &*FIELD_PRIME - &rhs.0) % &*FIELD_PRIME)
    }
}

impl Mul for &FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: &FieldElement) -> FieldElement {
        FieldElement((&self.0 * &rhs.0) % &*FIELD_PRIME)
    }
}

impl Neg for &FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        if self.0.is_zero() {
            FieldElement::zero()
        } else {
            FieldElement(&*FIELD_PRIME - &self.0)
        }
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_hex())
    }
}

/// Strip an optional `0x`/`0X` prefix and validate the hex body.
pub(crate) fn strip_hex_prefix(input: &str) -> Result<&str> {
    let body = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if body.is_empty() {
        return Err(SignerError::InvalidEncoding("empty hex string".to_string()));
    }
    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SignerError::InvalidEncoding(input.to_string()));
    }
    Ok(body)
}

pub(crate) fn biguint_to_bytes32(value: &BigUint) -> [u8; 32] {
    let raw = value.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - raw.len()..].copy_from_slice(&raw);
    out
}
