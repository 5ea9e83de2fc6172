use std::fmt;
use std::sync::LazyLock;

use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use sha2::Sha256;

use crate::error::{Result, SignerError};

use super::curve::{CurvePoint, CURVE_ORDER};
use super::felt::{biguint_to_bytes32, strip_hex_prefix, FieldElement};

type HmacSha256 = Hmac<Sha256>;

/// Retries of the deterministic nonce derivation before giving up. The
/// first nonce is essentially always usable; exhausting the budget means
/// the nonce source itself is broken.
const MAX_NONCE_ATTEMPTS: u64 = 16;

/// r and the intermediate w must fit in 251 bits.
static ELEMENT_BOUND: LazyLock<BigUint> = LazyLock::new(|| BigUint::one() << 251u32);

static ORDER_MINUS_TWO: LazyLock<BigUint> =
    LazyLock::new(|| &*CURVE_ORDER - BigUint::from(2u32));

/// A private signing scalar.
///
/// Opaque on purpose: no `Display`, a redacting `Debug`, and the raw value
/// is only reachable from the signing routines in this module.
#[derive(Clone)]
pub struct PrivateScalar(BigUint);

impl PrivateScalar {
    /// Parse from hex, with or without `0x` prefix. The scalar must be
    /// non-zero and at most 256 bits; values above the group order act as
    /// their residue under scalar multiplication.
    pub fn from_hex(input: &str) -> Result<Self> {
        let body = strip_hex_prefix(input)?;
        if body.len() > 64 {
            return Err(SignerError::InvalidFieldEncoding(
                "private scalar exceeds 256 bits".to_string(),
            ));
        }
        let value = BigUint::parse_bytes(body.as_bytes(), 16)
            .ok_or_else(|| SignerError::InvalidEncoding("private scalar".to_string()))?;
        if value.is_zero() {
            return Err(SignerError::InvalidFieldEncoding(
                "private scalar must be non-zero".to_string(),
            ));
        }
        Ok(PrivateScalar(value))
    }

    /// The public point `scalar * G`, computed with the constant-time ladder.
    pub fn public_key(&self) -> CurvePoint {
        CurvePoint::generator().scalar_mul_ladder(&self.0)
    }

    fn secret(&self) -> &BigUint {
        &self.0
    }
}

impl fmt::Debug for PrivateScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateScalar(<redacted>)")
    }
}

/// An ECDSA signature over the STARK curve.
///
/// `v` is a reserved recovery-style field carrying the parity of the nonce
/// point's y-coordinate; downstream consumers only read `r` and `s`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: FieldElement,
    pub s: FieldElement,
    pub v: FieldElement,
}

impl Signature {
    /// Three concatenated 64-digit zero-padded hex fields: `{r}{s}{v}`,
    /// 192 characters, no prefix. Downstream verification compares this
    /// byte-for-byte, so width and order are fixed.
    pub fn to_hex_string(&self) -> String {
        format!(
            "{}{}{}",
            hex::encode(self.r.to_bytes_be()),
            hex::encode(self.s.to_bytes_be()),
            hex::encode(self.v.to_bytes_be())
        )
    }
}

/// Sign a digest with a private scalar.
///
/// The per-message nonce is derived deterministically (RFC 6979 over
/// HMAC-SHA-256); degenerate candidates are retried with fresh entropy up
/// to a fixed budget, after which `SigningExhausted` is returned.
pub fn sign(digest: &FieldElement, key: &PrivateScalar) -> Result<Signature> {
    let z = digest.as_biguint();
    for attempt in 0..MAX_NONCE_ATTEMPTS {
        let seed = if attempt == 0 { None } else { Some(attempt) };
        let k = rfc6979_nonce(z, key.secret(), seed);
        let nonce_point = CurvePoint::generator().scalar_mul_ladder(&k);
        let (Some(x), Some(y)) = (nonce_point.x(), nonce_point.y()) else {
            continue;
        };
        let r = x.as_biguint().clone();
        if r.is_zero() || r >= *ELEMENT_BOUND {
            tracing::warn!(attempt, "nonce produced an out-of-range r, retrying");
            continue;
        }
        let t = (z + &r * key.secret()) % &*CURVE_ORDER;
        if t.is_zero() {
            tracing::warn!(attempt, "degenerate signature intermediate, retrying");
            continue;
        }
        let w = (&k * invert_mod_order(&t)) % &*CURVE_ORDER;
        if w.is_zero() || w >= *ELEMENT_BOUND {
            tracing::warn!(attempt, "nonce produced an out-of-range s, retrying");
            continue;
        }
        let s = invert_mod_order(&w);
        let v = FieldElement::from_u64(if y.as_biguint().bit(0) { 1 } else { 0 });
        return Ok(Signature {
            r: FieldElement::from_biguint(r),
            s: FieldElement::from_biguint(s),
            v,
        });
    }
    tracing::error!("signing nonce budget exhausted; nonce derivation is broken");
    Err(SignerError::SigningExhausted)
}

/// Verify an (r, s) pair against a digest and a public point.
pub fn verify(digest: &FieldElement, r: &FieldElement, s: &FieldElement, public_key: &CurvePoint) -> bool {
    let r_int = r.as_biguint();
    let s_int = s.as_biguint();
    if r_int.is_zero() || r_int >= &*ELEMENT_BOUND {
        return false;
    }
    if s_int.is_zero() || s_int >= &*CURVE_ORDER {
        return false;
    }
    let w = invert_mod_order(s_int);
    let u1 = (digest.as_biguint() * &w) % &*CURVE_ORDER;
    let u2 = (r_int * &w) % &*CURVE_ORDER;
    let point = CurvePoint::generator()
        .scalar_mul(&u1)
        .add(&public_key.scalar_mul(&u2));
    match point.x() {
        Some(x) => x.as_biguint() % &*CURVE_ORDER == r_int % &*CURVE_ORDER,
        None => false,
    }
}

/// Boundary form of signing: hex digest in, 192-character `{r}{s}{v}`
/// signature string out.
pub fn sign_message(msg_hash_hex: &str, private_key_hex: &str) -> Result<String> {
    let digest = FieldElement::from_hex(msg_hash_hex)?;
    let key = PrivateScalar::from_hex(private_key_hex)?;
    Ok(sign(&digest, &key)?.to_hex_string())
}

/// Deterministic nonce derivation per RFC 6979 with HMAC-SHA-256.
///
/// Follows the STARK reference signer: digests of 248..252 bits are shifted
/// left one nibble before entering the DRBG, and retry entropy is the seed
/// counter in minimal big-endian form.
fn rfc6979_nonce(msg_hash: &BigUint, secret: &BigUint, seed: Option<u64>) -> BigUint {
    let qlen = CURVE_ORDER.bits();
    let adjusted = {
        let bits = msg_hash.bits();
        if bits >= 248 && (1..=4).contains(&(bits % 8)) {
            msg_hash << 4u32
        } else {
            msg_hash.clone()
        }
    };
    let data = biguint_to_bytes32(&adjusted);
    let entropy = match seed {
        None => Vec::new(),
        Some(n) => {
            let bytes = n.to_be_bytes();
            let skip = bytes.iter().take_while(|b| **b == 0).count().min(7);
            bytes[skip..].to_vec()
        }
    };

    let bits2int = |bytes: &[u8]| -> BigUint {
        let value = BigUint::from_bytes_be(bytes);
        let blen = bytes.len() as u64 * 8;
        if blen > qlen {
            value >> (blen - qlen)
        } else {
            value
        }
    };
    let bits2octets = |bytes: &[u8]| -> [u8; 32] {
        let z1 = bits2int(bytes);
        let z2 = if z1 >= *CURVE_ORDER { z1 - &*CURVE_ORDER } else { z1 };
        biguint_to_bytes32(&z2)
    };

    let secret_bytes = biguint_to_bytes32(secret);
    let hashed = bits2octets(&data);

    let mut v = [0x01u8; 32];
    let mut key = [0x00u8; 32];
    key = hmac_concat(&key, &[&v, &[0x00], &secret_bytes, &hashed, &entropy]);
    v = hmac_concat(&key, &[&v]);
    key = hmac_concat(&key, &[&v, &[0x01], &secret_bytes, &hashed, &entropy]);
    v = hmac_concat(&key, &[&v]);

    loop {
        v = hmac_concat(&key, &[&v]);
        let candidate = bits2int(&v);
        if !candidate.is_zero() && candidate < *CURVE_ORDER {
            return candidate;
        }
        key = hmac_concat(&key, &[&v, &[0x00]]);
        v = hmac_concat(&key, &[&v]);
    }
}

fn hmac_concat(key: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

fn invert_mod_order(value: &BigUint) -> BigUint {
    value.modpow(&ORDER_MINUS_TWO, &CURVE_ORDER)
}
