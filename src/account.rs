use std::fmt;

use num_bigint::BigUint;

use crate::error::{Result, SignerError};
use crate::stark::{sign, CurvePoint, FieldElement, PrivateScalar, Signature};

/// A trading account's signing identity: vault id, private scalar, the
/// derived public point, and the exchange-issued API key.
///
/// Construction validates that the supplied stark key really is
/// `privateScalar * G`; an account that fails this check is unusable.
/// The private scalar never leaves the account: it has no accessor, and
/// `Debug` output redacts it.
#[derive(Clone)]
pub struct StarkPerpetualAccount {
    vault: u64,
    private_key: PrivateScalar,
    public_key: CurvePoint,
    api_key: String,
}

impl StarkPerpetualAccount {
    pub fn new(
        vault: u64,
        private_key_hex: &str,
        public_key_hex: &str,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let private_key = PrivateScalar::from_hex(private_key_hex)?;
        let stark_key = FieldElement::from_hex(public_key_hex)?;
        let public_key = private_key.public_key();
        match public_key.x() {
            Some(x) if *x == stark_key => {}
            _ => {
                tracing::error!(vault, "stark key does not match the private scalar");
                return Err(SignerError::KeyMismatch);
            }
        }
        tracing::debug!(vault, stark_key = %stark_key, "stark account ready");
        Ok(Self {
            vault,
            private_key,
            public_key,
            api_key: api_key.into(),
        })
    }

    pub fn vault(&self) -> u64 {
        self.vault
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn public_key(&self) -> &CurvePoint {
        &self.public_key
    }

    /// The stark key (public-key x-coordinate), `0x`-prefixed hex.
    pub fn public_key_hex(&self) -> String {
        match self.public_key.x() {
            Some(x) => x.to_hex(),
            None => FieldElement::zero().to_hex(),
        }
    }

    /// Sign an order digest.
    ///
    /// Produces the full signature, then splits its fixed-width hex form
    /// into the first two 64-character fields, which is exactly how the
    /// transport layer reassembles it.
    pub fn sign(&self, digest: &FieldElement) -> Result<(BigUint, BigUint)> {
        let signature = self.sign_raw(digest)?;
        let encoded = signature.to_hex_string();
        let parse = |range: &str| {
            BigUint::parse_bytes(range.as_bytes(), 16)
                .ok_or_else(|| SignerError::InvalidEncoding("signature field".to_string()))
        };
        Ok((parse(&encoded[..64])?, parse(&encoded[64..128])?))
    }

    /// Sign an order digest, returning the structured signature.
    pub fn sign_raw(&self, digest: &FieldElement) -> Result<Signature> {
        sign(digest, &self.private_key)
    }
}

impl fmt::Debug for StarkPerpetualAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StarkPerpetualAccount")
            .field("vault", &self.vault)
            .field("private_key", &self.private_key)
            .field("public_key", &self.public_key_hex())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_KEY: &str =
        "0x1234def56789012345678901234567890123456789012345678901234567890";
    const STARK_KEY: &str =
        "0x038635448ec22b1e99ba49f260dd3f3125f4fdf3cfe5e3be06f5f48dd5af0677";

    #[test]
    fn construction_validates_the_key_pair() {
        let account = StarkPerpetualAccount::new(100, PRIVATE_KEY, STARK_KEY, "api-key").unwrap();
        assert_eq!(account.vault(), 100);
        assert_eq!(account.api_key(), "api-key");
        assert_eq!(account.public_key_hex(), STARK_KEY);
    }

    #[test]
    fn mismatched_stark_key_is_rejected() {
        let result = StarkPerpetualAccount::new(
            100,
            PRIVATE_KEY,
            "0x5d05989e9302dcebc74e241001e3e3ac3f4402ccf2f8e6f74b034b07ad6a904",
            "api-key",
        );
        assert!(matches!(result, Err(SignerError::KeyMismatch)));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(matches!(
            StarkPerpetualAccount::new(1, "xyz", STARK_KEY, "k"),
            Err(SignerError::InvalidEncoding(_))
        ));
        assert!(matches!(
            StarkPerpetualAccount::new(1, PRIVATE_KEY, "", "k"),
            Err(SignerError::InvalidEncoding(_))
        ));
        assert!(matches!(
            StarkPerpetualAccount::new(1, PRIVATE_KEY, "0x12zz", "k"),
            Err(SignerError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn sign_splits_the_reference_signature() {
        let account = StarkPerpetualAccount::new(100, PRIVATE_KEY, STARK_KEY, "api-key").unwrap();
        let digest = FieldElement::from_hex(
            "0x4de4c009e0d0c5a70a7da0e2039fb2b99f376d53496f89d9f437e736add6b48",
        )
        .unwrap();
        let (r, s) = account.sign(&digest).unwrap();
        assert_eq!(
            r.to_string(),
            "2744225103614379349530169149569415648483556705538760809691766060588698917266"
        );
        assert_eq!(
            s.to_string(),
            "575134845329043509424821214199431073576156064822439379079045654927136672163"
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let account = StarkPerpetualAccount::new(100, PRIVATE_KEY, STARK_KEY, "secret-api-key")
            .unwrap();
        let debug = format!("{account:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("1234def5"));
        assert!(!debug.contains("secret-api-key"));
    }
}
