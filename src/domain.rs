use crate::error::Result;
use crate::stark::{hash_elements, FieldElement};

/// Signing-domain descriptor: binds every signature to one protocol
/// context so an order signed for one chain or app revision can never be
/// replayed against another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarknetDomain {
    pub name: String,
    pub version: String,
    pub chain_id: String,
    pub revision: String,
}

impl StarknetDomain {
    /// Domain for the mainnet deployment.
    pub fn mainnet() -> Self {
        Self {
            name: "Perpetuals".to_string(),
            version: "v0".to_string(),
            chain_id: "SN_MAIN".to_string(),
            revision: "1".to_string(),
        }
    }

    /// Domain for the Sepolia testnet deployment.
    pub fn testnet() -> Self {
        Self {
            name: "Perpetuals".to_string(),
            version: "v0".to_string(),
            chain_id: "SN_SEPOLIA".to_string(),
            revision: "1".to_string(),
        }
    }

    pub fn from_chain_id(chain_id: &str) -> Self {
        match chain_id {
            "SN_SEPOLIA" => Self::testnet(),
            _ => Self::mainnet(),
        }
    }

    /// Fold the four descriptor strings (short-string encoded) into the
    /// domain tag. The same tag seeds the order digest, which is what ties
    /// a signature to this domain.
    pub fn tag(&self) -> Result<FieldElement> {
        let elements = [
            FieldElement::from_short_string(&self.name)?,
            FieldElement::from_short_string(&self.version)?,
            FieldElement::from_short_string(&self.chain_id)?,
            FieldElement::from_short_string(&self.revision)?,
        ];
        Ok(hash_elements(&elements))
    }
}
