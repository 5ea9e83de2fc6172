use crate::account::StarkPerpetualAccount;
use crate::domain::StarknetDomain;
use crate::error::{Result, SignerError};
use crate::market::TradingFees;

/// Operator-supplied signing configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct SignerConfig {
    pub vault: u64,
    pub private_key: String,
    pub public_key: String,
    pub api_key: String,
    pub chain_id: String,
    pub fees: TradingFees,
}

impl SignerConfig {
    /// Load from the environment (a `.env` file is honored if present).
    ///
    /// Required: `STARK_VAULT_ID`, `STARK_PRIVATE_KEY`, `STARK_PUBLIC_KEY`,
    /// `STARK_API_KEY`. Optional: `STARK_CHAIN_ID` (defaults to mainnet).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let vault = required("STARK_VAULT_ID")?
            .parse::<u64>()
            .map_err(|e| SignerError::Config(format!("STARK_VAULT_ID: {e}")))?;
        let private_key = required("STARK_PRIVATE_KEY")?;
        let public_key = required("STARK_PUBLIC_KEY")?;
        let api_key = required("STARK_API_KEY")?;
        let chain_id =
            std::env::var("STARK_CHAIN_ID").unwrap_or_else(|_| "SN_MAIN".to_string());

        Ok(Self {
            vault,
            private_key,
            public_key,
            api_key,
            chain_id,
            fees: TradingFees::default(),
        })
    }

    pub fn domain(&self) -> StarknetDomain {
        StarknetDomain::from_chain_id(&self.chain_id)
    }

    /// Build the signing account, validating both keys.
    pub fn account(&self) -> Result<StarkPerpetualAccount> {
        StarkPerpetualAccount::new(
            self.vault,
            &self.private_key,
            &self.public_key,
            self.api_key.clone(),
        )
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| SignerError::Config(format!("{name} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const PRIVATE_KEY: &str =
        "0x1234def56789012345678901234567890123456789012345678901234567890";
    const STARK_KEY: &str =
        "0x038635448ec22b1e99ba49f260dd3f3125f4fdf3cfe5e3be06f5f48dd5af0677";

    fn set_full_env() {
        std::env::set_var("STARK_VAULT_ID", "10002");
        std::env::set_var("STARK_PRIVATE_KEY", PRIVATE_KEY);
        std::env::set_var("STARK_PUBLIC_KEY", STARK_KEY);
        std::env::set_var("STARK_API_KEY", "test-api-key");
        std::env::set_var("STARK_CHAIN_ID", "SN_SEPOLIA");
    }

    fn clear_env() {
        for name in [
            "STARK_VAULT_ID",
            "STARK_PRIVATE_KEY",
            "STARK_PUBLIC_KEY",
            "STARK_API_KEY",
            "STARK_CHAIN_ID",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn loads_a_complete_environment() {
        set_full_env();
        let config = SignerConfig::from_env().unwrap();
        assert_eq!(config.vault, 10002);
        assert_eq!(config.domain(), StarknetDomain::testnet());
        let account = config.account().unwrap();
        assert_eq!(account.public_key_hex(), STARK_KEY);
        clear_env();
    }

    #[test]
    #[serial]
    fn chain_id_defaults_to_mainnet() {
        set_full_env();
        std::env::remove_var("STARK_CHAIN_ID");
        let config = SignerConfig::from_env().unwrap();
        assert_eq!(config.domain(), StarknetDomain::mainnet());
        clear_env();
    }

    #[test]
    #[serial]
    fn missing_variables_are_reported() {
        clear_env();
        std::env::set_var("STARK_VAULT_ID", "1");
        let result = SignerConfig::from_env();
        assert!(matches!(result, Err(SignerError::Config(_))));
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_vault_is_reported() {
        set_full_env();
        std::env::set_var("STARK_VAULT_ID", "not-a-number");
        assert!(matches!(
            SignerConfig::from_env(),
            Err(SignerError::Config(_))
        ));
        clear_env();
    }
}
