//! Order Signing Demo
//!
//! Builds and signs a sample perpetual order from environment-supplied
//! credentials and prints the transport-ready JSON record.
//!
//! Usage:
//!   cargo run --bin sign_order

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use stark_perp_signer::{
    create_order, init_logging, CreateOrderParams, L2Config, MarketModel, OrderSide,
    SignerConfig,
};
use tracing::info;

fn btc_usd_market() -> MarketModel {
    MarketModel {
        name: "BTC-USD".to_string(),
        asset_name: "BTC".to_string(),
        asset_precision: 8,
        collateral_asset_name: "USD".to_string(),
        collateral_asset_precision: 6,
        active: true,
        l2_config: L2Config {
            config_type: "perpetual".to_string(),
            collateral_id: "0x1".to_string(),
            collateral_resolution: 1_000_000,
            synthetic_id: "0x2".to_string(),
            synthetic_resolution: 100_000_000,
        },
    }
}

fn main() -> Result<()> {
    init_logging();

    let config = SignerConfig::from_env().context("loading signer configuration")?;
    let account = config.account().context("building stark account")?;
    info!(vault = account.vault(), chain = %config.chain_id, "account ready");

    let mut params = CreateOrderParams::new(
        btc_usd_market(),
        config.domain(),
        Decimal::from_str("0.001")?,
        Decimal::from_str("43445.11")?,
        OrderSide::Sell,
    );
    params.fees = config.fees.clone();
    params.nonce = Some(rand_nonce());

    let order = create_order(&params, &account).context("building signed order")?;
    info!(order_id = %order.id, "order signed");
    println!("{}", serde_json::to_string_pretty(&order)?);
    Ok(())
}

/// Nonce from the subsecond clock; real callers manage their own nonces.
fn rand_nonce() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64 ^ d.as_secs())
        .unwrap_or(1)
}
