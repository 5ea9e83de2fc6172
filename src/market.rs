use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SignerError};
use crate::order::OrderSide;

/// Settlement-layer configuration of a market: asset ids and the
/// resolutions used to scale decimal amounts into integer quanta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Config {
    #[serde(rename = "type")]
    pub config_type: String,
    pub collateral_id: String,
    pub collateral_resolution: u64,
    pub synthetic_id: String,
    pub synthetic_resolution: u64,
}

/// A tradable market as reported by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketModel {
    pub name: String,
    pub asset_name: String,
    pub asset_precision: u32,
    pub collateral_asset_name: String,
    pub collateral_asset_precision: u32,
    pub active: bool,
    pub l2_config: L2Config,
}

/// Fee rates applied when building an order. An explicit value passed to
/// the builder, never ambient package state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingFees {
    pub maker_fee_rate: Decimal,
    pub taker_fee_rate: Decimal,
}

impl Default for TradingFees {
    fn default() -> Self {
        Self {
            maker_fee_rate: Decimal::new(2, 4),  // 0.0002
            taker_fee_rate: Decimal::new(5, 4),  // 0.0005
        }
    }
}

/// Signed integer amounts bound into the order digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledAmounts {
    /// Synthetic quantum amount: positive when buying, negative when selling.
    pub quantity: i128,
    /// Collateral quantum amount: opposite sign of `quantity`.
    pub price: i128,
    /// Fee quantum amount, always non-negative.
    pub fee: i128,
}

/// Scale a decimal quantity/price pair into signed settlement quanta.
///
/// Rounding follows the settlement convention: buys round both legs up,
/// sells round both legs down, fees always round up. Buying synthetic
/// makes the synthetic leg positive and the collateral leg negative;
/// selling flips both signs.
pub fn scale_order_amounts(
    side: OrderSide,
    quantity: Decimal,
    price: Decimal,
    fee_rate: Decimal,
    l2_config: &L2Config,
) -> Result<ScaledAmounts> {
    if quantity <= Decimal::ZERO || price <= Decimal::ZERO {
        return Err(SignerError::InvalidFieldEncoding(format!(
            "quantity and price must be positive, got {quantity} @ {price}"
        )));
    }
    if fee_rate < Decimal::ZERO {
        return Err(SignerError::InvalidFieldEncoding(format!(
            "fee rate must be non-negative, got {fee_rate}"
        )));
    }
    let synthetic_resolution = Decimal::from(l2_config.synthetic_resolution);
    let collateral_resolution = Decimal::from(l2_config.collateral_resolution);

    let collateral_value = quantity * price;
    let base_scaled = quantity * synthetic_resolution;
    let quote_scaled = collateral_value * collateral_resolution;
    let fee_scaled = collateral_value * fee_rate * collateral_resolution;

    let (base_abs, quote_abs) = match side {
        OrderSide::Buy => (base_scaled.ceil(), quote_scaled.ceil()),
        OrderSide::Sell => (base_scaled.floor(), quote_scaled.floor()),
    };
    let fee = decimal_to_i128(fee_scaled.ceil())?;
    let base = decimal_to_i128(base_abs)?;
    let quote = decimal_to_i128(quote_abs)?;

    let (quantity, price) = match side {
        OrderSide::Buy => (base, -quote),
        OrderSide::Sell => (-base, quote),
    };
    Ok(ScaledAmounts { quantity, price, fee })
}

fn decimal_to_i128(value: Decimal) -> Result<i128> {
    value
        .to_i128()
        .ok_or_else(|| SignerError::InvalidFieldEncoding(format!("amount out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn btc_usd() -> MarketModel {
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

    #[test]
    fn sell_amounts_round_down_and_flip_signs() {
        let amounts = scale_order_amounts(
            OrderSide::Sell,
            Decimal::from_str("0.00100000").unwrap(),
            Decimal::from_str("43445.11680000").unwrap(),
            Decimal::from_str("0.0005").unwrap(),
            &btc_usd().l2_config,
        )
        .unwrap();
        assert_eq!(amounts.quantity, -100_000);
        assert_eq!(amounts.price, 43_445_116);
        assert_eq!(amounts.fee, 21_723);
    }

    #[test]
    fn buy_amounts_round_up() {
        let amounts = scale_order_amounts(
            OrderSide::Buy,
            Decimal::from_str("0.00100000").unwrap(),
            Decimal::from_str("43445.11680000").unwrap(),
            Decimal::from_str("0.0005").unwrap(),
            &btc_usd().l2_config,
        )
        .unwrap();
        assert_eq!(amounts.quantity, 100_000);
        assert_eq!(amounts.price, -43_445_117);
        assert_eq!(amounts.fee, 21_723);
    }

    #[test]
    fn fee_always_rounds_up() {
        let amounts = scale_order_amounts(
            OrderSide::Sell,
            Decimal::from_str("1").unwrap(),
            Decimal::from_str("100.0000001").unwrap(),
            Decimal::from_str("0.0002").unwrap(),
            &btc_usd().l2_config,
        )
        .unwrap();
        // 100.0000001 * 0.0002 * 1e6 = 20000.00002 -> 20001
        assert_eq!(amounts.fee, 20_001);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let cfg = btc_usd().l2_config;
        for (qty, price) in [("0", "100"), ("1", "0"), ("-1", "100")] {
            let result = scale_order_amounts(
                OrderSide::Buy,
                Decimal::from_str(qty).unwrap(),
                Decimal::from_str(price).unwrap(),
                Decimal::ZERO,
                &cfg,
            );
            assert!(matches!(result, Err(SignerError::InvalidFieldEncoding(_))));
        }
    }

    #[test]
    fn default_fees_match_exchange_defaults() {
        let fees = TradingFees::default();
        assert_eq!(fees.maker_fee_rate.to_string(), "0.0002");
        assert_eq!(fees.taker_fee_rate.to_string(), "0.0005");
    }
}
