use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::account::StarkPerpetualAccount;
use crate::domain::StarknetDomain;
use crate::error::{Result, SignerError};
use crate::market::{scale_order_amounts, L2Config, MarketModel, TradingFees};
use crate::order::{
    OrderSide, OrderType, PerpetualOrder, SelfTradeProtection, Settlement, Signature,
    TimeInForce, Trigger,
};
use crate::order_hash::{order_digest, OrderHashInputs, ScaledTpSlLeg, ScaledTrigger};
use crate::stark::FieldElement;

/// Expiry applied when the caller does not supply one.
const DEFAULT_ORDER_LIFETIME_HOURS: i64 = 1;

/// Everything needed to build and sign one order.
///
/// The nonce is deliberately not defaulted: replay protection must come
/// from the caller's nonce discipline, so a missing nonce is an error,
/// never a silent default.
#[derive(Debug, Clone)]
pub struct CreateOrderParams {
    pub market: MarketModel,
    pub domain: StarknetDomain,
    pub quantity: Decimal,
    pub price: Decimal,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub self_trade_protection: SelfTradeProtection,
    pub expire_time: Option<DateTime<Utc>>,
    pub nonce: Option<u64>,
    pub post_only: bool,
    pub reduce_only: bool,
    pub trigger: Trigger,
    pub fees: TradingFees,
    pub builder_fee: Option<Decimal>,
    pub builder_id: Option<u32>,
    pub cancel_id: Option<String>,
}

impl CreateOrderParams {
    pub fn new(
        market: MarketModel,
        domain: StarknetDomain,
        quantity: Decimal,
        price: Decimal,
        side: OrderSide,
    ) -> Self {
        Self {
            market,
            domain,
            quantity,
            price,
            side,
            order_type: OrderType::Limit,
            time_in_force: TimeInForce::Gtt,
            self_trade_protection: SelfTradeProtection::Account,
            expire_time: None,
            nonce: None,
            post_only: false,
            reduce_only: false,
            trigger: Trigger::None,
            fees: TradingFees::default(),
            builder_fee: None,
            builder_id: None,
            cancel_id: None,
        }
    }
}

/// Build a fully-populated, signed order.
///
/// Scales the decimal amounts into settlement quanta, folds them into the
/// order digest, signs the digest with the account's private scalar, and
/// attaches the settlement block. The digest doubles as the order id.
pub fn create_order(
    params: &CreateOrderParams,
    account: &StarkPerpetualAccount,
) -> Result<PerpetualOrder> {
    let nonce = params.nonce.ok_or(SignerError::MissingNonce)?;
    let expire_time = params
        .expire_time
        .unwrap_or_else(|| Utc::now() + Duration::hours(DEFAULT_ORDER_LIFETIME_HOURS));
    let expiry_epoch_millis = u64::try_from(expire_time.timestamp_millis()).map_err(|_| {
        SignerError::InvalidFieldEncoding(format!("expiry before epoch: {expire_time}"))
    })?;

    // Settlement always reserves the taker rate; the matching engine
    // refunds the difference for maker fills.
    let fee_rate = params.fees.taker_fee_rate;
    let amounts = scale_order_amounts(
        params.side,
        params.quantity,
        params.price,
        fee_rate,
        &params.market.l2_config,
    )?;

    let inputs = OrderHashInputs {
        vault: account.vault(),
        position_id: account.vault(),
        synthetic_id: FieldElement::from_hex(&params.market.l2_config.synthetic_id)?,
        collateral_id: FieldElement::from_hex(&params.market.l2_config.collateral_id)?,
        quantity: amounts.quantity,
        price: amounts.price,
        fee: amounts.fee,
        expiry_epoch_millis: Some(expiry_epoch_millis),
        nonce: Some(nonce),
        side: params.side,
        time_in_force: params.time_in_force,
        self_trade_protection: params.self_trade_protection,
        reduce_only: params.reduce_only,
        post_only: params.post_only,
        trigger: scale_trigger(&params.trigger, &params.market.l2_config)?,
        builder_fee: scale_builder_fee(params, &params.market.l2_config)?,
        builder_id: params.builder_id,
        cancel_id: params.cancel_id.clone(),
    };

    let public_key = match account.public_key().x() {
        Some(x) => x.clone(),
        None => FieldElement::zero(),
    };
    let digest = order_digest(&inputs, &params.domain, &public_key)?;
    let signature = account.sign_raw(&digest)?;

    tracing::debug!(
        market = %params.market.name,
        side = %params.side,
        order_id = %digest,
        "order signed"
    );

    Ok(PerpetualOrder {
        id: digest.to_hex(),
        market: params.market.name.clone(),
        order_type: params.order_type,
        side: params.side,
        qty: params.quantity.to_string(),
        price: params.price.to_string(),
        time_in_force: params.time_in_force,
        expiry_epoch_millis,
        fee: fee_rate.to_string(),
        nonce: nonce.to_string(),
        settlement: Settlement {
            signature: Signature {
                r: signature.r.to_hex(),
                s: signature.s.to_hex(),
            },
            stark_key: account.public_key_hex(),
            collateral_position: account.vault().to_string(),
        },
        reduce_only: params.reduce_only,
        post_only: params.post_only,
        self_trade_protection_level: params.self_trade_protection,
        trigger: params.trigger.clone(),
        builder_fee: params.builder_fee.map(|fee| fee.to_string()),
        builder_id: params.builder_id,
        cancel_id: params.cancel_id.clone(),
    })
}

fn scale_trigger(trigger: &Trigger, l2_config: &L2Config) -> Result<ScaledTrigger> {
    let scaled = match trigger {
        Trigger::None => ScaledTrigger::None,
        Trigger::Conditional(conditional) => ScaledTrigger::Conditional {
            trigger_price: scale_price(conditional.trigger_price, l2_config)?,
            direction: conditional.direction,
            trigger_price_type: conditional.trigger_price_type,
            execution_price_type: conditional.execution_price_type,
        },
        Trigger::TpSl {
            take_profit,
            stop_loss,
        } => {
            let leg = |leg: &crate::order::TpSlLeg| -> Result<ScaledTpSlLeg> {
                Ok(ScaledTpSlLeg {
                    trigger_price: scale_price(leg.trigger_price, l2_config)?,
                    price: scale_price(leg.price, l2_config)?,
                })
            };
            ScaledTrigger::TpSl {
                take_profit: take_profit.as_ref().map(&leg).transpose()?,
                stop_loss: stop_loss.as_ref().map(&leg).transpose()?,
            }
        }
    };
    Ok(scaled)
}

fn scale_price(price: Decimal, l2_config: &L2Config) -> Result<i128> {
    let scaled = (price * Decimal::from(l2_config.collateral_resolution)).round();
    scaled
        .to_i128()
        .ok_or_else(|| SignerError::InvalidFieldEncoding(format!("price out of range: {price}")))
}

fn scale_builder_fee(params: &CreateOrderParams, l2_config: &L2Config) -> Result<Option<i128>> {
    let Some(rate) = params.builder_fee else {
        return Ok(None);
    };
    let scaled = (params.quantity
        * params.price
        * rate
        * Decimal::from(l2_config.collateral_resolution))
    .ceil();
    let fee = scaled.to_i128().ok_or_else(|| {
        SignerError::InvalidFieldEncoding(format!("builder fee out of range: {rate}"))
    })?;
    Ok(Some(fee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    const PRIVATE_KEY: &str =
        "0x1234def56789012345678901234567890123456789012345678901234567890";
    const STARK_KEY: &str =
        "0x038635448ec22b1e99ba49f260dd3f3125f4fdf3cfe5e3be06f5f48dd5af0677";

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

    fn trading_account() -> StarkPerpetualAccount {
        StarkPerpetualAccount::new(10002, PRIVATE_KEY, STARK_KEY, "test-api-key").unwrap()
    }

    fn sell_params() -> CreateOrderParams {
        let frozen_time = Utc.with_ymd_and_hms(2024, 1, 5, 1, 8, 57).unwrap();
        let mut params = CreateOrderParams::new(
            btc_usd_market(),
            StarknetDomain::testnet(),
            Decimal::from_str("0.00100000").unwrap(),
            Decimal::from_str("43445.11680000").unwrap(),
            OrderSide::Sell,
        );
        params.expire_time = Some(frozen_time + Duration::hours(1));
        params.nonce = Some(1_473_459_052);
        params
    }

    #[test]
    fn sell_order_with_frozen_inputs() {
        let order = create_order(&sell_params(), &trading_account()).unwrap();

        assert_eq!(
            order.id,
            "0x049e4f93d511c34d95952a98cb7ad857531f5fc1bdab0c2fce6dcf343f4aa6f6"
        );
        assert_eq!(order.market, "BTC-USD");
        assert_eq!(order.qty, "0.00100000");
        assert_eq!(order.price, "43445.11680000");
        assert_eq!(order.expiry_epoch_millis, 1_704_420_537_000);
        assert_eq!(order.fee, "0.0005");
        assert_eq!(order.nonce, "1473459052");
        assert_eq!(
            order.settlement.signature.r,
            "0x01b638869dfd9c4e3e467c9dbbc22ebb14db5702563d6f58fdd5329d707846ce"
        );
        assert_eq!(
            order.settlement.signature.s,
            "0x04cf0d1ea7cba78f9b696e5e0aa93f0e69d27a7866befa37d4002136062a47e6"
        );
        assert_eq!(order.settlement.stark_key, STARK_KEY);
        assert_eq!(order.settlement.collateral_position, "10002");
    }

    #[test]
    fn sell_order_wire_shape() {
        let order = create_order(&sell_params(), &trading_account()).unwrap();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["type"], "limit");
        assert_eq!(json["side"], "sell");
        assert_eq!(json["timeInForce"], "GTT");
        assert_eq!(json["selfTradeProtectionLevel"], "ACCOUNT");
        assert_eq!(json["expiryEpochMillis"], 1_704_420_537_000u64);
        assert_eq!(json["reduceOnly"], false);
        assert_eq!(json["postOnly"], false);
        assert_eq!(json["settlement"]["collateralPosition"], "10002");
        assert_eq!(json["settlement"]["starkKey"], STARK_KEY);
        // absent optionals are omitted from the wire form
        assert!(json.get("trigger").is_none());
        assert!(json.get("builderFee").is_none());
        assert!(json.get("cancelId").is_none());
    }

    #[test]
    fn missing_nonce_is_rejected() {
        let mut params = sell_params();
        params.nonce = None;
        assert!(matches!(
            create_order(&params, &trading_account()),
            Err(SignerError::MissingNonce)
        ));
    }

    #[test]
    fn expiry_defaults_to_one_hour_ahead() {
        let mut params = sell_params();
        params.expire_time = None;
        let before = Utc::now();
        let order = create_order(&params, &trading_account()).unwrap();
        let after = Utc::now();
        let low = (before + Duration::hours(1)).timestamp_millis() as u64;
        let high = (after + Duration::hours(1)).timestamp_millis() as u64;
        assert!(order.expiry_epoch_millis >= low && order.expiry_epoch_millis <= high);
    }

    #[test]
    fn signature_verifies_against_the_account_key() {
        let account = trading_account();
        let order = create_order(&sell_params(), &account).unwrap();
        let digest = FieldElement::from_hex(&order.id).unwrap();
        let r = FieldElement::from_hex(&order.settlement.signature.r).unwrap();
        let s = FieldElement::from_hex(&order.settlement.signature.s).unwrap();
        assert!(crate::stark::verify(&digest, &r, &s, account.public_key()));
    }

    #[test]
    fn side_changes_the_id() {
        let account = trading_account();
        let sell = create_order(&sell_params(), &account).unwrap();
        let mut buy_params = sell_params();
        buy_params.side = OrderSide::Buy;
        let buy = create_order(&buy_params, &account).unwrap();
        assert_ne!(sell.id, buy.id);
    }

    #[test]
    fn conditional_order_round_trips_its_trigger() {
        use crate::order::{
            ConditionalTrigger, ExecutionPriceType, TriggerDirection, TriggerPriceType,
        };
        let mut params = sell_params();
        params.order_type = OrderType::Conditional;
        params.trigger = Trigger::Conditional(ConditionalTrigger {
            trigger_price: Decimal::from_str("43500").unwrap(),
            trigger_price_type: TriggerPriceType::Last,
            direction: TriggerDirection::Up,
            execution_price_type: ExecutionPriceType::Limit,
        });
        let plain = create_order(&sell_params(), &trading_account()).unwrap();
        let conditional = create_order(&params, &trading_account()).unwrap();
        assert_ne!(plain.id, conditional.id);
        let json = serde_json::to_value(&conditional).unwrap();
        assert_eq!(json["trigger"]["kind"], "conditional");
    }
}
