use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Code folded into the order digest.
    pub fn code(&self) -> u64 {
        match self {
            OrderSide::Buy => 1,
            OrderSide::Sell => 2,
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
    Conditional,
}

/// Time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good till time
    Gtt,
    /// Good till cancel
    Gtc,
    /// Immediate or cancel
    Ioc,
}

impl TimeInForce {
    pub fn code(&self) -> u64 {
        match self {
            TimeInForce::Gtt => 1,
            TimeInForce::Gtc => 2,
            TimeInForce::Ioc => 3,
        }
    }
}

/// Self-trade protection level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SelfTradeProtection {
    Disabled,
    Account,
    Client,
}

impl SelfTradeProtection {
    pub fn code(&self) -> u64 {
        match self {
            SelfTradeProtection::Disabled => 0,
            SelfTradeProtection::Account => 1,
            SelfTradeProtection::Client => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerDirection {
    Up,
    Down,
}

impl TriggerDirection {
    pub fn code(&self) -> u64 {
        match self {
            TriggerDirection::Up => 1,
            TriggerDirection::Down => 2,
        }
    }
}

/// Which price feed a trigger watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerPriceType {
    Last,
    Mark,
    Index,
}

impl TriggerPriceType {
    pub fn code(&self) -> u64 {
        match self {
            TriggerPriceType::Last => 1,
            TriggerPriceType::Mark => 2,
            TriggerPriceType::Index => 3,
        }
    }
}

/// How a triggered order executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionPriceType {
    Limit,
    Market,
}

impl ExecutionPriceType {
    pub fn code(&self) -> u64 {
        match self {
            ExecutionPriceType::Limit => 1,
            ExecutionPriceType::Market => 2,
        }
    }
}

/// Trigger condition for a conditional order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalTrigger {
    pub trigger_price: Decimal,
    pub trigger_price_type: TriggerPriceType,
    pub direction: TriggerDirection,
    pub execution_price_type: ExecutionPriceType,
}

/// One leg of a take-profit / stop-loss pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TpSlLeg {
    pub trigger_price: Decimal,
    pub trigger_price_type: TriggerPriceType,
    pub price: Decimal,
    pub price_type: ExecutionPriceType,
}

/// Closed set of trigger shapes an order can carry.
///
/// Each variant owns its required fields, so the digest can fold a fixed
/// tag per shape instead of inspecting loosely-typed optionals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Trigger {
    #[default]
    None,
    Conditional(ConditionalTrigger),
    #[serde(rename_all = "camelCase")]
    TpSl {
        take_profit: Option<TpSlLeg>,
        stop_loss: Option<TpSlLeg>,
    },
}

impl Trigger {
    pub fn is_none(&self) -> bool {
        matches!(self, Trigger::None)
    }

    /// Tag folded into the order digest.
    pub fn code(&self) -> u64 {
        match self {
            Trigger::None => 0,
            Trigger::Conditional(_) => 1,
            Trigger::TpSl { .. } => 2,
        }
    }
}

/// Signature attached to an order settlement, hex with 0x prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub r: String,
    pub s: String,
}

/// Settlement block: the signature, the signer's stark key, and the
/// collateral position it settles against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub signature: Signature,
    pub stark_key: String,
    pub collateral_position: String,
}

/// A fully-populated, signed perpetual order, ready for the transport
/// layer. Immutable once built: the id is the digest of the fields below,
/// and the settlement signature covers exactly that digest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerpetualOrder {
    pub id: String,
    pub market: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: OrderSide,
    pub qty: String,
    pub price: String,
    pub time_in_force: TimeInForce,
    pub expiry_epoch_millis: u64,
    pub fee: String,
    pub nonce: String,
    pub settlement: Settlement,
    pub reduce_only: bool,
    pub post_only: bool,
    pub self_trade_protection_level: SelfTradeProtection,
    #[serde(skip_serializing_if = "Trigger::is_none")]
    pub trigger: Trigger,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_id: Option<String>,
}
