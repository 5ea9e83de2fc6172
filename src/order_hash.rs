use crate::domain::StarknetDomain;
use crate::error::{Result, SignerError};
use crate::order::{
    ExecutionPriceType, OrderSide, SelfTradeProtection, TimeInForce, TriggerDirection,
    TriggerPriceType,
};
use crate::stark::{hash_elements, FieldElement};

/// Trigger shape reduced to settlement quanta, ready for digest folding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScaledTrigger {
    #[default]
    None,
    Conditional {
        trigger_price: i128,
        direction: TriggerDirection,
        trigger_price_type: TriggerPriceType,
        execution_price_type: ExecutionPriceType,
    },
    TpSl {
        take_profit: Option<ScaledTpSlLeg>,
        stop_loss: Option<ScaledTpSlLeg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledTpSlLeg {
    pub trigger_price: i128,
    pub price: i128,
}

impl ScaledTrigger {
    /// Fixed-arity fold: a variant tag plus six value slots. Slots that a
    /// variant does not use hold zero, so every shape occupies the same
    /// positions in the digest.
    fn fold(&self) -> [FieldElement; 7] {
        let zero = FieldElement::zero;
        match self {
            ScaledTrigger::None => [
                zero(),
                zero(),
                zero(),
                zero(),
                zero(),
                zero(),
                zero(),
            ],
            ScaledTrigger::Conditional {
                trigger_price,
                direction,
                trigger_price_type,
                execution_price_type,
            } => {
                let aux = (direction.code() << 8)
                    | (trigger_price_type.code() << 4)
                    | execution_price_type.code();
                [
                    FieldElement::from_u64(1),
                    FieldElement::from_i128(*trigger_price),
                    FieldElement::from_u64(aux),
                    zero(),
                    zero(),
                    zero(),
                    zero(),
                ]
            }
            ScaledTrigger::TpSl {
                take_profit,
                stop_loss,
            } => {
                let leg = |leg: &Option<ScaledTpSlLeg>| -> (FieldElement, FieldElement) {
                    match leg {
                        Some(leg) => (
                            FieldElement::from_i128(leg.trigger_price),
                            FieldElement::from_i128(leg.price),
                        ),
                        None => (zero(), zero()),
                    }
                };
                let (tp_trigger, tp_price) = leg(take_profit);
                let (sl_trigger, sl_price) = leg(stop_loss);
                [
                    FieldElement::from_u64(2),
                    zero(),
                    zero(),
                    tp_trigger,
                    tp_price,
                    sl_trigger,
                    sl_price,
                ]
            }
        }
    }
}

/// Everything the order digest covers.
///
/// Quantities are settlement quanta: `quantity` and `price` carry the
/// side-dependent signs produced by `scale_order_amounts`. The settlement
/// signature itself is *not* part of the digest; it is computed over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHashInputs {
    pub vault: u64,
    pub position_id: u64,
    pub synthetic_id: FieldElement,
    pub collateral_id: FieldElement,
    pub quantity: i128,
    pub price: i128,
    pub fee: i128,
    pub expiry_epoch_millis: Option<u64>,
    pub nonce: Option<u64>,
    pub side: OrderSide,
    pub time_in_force: TimeInForce,
    pub self_trade_protection: SelfTradeProtection,
    pub reduce_only: bool,
    pub post_only: bool,
    pub trigger: ScaledTrigger,
    pub builder_fee: Option<i128>,
    pub builder_id: Option<u32>,
    pub cancel_id: Option<String>,
}

impl OrderHashInputs {
    /// Minimal inputs; optional slots default to their absent sentinels.
    pub fn new(
        vault: u64,
        position_id: u64,
        synthetic_id: FieldElement,
        collateral_id: FieldElement,
        quantity: i128,
        price: i128,
        fee: i128,
        expiry_epoch_millis: u64,
        nonce: u64,
        side: OrderSide,
    ) -> Self {
        Self {
            vault,
            position_id,
            synthetic_id,
            collateral_id,
            quantity,
            price,
            fee,
            expiry_epoch_millis: Some(expiry_epoch_millis),
            nonce: Some(nonce),
            side,
            time_in_force: TimeInForce::Gtt,
            self_trade_protection: SelfTradeProtection::Account,
            reduce_only: false,
            post_only: false,
            trigger: ScaledTrigger::None,
            builder_fee: None,
            builder_id: None,
            cancel_id: None,
        }
    }
}

/// Compute the order digest.
///
/// Folds the domain tag, every order attribute (absent optionals as fixed
/// zero sentinels, never omissions), and the signer's public-key
/// x-coordinate through the Pedersen chain. The result is both the
/// order's canonical id and the message that gets signed.
pub fn order_digest(
    inputs: &OrderHashInputs,
    domain: &StarknetDomain,
    public_key: &FieldElement,
) -> Result<FieldElement> {
    let nonce = inputs.nonce.ok_or(SignerError::MissingNonce)?;
    let expiry = inputs
        .expiry_epoch_millis
        .ok_or(SignerError::MissingExpiry)?;
    let flags = u64::from(inputs.reduce_only) | (u64::from(inputs.post_only) << 1);
    let cancel_id = match &inputs.cancel_id {
        Some(id) => FieldElement::from_short_string(id)?,
        None => FieldElement::zero(),
    };

    let mut elements = Vec::with_capacity(25);
    elements.push(domain.tag()?);
    elements.push(FieldElement::from_u64(inputs.vault));
    elements.push(FieldElement::from_u64(inputs.position_id));
    elements.push(inputs.synthetic_id.clone());
    elements.push(FieldElement::from_i128(inputs.quantity));
    elements.push(inputs.collateral_id.clone());
    elements.push(FieldElement::from_i128(inputs.price));
    elements.push(FieldElement::from_i128(inputs.fee));
    elements.push(FieldElement::from_u64(expiry));
    elements.push(FieldElement::from_u64(nonce));
    elements.push(FieldElement::from_u64(inputs.side.code()));
    elements.push(FieldElement::from_u64(inputs.time_in_force.code()));
    elements.push(FieldElement::from_u64(inputs.self_trade_protection.code()));
    elements.push(FieldElement::from_u64(flags));
    elements.extend(inputs.trigger.fold());
    elements.push(FieldElement::from_i128(inputs.builder_fee.unwrap_or(0)));
    elements.push(FieldElement::from_u64(u64::from(
        inputs.builder_id.unwrap_or(0),
    )));
    elements.push(cancel_id);
    elements.push(public_key.clone());

    Ok(hash_elements(&elements))
}

/// Boundary form: hex public key in, `0x`-prefixed 64-digit digest out.
/// The returned string is the order's canonical id.
pub fn compute_order_hash(
    inputs: &OrderHashInputs,
    domain: &StarknetDomain,
    public_key_hex: &str,
) -> Result<String> {
    let public_key = FieldElement::from_hex(public_key_hex)?;
    Ok(order_digest(inputs, domain, &public_key)?.to_hex())
}
