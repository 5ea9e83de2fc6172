pub mod account;
pub mod builder;
pub mod config;
pub mod domain;
pub mod error;
pub mod market;
pub mod order;
pub mod order_hash;
pub mod stark;

// Re-export commonly used types
pub use account::StarkPerpetualAccount;
pub use builder::{create_order, CreateOrderParams};
pub use config::SignerConfig;
pub use domain::StarknetDomain;
pub use error::{Result, SignerError};
pub use market::{scale_order_amounts, L2Config, MarketModel, ScaledAmounts, TradingFees};
pub use order::{
    ConditionalTrigger, ExecutionPriceType, OrderSide, OrderType, PerpetualOrder,
    SelfTradeProtection, Settlement, Signature, TimeInForce, TpSlLeg, Trigger,
    TriggerDirection, TriggerPriceType,
};
pub use order_hash::{
    compute_order_hash, order_digest, OrderHashInputs, ScaledTpSlLeg, ScaledTrigger,
};
pub use stark::{
    hash_elements, pedersen_hash, sign_message, CurvePoint, FieldElement, PrivateScalar,
};

/// Initialize logging for the library
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Just verify that main exports are accessible
        let _ = StarknetDomain::mainnet();
        let _ = TradingFees::default();
        let _ = FieldElement::zero();
    }
}
