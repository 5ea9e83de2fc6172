use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("invalid hex encoding: {0}")]
    InvalidEncoding(String),

    #[error("value cannot be encoded into the field: {0}")]
    InvalidFieldEncoding(String),

    #[error("division by zero in field arithmetic")]
    DivisionByZero,

    #[error("order nonce is required and was not provided")]
    MissingNonce,

    #[error("order expiry is required and was not provided")]
    MissingExpiry,

    #[error("signing nonce attempts exhausted; the nonce source is broken")]
    SigningExhausted,

    #[error("public key does not match the private scalar")]
    KeyMismatch,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SignerError>;
