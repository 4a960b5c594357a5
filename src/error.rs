use thiserror::Error;

use crate::validation::ValidationMessage;

/// Errors produced while turning user-typed decimal strings into base units
/// and back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Nothing to parse
    #[error("amount is empty")]
    Empty,

    /// Anything other than digits and a single decimal point
    #[error("invalid character in amount: {0}")]
    InvalidCharacter(String),

    /// Fractional part longer than the token supports
    #[error("amount has {found} decimals but the token supports {allowed}")]
    TooManyDecimals { found: usize, allowed: u8 },

    /// Value does not fit in 256 bits
    #[error("amount overflows 256 bits")]
    Overflow,

    /// Zero amounts cannot be deposited
    #[error("amount must be greater than zero")]
    NonPositive,

    /// Rate computed against an empty reserve
    #[error("division by zero")]
    DivisionByZero,

    /// Display precision larger than the base precision
    #[error("cannot display {display} decimals of a {base}-decimal amount")]
    DisplayPrecision { base: u8, display: u8 },
}

/// SDK Error type
#[derive(Error, Debug)]
pub enum Error {
    /// Full node answered with an error payload
    #[error("RPC error: {0}")]
    Rpc(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Contract interaction error
    #[error("Contract error: {0}")]
    Contract(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Amount parsing or arithmetic error
    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),

    /// Malformed TRON address
    #[error("Address error: {0}")]
    Address(String),

    /// The form is not in a submittable state
    #[error("Validation error: {0}")]
    Validation(ValidationMessage),

    /// Signer or account error
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Transaction build or broadcast error
    #[error("Transaction error: {0}")]
    Tx(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Controller channel closed
    #[error("Channel error: {0}")]
    Channel(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}
