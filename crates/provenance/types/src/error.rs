use thiserror::Error;

/// Errors raised while parsing user-supplied identifiers and addresses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid product id: {0}")]
    InvalidProductId(String),

    #[error("invalid transaction reference: {0}")]
    InvalidTransactionRef(String),

    #[error("empty lookup query")]
    EmptyQuery,
}
