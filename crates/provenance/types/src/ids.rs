//! Ledger-assigned identifiers.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Product token identifier, assigned by the ledger at registration.
///
/// Zero is the ledger's "absent" sentinel and never names a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl ProductId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_sentinel(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ProductId)
            .map_err(|_| ParseError::InvalidProductId(s.to_string()))
    }
}

/// Warranty claim identifier, assigned by the ledger at submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(pub u64);

impl ClaimId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the transaction that emitted a record.
///
/// Several records emitted by one transaction share the same reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRef(pub B256);

impl TransactionRef {
    pub fn new(hash: B256) -> Self {
        Self(hash)
    }

    pub fn as_b256(&self) -> &B256 {
        &self.0
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&alloy_primitives::hex::encode_prefixed(self.0.as_slice()))
    }
}

impl FromStr for TransactionRef {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<B256>()
            .map(TransactionRef)
            .map_err(|_| ParseError::InvalidTransactionRef(s.to_string()))
    }
}

/// A product lookup as typed by a user: either a token id or a serial number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProductQuery {
    Id(ProductId),
    Serial(String),
}

impl ProductQuery {
    /// Purely numeric input is a product id; anything else is a serial number.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyQuery);
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return trimmed.parse::<ProductId>().map(ProductQuery::Id);
        }
        Ok(ProductQuery::Serial(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_query_is_product_id() {
        assert_eq!(
            ProductQuery::parse(" 42 ").unwrap(),
            ProductQuery::Id(ProductId(42))
        );
    }

    #[test]
    fn non_numeric_query_is_serial() {
        assert_eq!(
            ProductQuery::parse("SN-0042").unwrap(),
            ProductQuery::Serial("SN-0042".into())
        );
    }

    #[test]
    fn empty_query_is_rejected() {
        assert_eq!(ProductQuery::parse("   "), Err(ParseError::EmptyQuery));
    }

    #[test]
    fn oversized_numeric_query_is_rejected() {
        assert!(matches!(
            ProductQuery::parse("99999999999999999999999"),
            Err(ParseError::InvalidProductId(_))
        ));
    }

    #[test]
    fn transaction_ref_round_trips_through_display() {
        let tx = TransactionRef(B256::repeat_byte(0xab));
        let parsed: TransactionRef = tx.to_string().parse().unwrap();
        assert_eq!(parsed, tx);
    }
}
