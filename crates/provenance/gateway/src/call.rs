//! Request and response shapes exchanged with the ledger.
//!
//! Point reads and stream queries answer in the ledger's positional tuple
//! shape (`Vec<serde_json::Value>`); see [`crate::codec`] for the decoding
//! rules.

use alloy_primitives::{Address, B256};
use provenance_types::{ClaimId, ProductId, RecordKind, Role, TransactionRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec;
use crate::error::FailureKind;

/// A single-value lookup against current ledger state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum PointCall {
    OwnerOf { product_id: ProductId },
    ProductDetails { product_id: ProductId },
    WarrantyClaim { claim_id: ClaimId },
    TokenIdForSerialHash { serial_hash: B256 },
    RoleId { role: Role },
    HasRole { role_id: B256, account: Address },
    IsWarrantyActive { product_id: ProductId },
}

impl PointCall {
    /// Contract function the call maps to.
    pub fn selector(&self) -> &'static str {
        match self {
            PointCall::OwnerOf { .. } => "ownerOf",
            PointCall::ProductDetails { .. } => "getProductDetails",
            PointCall::WarrantyClaim { .. } => "getWarrantyClaim",
            PointCall::TokenIdForSerialHash { .. } => "tokenIdForSerialHash",
            PointCall::RoleId { role } => role.constant_name(),
            PointCall::HasRole { .. } => "hasRole",
            PointCall::IsWarrantyActive { .. } => "isWarrantyActive",
        }
    }
}

/// Equality constraint on one indexed record argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArgFilter {
    pub position: usize,
    pub value: Value,
}

/// Scan of one record kind, optionally filtered on indexed arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamQuery {
    pub kind: RecordKind,
    pub arg_filters: Vec<ArgFilter>,
    pub from_block: u64,
}

impl StreamQuery {
    /// Every record of `kind` from genesis.
    pub fn all(kind: RecordKind) -> Self {
        Self {
            kind,
            arg_filters: Vec::new(),
            from_block: 0,
        }
    }

    /// Records of `kind` whose indexed product argument equals `product_id`.
    pub fn for_product(kind: RecordKind, product_id: ProductId) -> Self {
        Self::all(kind).with_filter(kind.product_position(), codec::encode_uint(product_id.0))
    }

    /// Transfer records whose recipient is `owner`.
    pub fn transfers_to(owner: Address) -> Self {
        Self::all(RecordKind::Transferred).with_filter(1, codec::encode_address(&owner))
    }

    pub fn with_filter(mut self, position: usize, value: Value) -> Self {
        debug_assert!(
            self.kind.indexed_positions().contains(&position),
            "position {position} is not indexed for {}",
            self.kind
        );
        self.arg_filters.push(ArgFilter { position, value });
        self
    }

    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = block;
        self
    }

    /// Whether `log` satisfies the kind, block range, and argument filters.
    pub fn matches(&self, log: &RawLog) -> bool {
        log.event == self.kind.event_name()
            && log.block_number >= self.from_block
            && self.arg_filters.iter().all(|filter| {
                log.args
                    .get(filter.position)
                    .is_some_and(|arg| codec::values_equivalent(arg, &filter.value))
            })
    }
}

/// One emitted record in wire shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawLog {
    pub event: String,
    pub block_number: u64,
    pub log_index: u64,
    pub transaction: TransactionRef,
    pub args: Vec<Value>,
}

/// A state-changing contract call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum WriteCall {
    RegisterProduct {
        initial_owner: Address,
        serial_number: String,
        model: String,
        warranty_duration_secs: u64,
        claim_limit: u32,
    },
    Transfer {
        from: Address,
        to: Address,
        product_id: ProductId,
    },
    SubmitClaim {
        product_id: ProductId,
        issue: String,
    },
    ProcessClaim {
        claim_id: ClaimId,
        approved: bool,
    },
    RecordService {
        claim_id: ClaimId,
        notes: String,
    },
    GrantRole {
        role: Role,
        account: Address,
    },
}

impl WriteCall {
    pub fn selector(&self) -> &'static str {
        match self {
            WriteCall::RegisterProduct { .. } => "registerProduct",
            WriteCall::Transfer { .. } => "safeTransferFrom",
            WriteCall::SubmitClaim { .. } => "submitWarrantyClaim",
            WriteCall::ProcessClaim { .. } => "processWarrantyClaim",
            WriteCall::RecordService { .. } => "recordService",
            WriteCall::GrantRole { .. } => "grantRole",
        }
    }
}

/// Inclusion receipt for a submitted write call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction: TransactionRef,
    pub block_number: u64,
    pub success: bool,
}

/// Success/failure contract of a write call. Never an error value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub transaction: Option<TransactionRef>,
    pub success: bool,
    pub block_number: Option<u64>,
    pub error: Option<String>,
    pub failure: Option<FailureKind>,
}

impl TransactionOutcome {
    pub fn from_receipt(receipt: TransactionReceipt) -> Self {
        let failure = (!receipt.success).then(|| FailureKind::Reverted(None));
        Self {
            transaction: Some(receipt.transaction),
            success: receipt.success,
            block_number: Some(receipt.block_number),
            error: failure.as_ref().map(|_| "transaction reverted".to_string()),
            failure,
        }
    }

    pub fn failed(error: &crate::error::GatewayError) -> Self {
        Self {
            transaction: None,
            success: false,
            block_number: None,
            error: Some(error.to_string()),
            failure: Some(FailureKind::from_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transfer_log(to: &str, product: u64) -> RawLog {
        RawLog {
            event: "Transfer".into(),
            block_number: 5,
            log_index: 0,
            transaction: TransactionRef(B256::repeat_byte(1)),
            args: vec![
                json!("0x0000000000000000000000000000000000000000"),
                json!(to),
                json!(product),
            ],
        }
    }

    #[test]
    fn product_filter_uses_kind_position() {
        let query = StreamQuery::for_product(RecordKind::Transferred, ProductId(7));
        assert_eq!(query.arg_filters[0].position, 2);
        assert!(query.matches(&transfer_log("0x1111111111111111111111111111111111111111", 7)));
        assert!(!query.matches(&transfer_log("0x1111111111111111111111111111111111111111", 8)));
    }

    #[test]
    fn recipient_filter_ignores_letter_case() {
        let owner: Address = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd".parse().unwrap();
        let query = StreamQuery::transfers_to(owner);
        assert!(query.matches(&transfer_log("0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD", 1)));
    }

    #[test]
    fn from_block_excludes_earlier_records() {
        let query = StreamQuery::all(RecordKind::Transferred).from_block(6);
        assert!(!query.matches(&transfer_log("0x1111111111111111111111111111111111111111", 1)));
    }

    #[test]
    fn other_event_names_never_match() {
        let mut log = transfer_log("0x1111111111111111111111111111111111111111", 1);
        log.event = "Approval".into();
        assert!(!StreamQuery::all(RecordKind::Transferred).matches(&log));
    }
}
