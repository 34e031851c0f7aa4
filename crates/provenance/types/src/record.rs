//! Decoded ledger records.
//!
//! The ledger emits six record kinds relevant to a product's life. The
//! gateway decodes each positional wire tuple into one of the payload structs
//! below; nothing past the gateway sees positional fields.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::ids::{ClaimId, ProductId, TransactionRef};

/// The six record kinds, in lifecycle query order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Registered,
    WarrantyActivated,
    Transferred,
    ClaimSubmitted,
    ClaimProcessed,
    ServiceRecorded,
}

impl RecordKind {
    /// All kinds in the order the reconstructor queries them. Ties between
    /// events with equal timestamps resolve in this order.
    pub const ALL: [RecordKind; 6] = [
        RecordKind::Registered,
        RecordKind::WarrantyActivated,
        RecordKind::Transferred,
        RecordKind::ClaimSubmitted,
        RecordKind::ClaimProcessed,
        RecordKind::ServiceRecorded,
    ];

    pub fn query_rank(self) -> usize {
        match self {
            RecordKind::Registered => 0,
            RecordKind::WarrantyActivated => 1,
            RecordKind::Transferred => 2,
            RecordKind::ClaimSubmitted => 3,
            RecordKind::ClaimProcessed => 4,
            RecordKind::ServiceRecorded => 5,
        }
    }

    /// Event name as emitted by the contract.
    pub fn event_name(self) -> &'static str {
        match self {
            RecordKind::Registered => "ProductRegistered",
            RecordKind::WarrantyActivated => "WarrantyActivated",
            RecordKind::Transferred => "Transfer",
            RecordKind::ClaimSubmitted => "WarrantyClaimSubmitted",
            RecordKind::ClaimProcessed => "WarrantyClaimProcessed",
            RecordKind::ServiceRecorded => "ServiceRecorded",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.event_name() == name)
    }

    /// Number of positional arguments on the wire.
    pub fn arity(self) -> usize {
        match self {
            RecordKind::Registered => 8,
            RecordKind::WarrantyActivated => 4,
            RecordKind::Transferred => 3,
            RecordKind::ClaimSubmitted
            | RecordKind::ClaimProcessed
            | RecordKind::ServiceRecorded => 5,
        }
    }

    /// Positions of the indexed (filterable) arguments.
    pub fn indexed_positions(self) -> &'static [usize] {
        match self {
            RecordKind::Registered => &[0, 3, 4],
            RecordKind::WarrantyActivated => &[0, 1],
            _ => &[0, 1, 2],
        }
    }

    /// Position of the indexed product id argument.
    pub fn product_position(self) -> usize {
        match self {
            RecordKind::Registered | RecordKind::WarrantyActivated | RecordKind::ServiceRecorded => 0,
            RecordKind::ClaimSubmitted | RecordKind::ClaimProcessed => 1,
            RecordKind::Transferred => 2,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registered {
    pub product_id: ProductId,
    pub serial_number: String,
    pub model: String,
    pub manufacturer: Address,
    pub initial_owner: Address,
    pub registered_at: u64,
    pub warranty_duration: u64,
    pub claim_limit: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantyActivated {
    pub product_id: ProductId,
    pub customer: Address,
    pub starts_at: u64,
    pub expires_at: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transferred {
    pub from: Address,
    pub to: Address,
    pub product_id: ProductId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSubmitted {
    pub claim_id: ClaimId,
    pub product_id: ProductId,
    pub customer: Address,
    pub issue: String,
    pub submitted_at: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimProcessed {
    pub claim_id: ClaimId,
    pub product_id: ProductId,
    pub service_center: Address,
    pub approved: bool,
    pub processed_at: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecorded {
    pub product_id: ProductId,
    pub claim_id: ClaimId,
    pub service_center: Address,
    pub notes: String,
    pub serviced_at: u64,
}

/// Kind-specific record fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordPayload {
    Registered(Registered),
    WarrantyActivated(WarrantyActivated),
    Transferred(Transferred),
    ClaimSubmitted(ClaimSubmitted),
    ClaimProcessed(ClaimProcessed),
    ServiceRecorded(ServiceRecorded),
}

impl RecordPayload {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordPayload::Registered(_) => RecordKind::Registered,
            RecordPayload::WarrantyActivated(_) => RecordKind::WarrantyActivated,
            RecordPayload::Transferred(_) => RecordKind::Transferred,
            RecordPayload::ClaimSubmitted(_) => RecordKind::ClaimSubmitted,
            RecordPayload::ClaimProcessed(_) => RecordKind::ClaimProcessed,
            RecordPayload::ServiceRecorded(_) => RecordKind::ServiceRecorded,
        }
    }

    pub fn product_id(&self) -> ProductId {
        match self {
            RecordPayload::Registered(r) => r.product_id,
            RecordPayload::WarrantyActivated(r) => r.product_id,
            RecordPayload::Transferred(r) => r.product_id,
            RecordPayload::ClaimSubmitted(r) => r.product_id,
            RecordPayload::ClaimProcessed(r) => r.product_id,
            RecordPayload::ServiceRecorded(r) => r.product_id,
        }
    }
}

/// One decoded entry from the ledger's append-only emission log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEventRecord {
    pub block_number: u64,
    pub log_index: u64,
    pub transaction: TransactionRef,
    /// Block time when the gateway already knows it; resolved lazily otherwise.
    pub block_timestamp: Option<u64>,
    pub payload: RecordPayload,
}

impl RawEventRecord {
    pub fn kind(&self) -> RecordKind {
        self.payload.kind()
    }

    pub fn product_id(&self) -> ProductId {
        self.payload.product_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_round_trip() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_event_name(kind.event_name()), Some(kind));
        }
        assert_eq!(RecordKind::from_event_name("Approval"), None);
    }

    #[test]
    fn query_rank_follows_declaration_order() {
        let ranks: Vec<usize> = RecordKind::ALL.iter().map(|k| k.query_rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn product_position_is_indexed_for_every_kind() {
        for kind in RecordKind::ALL {
            assert!(kind.indexed_positions().contains(&kind.product_position()));
            assert!(kind.product_position() < kind.arity());
        }
    }
}
