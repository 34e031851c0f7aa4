//! Normalized lifecycle events and the per-product timeline.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::ids::{ClaimId, ProductId, TransactionRef};
use crate::record::RecordKind;

/// Uniform event category shown on a timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Manufacture,
    Transfer,
    WarrantyClaim,
    Service,
    WarrantyActivated,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Manufacture => "manufacture",
            EventType::Transfer => "transfer",
            EventType::WarrantyClaim => "warranty_claim",
            EventType::Service => "service",
            EventType::WarrantyActivated => "warranty_activated",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution state of a warranty claim event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Approved,
    Rejected,
    Pending,
}

impl ClaimStatus {
    pub fn from_approval(approved: bool) -> Self {
        if approved {
            ClaimStatus::Approved
        } else {
            ClaimStatus::Rejected
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timeline entry, built from exactly one ledger record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLifecycleEvent {
    pub event_type: EventType,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub description: String,
    pub transaction: TransactionRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClaimStatus>,
    /// Record kind the event was built from.
    pub kind: RecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<ClaimId>,
}

/// Ordered lifecycle of one product: ascending timestamp, ties in record-kind
/// query order, then arrival order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLifecycleTimeline {
    pub product_id: ProductId,
    pub events: Vec<NormalizedLifecycleEvent>,
}

impl ProductLifecycleTimeline {
    pub fn new(product_id: ProductId, events: Vec<NormalizedLifecycleEvent>) -> Self {
        Self { product_id, events }
    }

    pub fn empty(product_id: ProductId) -> Self {
        Self {
            product_id,
            events: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedLifecycleEvent> {
        self.events.iter()
    }

    pub fn first(&self) -> Option<&NormalizedLifecycleEvent> {
        self.events.first()
    }

    pub fn of_type(&self, event_type: EventType) -> impl Iterator<Item = &NormalizedLifecycleEvent> {
        self.events
            .iter()
            .filter(move |event| event.event_type == event_type)
    }
}

impl<'a> IntoIterator for &'a ProductLifecycleTimeline {
    type Item = &'a NormalizedLifecycleEvent;
    type IntoIter = std::slice::Iter<'a, NormalizedLifecycleEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_timeline_keeps_product_id() {
        let timeline = ProductLifecycleTimeline::empty(ProductId(7));
        assert_eq!(timeline.product_id, ProductId(7));
        assert!(timeline.is_empty());
        assert!(timeline.first().is_none());
    }
}
