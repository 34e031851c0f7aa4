//! Point-read product and claim details, warranty windows, and holdings.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::ids::{ClaimId, ProductId};

const SECONDS_PER_DAY: u64 = 86_400;

/// Fixed product fields as stored by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub serial_number: String,
    pub model: String,
    pub manufacturer: Address,
    pub manufactured_at: u64,
    pub warranty_duration: u64,
    /// Zero until the warranty is activated by the first sale.
    pub warranty_start: u64,
    pub warranty_expiration: u64,
    pub claim_limit: u32,
    pub claim_count: u32,
}

impl ProductDetails {
    pub fn warranty(&self) -> Option<WarrantyWindow> {
        (self.warranty_start > 0).then(|| WarrantyWindow {
            starts_at: self.warranty_start,
            expires_at: self.warranty_expiration,
        })
    }

    pub fn claims_remaining(&self) -> u32 {
        self.claim_limit.saturating_sub(self.claim_count)
    }
}

/// A warranty claim as stored by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantyClaim {
    pub product_id: ProductId,
    pub customer: Address,
    pub issue: String,
    pub submitted_at: u64,
    pub processed: bool,
    pub approved: bool,
    pub service_notes: String,
    pub processed_at: u64,
}

/// Active warranty interval, in seconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantyWindow {
    pub starts_at: u64,
    pub expires_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantyRemaining {
    pub expired: bool,
    /// Whole days left, rounded up. Zero once expired.
    pub days: u64,
}

impl WarrantyWindow {
    pub fn is_active(&self, now: u64) -> bool {
        now >= self.starts_at && now < self.expires_at
    }

    pub fn remaining(&self, now: u64) -> WarrantyRemaining {
        if now >= self.expires_at {
            return WarrantyRemaining {
                expired: true,
                days: 0,
            };
        }
        let left = self.expires_at - now;
        WarrantyRemaining {
            expired: false,
            days: left.div_ceil(SECONDS_PER_DAY),
        }
    }
}

/// A product confirmed to be currently held by an owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedProduct {
    pub product_id: ProductId,
    pub details: ProductDetails,
}

/// Products currently held by one address, ordered by product id.
///
/// Every member has been confirmed against the ledger's current-holder
/// lookup; the transfer log alone only nominates candidates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingsSet {
    pub owner: Address,
    pub products: Vec<OwnedProduct>,
}

impl HoldingsSet {
    pub fn empty(owner: Address) -> Self {
        Self {
            owner,
            products: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.products.iter().any(|p| p.product_id == product_id)
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.products.iter().map(|p| p.product_id).collect()
    }
}

/// Directory row for a submitted warranty claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub claim_id: ClaimId,
    pub product_id: ProductId,
    pub model: String,
    pub issue: String,
    pub submitted_at: u64,
    pub processed: bool,
    pub approved: bool,
}
