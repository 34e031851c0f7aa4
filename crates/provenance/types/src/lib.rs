//! Provenance domain types.
//!
//! This crate defines the values shared by the ledger boundary and the
//! reconstruction core:
//! - identifiers (`ProductId`, `ClaimId`, `TransactionRef`) and address helpers
//! - decoded ledger records for the six emitted record kinds
//! - normalized lifecycle events and the ordered product timeline
//! - product/claim details, warranty window arithmetic, and holdings
//! - role identifiers and the resolved `RoleSet`
//!
//! Every value here is a query-time result. Nothing is persisted.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod address;
mod error;
pub mod ids;
pub mod lifecycle;
pub mod product;
pub mod record;
pub mod roles;

pub use address::{is_burn, parse_address, shorten_address, BURN_ADDRESS};
pub use alloy_primitives::{Address, B256};
pub use error::ParseError;
pub use ids::{ClaimId, ProductId, ProductQuery, TransactionRef};
pub use lifecycle::{ClaimStatus, EventType, NormalizedLifecycleEvent, ProductLifecycleTimeline};
pub use product::{
    ClaimSummary, HoldingsSet, OwnedProduct, ProductDetails, WarrantyClaim, WarrantyRemaining,
    WarrantyWindow,
};
pub use record::{
    ClaimProcessed, ClaimSubmitted, RawEventRecord, RecordKind, RecordPayload, Registered,
    ServiceRecorded, Transferred, WarrantyActivated,
};
pub use roles::{Role, RoleSet};
