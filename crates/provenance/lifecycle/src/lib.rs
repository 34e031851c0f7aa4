//! Lifecycle reconstruction and ownership/role resolution.
//!
//! Every answer is derived at query time from the ledger's append-only
//! record log plus point reads:
//!
//! - [`LifecycleReconstructor`] rebuilds a product's ordered timeline
//! - [`HoldingsResolver`] finds the products an account holds now
//! - [`RoleResolver`] computes an account's permissions, failing closed
//! - [`ClaimDirectory`] lists submitted warranty claims
//! - [`Verifier`] looks a product up by id or serial number
//!
//! [`ProvenanceService`] bundles them over one [`provenance_gateway::LedgerClient`].

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod claims;
pub mod config;
mod error;
pub mod holdings;
pub mod normalizer;
pub mod reconstructor;
pub mod roles;
pub mod service;
pub mod verification;

pub use claims::ClaimDirectory;
pub use config::{ClientConfig, ConfigError, LoggingConfig, TimelineOptions, TimelineView};
pub use error::{ResolveError, ResolveResult};
pub use holdings::HoldingsResolver;
pub use reconstructor::{merge_claim_resolutions, order_events, LifecycleReconstructor};
pub use roles::RoleResolver;
pub use service::ProvenanceService;
pub use verification::{ProductReport, Verification, Verifier};
