//! Ledger gateway boundary.
//!
//! The ledger is an external collaborator reached through two narrow traits:
//!
//! - [`LedgerGateway`]: point reads, record-stream queries, block-time
//!   lookups, and live notifications, all in the ledger's positional wire
//!   shape
//! - [`TransactionSubmitter`]: write calls with a success/failure receipt
//!
//! [`LedgerClient`] is the connection handle the rest of the system passes
//! around. It decodes every positional response exactly once, so only typed
//! values leave this crate.
//!
//! [`InMemoryLedger`] enforces the provenance contract's rules in memory for
//! tests, fixtures, and local demos. [`FlakyGateway`] wraps any gateway with
//! scripted faults.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod call;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod fault;
pub mod memory;
pub mod subscription;
pub mod traits;

pub use call::{
    ArgFilter, PointCall, RawLog, StreamQuery, TransactionOutcome, TransactionReceipt, WriteCall,
};
pub use client::LedgerClient;
pub use config::{GatewayConfig, NetworkConfig};
pub use error::{DecodeError, FailureKind, GatewayError, GatewayResult};
pub use fault::{FaultPlan, FlakyGateway};
pub use memory::InMemoryLedger;
pub use subscription::{LedgerNotification, RecordWatch, Subscription};
pub use traits::{LedgerGateway, TransactionSubmitter};
