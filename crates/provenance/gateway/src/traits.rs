use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use provenance_types::TransactionRef;
use serde_json::Value;

use crate::call::{PointCall, RawLog, StreamQuery, TransactionReceipt, WriteCall};
use crate::error::GatewayResult;
use crate::subscription::Subscription;

/// Read boundary of the external ledger, in its positional wire shape.
///
/// Implementations own transport, retries, and timeouts. Callers never see
/// these raw shapes directly; they go through [`crate::LedgerClient`].
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Single-value lookup against current state.
    async fn point_read(&self, call: &PointCall) -> GatewayResult<Vec<Value>>;

    /// Historical scan of one record kind, in emission order.
    async fn stream_query(&self, query: &StreamQuery) -> GatewayResult<Vec<RawLog>>;

    /// Time of the block that included `transaction`.
    async fn resolve_block_timestamp(&self, transaction: &TransactionRef) -> GatewayResult<u64>;

    /// Register for live notifications. Dropping the handle stops delivery.
    fn subscribe(&self) -> GatewayResult<Subscription>;
}

/// Write boundary: submit a call and wait for its inclusion receipt.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, sender: Address, call: &WriteCall) -> GatewayResult<TransactionReceipt>;
}

#[async_trait]
impl<G: LedgerGateway + ?Sized> LedgerGateway for Arc<G> {
    async fn point_read(&self, call: &PointCall) -> GatewayResult<Vec<Value>> {
        (**self).point_read(call).await
    }

    async fn stream_query(&self, query: &StreamQuery) -> GatewayResult<Vec<RawLog>> {
        (**self).stream_query(query).await
    }

    async fn resolve_block_timestamp(&self, transaction: &TransactionRef) -> GatewayResult<u64> {
        (**self).resolve_block_timestamp(transaction).await
    }

    fn subscribe(&self) -> GatewayResult<Subscription> {
        (**self).subscribe()
    }
}

#[async_trait]
impl<S: TransactionSubmitter + ?Sized> TransactionSubmitter for Arc<S> {
    async fn submit(&self, sender: Address, call: &WriteCall) -> GatewayResult<TransactionReceipt> {
        (**self).submit(sender, call).await
    }
}
