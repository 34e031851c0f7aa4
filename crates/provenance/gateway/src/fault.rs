//! Scripted gateway faults.
//!
//! [`FlakyGateway`] wraps another gateway and fails the calls named in its
//! [`FaultPlan`] with a transport error, delegating everything else. It
//! also counts point reads so callers can assert which lookups happened.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use provenance_types::{ProductId, RecordKind, TransactionRef};
use serde_json::Value;

use crate::call::{PointCall, RawLog, StreamQuery, TransactionReceipt, WriteCall};
use crate::error::{GatewayError, GatewayResult};
use crate::subscription::Subscription;
use crate::traits::{LedgerGateway, TransactionSubmitter};

/// Which calls a [`FlakyGateway`] fails.
#[derive(Clone, Debug, Default)]
pub struct FaultPlan {
    stream_kinds: HashSet<RecordKind>,
    selectors: HashSet<&'static str>,
    role_ids: HashSet<B256>,
    owner_lookups: HashSet<ProductId>,
    detail_lookups: HashSet<ProductId>,
    timestamps: bool,
    subscriptions: bool,
}

impl FaultPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_stream(mut self, kind: RecordKind) -> Self {
        self.stream_kinds.insert(kind);
        self
    }

    pub fn fail_all_streams(mut self) -> Self {
        self.stream_kinds.extend(RecordKind::ALL);
        self
    }

    /// Fail every point read with this selector, e.g. `"hasRole"`.
    pub fn fail_selector(mut self, selector: &'static str) -> Self {
        self.selectors.insert(selector);
        self
    }

    /// Fail membership checks for one role id only.
    pub fn fail_role_check(mut self, role_id: B256) -> Self {
        self.role_ids.insert(role_id);
        self
    }

    pub fn fail_owner_lookup(mut self, product_id: ProductId) -> Self {
        self.owner_lookups.insert(product_id);
        self
    }

    pub fn fail_details_lookup(mut self, product_id: ProductId) -> Self {
        self.detail_lookups.insert(product_id);
        self
    }

    pub fn fail_timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    pub fn fail_subscriptions(mut self) -> Self {
        self.subscriptions = true;
        self
    }

    fn fails_point(&self, call: &PointCall) -> bool {
        if self.selectors.contains(call.selector()) {
            return true;
        }
        match call {
            PointCall::HasRole { role_id, .. } => self.role_ids.contains(role_id),
            PointCall::OwnerOf { product_id } => self.owner_lookups.contains(product_id),
            PointCall::ProductDetails { product_id } => self.detail_lookups.contains(product_id),
            _ => false,
        }
    }
}

/// Gateway wrapper that injects the faults of a [`FaultPlan`].
pub struct FlakyGateway<G> {
    inner: G,
    plan: FaultPlan,
    point_reads: AtomicUsize,
}

impl<G> FlakyGateway<G> {
    pub fn new(inner: G, plan: FaultPlan) -> Self {
        Self {
            inner,
            plan,
            point_reads: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Point reads attempted so far, failed ones included.
    pub fn point_reads(&self) -> usize {
        self.point_reads.load(Ordering::Relaxed)
    }
}

fn injected(what: impl std::fmt::Display) -> GatewayError {
    GatewayError::Transport(format!("injected fault: {what}"))
}

#[async_trait]
impl<G: LedgerGateway> LedgerGateway for FlakyGateway<G> {
    async fn point_read(&self, call: &PointCall) -> GatewayResult<Vec<Value>> {
        self.point_reads.fetch_add(1, Ordering::Relaxed);
        if self.plan.fails_point(call) {
            return Err(injected(call.selector()));
        }
        self.inner.point_read(call).await
    }

    async fn stream_query(&self, query: &StreamQuery) -> GatewayResult<Vec<RawLog>> {
        if self.plan.stream_kinds.contains(&query.kind) {
            return Err(injected(query.kind));
        }
        self.inner.stream_query(query).await
    }

    async fn resolve_block_timestamp(&self, transaction: &TransactionRef) -> GatewayResult<u64> {
        if self.plan.timestamps {
            return Err(injected(transaction));
        }
        self.inner.resolve_block_timestamp(transaction).await
    }

    fn subscribe(&self) -> GatewayResult<Subscription> {
        if self.plan.subscriptions {
            return Err(injected("subscribe"));
        }
        self.inner.subscribe()
    }
}

#[async_trait]
impl<G: TransactionSubmitter> TransactionSubmitter for FlakyGateway<G> {
    async fn submit(&self, sender: Address, call: &WriteCall) -> GatewayResult<TransactionReceipt> {
        self.inner.submit(sender, call).await
    }
}
