//! Event-sourced lifecycle reconstruction.
//!
//! A timeline is rebuilt from scratch on every call: one filtered stream
//! query per record kind of the active view, issued concurrently, then
//! normalized, ordered, and merged. Nothing is cached between calls.

use std::collections::HashMap;

use futures::future::join_all;
use provenance_gateway::{GatewayError, LedgerClient, LedgerGateway, StreamQuery};
use provenance_types::{
    ClaimId, EventType, NormalizedLifecycleEvent, ProductId, ProductLifecycleTimeline,
    RawEventRecord, RecordKind,
};
use tracing::{debug, instrument, warn};

use crate::config::{TimelineOptions, TimelineView};
use crate::error::{ResolveError, ResolveResult};
use crate::normalizer;

/// Rebuilds product timelines from the ledger's record streams.
pub struct LifecycleReconstructor<G> {
    client: LedgerClient<G>,
    options: TimelineOptions,
}

impl<G> LifecycleReconstructor<G> {
    pub fn new(client: LedgerClient<G>, options: TimelineOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> TimelineOptions {
        self.options
    }

    /// Record kinds queried for the active view, in query order.
    pub fn kinds(&self) -> Vec<RecordKind> {
        match self.options.view {
            TimelineView::Full => RecordKind::ALL.to_vec(),
            TimelineView::Ownership => RecordKind::ALL
                .into_iter()
                .filter(|kind| match kind {
                    RecordKind::Registered | RecordKind::Transferred => true,
                    RecordKind::WarrantyActivated => self.options.include_warranty_activation,
                    _ => false,
                })
                .collect(),
        }
    }
}

impl<G: LedgerGateway> LifecycleReconstructor<G> {
    /// Reconstruct the ordered lifecycle of `product_id`.
    ///
    /// A product with no records yields an empty timeline. Individual kinds
    /// that fail are logged and left out; the call fails only when every
    /// queried kind fails.
    #[instrument(skip(self))]
    pub async fn reconstruct(&self, product_id: ProductId) -> ResolveResult<ProductLifecycleTimeline> {
        let records = self.fetch_records(product_id).await?;
        let include_activation = self.options.include_warranty_activation;

        let candidates: Vec<RawEventRecord> = records
            .into_iter()
            .filter(|record| normalizer::is_timeline_candidate(record, include_activation))
            .collect();
        let times = normalizer::resolve_timestamps(&self.client, &candidates).await;

        let mut events: Vec<NormalizedLifecycleEvent> = candidates
            .iter()
            .filter_map(|record| {
                let timestamp = times
                    .get(&record.transaction)
                    .copied()
                    .unwrap_or_else(normalizer::wall_clock_secs);
                normalizer::normalize(record, timestamp, include_activation)
            })
            .collect();

        order_events(&mut events);
        merge_claim_resolutions(&mut events);

        debug!(product_id = %product_id, events = events.len(), "Timeline reconstructed");
        Ok(ProductLifecycleTimeline::new(product_id, events))
    }

    /// Run the per-kind queries concurrently and concatenate the successful
    /// ones in query order.
    async fn fetch_records(&self, product_id: ProductId) -> ResolveResult<Vec<RawEventRecord>> {
        let kinds = self.kinds();
        let genesis = self.client.config().genesis_block;

        let queries = kinds.iter().map(|kind| {
            let query = StreamQuery::for_product(*kind, product_id).from_block(genesis);
            async move { (*kind, self.client.records(&query).await) }
        });
        let results = join_all(queries).await;

        let mut records = Vec::new();
        let mut last_error: Option<GatewayError> = None;
        let mut succeeded = 0usize;

        for (kind, result) in results {
            match result {
                Ok(batch) => {
                    succeeded += 1;
                    records.extend(batch);
                }
                Err(err) => {
                    warn!(
                        product_id = %product_id,
                        kind = ?kind,
                        error = %err,
                        "Record stream failed; omitting kind from timeline"
                    );
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(source) if succeeded == 0 => Err(ResolveError::LookupFailed { product_id, source }),
            _ => Ok(records),
        }
    }
}

/// Order events by timestamp, then record-kind query order. The sort is
/// stable, so arrival order breaks any remaining tie.
pub fn order_events(events: &mut [NormalizedLifecycleEvent]) {
    events.sort_by_key(|event| (event.timestamp, event.kind.query_rank()));
}

/// Fold claim resolutions into the claims they resolve.
///
/// A processed record whose claim id matches a submitted claim sets that
/// claim's status and is removed. Unmatched processed records stay as
/// standalone events. Relative order of the remaining events is kept.
pub fn merge_claim_resolutions(events: &mut Vec<NormalizedLifecycleEvent>) {
    let submitted: HashMap<ClaimId, usize> = events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.kind == RecordKind::ClaimSubmitted)
        .filter_map(|(index, event)| event.claim_id.map(|id| (id, index)))
        .collect();

    let mut absorbed = vec![false; events.len()];
    for index in 0..events.len() {
        let event = &events[index];
        if event.kind != RecordKind::ClaimProcessed || event.event_type != EventType::WarrantyClaim {
            continue;
        }
        let Some(target) = event.claim_id.and_then(|id| submitted.get(&id).copied()) else {
            continue;
        };
        let status = event.status;
        events[target].status = status;
        absorbed[index] = true;
    }

    let mut flags = absorbed.into_iter();
    events.retain(|_| !flags.next().unwrap_or(false));
}
