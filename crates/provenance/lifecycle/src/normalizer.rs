//! Record → lifecycle event normalization.
//!
//! Each of the six record kinds maps to one uniform event shape. Mint
//! transfers (from the burn address) are dropped: registration already
//! covers them. Normalization itself is pure; only timestamp resolution
//! touches the ledger.

use std::collections::HashMap;

use futures::future::join_all;
use provenance_gateway::{LedgerClient, LedgerGateway};
use provenance_types::{
    is_burn, ClaimStatus, EventType, NormalizedLifecycleEvent, RawEventRecord, RecordPayload,
    TransactionRef,
};
use tracing::warn;

/// Build the lifecycle event for one record at `timestamp`.
///
/// Returns `None` for records that never appear on a timeline: mint
/// transfers, and warranty activations unless `include_activation` is set.
pub fn normalize(
    record: &RawEventRecord,
    timestamp: u64,
    include_activation: bool,
) -> Option<NormalizedLifecycleEvent> {
    let event = |event_type, description: String| NormalizedLifecycleEvent {
        event_type,
        timestamp,
        description,
        transaction: record.transaction,
        from: None,
        to: None,
        status: None,
        kind: record.kind(),
        claim_id: None,
    };

    match &record.payload {
        RecordPayload::Registered(registered) => Some(NormalizedLifecycleEvent {
            from: Some(registered.manufacturer),
            to: Some(registered.initial_owner),
            ..event(EventType::Manufacture, "Product minted & registered".into())
        }),
        RecordPayload::WarrantyActivated(activated) => {
            include_activation.then(|| NormalizedLifecycleEvent {
                to: Some(activated.customer),
                ..event(EventType::WarrantyActivated, "Warranty activated".into())
            })
        }
        RecordPayload::Transferred(transfer) => {
            if is_burn(&transfer.from) {
                return None;
            }
            Some(NormalizedLifecycleEvent {
                from: Some(transfer.from),
                to: Some(transfer.to),
                ..event(EventType::Transfer, "Ownership transferred".into())
            })
        }
        RecordPayload::ClaimSubmitted(claim) => Some(NormalizedLifecycleEvent {
            from: Some(claim.customer),
            status: Some(ClaimStatus::Pending),
            claim_id: Some(claim.claim_id),
            ..event(EventType::WarrantyClaim, format!("Claim: {}", claim.issue))
        }),
        RecordPayload::ClaimProcessed(processed) => {
            let status = ClaimStatus::from_approval(processed.approved);
            Some(NormalizedLifecycleEvent {
                from: Some(processed.service_center),
                status: Some(status),
                claim_id: Some(processed.claim_id),
                ..event(
                    EventType::WarrantyClaim,
                    format!("Claim #{} {}", processed.claim_id, status),
                )
            })
        }
        RecordPayload::ServiceRecorded(service) => Some(NormalizedLifecycleEvent {
            from: Some(service.service_center),
            claim_id: Some(service.claim_id),
            ..event(EventType::Service, format!("Service: {}", service.notes))
        }),
    }
}

/// Whether a record can ever produce an event, checked before any
/// timestamp lookup is spent on it.
pub fn is_timeline_candidate(record: &RawEventRecord, include_activation: bool) -> bool {
    match &record.payload {
        RecordPayload::Transferred(transfer) => !is_burn(&transfer.from),
        RecordPayload::WarrantyActivated(_) => include_activation,
        _ => true,
    }
}

/// Current wall-clock time in seconds.
pub fn wall_clock_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

/// Block times for a batch of records, one ledger lookup per distinct
/// transaction. Records carrying a pre-resolved time are not looked up. A
/// failed lookup falls back to the wall clock.
pub async fn resolve_timestamps<G: LedgerGateway>(
    client: &LedgerClient<G>,
    records: &[RawEventRecord],
) -> HashMap<TransactionRef, u64> {
    let mut resolved: HashMap<TransactionRef, u64> = HashMap::new();
    let mut pending: Vec<TransactionRef> = Vec::new();

    for record in records {
        match record.block_timestamp {
            Some(timestamp) => {
                resolved.insert(record.transaction, timestamp);
            }
            None => {
                if !pending.contains(&record.transaction) {
                    pending.push(record.transaction);
                }
            }
        }
    }
    pending.retain(|transaction| !resolved.contains_key(transaction));

    let lookups = pending.iter().map(|transaction| async move {
        let timestamp = match client.block_timestamp(transaction).await {
            Ok(timestamp) => timestamp,
            Err(err) => {
                warn!(
                    transaction = %transaction,
                    error = %err,
                    "Block time lookup failed; using wall clock"
                );
                wall_clock_secs()
            }
        };
        (*transaction, timestamp)
    });
    resolved.extend(join_all(lookups).await);
    resolved
}
