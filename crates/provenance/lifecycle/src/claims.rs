//! Directory of submitted warranty claims.

use futures::{future::join_all, join};
use provenance_gateway::{GatewayResult, LedgerClient, LedgerGateway};
use provenance_types::{ClaimSubmitted, ClaimSummary, RecordKind, RecordPayload};
use tracing::{debug, instrument, warn};

use crate::error::{ResolveError, ResolveResult};

pub struct ClaimDirectory<G> {
    client: LedgerClient<G>,
}

impl<G: LedgerGateway> ClaimDirectory<G> {
    pub fn new(client: LedgerClient<G>) -> Self {
        Self { client }
    }

    /// Every submitted claim with its current state and product model,
    /// ascending by claim id. Claims whose lookups fail are left out,
    /// unless every lookup fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> ResolveResult<Vec<ClaimSummary>> {
        let records = self
            .client
            .records(&self.client.query(RecordKind::ClaimSubmitted))
            .await?;

        let lookups: Vec<_> = records
            .iter()
            .filter_map(|record| match &record.payload {
                RecordPayload::ClaimSubmitted(submitted) => Some(self.summarize(submitted)),
                _ => None,
            })
            .collect();
        let attempted = lookups.len();

        let mut summaries = Vec::with_capacity(attempted);
        let mut failures = Vec::new();
        for outcome in join_all(lookups).await {
            match outcome {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => {}
                Err(err) => failures.push(err),
            }
        }
        if attempted > 0 && failures.len() == attempted {
            warn!(claims = attempted, "Every claim lookup failed");
            if let Some(err) = failures.pop() {
                return Err(ResolveError::Gateway(err));
            }
        }

        summaries.sort_by_key(|summary| summary.claim_id);
        summaries.dedup_by_key(|summary| summary.claim_id);

        debug!(claims = summaries.len(), "Claim directory listed");
        Ok(summaries)
    }

    async fn summarize(&self, submitted: &ClaimSubmitted) -> GatewayResult<Option<ClaimSummary>> {
        let (claim, details) = join!(
            self.client.warranty_claim(submitted.claim_id),
            self.client.product_details(submitted.product_id),
        );

        match (claim, details) {
            (Ok(Some(claim)), Ok(Some(details))) => Ok(Some(ClaimSummary {
                claim_id: submitted.claim_id,
                product_id: claim.product_id,
                model: details.model,
                issue: claim.issue,
                submitted_at: claim.submitted_at,
                processed: claim.processed,
                approved: claim.approved,
            })),
            (Err(err), _) | (_, Err(err)) => {
                warn!(claim_id = %submitted.claim_id, error = %err, "Claim lookup failed; skipping");
                Err(err)
            }
            _ => Ok(None),
        }
    }
}
