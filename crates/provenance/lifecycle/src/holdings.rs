//! Current holdings of an account.
//!
//! The ledger has no "products of owner" collection. Candidates come from
//! replaying transfers addressed to the owner; each candidate is then
//! confirmed against the current-holder point read, so a product that has
//! since moved on is never reported.

use std::collections::BTreeSet;

use futures::future::join_all;
use provenance_gateway::{GatewayResult, LedgerClient, LedgerGateway, StreamQuery};
use provenance_types::{Address, HoldingsSet, OwnedProduct, ProductId, RecordPayload};
use tracing::{debug, instrument, warn};

use crate::error::{ResolveError, ResolveResult};

pub struct HoldingsResolver<G> {
    client: LedgerClient<G>,
}

impl<G: LedgerGateway> HoldingsResolver<G> {
    pub fn new(client: LedgerClient<G>) -> Self {
        Self { client }
    }

    /// Products `owner` holds right now, ascending by id.
    ///
    /// Products acquired without a transfer record are not found.
    #[instrument(skip(self))]
    pub async fn resolve(&self, owner: Address) -> ResolveResult<HoldingsSet> {
        let query = StreamQuery::transfers_to(owner).from_block(self.client.config().genesis_block);
        let records = self.client.records(&query).await?;

        let candidates: BTreeSet<ProductId> = records
            .iter()
            .filter_map(|record| match &record.payload {
                RecordPayload::Transferred(transfer) if transfer.to == owner => {
                    Some(transfer.product_id)
                }
                _ => None,
            })
            .collect();
        debug!(owner = %owner, candidates = candidates.len(), "Holding candidates collected");

        let confirmations = candidates
            .iter()
            .map(|product_id| self.confirm(owner, *product_id));
        let outcomes = join_all(confirmations).await;

        let mut products = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(Some(product)) => products.push(product),
                Ok(None) => {}
                Err(err) => failures.push(err),
            }
        }
        if !candidates.is_empty() && failures.len() == candidates.len() {
            warn!(owner = %owner, candidates = candidates.len(), "Every holding lookup failed");
            if let Some(err) = failures.pop() {
                return Err(ResolveError::Gateway(err));
            }
        }

        Ok(HoldingsSet { owner, products })
    }

    /// Point-verify one candidate. Absent results drop it; a failed lookup
    /// drops it unless every candidate fails.
    async fn confirm(
        &self,
        owner: Address,
        product_id: ProductId,
    ) -> GatewayResult<Option<OwnedProduct>> {
        match self.client.current_holder(product_id).await {
            Ok(Some(holder)) if holder == owner => {}
            Ok(_) => return Ok(None),
            Err(err) => {
                warn!(product_id = %product_id, error = %err, "Holder lookup failed; skipping");
                return Err(err);
            }
        }

        match self.client.product_details(product_id).await {
            Ok(details) => Ok(details.map(|details| OwnedProduct {
                product_id,
                details,
            })),
            Err(err) => {
                warn!(product_id = %product_id, error = %err, "Details lookup failed; skipping");
                Err(err)
            }
        }
    }
}
