//! Public query surface.

use provenance_gateway::{LedgerClient, LedgerGateway};
use provenance_types::{
    Address, ClaimSummary, HoldingsSet, ProductDetails, ProductId, ProductLifecycleTimeline,
    RoleSet,
};

use crate::claims::ClaimDirectory;
use crate::config::TimelineOptions;
use crate::error::ResolveResult;
use crate::holdings::HoldingsResolver;
use crate::reconstructor::LifecycleReconstructor;
use crate::roles::RoleResolver;
use crate::verification::{Verification, Verifier};

/// Provenance queries over one ledger connection.
///
/// Every operation recomputes its answer from the ledger. Expected failure
/// modes come back as empty values, `None`, or an error; none panic.
pub struct ProvenanceService<G> {
    client: LedgerClient<G>,
    options: TimelineOptions,
}

impl<G> Clone for ProvenanceService<G> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            options: self.options,
        }
    }
}

impl<G: LedgerGateway> ProvenanceService<G> {
    pub fn new(client: LedgerClient<G>) -> Self {
        Self::with_options(client, TimelineOptions::default())
    }

    pub fn with_options(client: LedgerClient<G>, options: TimelineOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &LedgerClient<G> {
        &self.client
    }

    pub fn options(&self) -> TimelineOptions {
        self.options
    }

    fn reconstructor(&self) -> LifecycleReconstructor<G> {
        LifecycleReconstructor::new(self.client.clone(), self.options)
    }

    pub async fn reconstruct_timeline(
        &self,
        product_id: ProductId,
    ) -> ResolveResult<ProductLifecycleTimeline> {
        self.reconstructor().reconstruct(product_id).await
    }

    pub async fn resolve_holdings(&self, owner: Address) -> ResolveResult<HoldingsSet> {
        HoldingsResolver::new(self.client.clone()).resolve(owner).await
    }

    pub async fn resolve_roles(&self, account: Address) -> RoleSet {
        RoleResolver::new(self.client.clone()).resolve(account).await
    }

    /// Direct point fetch; `Ok(None)` when the product does not exist.
    pub async fn product_details(&self, product_id: ProductId) -> ResolveResult<Option<ProductDetails>> {
        Ok(self.client.product_details(product_id).await?)
    }

    pub async fn verify(&self, query: &str) -> ResolveResult<Verification> {
        Verifier::new(self.client.clone(), self.reconstructor())
            .verify(query)
            .await
    }

    pub async fn list_claims(&self) -> ResolveResult<Vec<ClaimSummary>> {
        ClaimDirectory::new(self.client.clone()).list().await
    }
}
