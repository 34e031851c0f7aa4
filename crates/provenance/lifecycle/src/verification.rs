//! Product verification by id or serial number.

use futures::join;
use provenance_gateway::{LedgerClient, LedgerGateway};
use provenance_types::{
    Address, ProductDetails, ProductId, ProductLifecycleTimeline, ProductQuery, WarrantyRemaining,
    WarrantyWindow,
};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::ResolveResult;
use crate::normalizer::wall_clock_secs;
use crate::reconstructor::LifecycleReconstructor;

/// Everything known about one existing product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductReport {
    pub product_id: ProductId,
    pub details: ProductDetails,
    /// `None` when the holder lookup failed.
    pub current_holder: Option<Address>,
    pub warranty: Option<WarrantyWindow>,
    pub warranty_remaining: Option<WarrantyRemaining>,
    pub timeline: ProductLifecycleTimeline,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum Verification {
    NotFound,
    Found(Box<ProductReport>),
}

impl Verification {
    pub fn is_found(&self) -> bool {
        matches!(self, Verification::Found(_))
    }

    pub fn report(&self) -> Option<&ProductReport> {
        match self {
            Verification::Found(report) => Some(report),
            Verification::NotFound => None,
        }
    }
}

pub struct Verifier<G> {
    client: LedgerClient<G>,
    reconstructor: LifecycleReconstructor<G>,
}

impl<G: LedgerGateway> Verifier<G> {
    pub fn new(client: LedgerClient<G>, reconstructor: LifecycleReconstructor<G>) -> Self {
        Self {
            client,
            reconstructor,
        }
    }

    /// Look a product up by decimal id or serial number.
    ///
    /// Absence is `NotFound`, not an error. An existing product whose
    /// timeline cannot be read is still reported, with an empty timeline.
    #[instrument(skip(self))]
    pub async fn verify(&self, query: &str) -> ResolveResult<Verification> {
        let product_id = match ProductQuery::parse(query)? {
            ProductQuery::Id(id) => Some(id),
            ProductQuery::Serial(serial) => self.client.product_id_for_serial(&serial).await?,
        };
        let Some(product_id) = product_id else {
            debug!(query, "Serial number not registered");
            return Ok(Verification::NotFound);
        };
        let Some(details) = self.client.product_details(product_id).await? else {
            debug!(product_id = %product_id, "Product not registered");
            return Ok(Verification::NotFound);
        };

        let (holder, timeline) = join!(
            self.client.current_holder(product_id),
            self.reconstructor.reconstruct(product_id),
        );
        let current_holder = holder.unwrap_or_else(|err| {
            warn!(product_id = %product_id, error = %err, "Holder lookup failed");
            None
        });
        let timeline = timeline.unwrap_or_else(|err| {
            warn!(product_id = %product_id, error = %err, "Timeline unavailable");
            ProductLifecycleTimeline::empty(product_id)
        });

        let warranty = details.warranty();
        let warranty_remaining = warranty.map(|window| window.remaining(wall_clock_secs()));

        Ok(Verification::Found(Box::new(ProductReport {
            product_id,
            details,
            current_holder,
            warranty,
            warranty_remaining,
            timeline,
        })))
    }
}
