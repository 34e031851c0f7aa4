use provenance_gateway::GatewayError;
use provenance_types::{ParseError, ProductId};
use thiserror::Error;

/// Errors from lifecycle, holdings, claim, and verification queries.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every stream query behind a timeline failed.
    #[error("lifecycle lookup failed for product {product_id}: {source}")]
    LookupFailed {
        product_id: ProductId,
        #[source]
        source: GatewayError,
    },

    #[error("ledger error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("invalid query: {0}")]
    Parse(#[from] ParseError),
}

pub type ResolveResult<T> = Result<T, ResolveError>;
