//! Typed connection handle over a raw [`LedgerGateway`].

use std::sync::Arc;

use alloy_primitives::{keccak256, Address, B256};
use provenance_types::{
    ClaimId, ProductDetails, ProductId, RawEventRecord, RecordKind, Role, TransactionRef,
    WarrantyClaim,
};
use tracing::{debug, warn};

use crate::call::{PointCall, StreamQuery, TransactionOutcome, WriteCall};
use crate::codec;
use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::subscription::{RecordWatch, Subscription};
use crate::traits::{LedgerGateway, TransactionSubmitter};

/// Connection handle, built once per session and passed to every resolver.
///
/// Cloning is cheap; clones share the underlying gateway.
pub struct LedgerClient<G> {
    gateway: Arc<G>,
    config: Arc<GatewayConfig>,
}

impl<G> Clone for LedgerClient<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            config: Arc::clone(&self.config),
        }
    }
}

impl<G> LedgerClient<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_config(Arc::new(gateway), GatewayConfig::default())
    }

    /// Wrap a gateway the caller keeps a handle to.
    pub fn shared(gateway: Arc<G>) -> Self {
        Self::with_config(gateway, GatewayConfig::default())
    }

    pub fn with_config(gateway: Arc<G>, config: GatewayConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// A stream query for `kind` starting at the configured genesis block.
    pub fn query(&self, kind: RecordKind) -> StreamQuery {
        StreamQuery::all(kind).from_block(self.config.genesis_block)
    }
}

impl<G: LedgerGateway> LedgerClient<G> {
    /// Current holder of a product; `None` for the absent sentinel.
    pub async fn current_holder(&self, product_id: ProductId) -> GatewayResult<Option<Address>> {
        let call = PointCall::OwnerOf { product_id };
        let values = self.gateway.point_read(&call).await?;
        let holder = codec::decode_single_address(call.selector(), &values)?;
        Ok((holder != Address::ZERO).then_some(holder))
    }

    pub async fn product_details(
        &self,
        product_id: ProductId,
    ) -> GatewayResult<Option<ProductDetails>> {
        if product_id.is_sentinel() {
            return Ok(None);
        }
        let values = self
            .gateway
            .point_read(&PointCall::ProductDetails { product_id })
            .await?;
        Ok(codec::decode_product_details(&values)?)
    }

    pub async fn warranty_claim(&self, claim_id: ClaimId) -> GatewayResult<Option<WarrantyClaim>> {
        let values = self
            .gateway
            .point_read(&PointCall::WarrantyClaim { claim_id })
            .await?;
        Ok(codec::decode_warranty_claim(&values)?)
    }

    /// Alternate-key lookup: keccak-256 of the UTF-8 serial number.
    pub async fn product_id_for_serial(&self, serial: &str) -> GatewayResult<Option<ProductId>> {
        let call = PointCall::TokenIdForSerialHash {
            serial_hash: keccak256(serial.as_bytes()),
        };
        let values = self.gateway.point_read(&call).await?;
        let id = ProductId(codec::decode_single_uint(call.selector(), &values)?);
        Ok((!id.is_sentinel()).then_some(id))
    }

    pub async fn role_id(&self, role: Role) -> GatewayResult<B256> {
        if role == Role::Admin {
            return Ok(B256::ZERO);
        }
        let call = PointCall::RoleId { role };
        let values = self.gateway.point_read(&call).await?;
        Ok(codec::decode_single_b256(call.selector(), &values)?)
    }

    pub async fn has_role(&self, role_id: B256, account: Address) -> GatewayResult<bool> {
        let call = PointCall::HasRole { role_id, account };
        let values = self.gateway.point_read(&call).await?;
        Ok(codec::decode_single_bool(call.selector(), &values)?)
    }

    pub async fn is_warranty_active(&self, product_id: ProductId) -> GatewayResult<bool> {
        let call = PointCall::IsWarrantyActive { product_id };
        let values = self.gateway.point_read(&call).await?;
        Ok(codec::decode_single_bool(call.selector(), &values)?)
    }

    /// Run a stream query and decode every returned record.
    ///
    /// One malformed record fails the whole query: a stream that does not
    /// decode cleanly is not trusted partially.
    pub async fn records(&self, query: &StreamQuery) -> GatewayResult<Vec<RawEventRecord>> {
        let logs = self.gateway.stream_query(query).await?;
        debug!(kind = %query.kind, count = logs.len(), "Stream query returned");
        logs.iter()
            .map(codec::decode_record)
            .collect::<GatewayResult<Vec<_>>>()
    }

    pub async fn block_timestamp(&self, transaction: &TransactionRef) -> GatewayResult<u64> {
        self.gateway.resolve_block_timestamp(transaction).await
    }

    pub fn subscribe(&self) -> GatewayResult<Subscription> {
        self.gateway.subscribe()
    }

    /// Live feed of decoded records; an empty `kinds` slice watches all kinds.
    pub fn watch(&self, kinds: &[RecordKind]) -> GatewayResult<RecordWatch> {
        Ok(RecordWatch::new(self.gateway.subscribe()?, kinds))
    }
}

impl<G: TransactionSubmitter> LedgerClient<G> {
    /// Submit a write call. Failures come back inside the outcome.
    pub async fn submit(&self, sender: Address, call: WriteCall) -> TransactionOutcome {
        match self.gateway.submit(sender, &call).await {
            Ok(receipt) => {
                debug!(
                    selector = call.selector(),
                    transaction = %receipt.transaction,
                    block = receipt.block_number,
                    "Transaction included"
                );
                TransactionOutcome::from_receipt(receipt)
            }
            Err(err) => {
                warn!(selector = call.selector(), error = %err, "Transaction failed");
                TransactionOutcome::failed(&err)
            }
        }
    }

    pub async fn register_product(
        &self,
        manufacturer: Address,
        initial_owner: Address,
        serial_number: &str,
        model: &str,
        warranty_days: u64,
        claim_limit: u32,
    ) -> TransactionOutcome {
        self.submit(
            manufacturer,
            WriteCall::RegisterProduct {
                initial_owner,
                serial_number: serial_number.to_string(),
                model: model.to_string(),
                warranty_duration_secs: warranty_days.saturating_mul(86_400),
                claim_limit,
            },
        )
        .await
    }

    pub async fn transfer_product(
        &self,
        from: Address,
        to: Address,
        product_id: ProductId,
    ) -> TransactionOutcome {
        self.submit(from, WriteCall::Transfer { from, to, product_id })
            .await
    }

    pub async fn submit_warranty_claim(
        &self,
        customer: Address,
        product_id: ProductId,
        issue: &str,
    ) -> TransactionOutcome {
        self.submit(
            customer,
            WriteCall::SubmitClaim {
                product_id,
                issue: issue.to_string(),
            },
        )
        .await
    }

    pub async fn process_warranty_claim(
        &self,
        service_center: Address,
        claim_id: ClaimId,
        approved: bool,
    ) -> TransactionOutcome {
        self.submit(service_center, WriteCall::ProcessClaim { claim_id, approved })
            .await
    }

    pub async fn record_service(
        &self,
        service_center: Address,
        claim_id: ClaimId,
        notes: &str,
    ) -> TransactionOutcome {
        self.submit(
            service_center,
            WriteCall::RecordService {
                claim_id,
                notes: notes.to_string(),
            },
        )
        .await
    }

    pub async fn grant_role(&self, admin: Address, role: Role, account: Address) -> TransactionOutcome {
        self.submit(admin, WriteCall::GrantRole { role, account }).await
    }
}
