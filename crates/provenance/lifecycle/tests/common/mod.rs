#![allow(dead_code)]

use std::sync::Arc;

use provenance_gateway::{FaultPlan, FlakyGateway, InMemoryLedger, LedgerClient};
use provenance_lifecycle::{ProvenanceService, TimelineOptions};
use provenance_types::{Address, ProductId, RecordPayload, Role};

pub const ADMIN: Address = Address::repeat_byte(0xAD);
pub const MAKER: Address = Address::repeat_byte(0x11);
pub const SHOP: Address = Address::repeat_byte(0x22);
pub const BUYER: Address = Address::repeat_byte(0xBE);
pub const SECOND_BUYER: Address = Address::repeat_byte(0xCF);
pub const FIXER: Address = Address::repeat_byte(0x44);

pub const YEAR_DAYS: u64 = 365;

/// Ledger with the usual cast of actors, genesis at time zero.
pub fn ledger() -> Arc<InMemoryLedger> {
    Arc::new(
        InMemoryLedger::new(ADMIN, 0)
            .with_role(Role::Manufacturer, MAKER)
            .with_role(Role::Retailer, SHOP)
            .with_role(Role::ServiceCenter, FIXER),
    )
}

pub fn client(ledger: &Arc<InMemoryLedger>) -> LedgerClient<InMemoryLedger> {
    LedgerClient::shared(Arc::clone(ledger))
}

pub fn service(ledger: &Arc<InMemoryLedger>) -> ProvenanceService<InMemoryLedger> {
    ProvenanceService::new(client(ledger))
}

pub fn service_with(
    ledger: &Arc<InMemoryLedger>,
    options: TimelineOptions,
) -> ProvenanceService<InMemoryLedger> {
    ProvenanceService::with_options(client(ledger), options)
}

pub fn flaky_service(
    ledger: &Arc<InMemoryLedger>,
    plan: FaultPlan,
) -> ProvenanceService<FlakyGateway<Arc<InMemoryLedger>>> {
    ProvenanceService::new(LedgerClient::new(FlakyGateway::new(Arc::clone(ledger), plan)))
}

/// Register a product to the shop at time `at`, returning its id.
pub async fn register_at(ledger: &Arc<InMemoryLedger>, serial: &str, at: u64) -> ProductId {
    ledger.set_next_block_timestamp(at);
    let outcome = client(ledger)
        .register_product(MAKER, SHOP, serial, "Phone X", YEAR_DAYS, 2)
        .await;
    assert!(outcome.success, "registration failed: {:?}", outcome.error);
    client(ledger)
        .product_id_for_serial(serial)
        .await
        .expect("serial lookup")
        .expect("registered serial")
}

pub async fn transfer_at(
    ledger: &Arc<InMemoryLedger>,
    from: Address,
    to: Address,
    product_id: ProductId,
    at: u64,
) {
    ledger.set_next_block_timestamp(at);
    let outcome = client(ledger).transfer_product(from, to, product_id).await;
    assert!(outcome.success, "transfer failed: {:?}", outcome.error);
}

/// Append a record outside the contract rules at time `at`.
pub fn emit_at(ledger: &Arc<InMemoryLedger>, payload: RecordPayload, at: u64) {
    ledger.set_next_block_timestamp(at);
    ledger.emit_record(&payload).expect("emit record");
}
