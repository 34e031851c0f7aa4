//! In-memory ledger enforcing the provenance contract's rules.
//!
//! Suitable for tests, fixtures, and local demos. Every successful write
//! mines exactly one block; reverted writes leave no trace. Responses use
//! the same positional wire shape a deployed contract returns, so the
//! decoding path is exercised end to end.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use alloy_primitives::{keccak256, Address, B256};
use async_trait::async_trait;
use provenance_types::{
    ClaimId, ClaimProcessed, ClaimSubmitted, ProductDetails, ProductId, RecordPayload, Registered,
    Role, ServiceRecorded, TransactionRef, Transferred, WarrantyActivated, WarrantyClaim,
};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::call::{PointCall, RawLog, StreamQuery, TransactionReceipt, WriteCall};
use crate::codec;
use crate::error::{GatewayError, GatewayResult};
use crate::subscription::{LedgerNotification, Subscription};
use crate::traits::{LedgerGateway, TransactionSubmitter};

pub const DEFAULT_BLOCK_INTERVAL_SECS: u64 = 12;
const NOTIFICATION_CAPACITY: usize = 1024;

/// In-memory provenance ledger.
pub struct InMemoryLedger {
    block_interval: u64,
    inner: RwLock<LedgerState>,
    notifications: broadcast::Sender<LedgerNotification>,
}

struct ProductState {
    owner: Address,
    details: ProductDetails,
}

#[derive(Default)]
struct LedgerState {
    /// Block timestamps, indexed by block number. Block 0 is genesis.
    blocks: Vec<u64>,
    next_timestamp: Option<u64>,
    logs: Vec<RawLog>,
    transactions: HashMap<TransactionRef, u64>,
    products: BTreeMap<u64, ProductState>,
    serials: HashMap<B256, u64>,
    claims: BTreeMap<u64, WarrantyClaim>,
    roles: HashMap<B256, HashSet<Address>>,
    nonce: u64,
}

impl LedgerState {
    fn latest_timestamp(&self) -> u64 {
        self.blocks.last().copied().unwrap_or_default()
    }

    fn pending_timestamp(&self, interval: u64) -> u64 {
        let latest = self.latest_timestamp();
        self.next_timestamp
            .unwrap_or(latest.saturating_add(interval))
            .max(latest)
    }

    fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles
            .get(&role.conventional_id())
            .is_some_and(|members| members.contains(account))
    }

    fn require_role(&self, role: Role, account: &Address) -> GatewayResult<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(revert(format!("caller is missing {role}")))
        }
    }

    fn product(&self, product_id: ProductId) -> GatewayResult<&ProductState> {
        self.products
            .get(&product_id.0)
            .ok_or_else(|| revert("nonexistent token"))
    }

    /// Mine one block carrying `payloads`, returning the receipt and the
    /// notifications to publish once the state lock is released.
    fn mine(
        &mut self,
        timestamp: u64,
        sender: Address,
        payloads: Vec<(&str, Vec<Value>)>,
    ) -> (TransactionReceipt, Vec<LedgerNotification>) {
        self.blocks.push(timestamp);
        self.next_timestamp = None;
        self.nonce += 1;
        let block_number = (self.blocks.len() - 1) as u64;

        let mut preimage = Vec::with_capacity(36);
        preimage.extend_from_slice(sender.as_slice());
        preimage.extend_from_slice(&self.nonce.to_be_bytes());
        preimage.extend_from_slice(&block_number.to_be_bytes());
        let transaction = TransactionRef(keccak256(&preimage));
        self.transactions.insert(transaction, block_number);

        let mut notifications = vec![LedgerNotification::NewBlock {
            number: block_number,
            timestamp,
        }];
        for (log_index, (event, args)) in payloads.into_iter().enumerate() {
            let log = RawLog {
                event: event.to_string(),
                block_number,
                log_index: log_index as u64,
                transaction,
                args,
            };
            notifications.push(LedgerNotification::Record(log.clone()));
            self.logs.push(log);
        }

        (
            TransactionReceipt {
                transaction,
                block_number,
                success: true,
            },
            notifications,
        )
    }
}

fn revert(reason: impl Into<String>) -> GatewayError {
    GatewayError::Reverted(reason.into())
}

impl InMemoryLedger {
    /// New ledger whose genesis block is at `genesis_timestamp`, with
    /// `admin` holding the admin role.
    pub fn new(admin: Address, genesis_timestamp: u64) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let mut state = LedgerState {
            blocks: vec![genesis_timestamp],
            ..LedgerState::default()
        };
        state
            .roles
            .entry(Role::Admin.conventional_id())
            .or_default()
            .insert(admin);
        Self {
            block_interval: DEFAULT_BLOCK_INTERVAL_SECS,
            inner: RwLock::new(state),
            notifications,
        }
    }

    pub fn with_block_interval(mut self, seconds: u64) -> Self {
        self.block_interval = seconds;
        self
    }

    /// Genesis-time role assignment, bypassing the admin check.
    pub fn with_role(self, role: Role, account: Address) -> Self {
        if let Ok(mut state) = self.inner.write() {
            state
                .roles
                .entry(role.conventional_id())
                .or_default()
                .insert(account);
        }
        self
    }

    /// Pin the timestamp of the next mined block. Timestamps never move
    /// backwards; an earlier value is raised to the latest block time.
    pub fn set_next_block_timestamp(&self, timestamp: u64) {
        if let Ok(mut state) = self.inner.write() {
            state.next_timestamp = Some(timestamp);
        }
    }

    pub fn advance_time(&self, seconds: u64) {
        if let Ok(mut state) = self.inner.write() {
            let next = state.latest_timestamp().saturating_add(seconds);
            state.next_timestamp = Some(next);
        }
    }

    /// Latest block as `(number, timestamp)`.
    pub fn latest_block(&self) -> (u64, u64) {
        self.inner
            .read()
            .map(|state| ((state.blocks.len() - 1) as u64, state.latest_timestamp()))
            .unwrap_or_default()
    }

    pub fn log_count(&self) -> usize {
        self.inner.read().map(|state| state.logs.len()).unwrap_or(0)
    }

    /// Announce a wallet account switch to subscribers.
    pub fn set_active_account(&self, account: Option<Address>) {
        let _ = self
            .notifications
            .send(LedgerNotification::AccountChanged(account));
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifications.receiver_count()
    }

    /// Mine a block carrying one arbitrary record, bypassing contract rules.
    /// Used to reproduce ledger histories the rules would not produce.
    pub fn emit_raw(&self, event: &str, args: Vec<Value>) -> GatewayResult<TransactionRef> {
        let (receipt, notifications) = {
            let mut state = self.write_state()?;
            let timestamp = state.pending_timestamp(self.block_interval);
            state.mine(timestamp, Address::ZERO, vec![(event, args)])
        };
        self.publish(notifications);
        Ok(receipt.transaction)
    }

    /// Mine a block carrying an encoded record payload, bypassing contract rules.
    pub fn emit_record(&self, payload: &RecordPayload) -> GatewayResult<TransactionRef> {
        let (event, args) = codec::encode_payload(payload);
        self.emit_raw(event, args)
    }

    fn read_state(&self) -> GatewayResult<RwLockReadGuard<'_, LedgerState>> {
        self.inner
            .read()
            .map_err(|_| GatewayError::Transport("ledger state lock poisoned".to_string()))
    }

    fn write_state(&self) -> GatewayResult<RwLockWriteGuard<'_, LedgerState>> {
        self.inner
            .write()
            .map_err(|_| GatewayError::Transport("ledger state lock poisoned".to_string()))
    }

    fn publish(&self, notifications: Vec<LedgerNotification>) {
        for notification in notifications {
            // No receivers is fine.
            let _ = self.notifications.send(notification);
        }
    }

    fn execute(&self, sender: Address, call: &WriteCall) -> GatewayResult<TransactionReceipt> {
        let (receipt, notifications) = {
            let mut state = self.write_state()?;
            let now = state.pending_timestamp(self.block_interval);
            let payloads = apply(&mut state, sender, call, now)?;
            let encoded = payloads.iter().map(codec::encode_payload).collect();
            state.mine(now, sender, encoded)
        };
        debug!(
            selector = call.selector(),
            block = receipt.block_number,
            "In-memory ledger mined transaction"
        );
        self.publish(notifications);
        Ok(receipt)
    }
}

/// Validate and apply one write call. Validation happens before any
/// mutation, so a revert leaves the state untouched.
fn apply(
    state: &mut LedgerState,
    sender: Address,
    call: &WriteCall,
    now: u64,
) -> GatewayResult<Vec<RecordPayload>> {
    match call {
        WriteCall::RegisterProduct {
            initial_owner,
            serial_number,
            model,
            warranty_duration_secs,
            claim_limit,
        } => {
            state.require_role(Role::Manufacturer, &sender)?;
            if serial_number.is_empty() {
                return Err(revert("serial number required"));
            }
            if *initial_owner == Address::ZERO {
                return Err(revert("invalid initial owner"));
            }
            let serial_hash = keccak256(serial_number.as_bytes());
            if state.serials.contains_key(&serial_hash) {
                return Err(revert("serial number already registered"));
            }

            let product_id = ProductId(state.products.len() as u64 + 1);
            state.serials.insert(serial_hash, product_id.0);
            state.products.insert(
                product_id.0,
                ProductState {
                    owner: *initial_owner,
                    details: ProductDetails {
                        serial_number: serial_number.clone(),
                        model: model.clone(),
                        manufacturer: sender,
                        manufactured_at: now,
                        warranty_duration: *warranty_duration_secs,
                        warranty_start: 0,
                        warranty_expiration: 0,
                        claim_limit: *claim_limit,
                        claim_count: 0,
                    },
                },
            );

            Ok(vec![
                RecordPayload::Transferred(Transferred {
                    from: Address::ZERO,
                    to: *initial_owner,
                    product_id,
                }),
                RecordPayload::Registered(Registered {
                    product_id,
                    serial_number: serial_number.clone(),
                    model: model.clone(),
                    manufacturer: sender,
                    initial_owner: *initial_owner,
                    registered_at: now,
                    warranty_duration: *warranty_duration_secs,
                    claim_limit: *claim_limit,
                }),
            ])
        }

        WriteCall::Transfer {
            from,
            to,
            product_id,
        } => {
            let product = state.product(*product_id)?;
            if product.owner != *from {
                return Err(revert("transfer from incorrect owner"));
            }
            if sender != *from {
                return Err(revert("caller is not token owner"));
            }
            if *to == Address::ZERO {
                return Err(revert("transfer to the zero address"));
            }

            let activation = if product.details.warranty_start == 0 {
                let expiration = now
                    .checked_add(product.details.warranty_duration)
                    .ok_or_else(|| revert("warranty expiration overflow"))?;
                Some(expiration)
            } else {
                None
            };

            let mut emitted = vec![RecordPayload::Transferred(Transferred {
                from: *from,
                to: *to,
                product_id: *product_id,
            })];

            let product = state
                .products
                .get_mut(&product_id.0)
                .ok_or_else(|| revert("nonexistent token"))?;
            product.owner = *to;

            // The first sale starts the warranty clock.
            if let Some(expiration) = activation {
                product.details.warranty_start = now;
                product.details.warranty_expiration = expiration;
                emitted.push(RecordPayload::WarrantyActivated(WarrantyActivated {
                    product_id: *product_id,
                    customer: *to,
                    starts_at: now,
                    expires_at: product.details.warranty_expiration,
                }));
            }
            Ok(emitted)
        }

        WriteCall::SubmitClaim { product_id, issue } => {
            let product = state.product(*product_id)?;
            if product.owner != sender {
                return Err(revert("caller is not the product owner"));
            }
            let details = &product.details;
            if details.warranty_start == 0 || now >= details.warranty_expiration {
                return Err(revert("warranty not active"));
            }
            if details.claim_count >= details.claim_limit {
                return Err(revert("claim limit reached"));
            }
            if issue.trim().is_empty() {
                return Err(revert("issue description required"));
            }

            let claim_id = ClaimId(state.claims.len() as u64 + 1);
            state.claims.insert(
                claim_id.0,
                WarrantyClaim {
                    product_id: *product_id,
                    customer: sender,
                    issue: issue.clone(),
                    submitted_at: now,
                    processed: false,
                    approved: false,
                    service_notes: String::new(),
                    processed_at: 0,
                },
            );
            if let Some(product) = state.products.get_mut(&product_id.0) {
                product.details.claim_count += 1;
            }

            Ok(vec![RecordPayload::ClaimSubmitted(ClaimSubmitted {
                claim_id,
                product_id: *product_id,
                customer: sender,
                issue: issue.clone(),
                submitted_at: now,
            })])
        }

        WriteCall::ProcessClaim { claim_id, approved } => {
            state.require_role(Role::ServiceCenter, &sender)?;
            let claim = state
                .claims
                .get_mut(&claim_id.0)
                .ok_or_else(|| revert("nonexistent claim"))?;
            if claim.processed {
                return Err(revert("claim already processed"));
            }
            claim.processed = true;
            claim.approved = *approved;
            claim.processed_at = now;

            Ok(vec![RecordPayload::ClaimProcessed(ClaimProcessed {
                claim_id: *claim_id,
                product_id: claim.product_id,
                service_center: sender,
                approved: *approved,
                processed_at: now,
            })])
        }

        WriteCall::RecordService { claim_id, notes } => {
            state.require_role(Role::ServiceCenter, &sender)?;
            let claim = state
                .claims
                .get_mut(&claim_id.0)
                .ok_or_else(|| revert("nonexistent claim"))?;
            if !(claim.processed && claim.approved) {
                return Err(revert("claim not approved"));
            }
            claim.service_notes = notes.clone();

            Ok(vec![RecordPayload::ServiceRecorded(ServiceRecorded {
                product_id: claim.product_id,
                claim_id: *claim_id,
                service_center: sender,
                notes: notes.clone(),
                serviced_at: now,
            })])
        }

        WriteCall::GrantRole { role, account } => {
            state.require_role(Role::Admin, &sender)?;
            state
                .roles
                .entry(role.conventional_id())
                .or_default()
                .insert(*account);
            Ok(Vec::new())
        }
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn point_read(&self, call: &PointCall) -> GatewayResult<Vec<Value>> {
        let state = self.read_state()?;
        let values = match call {
            PointCall::OwnerOf { product_id } => {
                let owner = state
                    .products
                    .get(&product_id.0)
                    .map(|product| product.owner)
                    .unwrap_or(Address::ZERO);
                vec![codec::encode_address(&owner)]
            }
            PointCall::ProductDetails { product_id } => match state.products.get(&product_id.0) {
                Some(product) => codec::encode_product_details(&product.details),
                None => codec::encode_product_details(&ProductDetails {
                    serial_number: String::new(),
                    model: String::new(),
                    manufacturer: Address::ZERO,
                    manufactured_at: 0,
                    warranty_duration: 0,
                    warranty_start: 0,
                    warranty_expiration: 0,
                    claim_limit: 0,
                    claim_count: 0,
                }),
            },
            PointCall::WarrantyClaim { claim_id } => match state.claims.get(&claim_id.0) {
                Some(claim) => codec::encode_warranty_claim(claim),
                None => codec::encode_warranty_claim(&WarrantyClaim {
                    product_id: ProductId(0),
                    customer: Address::ZERO,
                    issue: String::new(),
                    submitted_at: 0,
                    processed: false,
                    approved: false,
                    service_notes: String::new(),
                    processed_at: 0,
                }),
            },
            PointCall::TokenIdForSerialHash { serial_hash } => {
                let id = state.serials.get(serial_hash).copied().unwrap_or(0);
                vec![codec::encode_uint(id)]
            }
            PointCall::RoleId { role } => vec![codec::encode_b256(&role.conventional_id())],
            PointCall::HasRole { role_id, account } => {
                let granted = state
                    .roles
                    .get(role_id)
                    .is_some_and(|members| members.contains(account));
                vec![Value::Bool(granted)]
            }
            PointCall::IsWarrantyActive { product_id } => {
                let now = state.latest_timestamp();
                let active = state.products.get(&product_id.0).is_some_and(|product| {
                    product.details.warranty_start > 0
                        && now < product.details.warranty_expiration
                });
                vec![Value::Bool(active)]
            }
        };
        Ok(values)
    }

    async fn stream_query(&self, query: &StreamQuery) -> GatewayResult<Vec<RawLog>> {
        let state = self.read_state()?;
        Ok(state
            .logs
            .iter()
            .filter(|log| query.matches(log))
            .cloned()
            .collect())
    }

    async fn resolve_block_timestamp(&self, transaction: &TransactionRef) -> GatewayResult<u64> {
        let state = self.read_state()?;
        state
            .transactions
            .get(transaction)
            .and_then(|block| state.blocks.get(*block as usize))
            .copied()
            .ok_or_else(|| GatewayError::Transport(format!("unknown transaction {transaction}")))
    }

    fn subscribe(&self) -> GatewayResult<Subscription> {
        Ok(Subscription::new(self.notifications.subscribe()))
    }
}

#[async_trait]
impl TransactionSubmitter for InMemoryLedger {
    async fn submit(&self, sender: Address, call: &WriteCall) -> GatewayResult<TransactionReceipt> {
        self.execute(sender, call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provenance_types::RecordKind;

    const ADMIN: Address = Address::repeat_byte(0xAA);
    const MAKER: Address = Address::repeat_byte(0x01);
    const SHOP: Address = Address::repeat_byte(0x02);
    const BUYER: Address = Address::repeat_byte(0x03);
    const FIXER: Address = Address::repeat_byte(0x04);

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::new(ADMIN, 1_000)
            .with_role(Role::Manufacturer, MAKER)
            .with_role(Role::ServiceCenter, FIXER)
    }

    fn register(ledger: &InMemoryLedger, serial: &str) -> GatewayResult<TransactionReceipt> {
        ledger.execute(
            MAKER,
            &WriteCall::RegisterProduct {
                initial_owner: SHOP,
                serial_number: serial.into(),
                model: "Phone X".into(),
                warranty_duration_secs: 365 * 86_400,
                claim_limit: 1,
            },
        )
    }

    fn transfer(ledger: &InMemoryLedger, from: Address, to: Address) -> GatewayResult<TransactionReceipt> {
        ledger.execute(
            from,
            &WriteCall::Transfer {
                from,
                to,
                product_id: ProductId(1),
            },
        )
    }

    #[tokio::test]
    async fn registration_emits_mint_and_registered_in_one_transaction() {
        let ledger = ledger();
        let receipt = register(&ledger, "SN-1").unwrap();

        let mints = ledger
            .stream_query(&StreamQuery::all(RecordKind::Transferred))
            .await
            .unwrap();
        let registered = ledger
            .stream_query(&StreamQuery::all(RecordKind::Registered))
            .await
            .unwrap();
        assert_eq!(mints.len(), 1);
        assert_eq!(registered.len(), 1);
        assert_eq!(mints[0].transaction, receipt.transaction);
        assert_eq!(registered[0].transaction, receipt.transaction);
    }

    #[test]
    fn registration_requires_manufacturer_role() {
        let ledger = ledger();
        let err = ledger
            .execute(
                BUYER,
                &WriteCall::RegisterProduct {
                    initial_owner: BUYER,
                    serial_number: "SN-1".into(),
                    model: "Phone".into(),
                    warranty_duration_secs: 1,
                    claim_limit: 1,
                },
            )
            .unwrap_err();
        assert!(matches!(err, GatewayError::Reverted(_)));
        assert_eq!(ledger.log_count(), 0);
    }

    #[test]
    fn duplicate_serial_is_rejected() {
        let ledger = ledger();
        register(&ledger, "SN-1").unwrap();
        assert_eq!(
            register(&ledger, "SN-1").unwrap_err(),
            GatewayError::Reverted("serial number already registered".into())
        );
    }

    #[tokio::test]
    async fn first_sale_activates_warranty() {
        let ledger = ledger();
        register(&ledger, "SN-1").unwrap();
        ledger.set_next_block_timestamp(5_000);
        transfer(&ledger, SHOP, BUYER).unwrap();

        let values = ledger
            .point_read(&PointCall::ProductDetails {
                product_id: ProductId(1),
            })
            .await
            .unwrap();
        let details = codec::decode_product_details(&values).unwrap().unwrap();
        assert_eq!(details.warranty_start, 5_000);
        assert_eq!(details.warranty_expiration, 5_000 + 365 * 86_400);

        let activations = ledger
            .stream_query(&StreamQuery::all(RecordKind::WarrantyActivated))
            .await
            .unwrap();
        assert_eq!(activations.len(), 1);

        transfer(&ledger, BUYER, SHOP).unwrap();
        let activations = ledger
            .stream_query(&StreamQuery::all(RecordKind::WarrantyActivated))
            .await
            .unwrap();
        assert_eq!(activations.len(), 1);
    }

    #[test]
    fn only_the_owner_can_transfer() {
        let ledger = ledger();
        register(&ledger, "SN-1").unwrap();
        assert!(transfer(&ledger, BUYER, SHOP).is_err());
    }

    #[test]
    fn claims_respect_limit_and_service_requires_approval() {
        let ledger = ledger();
        register(&ledger, "SN-1").unwrap();
        transfer(&ledger, SHOP, BUYER).unwrap();

        let submit = WriteCall::SubmitClaim {
            product_id: ProductId(1),
            issue: "cracked screen".into(),
        };
        ledger.execute(BUYER, &submit).unwrap();
        assert_eq!(
            ledger.execute(BUYER, &submit).unwrap_err(),
            GatewayError::Reverted("claim limit reached".into())
        );

        let service = WriteCall::RecordService {
            claim_id: ClaimId(1),
            notes: "replaced screen".into(),
        };
        assert!(ledger.execute(FIXER, &service).is_err());

        ledger
            .execute(
                FIXER,
                &WriteCall::ProcessClaim {
                    claim_id: ClaimId(1),
                    approved: true,
                },
            )
            .unwrap();
        ledger.execute(FIXER, &service).unwrap();
    }

    #[test]
    fn expired_warranty_rejects_claims() {
        let ledger = ledger();
        register(&ledger, "SN-1").unwrap();
        transfer(&ledger, SHOP, BUYER).unwrap();
        ledger.advance_time(366 * 86_400);
        let err = ledger
            .execute(
                BUYER,
                &WriteCall::SubmitClaim {
                    product_id: ProductId(1),
                    issue: "late".into(),
                },
            )
            .unwrap_err();
        assert_eq!(err, GatewayError::Reverted("warranty not active".into()));
    }

    #[test]
    fn grant_role_requires_admin() {
        let ledger = ledger();
        let grant = WriteCall::GrantRole {
            role: Role::Retailer,
            account: SHOP,
        };
        assert!(ledger.execute(MAKER, &grant).is_err());
        ledger.execute(ADMIN, &grant).unwrap();
        assert!(ledger.read_state().unwrap().has_role(Role::Retailer, &SHOP));
    }

    #[tokio::test]
    async fn block_timestamps_follow_pins_and_never_go_back() {
        let ledger = ledger();
        ledger.set_next_block_timestamp(100);
        let first = register(&ledger, "SN-1").unwrap();
        assert_eq!(
            ledger.resolve_block_timestamp(&first.transaction).await.unwrap(),
            1_000
        );

        ledger.set_next_block_timestamp(2_000);
        let second = register(&ledger, "SN-2").unwrap();
        assert_eq!(
            ledger.resolve_block_timestamp(&second.transaction).await.unwrap(),
            2_000
        );
        assert_eq!(ledger.latest_block(), (2, 2_000));
    }

    #[tokio::test]
    async fn unknown_transaction_timestamp_is_an_error() {
        let ledger = ledger();
        let err = ledger
            .resolve_block_timestamp(&TransactionRef(B256::repeat_byte(7)))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[tokio::test]
    async fn subscribers_receive_blocks_and_records_until_disposed() {
        let ledger = ledger();
        let mut subscription = ledger.subscribe().unwrap();
        assert_eq!(ledger.subscriber_count(), 1);

        register(&ledger, "SN-1").unwrap();
        assert!(matches!(
            subscription.recv().await,
            Some(LedgerNotification::NewBlock { number: 1, .. })
        ));
        assert!(matches!(
            subscription.recv().await,
            Some(LedgerNotification::Record(ref log)) if log.event == "Transfer"
        ));

        subscription.unsubscribe();
        assert_eq!(ledger.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn account_switches_reach_subscribers() {
        let ledger = ledger();
        let mut subscription = ledger.subscribe().unwrap();

        ledger.set_active_account(Some(BUYER));
        ledger.set_active_account(None);
        assert!(matches!(
            subscription.recv().await,
            Some(LedgerNotification::AccountChanged(Some(account))) if account == BUYER
        ));
        assert!(matches!(
            subscription.recv().await,
            Some(LedgerNotification::AccountChanged(None))
        ));
    }

    #[tokio::test]
    async fn overflowing_warranty_reverts_without_poisoning_state() {
        let ledger = ledger();
        ledger
            .execute(
                MAKER,
                &WriteCall::RegisterProduct {
                    initial_owner: SHOP,
                    serial_number: "SN-MAX".into(),
                    model: "Phone X".into(),
                    warranty_duration_secs: u64::MAX,
                    claim_limit: 1,
                },
            )
            .unwrap();

        assert_eq!(
            transfer(&ledger, SHOP, BUYER).unwrap_err(),
            GatewayError::Reverted("warranty expiration overflow".into())
        );
        let owner = ledger
            .point_read(&PointCall::OwnerOf {
                product_id: ProductId(1),
            })
            .await
            .unwrap();
        assert_eq!(codec::decode_single_address("ownerOf", &owner).unwrap(), SHOP);
    }

    #[test]
    fn advancing_time_past_the_end_saturates() {
        let ledger = ledger();
        ledger.advance_time(u64::MAX);
        register(&ledger, "SN-1").unwrap();
        assert_eq!(ledger.latest_block(), (1, u64::MAX));
        register(&ledger, "SN-2").unwrap();
        assert_eq!(ledger.latest_block(), (2, u64::MAX));
    }
}
