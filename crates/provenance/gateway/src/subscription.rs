//! Live ledger notifications.
//!
//! A subscription is a registration handle over a broadcast channel.
//! Delivery is a sequence of discrete notifications pulled with `recv`;
//! dropping the handle (or calling [`Subscription::unsubscribe`]) stops it.

use alloy_primitives::Address;
use provenance_types::{RawEventRecord, RecordKind};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::call::RawLog;
use crate::codec;

#[derive(Clone, Debug, PartialEq)]
pub enum LedgerNotification {
    /// A record was emitted in a newly included block.
    Record(RawLog),
    NewBlock { number: u64, timestamp: u64 },
    /// The session's active account changed; `None` when disconnected.
    AccountChanged(Option<Address>),
}

pub struct Subscription {
    receiver: broadcast::Receiver<LedgerNotification>,
}

impl Subscription {
    pub fn new(receiver: broadcast::Receiver<LedgerNotification>) -> Self {
        Self { receiver }
    }

    /// Wait for the next notification. `None` once the source is gone.
    ///
    /// Notifications missed because the receiver fell behind are skipped.
    pub async fn recv(&mut self) -> Option<LedgerNotification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscription lagged; notifications dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll.
    pub fn try_recv(&mut self) -> Option<LedgerNotification> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscription lagged; notifications dropped");
                }
                Err(_) => return None,
            }
        }
    }

    /// Explicit disposal.
    pub fn unsubscribe(self) {
        debug!("Subscription disposed");
    }
}

/// Typed record feed layered over a [`Subscription`].
pub struct RecordWatch {
    subscription: Subscription,
    kinds: Vec<RecordKind>,
}

impl RecordWatch {
    pub fn new(subscription: Subscription, kinds: &[RecordKind]) -> Self {
        Self {
            subscription,
            kinds: kinds.to_vec(),
        }
    }

    fn wants(&self, kind: RecordKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }

    /// Next decoded record of a watched kind. Undecodable records are logged
    /// and skipped.
    pub async fn next(&mut self) -> Option<RawEventRecord> {
        while let Some(notification) = self.subscription.recv().await {
            let LedgerNotification::Record(log) = notification else {
                continue;
            };
            match codec::decode_record(&log) {
                Ok(record) if self.wants(record.kind()) => return Some(record),
                Ok(_) => {}
                Err(err) => {
                    warn!(event = %log.event, error = %err, "Skipping undecodable live record");
                }
            }
        }
        None
    }

    pub fn unsubscribe(self) {
        self.subscription.unsubscribe();
    }
}
