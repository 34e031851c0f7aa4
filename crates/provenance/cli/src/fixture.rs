//! JSON fixture ledgers.
//!
//! A fixture names the admin account, optional genesis role grants, and a
//! list of write calls. Replaying it into an [`InMemoryLedger`] produces the
//! ledger history the query commands run against.

use std::path::Path;
use std::sync::Arc;

use provenance_gateway::{InMemoryLedger, LedgerClient, WriteCall};
use provenance_types::{Address, Role};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub admin: Address,

    #[serde(default)]
    pub genesis_timestamp: u64,

    /// Roles assigned at genesis, without admin transactions.
    #[serde(default)]
    pub roles: Vec<RoleGrant>,

    #[serde(default)]
    pub steps: Vec<FixtureStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role: Role,
    pub account: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureStep {
    pub sender: Address,

    /// Block time for this step; defaults to the ledger's block interval.
    #[serde(default)]
    pub at: Option<u64>,

    pub call: WriteCall,
}

/// Summary of a replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    pub reverted: usize,
}

impl Fixture {
    pub fn from_file(path: impl AsRef<Path>) -> CliResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CliError::Fixture(format!("{}: {e}", path.display())))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> CliResult<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Build a ledger and replay every step into it. Reverted steps are
    /// reported and skipped.
    pub async fn replay(&self) -> (Arc<InMemoryLedger>, ReplayReport) {
        let ledger = self.roles.iter().fold(
            InMemoryLedger::new(self.admin, self.genesis_timestamp),
            |ledger, grant| ledger.with_role(grant.role, grant.account),
        );
        let ledger = Arc::new(ledger);
        let client = LedgerClient::shared(Arc::clone(&ledger));

        let mut report = ReplayReport::default();
        for (index, step) in self.steps.iter().enumerate() {
            if let Some(at) = step.at {
                ledger.set_next_block_timestamp(at);
            }
            let outcome = client.submit(step.sender, step.call.clone()).await;
            if outcome.success {
                report.applied += 1;
            } else {
                report.reverted += 1;
                warn!(
                    step = index,
                    selector = step.call.selector(),
                    error = outcome.error.as_deref().unwrap_or("unknown"),
                    "Fixture step reverted"
                );
            }
        }

        info!(
            applied = report.applied,
            reverted = report.reverted,
            "Fixture replayed"
        );
        (ledger, report)
    }
}
