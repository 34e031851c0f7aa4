//! Role resolution for one account.
//!
//! Four independent membership checks, issued concurrently. Authorization
//! fails closed: any failure yields an empty role set, never an error.

use futures::join;
use provenance_gateway::{GatewayResult, LedgerClient, LedgerGateway};
use provenance_types::{Address, Role, RoleSet, B256};
use tracing::{instrument, warn};

pub struct RoleResolver<G> {
    client: LedgerClient<G>,
}

impl<G: LedgerGateway> RoleResolver<G> {
    pub fn new(client: LedgerClient<G>) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, account: Address) -> RoleSet {
        match self.try_resolve(account).await {
            Ok(roles) => roles,
            Err(err) => {
                warn!(account = %account, error = %err, "Role resolution failed; denying all roles");
                RoleSet::none()
            }
        }
    }

    async fn try_resolve(&self, account: Address) -> GatewayResult<RoleSet> {
        let (manufacturer, retailer, service_center) = join!(
            self.client.role_id(Role::Manufacturer),
            self.client.role_id(Role::Retailer),
            self.client.role_id(Role::ServiceCenter),
        );
        let (manufacturer, retailer, service_center) = (manufacturer?, retailer?, service_center?);

        let (admin, manufacturer, retailer, service_center) = join!(
            self.client.has_role(B256::ZERO, account),
            self.client.has_role(manufacturer, account),
            self.client.has_role(retailer, account),
            self.client.has_role(service_center, account),
        );

        Ok(RoleSet {
            admin: admin?,
            manufacturer: manufacturer?,
            retailer: retailer?,
            service_center: service_center?,
        })
    }
}
