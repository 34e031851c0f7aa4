//! Access-control roles.

use std::fmt;

use alloy_primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manufacturer,
    Retailer,
    ServiceCenter,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::Manufacturer,
        Role::Retailer,
        Role::ServiceCenter,
    ];

    /// Contract constant name for the role.
    pub fn constant_name(self) -> &'static str {
        match self {
            Role::Admin => "DEFAULT_ADMIN_ROLE",
            Role::Manufacturer => "MANUFACTURER_ROLE",
            Role::Retailer => "RETAILER_ROLE",
            Role::ServiceCenter => "SERVICE_CENTER_ROLE",
        }
    }

    /// Role identifier under the usual access-control convention: zero for
    /// the admin role, keccak-256 of the constant name otherwise.
    pub fn conventional_id(self) -> B256 {
        match self {
            Role::Admin => B256::ZERO,
            other => keccak256(other.constant_name().as_bytes()),
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input
            .trim()
            .trim_end_matches("_ROLE")
            .trim_end_matches("_role")
            .to_ascii_lowercase()
            .replace(['-', ' '], "_");
        match normalized.as_str() {
            "admin" | "default_admin" => Some(Role::Admin),
            "manufacturer" => Some(Role::Manufacturer),
            "retailer" => Some(Role::Retailer),
            "service_center" | "servicecenter" => Some(Role::ServiceCenter),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.constant_name())
    }
}

/// Resolved permissions of one address.
///
/// The flags mirror the ledger literally; admin does not set the others.
/// The `can_*` helpers apply the gating rule that admin is a superset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
    pub admin: bool,
    pub manufacturer: bool,
    pub retailer: bool,
    pub service_center: bool,
}

impl RoleSet {
    /// The fail-closed result.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has(&self, role: Role) -> bool {
        match role {
            Role::Admin => self.admin,
            Role::Manufacturer => self.manufacturer,
            Role::Retailer => self.retailer,
            Role::ServiceCenter => self.service_center,
        }
    }

    /// Gate check: admin passes every role gate.
    pub fn permits(&self, role: Role) -> bool {
        self.admin || self.has(role)
    }

    pub fn can_register_products(&self) -> bool {
        self.permits(Role::Manufacturer)
    }

    pub fn can_sell(&self) -> bool {
        self.permits(Role::Retailer)
    }

    pub fn can_service(&self) -> bool {
        self.permits(Role::ServiceCenter)
    }

    pub fn can_manage_roles(&self) -> bool {
        self.admin
    }

    pub fn is_empty(&self) -> bool {
        !(self.admin || self.manufacturer || self.retailer || self.service_center)
    }
}
