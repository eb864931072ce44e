//! Tenant entities and access levels.

use serde::{Deserialize, Serialize};

/// Access a user holds on a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    Owner,
}

/// A tenant (one organization's roster space).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Stringified UUIDv4
    pub id: String,
    pub name: String,
}

/// Grant of access to a tenant for one user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantUserAccess {
    pub tenant_id: String,
    pub user_account_id: String,
    pub access_level: AccessLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_level_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&AccessLevel::Owner).unwrap();
        assert_eq!(json, "\"OWNER\"");
    }

    #[test]
    fn tenant_round_trips_through_json() {
        let tenant = Tenant {
            id: "4e9a".to_string(),
            name: "Acme".to_string(),
        };
        let json = serde_json::to_string(&tenant).unwrap();
        let back: Tenant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tenant);
    }
}
