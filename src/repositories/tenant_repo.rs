//! Tenant persistence interface.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Tenant, TenantUserAccess};

/// Persistence collaborator for tenants and their access grants.
///
/// Implementations live outside this crate (a SQL-backed one in the
/// service binary); the in-memory implementation in
/// [`crate::repositories::memory`] backs the tests.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Inserts a tenant row.
    async fn insert_tenant(&self, tenant: &Tenant) -> AppResult<()>;

    /// Inserts an access grant for a user on a tenant.
    async fn insert_user_access(&self, access: &TenantUserAccess) -> AppResult<()>;

    /// Lists the tenants a user has access to.
    async fn select_tenants_by_user(&self, user_id: &str) -> AppResult<Vec<Tenant>>;
}
