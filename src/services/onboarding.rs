//! Tenant onboarding saga.
//!
//! Phase 1 runs synchronously inside the calling request: insert the tenant
//! and grant the requesting user owner access. Phase 2 is fire-and-forget:
//! broadcast a versioned new-tenant event so the roster seeder can populate
//! the tenant's default teams. The caller observes eventual, not immediate,
//! roster seeding, and gets no signal when the async side completes.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppResult;
use crate::messaging::{Envelope, EventRouter};
use crate::models::{AccessLevel, Tenant, TenantUserAccess};
use crate::repositories::TenantRepository;

/// Schema version of the new-tenant event payload.
pub const NEW_TENANT_DATA_VERSION: &str = "1.0.0";

/// Routing key new-tenant events are published and bound under.
///
/// Inert under the fanout tenant-events exchange; kept so a future move to
/// a key-honoring exchange kind does not change call sites.
pub const NEW_TENANT_ROUTING_KEY: &str = "tenant.new";

/// Orchestrates tenant creation across its synchronous and asynchronous
/// phases.
#[derive(Clone)]
pub struct OnboardingService {
    tenants: Arc<dyn TenantRepository>,
    router: Arc<EventRouter>,
    tenant_exchange: String,
}

impl OnboardingService {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        router: Arc<EventRouter>,
        tenant_exchange: String,
    ) -> Self {
        Self {
            tenants,
            router,
            tenant_exchange,
        }
    }

    /// Creates a tenant owned by `user_id` and kicks off roster seeding.
    ///
    /// Both inserts must succeed before the event is published; either
    /// failure aborts the saga and nothing is published. Already-committed
    /// partial inserts are not rolled back here; transactionality across
    /// the two inserts is the repository's concern.
    ///
    /// A publish failure after both inserts is logged and swallowed: the
    /// tenant exists and is returned, but its default roster will never be
    /// seeded. This gap is a documented property of the design, not
    /// something this layer papers over with retries.
    pub async fn onboard_tenant(&self, user_id: &str, name: &str) -> AppResult<Tenant> {
        let tenant = Tenant {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        tracing::debug!(tenant_id = %tenant.id, name = %tenant.name, "Creating tenant");

        self.tenants.insert_tenant(&tenant).await?;

        let access = TenantUserAccess {
            tenant_id: tenant.id.clone(),
            user_account_id: user_id.to_string(),
            access_level: AccessLevel::Owner,
        };
        self.tenants.insert_user_access(&access).await?;

        let envelope = Envelope::new(NEW_TENANT_DATA_VERSION, &tenant)?;
        if let Err(e) = self
            .router
            .publish(&self.tenant_exchange, NEW_TENANT_ROUTING_KEY, &[envelope])
            .await
        {
            tracing::warn!(
                tenant_id = %tenant.id,
                error = %e,
                "Failed to publish new-tenant event; default roster will not be seeded"
            );
        }

        Ok(tenant)
    }

    /// Lists the tenants a user has access to.
    pub async fn list_tenants(&self, user_id: &str) -> AppResult<Vec<Tenant>> {
        self.tenants.select_tenants_by_user(user_id).await
    }
}
