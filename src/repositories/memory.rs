//! In-memory repository implementations.
//!
//! Back the tests and wiring demos. Both repositories enforce the same
//! constraints a SQL schema would (unique ids, atomic batch inserts) and
//! expose failure-injection hooks for partial-failure tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::models::{Team, Tenant, TenantUserAccess};
use crate::repositories::{TeamRepository, TenantRepository};

fn lock_store<'a, T>(store: &'a Mutex<T>, name: &str) -> AppResult<MutexGuard<'a, T>> {
    store.lock().map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("{name} store lock poisoned: {e}"),
    })
}

/// Tenants and access grants in process memory.
#[derive(Default)]
pub struct InMemoryTenantRepository {
    tenants: Mutex<Vec<Tenant>>,
    access: Mutex<Vec<TenantUserAccess>>,
    fail_next_access: AtomicBool,
}

impl InMemoryTenantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `insert_user_access` call fail. Used to test saga
    /// phase-1 abort behavior.
    pub fn fail_next_user_access(&self) {
        self.fail_next_access.store(true, Ordering::SeqCst);
    }

    /// Access grants recorded for a tenant.
    pub fn access_for_tenant(&self, tenant_id: &str) -> Vec<TenantUserAccess> {
        self.access
            .lock()
            .expect("access store poisoned")
            .iter()
            .filter(|a| a.tenant_id == tenant_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TenantRepository for InMemoryTenantRepository {
    async fn insert_tenant(&self, tenant: &Tenant) -> AppResult<()> {
        let mut tenants = lock_store(&self.tenants, "tenant")?;
        if tenants.iter().any(|t| t.id == tenant.id) {
            return Err(AppError::Conflict {
                entity: "tenant".to_string(),
                field: "id".to_string(),
                value: tenant.id.clone(),
            });
        }
        tenants.push(tenant.clone());
        Ok(())
    }

    async fn insert_user_access(&self, access: &TenantUserAccess) -> AppResult<()> {
        if self.fail_next_access.swap(false, Ordering::SeqCst) {
            return Err(AppError::Database {
                operation: "insert tenant user access".to_string(),
                source: anyhow::anyhow!("injected failure"),
            });
        }
        lock_store(&self.access, "access")?.push(access.clone());
        Ok(())
    }

    async fn select_tenants_by_user(&self, user_id: &str) -> AppResult<Vec<Tenant>> {
        let access = lock_store(&self.access, "access")?;
        let tenant_ids: Vec<&str> = access
            .iter()
            .filter(|a| a.user_account_id == user_id)
            .map(|a| a.tenant_id.as_str())
            .collect();

        let tenants = lock_store(&self.tenants, "tenant")?;
        Ok(tenants
            .iter()
            .filter(|t| tenant_ids.contains(&t.id.as_str()))
            .cloned()
            .collect())
    }
}

/// Teams in process memory with atomic batch inserts.
#[derive(Default)]
pub struct InMemoryTeamRepository {
    teams: Mutex<Vec<Team>>,
    fail_next_batch: AtomicBool,
}

impl InMemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `insert_teams` call fail without inserting anything.
    pub fn fail_next_batch(&self) {
        self.fail_next_batch.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn insert_teams(&self, batch: &[Team]) -> AppResult<()> {
        if self.fail_next_batch.swap(false, Ordering::SeqCst) {
            return Err(AppError::Database {
                operation: "insert teams".to_string(),
                source: anyhow::anyhow!("injected failure"),
            });
        }

        let mut teams = lock_store(&self.teams, "team")?;

        // Validate the whole batch before touching the store so a conflict
        // leaves no partial roster behind.
        for team in batch {
            if teams.iter().any(|t| t.id == team.id) {
                return Err(AppError::Conflict {
                    entity: "team".to_string(),
                    field: "id".to_string(),
                    value: team.id.clone(),
                });
            }
        }

        teams.extend(batch.iter().cloned());
        Ok(())
    }

    async fn select_teams_by_tenant(&self, tenant_id: &str) -> AppResult<Vec<Team>> {
        let teams = lock_store(&self.teams, "team")?;
        let mut result: Vec<Team> = teams
            .iter()
            .filter(|t| t.tenant_id == tenant_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}
