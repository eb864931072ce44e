//! Team persistence interface.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::Team;

/// Persistence collaborator for teams.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Inserts a batch of teams atomically.
    ///
    /// All-or-nothing: if any row cannot be inserted, no row from the batch
    /// is persisted. The roster seeder depends on this because the message
    /// that triggered the batch cannot be redelivered to retry a partial
    /// failure.
    async fn insert_teams(&self, teams: &[Team]) -> AppResult<()>;

    /// Lists a tenant's teams ordered by name.
    async fn select_teams_by_tenant(&self, tenant_id: &str) -> AppResult<Vec<Team>>;
}
