//! Repository layer: persistence collaborator interfaces.
//!
//! The SQL-backed implementations live in the service binary; this crate
//! specifies the traits the saga and seeder depend on and ships in-memory
//! implementations for tests and wiring demos.

pub mod memory;
mod team_repo;
mod tenant_repo;

pub use memory::{InMemoryTeamRepository, InMemoryTenantRepository};
pub use team_repo::TeamRepository;
pub use tenant_repo::TenantRepository;

use std::sync::Arc;

/// Aggregates all repositories for convenient access.
///
/// Cloning is cheap since every repository is behind an `Arc`.
#[derive(Clone)]
pub struct Repositories {
    pub tenants: Arc<dyn TenantRepository>,
    pub teams: Arc<dyn TeamRepository>,
}

impl Repositories {
    pub fn new(tenants: Arc<dyn TenantRepository>, teams: Arc<dyn TeamRepository>) -> Self {
        Self { tenants, teams }
    }

    /// In-memory repositories, mainly for tests and demos.
    pub fn in_memory() -> Self {
        Self {
            tenants: Arc::new(InMemoryTenantRepository::new()),
            teams: Arc::new(InMemoryTeamRepository::new()),
        }
    }
}
