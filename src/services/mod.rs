//! Service layer for business logic operations.

pub mod onboarding;
pub mod roster;

pub use onboarding::{NEW_TENANT_DATA_VERSION, NEW_TENANT_ROUTING_KEY, OnboardingService};
pub use roster::{DEFAULT_LEAGUE, RosterSeeder};

use std::sync::Arc;

use crate::config::OnboardingConfig;
use crate::messaging::EventRouter;
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
#[derive(Clone)]
pub struct Services {
    pub onboarding: OnboardingService,
}

impl Services {
    /// Creates a new Services instance from repositories and the router.
    pub fn new(repos: &Repositories, router: Arc<EventRouter>, config: &OnboardingConfig) -> Self {
        Self {
            onboarding: OnboardingService::new(
                repos.tenants.clone(),
                router,
                config.tenant_exchange.clone(),
            ),
        }
    }
}
