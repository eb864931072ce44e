//! Application state and startup wiring.

use std::sync::Arc;

use crate::config::OnboardingConfig;
use crate::error::AppResult;
use crate::messaging::EventRouter;
use crate::repositories::Repositories;
use crate::services::{NEW_TENANT_ROUTING_KEY, RosterSeeder, Services};

/// Application state containing all shared services and resources.
///
/// Cloning is cheap since services and repositories are behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Persistence collaborators
    pub repos: Repositories,
    /// The event router shared by publishers and subscribers
    pub router: Arc<EventRouter>,
    onboarding: OnboardingConfig,
}

impl AppState {
    /// Creates application state from a router and repositories.
    pub fn new(router: Arc<EventRouter>, repos: Repositories, config: &OnboardingConfig) -> Self {
        let services = Services::new(&repos, router.clone(), config);
        Self {
            services,
            repos,
            router,
            onboarding: config.clone(),
        }
    }

    /// Registers all background subscriptions.
    ///
    /// Called once during process startup, before requests are served. A
    /// failure here is fatal to startup: without its topology a subscriber
    /// would never receive anything.
    pub async fn register_subscriptions(&self) -> AppResult<()> {
        let seeder = Arc::new(RosterSeeder::new(self.repos.teams.clone()));
        self.router
            .subscribe(
                &self.onboarding.tenant_exchange,
                NEW_TENANT_ROUTING_KEY,
                seeder,
            )
            .await?;
        tracing::info!(
            exchange = %self.onboarding.tenant_exchange,
            "Registered roster seeder subscription"
        );
        Ok(())
    }
}
