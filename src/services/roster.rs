//! Default roster seeding for newly onboarded tenants.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::messaging::{Envelope, EventHandler};
use crate::models::Team;
use crate::repositories::TeamRepository;
use crate::services::onboarding::NEW_TENANT_DATA_VERSION;

/// The fixed league every new tenant starts with.
pub const DEFAULT_LEAGUE: [&str; 32] = [
    "Arbor Falls Acorns",
    "Basin City Barracudas",
    "Cedar Ridge Comets",
    "Dockside Dynamos",
    "Eastgate Elks",
    "Foundry Flats Forgers",
    "Granite Bay Gulls",
    "Harborview Herons",
    "Iron Hollow Ironsides",
    "Junction City Jackrabbits",
    "Kings Landing Kestrels",
    "Lakemont Lynx",
    "Meadowbrook Mustangs",
    "Northpoint Narwhals",
    "Oakhurst Otters",
    "Pinecrest Prowlers",
    "Quarry Town Quakes",
    "Redstone Raptors",
    "Silver Creek Stallions",
    "Timberline Titans",
    "Union Square Urchins",
    "Valley Forge Vipers",
    "Westbrook Wolves",
    "Crosswind Condors",
    "Yellow Pine Yaks",
    "Zenith City Zephyrs",
    "Ashford Admirals",
    "Brookfield Bisons",
    "Clearwater Cougars",
    "Dunmore Drakes",
    "Elmwood Eagles",
    "Fairhaven Falcons",
];

/// Payload of a new-tenant event, as of `data_version` 1.0.0.
#[derive(Debug, Deserialize)]
struct NewTenantData {
    id: String,
}

/// Background listener that seeds a tenant's default roster.
///
/// Consumes new-tenant events from the tenant-events exchange and inserts
/// one team per [`DEFAULT_LEAGUE`] entry as a single atomic batch. A batch
/// insert failure is terminal for that tenant: the triggering message was
/// acknowledged at delivery and will not come back.
pub struct RosterSeeder {
    teams: Arc<dyn TeamRepository>,
}

impl RosterSeeder {
    pub fn new(teams: Arc<dyn TeamRepository>) -> Self {
        Self { teams }
    }
}

#[async_trait]
impl EventHandler for RosterSeeder {
    async fn handle(&self, envelope: Envelope) -> AppResult<()> {
        if envelope.data_version != NEW_TENANT_DATA_VERSION {
            // Schema mismatch between publisher and this consumer; nothing
            // can be partially interpreted, so the message is rejected
            // whole.
            tracing::error!(
                data_version = %envelope.data_version,
                supported = NEW_TENANT_DATA_VERSION,
                "Unsupported new-tenant event version, message skipped"
            );
            return Err(AppError::UnprocessableContent {
                message: format!(
                    "unsupported new-tenant event version '{}'",
                    envelope.data_version
                ),
            });
        }

        let data: NewTenantData = envelope.decode()?;

        let teams: Vec<Team> = DEFAULT_LEAGUE
            .iter()
            .map(|name| Team {
                id: Uuid::new_v4().to_string(),
                tenant_id: data.id.clone(),
                name: (*name).to_string(),
            })
            .collect();

        self.teams.insert_teams(&teams).await?;
        tracing::info!(
            tenant_id = %data.id,
            teams = teams.len(),
            "Seeded default roster for tenant"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "roster-seeder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryTeamRepository;

    fn new_tenant_envelope(version: &str, tenant_id: &str) -> Envelope {
        Envelope::new(version, &serde_json::json!({ "id": tenant_id, "name": "Acme" }))
            .unwrap()
    }

    #[tokio::test]
    async fn supported_version_seeds_the_full_league() {
        let teams = Arc::new(InMemoryTeamRepository::new());
        let seeder = RosterSeeder::new(teams.clone());

        seeder
            .handle(new_tenant_envelope("1.0.0", "acme"))
            .await
            .unwrap();

        let seeded = teams.select_teams_by_tenant("acme").await.unwrap();
        assert_eq!(seeded.len(), DEFAULT_LEAGUE.len());
        assert!(seeded.iter().all(|t| t.tenant_id == "acme"));
    }

    #[tokio::test]
    async fn unsupported_version_seeds_nothing() {
        let teams = Arc::new(InMemoryTeamRepository::new());
        let seeder = RosterSeeder::new(teams.clone());

        let result = seeder.handle(new_tenant_envelope("2.0.0", "acme")).await;

        assert!(matches!(
            result,
            Err(AppError::UnprocessableContent { .. })
        ));
        assert!(teams.select_teams_by_tenant("acme").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_seeds_nothing() {
        let teams = Arc::new(InMemoryTeamRepository::new());
        let seeder = RosterSeeder::new(teams.clone());

        let envelope =
            Envelope::new("1.0.0", &serde_json::json!({ "tenant": "wrong-shape" })).unwrap();
        assert!(seeder.handle(envelope).await.is_err());
        assert!(teams.select_teams_by_tenant("acme").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_batch_leaves_no_partial_roster() {
        let teams = Arc::new(InMemoryTeamRepository::new());
        teams.fail_next_batch();
        let seeder = RosterSeeder::new(teams.clone());

        let result = seeder.handle(new_tenant_envelope("1.0.0", "acme")).await;

        assert!(result.is_err());
        assert!(teams.select_teams_by_tenant("acme").await.unwrap().is_empty());
    }
}
