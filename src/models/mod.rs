//! Domain entities that flow through the onboarding saga.

mod team;
mod tenant;

pub use team::Team;
pub use tenant::{AccessLevel, Tenant, TenantUserAccess};
