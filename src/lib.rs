//! Rosterhub core library
//!
//! Multi-tenant sports-roster service core: the fanout event-dispatch layer,
//! the tenant-onboarding saga, and the collaborator interfaces they depend
//! on. HTTP transport, authentication, and SQL-backed repositories live in
//! the service binary and plug in through the traits exposed here.

pub mod config;
pub mod error;
pub mod logger;
pub mod messaging;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
