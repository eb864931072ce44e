//! Team entity.

use serde::{Deserialize, Serialize};

/// A team belonging to one tenant's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Stringified UUIDv4
    pub id: String,
    pub tenant_id: String,
    pub name: String,
}
