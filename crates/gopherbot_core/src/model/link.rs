//! Resource-to-team association row.
//!
//! # Invariants
//! - `(resource_id, team_id)` is unique.
//! - Rows disappear together with either parent (`ON DELETE CASCADE`).

use super::resource::ResourceId;
use super::team::TeamId;
use serde::{Deserialize, Serialize};

/// "Resource is tagged with team."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTeamLink {
    pub id: i64,
    pub resource_id: ResourceId,
    pub team_id: TeamId,
}
