//! Team entity: a tag used to classify resources.

use serde::{Deserialize, Serialize};

/// Surrogate key of a `team` row.
pub type TeamId = i64;

/// One registered team. Team names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}
