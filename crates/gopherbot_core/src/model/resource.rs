//! Resource entity: a named link.

use serde::{Deserialize, Serialize};

/// Surrogate key of a `resource` row.
pub type ResourceId = i64;

/// One registered resource.
///
/// `name` is unique only by convention: two rows may share a name when their
/// urls differ, but `(name, url)` never repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub url: String,
}
