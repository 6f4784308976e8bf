//! Registry use-case service.
//!
//! # Responsibility
//! - Expose the registry operations with lookup misses turned into errors.
//! - Classify failures into recoverable (not found, bad input) and fatal
//!   (store) so callers never conflate them.
//! - Emit one metadata-only log event per mutation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Log lines carry input lengths, never raw user-provided names or urls.

use crate::model::link::ResourceTeamLink;
use crate::model::resource::Resource;
use crate::model::team::Team;
use crate::model::validation::ValidationError;
use crate::repo::registry_repo::{RegistryRepository, RepoError};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Entity addressed by a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Resource,
    Team,
}

impl EntityKind {
    fn label(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Team => "tag",
        }
    }
}

/// Service error for registry use-cases.
#[derive(Debug)]
pub enum RegistryError {
    /// Lookup by name matched no row. Recoverable.
    NotFound { kind: EntityKind, name: String },
    /// Input rejected before reaching storage. Recoverable.
    Validation(ValidationError),
    /// Storage failure. Fatal for the caller.
    Store(RepoError),
}

impl RegistryError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    fn not_found(kind: EntityKind, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.trim().to_string(),
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, name } => write!(f, "{} not found: {name}", kind.label()),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "registry store failure: {err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<RepoError> for RegistryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ResourceNotFound(name) => Self::NotFound {
                kind: EntityKind::Resource,
                name,
            },
            RepoError::TeamNotFound(name) => Self::NotFound {
                kind: EntityKind::Team,
                name,
            },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry facade over a repository implementation.
pub struct RegistryService<R: RegistryRepository> {
    repo: R,
}

impl<R: RegistryRepository> RegistryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the wrapped repository, e.g. to close its connection.
    pub fn into_repo(self) -> R {
        self.repo
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates a resource; an identical `(name, url)` row makes this a no-op.
    pub fn create_resource(&mut self, name: &str, url: &str) -> RegistryResult<()> {
        let started_at = Instant::now();
        let outcome = self.repo.create_resource(name, url);
        log_mutation("resource_create", started_at, &outcome, |created| {
            format!("name_len={} url_len={} created={created}", name.len(), url.len())
        });
        outcome?;
        Ok(())
    }

    /// Resolves a resource by name.
    pub fn get_resource(&self, name: &str) -> RegistryResult<Resource> {
        self.repo
            .get_resource(name)?
            .ok_or_else(|| RegistryError::not_found(EntityKind::Resource, name))
    }

    /// Lists all resources.
    pub fn list_resources(&self) -> RegistryResult<Vec<Resource>> {
        Ok(self.repo.list_resources()?)
    }

    /// Lists resources tagged with a team.
    ///
    /// An unknown team yields an empty list, same as a team without tagged
    /// resources.
    pub fn query_resources_by_team(&self, team_name: &str) -> RegistryResult<Vec<Resource>> {
        let resources = self.repo.query_resources_by_team(team_name)?;
        debug!(
            "event=resource_query module=registry status=ok team_len={} count={}",
            team_name.len(),
            resources.len()
        );
        Ok(resources)
    }

    /// Deletes every resource with this name along with its links.
    pub fn delete_resource(&mut self, name: &str) -> RegistryResult<()> {
        let started_at = Instant::now();
        let outcome = self.repo.delete_resource(name);
        log_mutation("resource_delete", started_at, &outcome, |removed| {
            format!("name_len={} removed={removed}", name.len())
        });
        outcome?;
        Ok(())
    }

    /// Creates a team; an existing name makes this a no-op.
    pub fn create_team(&mut self, name: &str) -> RegistryResult<()> {
        let started_at = Instant::now();
        let outcome = self.repo.create_team(name);
        log_mutation("team_create", started_at, &outcome, |created| {
            format!("name_len={} created={created}", name.len())
        });
        outcome?;
        Ok(())
    }

    pub fn get_team(&self, name: &str) -> RegistryResult<Team> {
        self.repo
            .get_team(name)?
            .ok_or_else(|| RegistryError::not_found(EntityKind::Team, name))
    }

    pub fn list_teams(&self) -> RegistryResult<Vec<Team>> {
        Ok(self.repo.list_teams()?)
    }

    /// Tags a resource with a team. Tagging twice is a no-op.
    pub fn register_resource(&mut self, resource_name: &str, team_name: &str) -> RegistryResult<()> {
        let started_at = Instant::now();
        let outcome = self.repo.register_resource(resource_name, team_name);
        log_mutation("resource_register", started_at, &outcome, |linked| {
            format!("linked={linked}")
        });
        outcome?;
        Ok(())
    }

    /// Removes a tag from a resource. Removing an absent tag is a no-op.
    pub fn deregister_resource(
        &mut self,
        resource_name: &str,
        team_name: &str,
    ) -> RegistryResult<()> {
        let started_at = Instant::now();
        let outcome = self.repo.deregister_resource(resource_name, team_name);
        log_mutation("resource_deregister", started_at, &outcome, |unlinked| {
            format!("unlinked={unlinked}")
        });
        outcome?;
        Ok(())
    }

    /// Lists raw association rows.
    pub fn list_links(&self) -> RegistryResult<Vec<ResourceTeamLink>> {
        Ok(self.repo.list_links()?)
    }
}

fn log_mutation<T>(
    event: &str,
    started_at: Instant,
    outcome: &Result<T, RepoError>,
    details: impl FnOnce(&T) -> String,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match outcome {
        Ok(value) => info!(
            "event={event} module=registry status=ok duration_ms={duration_ms} {}",
            details(value)
        ),
        Err(err) if err.is_recoverable() => info!(
            "event={event} module=registry status=rejected duration_ms={duration_ms} reason={}",
            rejection_code(err)
        ),
        Err(err) => error!(
            "event={event} module=registry status=error duration_ms={duration_ms} error={err}"
        ),
    }
}

fn rejection_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::ResourceNotFound(_) => "resource_not_found",
        RepoError::TeamNotFound(_) => "team_not_found",
        RepoError::Validation(_) => "invalid_input",
        _ => "store_error",
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, RegistryError};
    use crate::repo::registry_repo::RepoError;

    #[test]
    fn repo_not_found_maps_to_named_not_found() {
        let err = RegistryError::from(RepoError::TeamNotFound("ops".to_string()));
        assert!(matches!(
            err,
            RegistryError::NotFound {
                kind: EntityKind::Team,
                ..
            }
        ));
        assert_eq!(err.to_string(), "tag not found: ops");
        assert!(!err.is_fatal());
    }

    #[test]
    fn schema_errors_are_fatal() {
        let err = RegistryError::from(RepoError::MissingRequiredTable("team"));
        assert!(err.is_fatal());
    }
}
