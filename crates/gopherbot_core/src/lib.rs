//! Core of the gopher chat bot: a registry of named links ("resources"),
//! tags ("teams") and the associations between them, plus the dispatcher
//! that turns `/gopher ...` chat commands into registry calls.

pub mod config;
pub mod db;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{BotConfig, ConfigError};
pub use dispatch::command::CommandLine;
pub use dispatch::dispatcher::{DispatchError, DispatchResult, Dispatcher};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::link::ResourceTeamLink;
pub use model::resource::{Resource, ResourceId};
pub use model::team::{Team, TeamId};
pub use model::validation::ValidationError;
pub use repo::registry_repo::{
    RegistryRepository, RepoError, RepoResult, SqliteRegistryRepository,
};
pub use service::registry_service::{
    EntityKind, RegistryError, RegistryResult, RegistryService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
