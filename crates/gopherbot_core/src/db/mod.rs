//! Store bootstrap for the resource/team registry.
//!
//! The registry never opens connections on its own: callers obtain one here,
//! hand it to `SqliteRegistryRepository::try_new`, and get it back through
//! `close`/`into_connection`.
//!
//! # Invariants
//! - A connection returned by `open_db*` has `resource`, `team` and
//!   `resource_to_team` at the latest schema version.
//! - Every `DbError` is fatal to the registry: lookups that merely find no
//!   row never produce one.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// SQLite refused a statement or the file could not be opened.
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build; refusing to touch it.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "registry schema v{db_version} is ahead of this build (knows up to v{latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
