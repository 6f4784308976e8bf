//! Registry store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own every read and write against `resource`, `team` and
//!   `resource_to_team`.
//! - Implement idempotent creation and the team join query.
//!
//! # Invariants
//! - Idempotent inserts rely on the unique indexes from schema v2 and run in
//!   an IMMEDIATE transaction, so two writers never both insert the same key.
//! - Lookups that find nothing return `Ok(None)`; only storage failures are
//!   `RepoError::Db`.
//! - Deleting a resource removes its links through `ON DELETE CASCADE`.
//! - Writes validate names/urls before touching SQL.

use crate::db::{DbError, DbResult};
use crate::model::link::ResourceTeamLink;
use crate::model::resource::{Resource, ResourceId};
use crate::model::team::{Team, TeamId};
use crate::model::validation::{normalize_name, normalize_url, ValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RESOURCE_SELECT_SQL: &str = "SELECT r.id, r.name, r.url FROM resource r";
const TEAM_SELECT_SQL: &str = "SELECT t.id, t.name FROM team t";

pub type RepoResult<T> = Result<T, RepoError>;

/// Registry repository error.
#[derive(Debug)]
pub enum RepoError {
    /// No resource row carries this name.
    ResourceNotFound(String),
    /// No team row carries this name.
    TeamNotFound(String),
    Validation(ValidationError),
    Db(DbError),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Whether the error is an expected outcome rather than a store failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ResourceNotFound(_) | Self::TeamNotFound(_) | Self::Validation(_)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResourceNotFound(name) => write!(f, "resource not found: {name}"),
            Self::TeamNotFound(name) => write!(f, "tag not found: {name}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "registry schema is missing table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "registry schema is missing column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the resource/team registry.
///
/// Mutations take `&mut self`: a repository value is the single mutual
/// exclusion domain for its connection.
pub trait RegistryRepository {
    /// Inserts `(name, url)` unless that exact pair exists. Returns whether a
    /// row was inserted.
    fn create_resource(&mut self, name: &str, url: &str) -> RepoResult<bool>;
    /// Returns the lowest-id resource with this name.
    fn get_resource(&self, name: &str) -> RepoResult<Option<Resource>>;
    /// Returns every resource.
    fn list_resources(&self) -> RepoResult<Vec<Resource>>;
    /// Returns resources tagged with `team_name`. Unknown teams yield an
    /// empty list.
    fn query_resources_by_team(&self, team_name: &str) -> RepoResult<Vec<Resource>>;
    /// Deletes every resource with this name, cascading to links. Returns the
    /// number of resource rows removed.
    fn delete_resource(&mut self, name: &str) -> RepoResult<usize>;
    /// Inserts a team unless one with this name exists. Returns whether a row
    /// was inserted.
    fn create_team(&mut self, name: &str) -> RepoResult<bool>;
    fn get_team(&self, name: &str) -> RepoResult<Option<Team>>;
    fn list_teams(&self) -> RepoResult<Vec<Team>>;
    /// Tags a resource with a team. Fails without writing when either name is
    /// unknown; the resource is checked first. Returns whether a link was
    /// inserted.
    fn register_resource(&mut self, resource_name: &str, team_name: &str) -> RepoResult<bool>;
    /// Removes the exact link. Unknown names fail as in `register_resource`;
    /// an absent link is a no-op. Returns whether a link was removed.
    fn deregister_resource(&mut self, resource_name: &str, team_name: &str)
        -> RepoResult<bool>;
    /// Returns every association row.
    fn list_links(&self) -> RepoResult<Vec<ResourceTeamLink>>;
}

/// SQLite-backed registry repository owning its connection.
pub struct SqliteRegistryRepository {
    conn: Connection,
}

impl SqliteRegistryRepository {
    /// Constructs a repository from a migrated connection.
    ///
    /// Fails when the registry tables are missing, i.e. the connection was
    /// not produced by `open_db`/`open_db_in_memory` or an equivalent
    /// external bootstrap.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_registry_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Read access to the underlying handle.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Gives the connection back without closing it.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Closes the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> DbResult<()> {
        self.conn.close().map_err(|(_, err)| DbError::Sqlite(err))
    }

    fn immediate_tx(&mut self) -> RepoResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

impl RegistryRepository for SqliteRegistryRepository {
    fn create_resource(&mut self, name: &str, url: &str) -> RepoResult<bool> {
        let name = normalize_name("resource name", name)?;
        let url = normalize_url(url)?;

        let tx = self.immediate_tx()?;
        let inserted = tx.execute(
            "INSERT INTO resource (name, url)
             VALUES (?1, ?2)
             ON CONFLICT (name, url) DO NOTHING;",
            params![name, url],
        )?;
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn get_resource(&self, name: &str) -> RepoResult<Option<Resource>> {
        let resource = self
            .conn
            .query_row(
                &format!("{RESOURCE_SELECT_SQL} WHERE r.name = ?1 ORDER BY r.id ASC LIMIT 1;"),
                [name.trim()],
                parse_resource_row,
            )
            .optional()?;
        Ok(resource)
    }

    fn list_resources(&self) -> RepoResult<Vec<Resource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOURCE_SELECT_SQL} ORDER BY r.id ASC;"))?;
        let rows = stmt.query_map([], parse_resource_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn query_resources_by_team(&self, team_name: &str) -> RepoResult<Vec<Resource>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESOURCE_SELECT_SQL}
             INNER JOIN resource_to_team rt ON rt.resource_id = r.id
             INNER JOIN team t ON t.id = rt.team_id
             WHERE t.name = ?1
             ORDER BY r.id ASC;"
        ))?;
        let rows = stmt.query_map([team_name.trim()], parse_resource_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn delete_resource(&mut self, name: &str) -> RepoResult<usize> {
        let tx = self.immediate_tx()?;
        let removed = tx.execute("DELETE FROM resource WHERE name = ?1;", [name.trim()])?;
        tx.commit()?;
        Ok(removed)
    }

    fn create_team(&mut self, name: &str) -> RepoResult<bool> {
        let name = normalize_name("tag name", name)?;

        let tx = self.immediate_tx()?;
        let inserted = tx.execute(
            "INSERT INTO team (name)
             VALUES (?1)
             ON CONFLICT (name) DO NOTHING;",
            [name.as_str()],
        )?;
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn get_team(&self, name: &str) -> RepoResult<Option<Team>> {
        let team = self
            .conn
            .query_row(
                &format!("{TEAM_SELECT_SQL} WHERE t.name = ?1 ORDER BY t.id ASC LIMIT 1;"),
                [name.trim()],
                parse_team_row,
            )
            .optional()?;
        Ok(team)
    }

    fn list_teams(&self) -> RepoResult<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TEAM_SELECT_SQL} ORDER BY t.id ASC;"))?;
        let rows = stmt.query_map([], parse_team_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn register_resource(&mut self, resource_name: &str, team_name: &str) -> RepoResult<bool> {
        let tx = self.immediate_tx()?;
        let (resource_id, team_id) = resolve_link_ids(&tx, resource_name, team_name)?;
        let inserted = tx.execute(
            "INSERT INTO resource_to_team (resource_id, team_id)
             VALUES (?1, ?2)
             ON CONFLICT (resource_id, team_id) DO NOTHING;",
            params![resource_id, team_id],
        )?;
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn deregister_resource(
        &mut self,
        resource_name: &str,
        team_name: &str,
    ) -> RepoResult<bool> {
        let tx = self.immediate_tx()?;
        let (resource_id, team_id) = resolve_link_ids(&tx, resource_name, team_name)?;
        let removed = tx.execute(
            "DELETE FROM resource_to_team WHERE resource_id = ?1 AND team_id = ?2;",
            params![resource_id, team_id],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn list_links(&self) -> RepoResult<Vec<ResourceTeamLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, resource_id, team_id
             FROM resource_to_team
             ORDER BY id ASC;",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ResourceTeamLink {
                id: row.get("id")?,
                resource_id: row.get("resource_id")?,
                team_id: row.get("team_id")?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// Resolves both link endpoints inside the caller's transaction. An early
/// return drops the transaction, which rolls back.
fn resolve_link_ids(
    tx: &Transaction<'_>,
    resource_name: &str,
    team_name: &str,
) -> RepoResult<(ResourceId, TeamId)> {
    let resource_name = resource_name.trim();
    let team_name = team_name.trim();

    let resource_id: Option<ResourceId> = tx
        .query_row(
            "SELECT id FROM resource WHERE name = ?1 ORDER BY id ASC LIMIT 1;",
            [resource_name],
            |row| row.get(0),
        )
        .optional()?;
    let Some(resource_id) = resource_id else {
        return Err(RepoError::ResourceNotFound(resource_name.to_string()));
    };

    let team_id: Option<TeamId> = tx
        .query_row(
            "SELECT id FROM team WHERE name = ?1 ORDER BY id ASC LIMIT 1;",
            [team_name],
            |row| row.get(0),
        )
        .optional()?;
    let Some(team_id) = team_id else {
        return Err(RepoError::TeamNotFound(team_name.to_string()));
    };

    Ok((resource_id, team_id))
}

fn parse_resource_row(row: &Row<'_>) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: row.get("id")?,
        name: row.get("name")?,
        url: row.get("url")?,
    })
}

fn parse_team_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

fn ensure_registry_connection_ready(conn: &Connection) -> RepoResult<()> {
    const REQUIRED: &[(&str, &[&str])] = &[
        ("resource", &["id", "name", "url"]),
        ("team", &["id", "name"]),
        ("resource_to_team", &["id", "resource_id", "team_id"]),
    ];

    for &(table, columns) in REQUIRED {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
