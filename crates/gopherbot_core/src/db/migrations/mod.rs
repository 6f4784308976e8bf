//! Registry schema versions.
//!
//! | version | change |
//! |---|---|
//! | 1 | `resource`, `team`, `resource_to_team` with cascading FKs |
//! | 2 | merge duplicate rows, then unique indexes on `(name, url)`, team `name` and `(resource_id, team_id)` |
//!
//! The applied version lives in `PRAGMA user_version`. Pending steps run in
//! one transaction, so a failed upgrade leaves the file at its old version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, sql)` in ascending version order.
const STEPS: &[(u32, &str)] = &[
    (1, include_str!("0001_init.sql")),
    (2, include_str!("0002_unique_keys.sql")),
];

/// Highest schema version this build can write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |&(version, _)| version)
}

/// Brings `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let to = latest_version();

    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }

    let pending: Vec<_> = STEPS.iter().filter(|&&(version, _)| version > from).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for &&(version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from} to_version={to} steps={}",
        pending.len()
    );
    Ok(())
}
