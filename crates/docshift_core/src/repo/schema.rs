//! Connection readiness checks shared by SQLite repositories.

use super::{RepoError, RepoResult};
use crate::db::migrations::{current_user_version, latest_version};
use crate::model::period::PeriodId;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

const REQUIRED_TABLES: [&str; 2] = ["periods", "documents"];

/// Rejects connections that were not opened through `db::open_db*`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

/// Loads the `locked` flag of a period, failing when it does not exist.
pub(crate) fn period_locked(conn: &Connection, period_uuid: PeriodId) -> RepoResult<bool> {
    let locked: Option<i64> = conn
        .query_row(
            "SELECT locked FROM periods WHERE uuid = ?1;",
            [period_uuid.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    match locked {
        None => Err(RepoError::PeriodNotFound(period_uuid)),
        Some(value) => int_to_bool(value, "periods.locked"),
    }
}

/// Fails unless the period exists and is unlocked.
pub(crate) fn ensure_period_writable(conn: &Connection, period_uuid: PeriodId) -> RepoResult<()> {
    if period_locked(conn, period_uuid)? {
        return Err(RepoError::PeriodLocked(period_uuid));
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
