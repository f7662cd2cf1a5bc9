//! Period repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist accounting periods that scope document numbering.
//!
//! # Invariants
//! - Periods are validated before insert.
//! - Listing is deterministic: `start_date ASC, uuid ASC`.

use super::schema::{bool_to_int, ensure_connection_ready, int_to_bool, parse_uuid};
use super::{RepoError, RepoResult};
use crate::model::period::{Period, PeriodId};
use rusqlite::{params, Connection, Row};

const PERIOD_SELECT_SQL: &str = "SELECT uuid, start_date, end_date, locked FROM periods";

/// Repository interface for accounting periods.
pub trait PeriodRepository {
    fn create_period(&self, period: &Period) -> RepoResult<PeriodId>;
    fn get_period(&self, id: PeriodId) -> RepoResult<Option<Period>>;
    fn list_periods(&self) -> RepoResult<Vec<Period>>;
    fn set_locked(&self, id: PeriodId, locked: bool) -> RepoResult<()>;
}

/// SQLite-backed period repository.
pub struct SqlitePeriodRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePeriodRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PeriodRepository for SqlitePeriodRepository<'_> {
    fn create_period(&self, period: &Period) -> RepoResult<PeriodId> {
        period.validate()?;

        self.conn.execute(
            "INSERT INTO periods (uuid, start_date, end_date, locked)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                period.uuid.to_string(),
                period.start_date,
                period.end_date,
                bool_to_int(period.locked),
            ],
        )?;
        Ok(period.uuid)
    }

    fn get_period(&self, id: PeriodId) -> RepoResult<Option<Period>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERIOD_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_period_row(row)?));
        }
        Ok(None)
    }

    fn list_periods(&self) -> RepoResult<Vec<Period>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERIOD_SELECT_SQL} ORDER BY start_date ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut periods = Vec::new();
        while let Some(row) = rows.next()? {
            periods.push(parse_period_row(row)?);
        }
        Ok(periods)
    }

    fn set_locked(&self, id: PeriodId, locked: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE periods SET locked = ?2 WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(locked)],
        )?;
        if changed == 0 {
            return Err(RepoError::PeriodNotFound(id));
        }
        Ok(())
    }
}

fn parse_period_row(row: &Row<'_>) -> RepoResult<Period> {
    let uuid_text: String = row.get("uuid")?;
    let period = Period {
        uuid: parse_uuid(&uuid_text, "periods.uuid")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        locked: int_to_bool(row.get("locked")?, "periods.locked")?,
    };
    period
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(period)
}
