//! Document repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist numbered documents per period.
//! - Serve as the SQLite persistence boundary of the renumbering core
//!   (`ScopeReader` + `RangeMutator`).
//!
//! # Invariants
//! - Listing is deterministic: `number ASC`.
//! - Numbers stay unique per period; the unique index is the final guard.
//! - A range shift is one `IMMEDIATE` transaction: all documents move or none.

use super::schema::{ensure_connection_ready, ensure_period_writable, parse_uuid, period_locked};
use super::{RepoError, RepoResult};
use crate::db::DbError;
use crate::model::document::{Document, DocumentId, DocumentNumber};
use crate::model::period::PeriodId;
use crate::renumber::executor::RangeMutator;
use crate::renumber::scope::{ScopeReader, ScopeSnapshot};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Repository interface for document persistence.
pub trait DocumentRepository {
    /// Inserts a document with a caller-chosen number.
    fn create_document(&self, document: &Document) -> RepoResult<DocumentId>;
    /// Inserts a document numbered `max(number) + 1` within its period.
    fn create_next_document(&self, period_uuid: PeriodId, date: i64) -> RepoResult<Document>;
    fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>>;
    /// Lists one period's documents ordered by number.
    fn list_documents(&self, period_uuid: PeriodId) -> RepoResult<Vec<Document>>;
    /// Deletes one document, leaving a gap in the period's numbering.
    fn delete_document(&self, id: DocumentId) -> RepoResult<()>;
}

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn create_document(&self, document: &Document) -> RepoResult<DocumentId> {
        document.validate()?;
        ensure_period_writable(self.conn, document.period_uuid)?;
        insert_document(self.conn, document)?;
        Ok(document.uuid)
    }

    fn create_next_document(&self, period_uuid: PeriodId, date: i64) -> RepoResult<Document> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_period_writable(&tx, period_uuid)?;

        let highest: Option<DocumentNumber> = tx.query_row(
            "SELECT MAX(number) FROM documents WHERE period_uuid = ?1;",
            [period_uuid.to_string()],
            |row| row.get(0),
        )?;
        let number = match highest {
            None => 1,
            Some(value) => value.checked_add(1).ok_or(RepoError::NumberOutOfRange {
                period_uuid,
                number: None,
            })?,
        };

        let document = Document::new(period_uuid, number, date);
        insert_document(&tx, &document)?;
        tx.commit()?;
        Ok(document)
    }

    fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, period_uuid, number, date
             FROM documents
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_document_row(row)?));
        }
        Ok(None)
    }

    fn list_documents(&self, period_uuid: PeriodId) -> RepoResult<Vec<Document>> {
        period_locked(self.conn, period_uuid)?;
        list_period_documents(self.conn, period_uuid)
    }

    fn delete_document(&self, id: DocumentId) -> RepoResult<()> {
        let period_text: Option<String> = self
            .conn
            .query_row(
                "SELECT period_uuid FROM documents WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(period_text) = period_text else {
            return Err(RepoError::DocumentNotFound(id));
        };
        ensure_period_writable(self.conn, parse_uuid(&period_text, "documents.period_uuid")?)?;

        self.conn
            .execute("DELETE FROM documents WHERE uuid = ?1;", [id.to_string()])?;
        Ok(())
    }
}

impl ScopeReader for SqliteDocumentRepository<'_> {
    fn load_scope(&self, period_uuid: PeriodId) -> RepoResult<ScopeSnapshot> {
        // Deferred read transaction keeps the existence check and the listing
        // on one snapshot.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        period_locked(&tx, period_uuid)?;
        let documents = list_period_documents(&tx, period_uuid)?;
        tx.commit()?;
        Ok(ScopeSnapshot::new(period_uuid, documents))
    }
}

impl RangeMutator for SqliteDocumentRepository<'_> {
    fn apply_shift(
        &self,
        period_uuid: PeriodId,
        start: DocumentNumber,
        end: DocumentNumber,
        shift: DocumentNumber,
    ) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_period_writable(&tx, period_uuid)?;

        let (lowest, highest): (Option<DocumentNumber>, Option<DocumentNumber>) = tx.query_row(
            "SELECT MIN(number), MAX(number)
             FROM documents
             WHERE period_uuid = ?1
               AND number BETWEEN ?2 AND ?3;",
            params![period_uuid.to_string(), start, end],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let (Some(lowest), Some(highest)) = (lowest, highest) else {
            return Ok(0);
        };

        match (lowest.checked_add(shift), highest.checked_add(shift)) {
            (Some(new_lowest), Some(_)) if new_lowest >= 1 => {}
            (Some(new_lowest), Some(_)) => {
                return Err(RepoError::NumberOutOfRange {
                    period_uuid,
                    number: Some(new_lowest),
                });
            }
            _ => {
                return Err(RepoError::NumberOutOfRange {
                    period_uuid,
                    number: None,
                });
            }
        }

        // Phase 1 parks every moving document on the negated target number.
        // Targets are >= 1, so the parked values never meet a live number and
        // the unique index only ever judges final values in phase 2.
        let moved = tx.execute(
            "UPDATE documents
             SET number = -(number + ?4),
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE period_uuid = ?1
               AND number BETWEEN ?2 AND ?3;",
            params![period_uuid.to_string(), start, end, shift],
        )?;

        if let Err(err) = tx.execute(
            "UPDATE documents
             SET number = -number
             WHERE period_uuid = ?1
               AND number < 0;",
            [period_uuid.to_string()],
        ) {
            let err = DbError::from(err);
            if !err.is_constraint_violation() {
                return Err(err.into());
            }
            return Err(match first_collision(&tx, period_uuid)? {
                Some(number) => RepoError::DuplicateNumber {
                    period_uuid,
                    number,
                },
                None => err.into(),
            });
        }

        tx.commit()?;
        debug!(
            "event=shift_applied module=repo status=ok period={period_uuid} start={start} end={end} shift={shift} moved={moved}"
        );
        Ok(moved)
    }
}

fn insert_document(conn: &Connection, document: &Document) -> RepoResult<()> {
    let result = conn.execute(
        "INSERT INTO documents (uuid, period_uuid, number, date)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            document.uuid.to_string(),
            document.period_uuid.to_string(),
            document.number,
            document.date,
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(err) => {
            let err = DbError::from(err);
            if err.is_constraint_violation()
                && number_taken(conn, document.period_uuid, document.number)?
            {
                return Err(RepoError::DuplicateNumber {
                    period_uuid: document.period_uuid,
                    number: document.number,
                });
            }
            Err(err.into())
        }
    }
}

fn number_taken(
    conn: &Connection,
    period_uuid: PeriodId,
    number: DocumentNumber,
) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM documents WHERE period_uuid = ?1 AND number = ?2
        );",
        params![period_uuid.to_string(), number],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Smallest target number of a parked document that is already held by a
/// stable document of the same period.
fn first_collision(
    conn: &Connection,
    period_uuid: PeriodId,
) -> RepoResult<Option<DocumentNumber>> {
    let number = conn.query_row(
        "SELECT MIN(-parked.number)
         FROM documents parked
         WHERE parked.period_uuid = ?1
           AND parked.number < 0
           AND EXISTS(
               SELECT 1
               FROM documents stable
               WHERE stable.period_uuid = ?1
                 AND stable.number = -parked.number
           );",
        [period_uuid.to_string()],
        |row| row.get(0),
    )?;
    Ok(number)
}

fn list_period_documents(conn: &Connection, period_uuid: PeriodId) -> RepoResult<Vec<Document>> {
    let mut stmt = conn.prepare(
        "SELECT uuid, period_uuid, number, date
         FROM documents
         WHERE period_uuid = ?1
         ORDER BY number ASC;",
    )?;
    let mut rows = stmt.query([period_uuid.to_string()])?;
    let mut documents = Vec::new();
    while let Some(row) = rows.next()? {
        documents.push(parse_document_row(row)?);
    }
    Ok(documents)
}

fn parse_document_row(row: &Row<'_>) -> RepoResult<Document> {
    let uuid_text: String = row.get("uuid")?;
    let period_text: String = row.get("period_uuid")?;
    let document = Document {
        uuid: parse_uuid(&uuid_text, "documents.uuid")?,
        period_uuid: parse_uuid(&period_text, "documents.period_uuid")?,
        number: row.get("number")?,
        date: row.get("date")?,
    };
    document
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(document)
}
