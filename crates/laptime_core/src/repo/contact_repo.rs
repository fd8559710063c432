//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Load and persist contact rows and their lap times.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Ids follow SQLite AUTOINCREMENT: never reused, even after deletes.
//! - A contact and its lap times are written in one transaction.
//! - Lap times for attributes outside the configured set are not loaded.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::attribute::AttributeSet;
use crate::model::record::{Record, RecordId};
use log::debug;
use rusqlite::{params, Connection, Row};
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(RecordId),
    SchemaMismatch { found: u32, expected: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::SchemaMismatch { found, expected } => write!(
                f,
                "contact schema version {found} does not match expected {expected}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::SchemaMismatch { .. } => None,
        }
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

/// Persistent contact table.
pub trait ContactRepository {
    /// All contacts in id order, lap times limited to `attributes`.
    fn list_contacts(&self, attributes: &AttributeSet) -> RepoResult<Vec<Record>>;
    /// Inserts a row with its store-assigned id.
    fn insert_contact(&self, record: &Record) -> RepoResult<()>;
    fn update_contact(&self, record: &Record) -> RepoResult<()>;
    fn delete_contact(&self, id: RecordId) -> RepoResult<()>;
    /// Smallest id that was never handed out.
    fn next_contact_id(&self) -> RepoResult<RecordId>;
    /// Removes every contact and restarts ids at `1`.
    fn reset_contacts(&self) -> RepoResult<()>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Wraps a connection without schema checks.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after checking it was opened through `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let found = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        let expected = latest_version();
        if found != expected {
            return Err(RepoError::SchemaMismatch { found, expected });
        }
        Ok(Self::new(conn))
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn list_contacts(&self, attributes: &AttributeSet) -> RepoResult<Vec<Record>> {
        let mut durations = load_durations(self.conn, attributes)?;

        let mut stmt = self
            .conn
            .prepare("SELECT id, name, job, email FROM contacts ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = parse_contact_row(row)?;
            let mut laps = durations.remove(&record.id).unwrap_or_default();
            for key in attributes.keys() {
                laps.entry(key.to_string()).or_default();
            }
            record.durations = laps;
            records.push(record);
        }

        debug!(
            "event=contacts_list module=repo status=ok rows={}",
            records.len()
        );
        Ok(records)
    }

    fn insert_contact(&self, record: &Record) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO contacts (id, name, job, email) VALUES (?1, ?2, ?3, ?4);",
            params![
                record.id,
                record.name.as_str(),
                record.job.as_str(),
                record.email.as_str()
            ],
        )?;
        write_durations(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    fn update_contact(&self, record: &Record) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE contacts SET name = ?1, job = ?2, email = ?3 WHERE id = ?4;",
            params![
                record.name.as_str(),
                record.job.as_str(),
                record.email.as_str(),
                record.id
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(record.id));
        }
        write_durations(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_contact(&self, id: RecordId) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM contact_durations WHERE contact_id = ?1;",
            [id],
        )?;
        let changed = tx.execute("DELETE FROM contacts WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn next_contact_id(&self) -> RepoResult<RecordId> {
        let next = self.conn.query_row(
            "SELECT MAX(
                COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'contacts'), 0),
                COALESCE((SELECT MAX(id) FROM contacts), 0)
            ) + 1;",
            [],
            |row| row.get::<_, RecordId>(0),
        )?;
        Ok(next)
    }

    fn reset_contacts(&self) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(
            "DELETE FROM contact_durations;
             DELETE FROM contacts;
             DELETE FROM sqlite_sequence WHERE name = 'contacts';",
        )?;
        tx.commit()?;
        debug!("event=contacts_reset module=repo status=ok");
        Ok(())
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Record> {
    Ok(Record {
        id: row.get("id")?,
        name: row.get("name")?,
        job: row.get("job")?,
        email: row.get("email")?,
        durations: BTreeMap::new(),
    })
}

fn load_durations(
    conn: &Connection,
    attributes: &AttributeSet,
) -> RepoResult<HashMap<RecordId, BTreeMap<String, String>>> {
    let mut stmt = conn.prepare("SELECT contact_id, attribute, value FROM contact_durations;")?;
    let mut rows = stmt.query([])?;
    let mut durations: HashMap<RecordId, BTreeMap<String, String>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let attribute: String = row.get("attribute")?;
        if !attributes.contains_key(&attribute) {
            continue;
        }
        durations
            .entry(row.get("contact_id")?)
            .or_default()
            .insert(attribute, row.get("value")?);
    }
    Ok(durations)
}

fn write_durations(conn: &Connection, record: &Record) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO contact_durations (contact_id, attribute, value)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(contact_id, attribute) DO UPDATE SET value = excluded.value;",
    )?;
    for (attribute, value) in &record.durations {
        stmt.execute(params![record.id, attribute.as_str(), value.as_str()])?;
    }
    Ok(())
}
