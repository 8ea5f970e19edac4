//! SQLite-backed [`HierarchyStore`].

mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use directories::ProjectDirs;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::{HierarchyStore, InitiativePatch, KeyResultPatch, ObjectivePatch};

pub use schema::SCHEMA;

const DB_FILE_NAME: &str = "okr-tracker.db";

const OBJECTIVE_COLUMNS: &str =
    "id, title, description, owner, deadline, status, created_at, updated_at";
const KEY_RESULT_COLUMNS: &str = "id, objective_id, title, description, result_type, \
     start_value, target_value, current_value, unit, owner, created_at, updated_at";
const INITIATIVE_COLUMNS: &str =
    "id, key_result_id, title, description, owner, status, created_at, updated_at";

/// Handle to the OKR database. Cloning shares the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `path`, creating parent
    /// directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!("Opened database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "okr-tracker")
            .ok_or_else(|| Error::Storage("no home directory for default database".into()))?;
        Ok(dirs.data_dir().join(DB_FILE_NAME))
    }

    /// Apply the schema. Idempotent.
    pub fn migrate(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Storage("lock poisoned".into()))
    }
}

// Row decoding

fn conversion_error(idx: usize, e: Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn text_column<T>(row: &Row, idx: usize, parse: impl FnOnce(&str) -> Result<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).map_err(|e| conversion_error(idx, e))
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Storage(format!("invalid id {:?}: {}", s, e)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("invalid timestamp {:?}: {}", s, e)))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| Error::Storage(format!("invalid date {:?}: {}", s, e)))
}

fn unknown(what: &str, s: &str) -> Error {
    Error::Storage(format!("unknown {} {:?}", what, s))
}

fn objective_from_row(row: &Row) -> rusqlite::Result<Objective> {
    let deadline: Option<String> = row.get(4)?;
    Ok(Objective {
        id: text_column(row, 0, parse_uuid)?,
        title: row.get(1)?,
        description: row.get(2)?,
        owner: row.get(3)?,
        deadline: deadline
            .map(|d| parse_date(&d))
            .transpose()
            .map_err(|e| conversion_error(4, e))?,
        status: text_column(row, 5, |s| {
            ObjectiveStatus::from_str(s).ok_or_else(|| unknown("objective status", s))
        })?,
        created_at: text_column(row, 6, parse_timestamp)?,
        updated_at: text_column(row, 7, parse_timestamp)?,
    })
}

fn key_result_from_row(row: &Row) -> rusqlite::Result<KeyResult> {
    Ok(KeyResult {
        id: text_column(row, 0, parse_uuid)?,
        objective_id: text_column(row, 1, parse_uuid)?,
        title: row.get(2)?,
        description: row.get(3)?,
        result_type: text_column(row, 4, |s| {
            KeyResultType::from_str(s).ok_or_else(|| unknown("key result type", s))
        })?,
        start_value: row.get(5)?,
        target_value: row.get(6)?,
        current_value: row.get(7)?,
        unit: row.get(8)?,
        owner: row.get(9)?,
        created_at: text_column(row, 10, parse_timestamp)?,
        updated_at: text_column(row, 11, parse_timestamp)?,
    })
}

fn initiative_from_row(row: &Row) -> rusqlite::Result<Initiative> {
    Ok(Initiative {
        id: text_column(row, 0, parse_uuid)?,
        key_result_id: text_column(row, 1, parse_uuid)?,
        title: row.get(2)?,
        description: row.get(3)?,
        owner: row.get(4)?,
        status: text_column(row, 5, |s| {
            InitiativeStatus::from_str(s).ok_or_else(|| unknown("initiative status", s))
        })?,
        created_at: text_column(row, 6, parse_timestamp)?,
        updated_at: text_column(row, 7, parse_timestamp)?,
    })
}

fn deadline_text(deadline: Option<NaiveDate>) -> Option<String> {
    deadline.map(|d| d.format("%Y-%m-%d").to_string())
}

// Row encoding

fn write_objective(conn: &Connection, o: &Objective) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE objectives SET title = ?2, description = ?3, owner = ?4, deadline = ?5,
         status = ?6, updated_at = ?7 WHERE id = ?1",
        params![
            o.id.to_string(),
            o.title,
            o.description,
            o.owner,
            deadline_text(o.deadline),
            o.status.as_str(),
            o.updated_at.to_rfc3339(),
        ],
    )?)
}

fn write_key_result(conn: &Connection, kr: &KeyResult) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE key_results SET title = ?2, description = ?3, result_type = ?4,
         start_value = ?5, target_value = ?6, current_value = ?7, unit = ?8, owner = ?9,
         updated_at = ?10 WHERE id = ?1",
        params![
            kr.id.to_string(),
            kr.title,
            kr.description,
            kr.result_type.as_str(),
            kr.start_value,
            kr.target_value,
            kr.current_value,
            kr.unit,
            kr.owner,
            kr.updated_at.to_rfc3339(),
        ],
    )?)
}

fn write_initiative(conn: &Connection, i: &Initiative) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE initiatives SET title = ?2, description = ?3, owner = ?4, status = ?5,
         updated_at = ?6 WHERE id = ?1",
        params![
            i.id.to_string(),
            i.title,
            i.description,
            i.owner,
            i.status.as_str(),
            i.updated_at.to_rfc3339(),
        ],
    )?)
}

fn select_one<T>(
    conn: &Connection,
    sql: &str,
    id: Uuid,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Option<T>> {
    Ok(conn
        .query_row(sql, params![id.to_string()], map)
        .optional()?)
}

fn select_many<T>(
    conn: &Connection,
    sql: &str,
    parent_id: Option<Uuid>,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = match parent_id {
        Some(id) => stmt.query_map(params![id.to_string()], map)?,
        None => stmt.query_map([], map)?,
    };
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn count(conn: &Connection, sql: &str, parent_id: Uuid) -> Result<usize> {
    let n: i64 = conn.query_row(sql, params![parent_id.to_string()], |row| row.get(0))?;
    Ok(n as usize)
}

impl HierarchyStore for Database {
    fn insert_objective(&self, o: &Objective) -> Result<Uuid> {
        self.conn()?.execute(
            &format!(
                "INSERT INTO objectives ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                OBJECTIVE_COLUMNS
            ),
            params![
                o.id.to_string(),
                o.title,
                o.description,
                o.owner,
                deadline_text(o.deadline),
                o.status.as_str(),
                o.created_at.to_rfc3339(),
                o.updated_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(objective_id = %o.id, "Inserted objective");
        Ok(o.id)
    }

    fn find_objective(&self, id: Uuid) -> Result<Option<Objective>> {
        let conn = self.conn()?;
        select_one(
            &conn,
            &format!("SELECT {} FROM objectives WHERE id = ?1", OBJECTIVE_COLUMNS),
            id,
            objective_from_row,
        )
    }

    fn list_objectives(&self) -> Result<Vec<Objective>> {
        let conn = self.conn()?;
        select_many(
            &conn,
            &format!("SELECT {} FROM objectives ORDER BY rowid", OBJECTIVE_COLUMNS),
            None,
            objective_from_row,
        )
    }

    fn update_objective(&self, id: Uuid, patch: &ObjectivePatch) -> Result<usize> {
        let conn = self.conn()?;
        let Some(mut objective) = select_one(
            &conn,
            &format!("SELECT {} FROM objectives WHERE id = ?1", OBJECTIVE_COLUMNS),
            id,
            objective_from_row,
        )?
        else {
            return Ok(0);
        };
        patch.apply(&mut objective);
        write_objective(&conn, &objective)
    }

    fn delete_objective(&self, id: Uuid) -> Result<usize> {
        Ok(self
            .conn()?
            .execute("DELETE FROM objectives WHERE id = ?1", params![id.to_string()])?)
    }

    fn insert_key_result(&self, kr: &KeyResult) -> Result<Uuid> {
        self.conn()?.execute(
            &format!(
                "INSERT INTO key_results ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                KEY_RESULT_COLUMNS
            ),
            params![
                kr.id.to_string(),
                kr.objective_id.to_string(),
                kr.title,
                kr.description,
                kr.result_type.as_str(),
                kr.start_value,
                kr.target_value,
                kr.current_value,
                kr.unit,
                kr.owner,
                kr.created_at.to_rfc3339(),
                kr.updated_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(key_result_id = %kr.id, objective_id = %kr.objective_id, "Inserted key result");
        Ok(kr.id)
    }

    fn find_key_result(&self, id: Uuid) -> Result<Option<KeyResult>> {
        let conn = self.conn()?;
        select_one(
            &conn,
            &format!("SELECT {} FROM key_results WHERE id = ?1", KEY_RESULT_COLUMNS),
            id,
            key_result_from_row,
        )
    }

    fn find_key_results_by_objective(&self, objective_id: Uuid) -> Result<Vec<KeyResult>> {
        let conn = self.conn()?;
        select_many(
            &conn,
            &format!(
                "SELECT {} FROM key_results WHERE objective_id = ?1 ORDER BY rowid",
                KEY_RESULT_COLUMNS
            ),
            Some(objective_id),
            key_result_from_row,
        )
    }

    fn update_key_result(&self, id: Uuid, patch: &KeyResultPatch) -> Result<usize> {
        let conn = self.conn()?;
        let Some(mut key_result) = select_one(
            &conn,
            &format!("SELECT {} FROM key_results WHERE id = ?1", KEY_RESULT_COLUMNS),
            id,
            key_result_from_row,
        )?
        else {
            return Ok(0);
        };
        patch.apply(&mut key_result);
        write_key_result(&conn, &key_result)
    }

    fn delete_key_result(&self, id: Uuid) -> Result<usize> {
        Ok(self
            .conn()?
            .execute("DELETE FROM key_results WHERE id = ?1", params![id.to_string()])?)
    }

    fn delete_key_results_by_objective(&self, objective_id: Uuid) -> Result<usize> {
        Ok(self.conn()?.execute(
            "DELETE FROM key_results WHERE objective_id = ?1",
            params![objective_id.to_string()],
        )?)
    }

    fn count_key_results_by_objective(&self, objective_id: Uuid) -> Result<usize> {
        count(
            &*self.conn()?,
            "SELECT COUNT(*) FROM key_results WHERE objective_id = ?1",
            objective_id,
        )
    }

    fn insert_initiative(&self, i: &Initiative) -> Result<Uuid> {
        self.conn()?.execute(
            &format!(
                "INSERT INTO initiatives ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                INITIATIVE_COLUMNS
            ),
            params![
                i.id.to_string(),
                i.key_result_id.to_string(),
                i.title,
                i.description,
                i.owner,
                i.status.as_str(),
                i.created_at.to_rfc3339(),
                i.updated_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(initiative_id = %i.id, key_result_id = %i.key_result_id, "Inserted initiative");
        Ok(i.id)
    }

    fn find_initiative(&self, id: Uuid) -> Result<Option<Initiative>> {
        let conn = self.conn()?;
        select_one(
            &conn,
            &format!("SELECT {} FROM initiatives WHERE id = ?1", INITIATIVE_COLUMNS),
            id,
            initiative_from_row,
        )
    }

    fn find_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<Vec<Initiative>> {
        let conn = self.conn()?;
        select_many(
            &conn,
            &format!(
                "SELECT {} FROM initiatives WHERE key_result_id = ?1 ORDER BY rowid",
                INITIATIVE_COLUMNS
            ),
            Some(key_result_id),
            initiative_from_row,
        )
    }

    fn update_initiative(&self, id: Uuid, patch: &InitiativePatch) -> Result<usize> {
        let conn = self.conn()?;
        let Some(mut initiative) = select_one(
            &conn,
            &format!("SELECT {} FROM initiatives WHERE id = ?1", INITIATIVE_COLUMNS),
            id,
            initiative_from_row,
        )?
        else {
            return Ok(0);
        };
        patch.apply(&mut initiative);
        write_initiative(&conn, &initiative)
    }

    fn delete_initiative(&self, id: Uuid) -> Result<usize> {
        Ok(self
            .conn()?
            .execute("DELETE FROM initiatives WHERE id = ?1", params![id.to_string()])?)
    }

    fn delete_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<usize> {
        Ok(self.conn()?.execute(
            "DELETE FROM initiatives WHERE key_result_id = ?1",
            params![key_result_id.to_string()],
        )?)
    }

    fn count_initiatives_by_key_result(&self, key_result_id: Uuid) -> Result<usize> {
        count(
            &*self.conn()?,
            "SELECT COUNT(*) FROM initiatives WHERE key_result_id = ?1",
            key_result_id,
        )
    }
}
