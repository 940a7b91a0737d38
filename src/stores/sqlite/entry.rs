//! Implements a SQLite backed entry store.
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::EntryID,
    db::{CreateTable, MapRow},
    entry::Entry,
    stores::EntryStore,
    user::UserID,
};

const ENTRY_COLUMNS: &str = "id, user_id, balance, ratio, budget, created_at";

/// Stores ledger entries in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteEntryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteEntryStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CreateTable for SQLiteEntryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS entry (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                balance REAL NOT NULL,
                ratio REAL NOT NULL,
                budget REAL NOT NULL,
                created_at TEXT NOT NULL
            )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteEntryStore {
    type ReturnType = Entry;

    fn map_row_with_offset(
        row: &rusqlite::Row,
        offset: usize,
    ) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Entry {
            id: row.get(offset)?,
            user_id: UserID::new(row.get(offset + 1)?),
            balance: row.get(offset + 2)?,
            ratio: row.get(offset + 3)?,
            budget: row.get(offset + 4)?,
            created_at: row.get(offset + 5)?,
        })
    }
}

/// Rewrite each of `entries` inside the transaction `tx`.
///
/// Returns early with [Error::NotFound] if any entry's ID matches no row;
/// the caller must not commit in that case.
fn update_all(tx: &rusqlite::Transaction, entries: &[Entry]) -> Result<(), Error> {
    let mut statement =
        tx.prepare("UPDATE entry SET balance = ?1, ratio = ?2, budget = ?3 WHERE id = ?4")?;

    for entry in entries {
        let rows_changed =
            statement.execute((entry.balance, entry.ratio, entry.budget, entry.id))?;

        if rows_changed != 1 {
            return Err(Error::NotFound);
        }
    }

    Ok(())
}

impl EntryStore for SQLiteEntryStore {
    /// Create a new entry in the database.
    ///
    /// The database assigns the ID and the creation timestamp is taken at
    /// insertion time, so entries are appended at the chronological end of
    /// the owner's history.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn create(
        &mut self,
        user_id: UserID,
        balance: f64,
        ratio: f64,
        budget: f64,
    ) -> Result<Entry, Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLockError)?;

        let entry = connection
            .prepare(&format!(
                "INSERT INTO entry (user_id, balance, ratio, budget, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING {ENTRY_COLUMNS}"
            ))?
            .query_row(
                (
                    user_id.as_i64(),
                    balance,
                    ratio,
                    budget,
                    OffsetDateTime::now_utc(),
                ),
                Self::map_row,
            )?;

        Ok(entry)
    }

    /// Retrieve the entry with `id` from the database.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to an entry, or an
    /// [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: EntryID) -> Result<Entry, Error> {
        let entry = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM entry WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(entry)
    }

    /// Retrieve the entries owned by `user_id`, newest first.
    ///
    /// Ties on the creation timestamp are broken by descending ID, which
    /// matches insertion order.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error.
    fn get_by_user(&self, user_id: UserID, limit: Option<u32>) -> Result<Vec<Entry>, Error> {
        let mut query = format!(
            "SELECT {ENTRY_COLUMNS} FROM entry
             WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC"
        );

        if let Some(limit) = limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&query)?
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
            .collect()
    }

    /// Rewrite the balance, ratio and budget of each of `entries` in one SQL
    /// transaction.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if any entry's ID matches no row (nothing
    /// is applied), or an [Error::SqlError] if there is an SQL error.
    fn batch_update(&mut self, entries: &[Entry]) -> Result<(), Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLockError)?;

        let tx = connection.unchecked_transaction()?;
        update_all(&tx, entries)?;
        tx.commit()?;

        Ok(())
    }

    /// Delete the entry with `id` from the database.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` does not refer to an entry, or an
    /// [Error::SqlError] if there is an SQL error.
    fn delete(&mut self, id: EntryID) -> Result<(), Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLockError)?;

        let rows_changed = connection.execute("DELETE FROM entry WHERE id = ?1", (id,))?;

        if rows_changed == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Delete the entry with `id` and rewrite `entries` in one SQL
    /// transaction.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if `id` or any entry's ID matches no row,
    /// or an [Error::SqlError] if there is an SQL error. In both cases
    /// nothing is committed.
    fn delete_and_update(&mut self, id: EntryID, entries: &[Entry]) -> Result<(), Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLockError)?;

        let tx = connection.unchecked_transaction()?;

        let rows_changed = tx.execute("DELETE FROM entry WHERE id = ?1", (id,))?;
        if rows_changed == 0 {
            return Err(Error::NotFound);
        }

        update_all(&tx, entries)?;
        tx.commit()?;

        Ok(())
    }
}
