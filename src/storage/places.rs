//! SQLite access to a Firefox places database.
//!
//! Connection lifecycle lives here; the reconciliation logic in
//! [`crate::sync`] only ever sees a `&Connection` or a `&Transaction`.

use crate::error::Result;
use crate::storage::schema::{apply_schema, seed_roots};
use rusqlite::{Connection, OpenFlags, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Handle to an open places database.
#[derive(Debug)]
pub struct PlacesStore {
    conn: Connection,
}

impl PlacesStore {
    /// Open an existing places database for reading and writing.
    ///
    /// The schema is not touched: the file belongs to Firefox.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open with an optional busy timeout (default 5 seconds).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        conn.busy_timeout(timeout_ms.map_or(Duration::from_secs(5), Duration::from_millis))?;
        Ok(Self { conn })
    }

    /// Open a places database read-only, for dumping.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )?;
        Ok(Self { conn })
    }

    /// Create a new places database with the schema and the fixed roots.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the schema fails.
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory places database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        apply_schema(&conn)?;
        seed_roots(&conn, chrono::Utc::now().timestamp_micros())?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run a mutation inside one IMMEDIATE transaction.
    ///
    /// The closure's writes are committed together if it returns `Ok`.
    /// On any error the transaction is dropped, which rolls it back, so
    /// readers never observe a partial mutation.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or an error from BEGIN/COMMIT.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        debug!(op, "begin");
        let result = f(&tx)?;

        tx.commit()?;
        debug!(op, "commit");

        Ok(result)
    }
}
