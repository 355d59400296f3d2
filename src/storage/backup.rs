//! Online backups of a places database.

use std::path::Path;

use rusqlite::DatabaseName;
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::PlacesStore;

impl PlacesStore {
    /// Copy the whole database to `dest` with SQLite's online backup API.
    ///
    /// Refuses to overwrite an existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if `dest` exists or the backup fails.
    pub fn backup_to(&self, dest: &Path) -> Result<()> {
        if dest.exists() {
            return Err(Error::InvalidArgument(format!(
                "backup target already exists: {}",
                dest.display()
            )));
        }
        self.conn().backup(DatabaseName::Main, dest, None)?;
        info!(path = %dest.display(), "wrote database backup");
        Ok(())
    }
}
