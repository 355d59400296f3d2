//! Snapshot import.
//!
//! The importer diffs the store against a target tree, asks the caller to
//! confirm, and applies the diff in one transaction.

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::BookmarkNode;
use crate::storage::PlacesStore;
use crate::sync::apply::{ApplyStats, apply};
use crate::sync::diff::{Diff, diff};
use crate::sync::extract::extract_store;
use crate::sync::rows::to_rows;

/// What an import did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The store already matches the target.
    NoChanges,
    /// The caller declined the diff. Nothing was written.
    Declined { diff: Diff },
    Applied { diff: Diff, stats: ApplyStats },
}

/// Imports snapshot trees into a places store.
pub struct Importer<'a> {
    store: &'a mut PlacesStore,
}

impl<'a> Importer<'a> {
    #[must_use]
    pub fn new(store: &'a mut PlacesStore) -> Self {
        Self { store }
    }

    /// Diff the store (side A) against `target` (side B).
    ///
    /// # Errors
    ///
    /// Returns an error if either side fails extraction or flattening.
    pub fn plan(&self, target: &BookmarkNode) -> Result<Diff> {
        let current = extract_store(self.store.conn())?;
        Ok(diff(&to_rows(&current)?, &to_rows(target)?))
    }

    /// Make the store match `target`.
    ///
    /// `confirm` is called once with the pending diff, unless the diff is
    /// empty. Returning `false` leaves the store untouched.
    ///
    /// The diff is recomputed inside the write transaction; if the store
    /// changed after `confirm` saw it, nothing is applied.
    ///
    /// # Errors
    ///
    /// Returns any extraction or apply error. On error the transaction is
    /// rolled back.
    pub fn import<F>(&mut self, target: &BookmarkNode, confirm: F) -> Result<ImportOutcome>
    where
        F: FnOnce(&Diff) -> bool,
    {
        let pending = self.plan(target)?;
        if pending.is_empty() {
            info!("Store already matches target");
            return Ok(ImportOutcome::NoChanges);
        }
        if !confirm(&pending) {
            info!(changes = pending.len(), "Import declined");
            return Ok(ImportOutcome::Declined { diff: pending });
        }

        let target_rows = to_rows(target)?;
        let stats = self.store.mutate("import", |tx| {
            let fresh = diff(&to_rows(&extract_store(tx)?)?, &target_rows);
            if fresh != pending {
                warn!("Store changed while waiting for confirmation");
                return Err(Error::StoreChanged);
            }
            apply(&fresh, tx)
        })?;

        info!(
            inserted = stats.inserted,
            updated = stats.updated,
            deleted = stats.deleted,
            "Import complete"
        );
        Ok(ImportOutcome::Applied {
            diff: pending,
            stats,
        })
    }
}
