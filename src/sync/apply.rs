//! Applying a diff to a places store.
//!
//! The diff must have the store as side A and the target as side B.
//! Everything happens on one transaction the caller owns: the engine
//! validates the whole diff first, then inserts (parents first), updates,
//! and deletes (children first). Any error leaves the transaction
//! uncommitted, and dropping it rolls everything back.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, Transaction, params};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, IntegrityViolation, Result};
use crate::model::{FlatRow, RowKind, TYPE_BOOKMARK, TYPE_FOLDER};
use crate::storage::ROOT_PARENT_ID;
use crate::sync::diff::Diff;
use crate::sync::guid::generate_guid;
use crate::sync::order::{deletion_order, order};
use crate::url_hash::stored_fingerprint;

/// Counts of what an apply wrote.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub places_created: usize,
    pub origins_created: usize,
}

/// Split a URL into its origin prefix (`scheme://` or `scheme:`) and host.
///
/// The host is everything after the prefix up to the first `/`.
///
/// # Errors
///
/// Returns `MalformedUrl` if the URL has neither `://` nor `:`.
pub fn split_origin(uri: &str) -> Result<(String, String)> {
    let (scheme, sep, rest) = if let Some((scheme, rest)) = uri.split_once("://") {
        (scheme, "://", rest)
    } else if let Some((scheme, rest)) = uri.split_once(':') {
        (scheme, ":", rest)
    } else {
        return Err(Error::MalformedUrl { url: uri.to_string() });
    };
    let host = rest.split('/').next().unwrap_or_default();
    Ok((format!("{scheme}{sep}"), host.to_string()))
}

/// Apply `diff` (store → target) on an open transaction.
///
/// The caller commits on `Ok`. Nothing is committed here.
///
/// # Errors
///
/// Returns `UnresolvedReference` for rows whose parent (or, for updates and
/// deletes, the row itself) is not in the store, `KindMismatch` when a guid
/// switches between link and folder, `MalformedUrl` for URLs without a
/// scheme separator, and database errors. All of these except database
/// errors are detected before the first write.
pub fn apply(diff: &Diff, tx: &Transaction<'_>) -> Result<ApplyStats> {
    let mut engine = Reconciler::new(tx);
    engine.validate(diff)?;

    for guid in order(&diff.only_in_b)? {
        engine.insert(&guid, &diff.only_in_b[&guid])?;
    }
    for (guid, change) in &diff.changed {
        engine.update(guid, &change.new, change.uri_changed())?;
    }
    for guid in deletion_order(&diff.only_in_a)? {
        engine.delete(&guid)?;
    }

    info!(
        inserted = engine.stats.inserted,
        updated = engine.stats.updated,
        deleted = engine.stats.deleted,
        places_created = engine.stats.places_created,
        "applied diff"
    );
    Ok(engine.stats)
}

struct Reconciler<'a> {
    conn: &'a Connection,
    /// Bookmark ids by guid, filled by lookups and inserts.
    ids: HashMap<String, i64>,
    stats: ApplyStats,
}

impl<'a> Reconciler<'a> {
    fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            ids: HashMap::new(),
            stats: ApplyStats::default(),
        }
    }

    // ==================
    // Validation
    // ==================

    fn validate(&mut self, diff: &Diff) -> Result<()> {
        for (guid, row) in &diff.only_in_b {
            self.check_parent(guid, row, diff)?;
            if let Some(uri) = row.uri() {
                split_origin(uri)?;
            }
        }

        for (guid, change) in &diff.changed {
            if change.old.is_link() != change.new.is_link() {
                return Err(IntegrityViolation::KindMismatch { guid: guid.clone() }.into());
            }
            self.check_present(guid, &change.old)?;
            if change.parent_changed() {
                self.check_parent(guid, &change.new, diff)?;
            }
            if let (true, Some(uri)) = (change.uri_changed(), change.new.uri()) {
                split_origin(uri)?;
            }
        }

        for (guid, row) in &diff.only_in_a {
            self.check_present(guid, row)?;
        }
        Ok(())
    }

    /// The row's parent is the synthetic root, or will exist when it is inserted.
    fn check_parent(&mut self, guid: &str, row: &FlatRow, diff: &Diff) -> Result<()> {
        let parent = row.parent.as_str();
        if row.is_root_of(guid) || diff.only_in_b.contains_key(parent) {
            return Ok(());
        }
        if diff.only_in_a.contains_key(parent) || self.lookup_id(parent)?.is_none() {
            return Err(Error::UnresolvedReference {
                guid: guid.to_string(),
                parent: parent.to_string(),
            });
        }
        Ok(())
    }

    fn check_present(&mut self, guid: &str, row: &FlatRow) -> Result<()> {
        if self.lookup_id(guid)?.is_none() {
            return Err(Error::UnresolvedReference {
                guid: guid.to_string(),
                parent: row.parent.clone(),
            });
        }
        Ok(())
    }

    // ==================
    // Id resolution
    // ==================

    fn lookup_id(&mut self, guid: &str) -> Result<Option<i64>> {
        if let Some(id) = self.ids.get(guid) {
            return Ok(Some(*id));
        }
        let id: Option<i64> = self
            .conn
            .query_row("SELECT id FROM moz_bookmarks WHERE guid = ?1", [guid], |row| {
                row.get(0)
            })
            .optional()?;
        if let Some(id) = id {
            self.ids.insert(guid.to_string(), id);
        }
        Ok(id)
    }

    fn resolve_parent(&mut self, guid: &str, row: &FlatRow) -> Result<i64> {
        if row.is_root_of(guid) {
            return Ok(ROOT_PARENT_ID);
        }
        self.lookup_id(&row.parent)?
            .ok_or_else(|| Error::UnresolvedReference {
                guid: guid.to_string(),
                parent: row.parent.clone(),
            })
    }

    /// Find or create the place for a URL and return its id.
    ///
    /// Existing places match by fingerprint and URL; a place whose stored
    /// fingerprint is 0 has not been hashed yet and matches by URL alone.
    fn resolve_uri(&mut self, uri: &str) -> Result<i64> {
        let url_hash = stored_fingerprint(uri);
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM moz_places
                 WHERE url_hash IN (?1, 0) AND url = ?2
                 ORDER BY url_hash DESC LIMIT 1",
                params![url_hash, uri],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let (prefix, host) = split_origin(uri)?;
        let origin_id = self.resolve_origin(&prefix, &host)?;
        let rev_host: String = host.chars().rev().collect();
        self.conn.execute(
            "INSERT INTO moz_places (url, url_hash, title, rev_host, guid, origin_id)
             VALUES (?1, ?2, ?1, ?3, ?4, ?5)",
            params![uri, url_hash, rev_host, generate_guid(), origin_id],
        )?;
        let id = self.conn.last_insert_rowid();
        self.stats.places_created += 1;
        debug!(uri, id, "created place");
        Ok(id)
    }

    fn resolve_origin(&mut self, prefix: &str, host: &str) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM moz_origins WHERE prefix = ?1 AND host = ?2",
                params![prefix, host],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn.execute(
            "INSERT INTO moz_origins (prefix, host, frecency) VALUES (?1, ?2, 0)",
            params![prefix, host],
        )?;
        let id = self.conn.last_insert_rowid();
        self.stats.origins_created += 1;
        debug!(prefix, host, id, "created origin");
        Ok(id)
    }

    // ==================
    // Mutations
    // ==================

    fn insert(&mut self, guid: &str, row: &FlatRow) -> Result<()> {
        let parent_id = self.resolve_parent(guid, row)?;
        let (type_code, fk) = match &row.kind {
            RowKind::Link { uri } => (TYPE_BOOKMARK, Some(self.resolve_uri(uri)?)),
            RowKind::Folder => (TYPE_FOLDER, None),
        };

        self.conn.execute(
            "INSERT INTO moz_bookmarks (type, fk, parent, position, title, dateAdded, lastModified, guid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                type_code,
                fk,
                parent_id,
                row.index,
                row.title,
                row.date_added,
                row.last_modified,
                guid
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.ids.insert(guid.to_string(), id);
        self.stats.inserted += 1;
        debug!(guid, id, title = %row.title, "inserted bookmark");
        Ok(())
    }

    /// One UPDATE per changed row. `fk` is only rewritten when the URL changed.
    fn update(&mut self, guid: &str, new: &FlatRow, uri_changed: bool) -> Result<()> {
        let parent_id = self.resolve_parent(guid, new)?;
        let fk = match (uri_changed, new.uri()) {
            (true, Some(uri)) => Some(self.resolve_uri(uri)?),
            _ => None,
        };

        let count = self.conn.execute(
            "UPDATE moz_bookmarks
             SET fk = COALESCE(?1, fk), parent = ?2, position = ?3, title = ?4,
                 dateAdded = ?5, lastModified = ?6
             WHERE guid = ?7",
            params![
                fk,
                parent_id,
                new.index,
                new.title,
                new.date_added,
                new.last_modified,
                guid
            ],
        )?;
        if count != 1 {
            return Err(Error::UnresolvedReference {
                guid: guid.to_string(),
                parent: new.parent.clone(),
            });
        }
        self.stats.updated += 1;
        debug!(guid, title = %new.title, "updated bookmark");
        Ok(())
    }

    fn delete(&mut self, guid: &str) -> Result<()> {
        let count = self
            .conn
            .execute("DELETE FROM moz_bookmarks WHERE guid = ?1", [guid])?;
        self.ids.remove(guid);
        self.stats.deleted += count;
        debug!(guid, count, "deleted bookmark");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookmarkNode, NodeKind, Rows};
    use crate::storage::PlacesStore;
    use crate::sync::diff::diff;
    use crate::sync::extract::extract_store;
    use crate::sync::rows::to_rows;

    fn store_rows(store: &PlacesStore) -> Rows {
        to_rows(&extract_store(store.conn()).unwrap()).unwrap()
    }

    fn link_row(parent: &str, title: &str, uri: &str, index: i64) -> FlatRow {
        FlatRow {
            parent: parent.into(),
            title: title.into(),
            index,
            date_added: 1_000,
            last_modified: 2_000,
            kind: RowKind::Link { uri: uri.into() },
        }
    }

    fn folder_row(parent: &str, title: &str, index: i64) -> FlatRow {
        FlatRow {
            parent: parent.into(),
            title: title.into(),
            index,
            date_added: 1_000,
            last_modified: 2_000,
            kind: RowKind::Folder,
        }
    }

    fn count(store: &PlacesStore, table: &str) -> i64 {
        store
            .conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    fn apply_rows(store: &mut PlacesStore, target: &Rows) -> Result<ApplyStats> {
        let d = diff(&store_rows(store), target);
        store.mutate("test_apply", |tx| apply(&d, tx))
    }

    #[test]
    fn test_split_origin() {
        assert_eq!(
            split_origin("https://example.org/a/b").unwrap(),
            ("https://".to_string(), "example.org".to_string())
        );
        assert_eq!(
            split_origin("about:blank").unwrap(),
            ("about:".to_string(), "blank".to_string())
        );
        assert_eq!(
            split_origin("file:///home/x").unwrap(),
            ("file://".to_string(), String::new())
        );
        assert!(matches!(
            split_origin("example.org"),
            Err(Error::MalformedUrl { .. })
        ));
    }

    #[test]
    fn test_pure_insertion() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut target = store_rows(&store);
        target.insert(
            "abc".into(),
            link_row("toolbar_____", "Example", "http://example.org/", 0),
        );

        let stats = apply_rows(&mut store, &target).unwrap();
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.places_created, 1);
        assert_eq!(stats.origins_created, 1);
        assert_eq!(count(&store, "moz_places"), 1);
        assert_eq!(count(&store, "moz_bookmarks"), 7);

        let (url_hash, rev_host, guid_len): (i64, String, i64) = store
            .conn()
            .query_row(
                "SELECT url_hash, rev_host, length(guid) FROM moz_places",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(url_hash, 125_508_604_170_377);
        assert_eq!(rev_host, "gro.elpmaxe");
        assert_eq!(guid_len, 12);

        assert!(diff(&store_rows(&store), &target).is_empty());
    }

    #[test]
    fn test_insert_reuses_place_and_origin() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut target = store_rows(&store);
        target.insert("one".into(), link_row("toolbar_____", "A", "https://example.org/", 0));
        target.insert("two".into(), link_row("menu________", "B", "https://example.org/", 0));
        target.insert("three".into(), link_row("menu________", "C", "https://example.org/x", 1));

        let stats = apply_rows(&mut store, &target).unwrap();
        assert_eq!(stats.inserted, 3);
        assert_eq!(stats.places_created, 2);
        assert_eq!(stats.origins_created, 1);
    }

    #[test]
    fn test_insert_matches_unhashed_place() {
        let mut store = PlacesStore::open_memory().unwrap();
        store
            .conn()
            .execute(
                "INSERT INTO moz_places (url, url_hash, guid) VALUES ('https://example.org/', 0, 'existingplac')",
                [],
            )
            .unwrap();
        let mut target = store_rows(&store);
        target.insert("one".into(), link_row("toolbar_____", "A", "https://example.org/", 0));

        let stats = apply_rows(&mut store, &target).unwrap();
        assert_eq!(stats.places_created, 0);
        let stored: i64 = store
            .conn()
            .query_row("SELECT url_hash FROM moz_places", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, 0);
    }

    #[test]
    fn test_nested_insert_resolves_new_parent() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut target = store_rows(&store);
        target.insert("folder".into(), folder_row("unfiled_____", "F", 0));
        target.insert("sub".into(), folder_row("folder", "S", 0));
        target.insert("leaf".into(), link_row("sub", "L", "https://example.org/", 0));

        apply_rows(&mut store, &target).unwrap();
        assert!(diff(&store_rows(&store), &target).is_empty());
    }

    #[test]
    fn test_rename_only() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut target = store_rows(&store);
        target.insert("abc".into(), link_row("toolbar_____", "Example", "http://example.org/", 0));
        apply_rows(&mut store, &target).unwrap();

        target.get_mut("abc").unwrap().title = "Renamed".into();
        target.get_mut("abc").unwrap().last_modified = 3_000;
        let d = diff(&store_rows(&store), &target);
        assert_eq!(d.changed.len(), 1);
        assert!(!d.changed["abc"].uri_changed());

        let stats = store.mutate("rename", |tx| apply(&d, tx)).unwrap();
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.places_created, 0);
        assert_eq!(count(&store, "moz_places"), 1);
        assert!(diff(&store_rows(&store), &target).is_empty());
    }

    #[test]
    fn test_url_change_moves_fk() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut target = store_rows(&store);
        target.insert("abc".into(), link_row("toolbar_____", "Example", "http://example.org/", 0));
        apply_rows(&mut store, &target).unwrap();

        target.insert("abc".into(), link_row("toolbar_____", "Example", "https://example.org/", 0));
        let stats = apply_rows(&mut store, &target).unwrap();
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.places_created, 1);
        assert!(diff(&store_rows(&store), &target).is_empty());
    }

    #[test]
    fn test_move_between_folders() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut target = store_rows(&store);
        target.insert("abc".into(), link_row("toolbar_____", "Example", "http://example.org/", 0));
        apply_rows(&mut store, &target).unwrap();

        target.get_mut("abc").unwrap().parent = "menu________".into();
        apply_rows(&mut store, &target).unwrap();
        assert!(diff(&store_rows(&store), &target).is_empty());
    }

    #[test]
    fn test_delete_folder_with_children() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut target = store_rows(&store);
        let before = target.clone();
        target.insert("folder".into(), folder_row("toolbar_____", "F", 0));
        target.insert("c1".into(), link_row("folder", "1", "https://a.example/", 0));
        target.insert("c2".into(), folder_row("folder", "2", 1));
        apply_rows(&mut store, &target).unwrap();
        assert_eq!(count(&store, "moz_bookmarks"), 9);

        let d = diff(&store_rows(&store), &before);
        let order = deletion_order(&d.only_in_a).unwrap();
        assert_eq!(order.last().map(String::as_str), Some("folder"));

        let stats = store.mutate("delete", |tx| apply(&d, tx)).unwrap();
        assert_eq!(stats.deleted, 3);
        assert_eq!(count(&store, "moz_bookmarks"), 6);
        assert!(diff(&store_rows(&store), &before).is_empty());
    }

    #[test]
    fn test_unresolved_parent_aborts_everything() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut target = store_rows(&store);
        target.insert("good".into(), link_row("toolbar_____", "ok", "https://ok.example/", 0));
        target.insert("bad".into(), link_row("nosuchfolder", "bad", "https://bad.example/", 0));

        let err = apply_rows(&mut store, &target).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { ref parent, .. } if parent == "nosuchfolder"));
        assert_eq!(count(&store, "moz_bookmarks"), 6);
        assert_eq!(count(&store, "moz_places"), 0);
    }

    #[test]
    fn test_malformed_url_aborts_everything() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut target = store_rows(&store);
        target.insert("good".into(), link_row("toolbar_____", "ok", "https://ok.example/", 0));
        target.insert("bad".into(), link_row("toolbar_____", "bad", "no-scheme-here", 1));

        let err = apply_rows(&mut store, &target).unwrap_err();
        assert!(matches!(err, Error::MalformedUrl { .. }));
        assert_eq!(count(&store, "moz_bookmarks"), 6);
        assert_eq!(count(&store, "moz_origins"), 0);
    }

    #[test]
    fn test_kind_change_is_rejected() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut target = store_rows(&store);
        target.insert("x".into(), folder_row("toolbar_____", "F", 0));
        apply_rows(&mut store, &target).unwrap();

        target.insert("x".into(), link_row("toolbar_____", "F", "https://x.example/", 0));
        let err = apply_rows(&mut store, &target).unwrap_err();
        assert!(matches!(
            err,
            Error::Integrity(IntegrityViolation::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_update_of_missing_row_is_unresolved() {
        let mut store = PlacesStore::open_memory().unwrap();
        let mut d = Diff::default();
        d.changed.insert(
            "ghost".into(),
            crate::sync::diff::Change {
                old: folder_row("toolbar_____", "a", 0),
                new: folder_row("toolbar_____", "b", 0),
            },
        );
        let err = store.mutate("ghost", |tx| apply(&d, tx)).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { .. }));
    }

    #[test]
    fn test_root_insert_uses_sentinel_parent() {
        let mut store = PlacesStore::open_memory().unwrap();
        store
            .conn()
            .execute("DELETE FROM moz_bookmarks", [])
            .unwrap();

        let tree = BookmarkNode {
            guid: "root________".into(),
            title: String::new(),
            index: 0,
            date_added: 1,
            last_modified: 1,
            id: None,
            root: None,
            kind: NodeKind::Folder { children: vec![] },
        };
        let target = to_rows(&tree).unwrap();
        let d = diff(&Rows::new(), &target);
        store.mutate("root", |tx| apply(&d, tx)).unwrap();

        let parent: i64 = store
            .conn()
            .query_row("SELECT parent FROM moz_bookmarks WHERE guid = 'root________'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(parent, ROOT_PARENT_ID);
    }
}
