//! Places schema for fresh databases.
//!
//! This is the subset of Firefox's `places.sqlite` schema that bookmark
//! reconciliation reads and writes. It is only applied to databases we
//! create ourselves (tests, scratch stores); a real profile database is
//! never altered.

use rusqlite::{Connection, Result, params};

use crate::model::{RootRole, TYPE_FOLDER};

/// Parent id Firefox stores on the places root.
pub const ROOT_PARENT_ID: i64 = 0;

pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS moz_origins (
    id INTEGER PRIMARY KEY,
    prefix TEXT NOT NULL,
    host TEXT NOT NULL,
    frecency INTEGER NOT NULL,
    recalc_frecency INTEGER NOT NULL DEFAULT 0,
    alt_frecency INTEGER,
    recalc_alt_frecency INTEGER NOT NULL DEFAULT 0,
    UNIQUE (prefix, host)
);

CREATE TABLE IF NOT EXISTS moz_places (
    id INTEGER PRIMARY KEY,
    url LONGVARCHAR,
    title LONGVARCHAR,
    rev_host LONGVARCHAR,
    visit_count INTEGER DEFAULT 0,
    hidden INTEGER DEFAULT 0 NOT NULL,
    typed INTEGER DEFAULT 0 NOT NULL,
    frecency INTEGER DEFAULT -1 NOT NULL,
    last_visit_date INTEGER,
    guid TEXT,
    foreign_count INTEGER DEFAULT 0 NOT NULL,
    url_hash INTEGER DEFAULT 0 NOT NULL,
    description TEXT,
    preview_image_url TEXT,
    origin_id INTEGER REFERENCES moz_origins(id)
);

CREATE INDEX IF NOT EXISTS moz_places_url_hashindex ON moz_places (url_hash);
CREATE UNIQUE INDEX IF NOT EXISTS moz_places_guid_uniqueindex ON moz_places (guid);
CREATE INDEX IF NOT EXISTS moz_places_originidindex ON moz_places (origin_id);

CREATE TABLE IF NOT EXISTS moz_bookmarks (
    id INTEGER PRIMARY KEY,
    type INTEGER,
    fk INTEGER DEFAULT NULL,
    parent INTEGER,
    position INTEGER,
    title LONGVARCHAR,
    keyword_id INTEGER,
    folder_type TEXT,
    dateAdded INTEGER,
    lastModified INTEGER,
    guid TEXT,
    syncStatus INTEGER NOT NULL DEFAULT 0,
    syncChangeCounter INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS moz_bookmarks_itemindex ON moz_bookmarks (fk, type);
CREATE INDEX IF NOT EXISTS moz_bookmarks_parentindex ON moz_bookmarks (parent, position);
CREATE UNIQUE INDEX IF NOT EXISTS moz_bookmarks_guid_uniqueindex ON moz_bookmarks (guid);
";

/// Create the places tables if they don't exist.
///
/// # Errors
///
/// Returns an error if the schema SQL fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// Insert the six fixed root folders, the way a new Firefox profile has them.
///
/// The places root gets `ROOT_PARENT_ID`; the others hang off it in the
/// order menu, toolbar, tags, unfiled, mobile. Existing roots are left alone.
///
/// # Errors
///
/// Returns an error if an insert fails.
pub fn seed_roots(conn: &Connection, timestamp: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO moz_bookmarks (type, parent, position, title, dateAdded, lastModified, guid)
         VALUES (?1, ?2, 0, '', ?3, ?3, ?4)",
        params![TYPE_FOLDER, ROOT_PARENT_ID, timestamp, RootRole::Root.store_guid()],
    )?;
    let root_id: i64 = conn.query_row(
        "SELECT id FROM moz_bookmarks WHERE guid = ?1",
        [RootRole::Root.store_guid()],
        |row| row.get(0),
    )?;

    let children = RootRole::ALL.into_iter().filter(|r| *r != RootRole::Root);
    for (position, role) in (0_i64..).zip(children) {
        conn.execute(
            "INSERT OR IGNORE INTO moz_bookmarks (type, parent, position, title, dateAdded, lastModified, guid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6)",
            params![TYPE_FOLDER, root_id, position, role.as_str(), timestamp, role.store_guid()],
        )?;
    }
    Ok(())
}
