//! Tree extraction from a places store or a JSON snapshot.
//!
//! Store extraction reads every bookmark row in one query, groups rows by
//! parent id, then assembles the tree from the places root downward. The
//! grouping map is consumed as the tree is built, so no row is visited twice.

use std::collections::{HashMap, HashSet};

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::{IntegrityViolation, Result};
use crate::model::{BookmarkNode, NodeKind, RootRole, SnapshotNode, TYPE_BOOKMARK, TYPE_FOLDER};
use crate::url_hash::{matches_stored, stored_fingerprint};

/// Where a tree comes from.
#[derive(Debug)]
pub enum Source<'a> {
    /// A live places database.
    Store(&'a Connection),
    /// An already-parsed snapshot, which only needs validating.
    Snapshot(SnapshotNode),
}

/// Extract a validated tree from either kind of source.
///
/// # Errors
///
/// Returns an integrity violation if the source is structurally broken,
/// or a database error if the store cannot be read.
pub fn extract(source: Source<'_>) -> Result<BookmarkNode> {
    match source {
        Source::Store(conn) => extract_store(conn),
        Source::Snapshot(raw) => validate_snapshot(raw),
    }
}

/// A `moz_bookmarks` row joined with its place.
struct StoreRow {
    id: i64,
    type_code: i64,
    fk: Option<i64>,
    position: i64,
    title: Option<String>,
    date_added: Option<i64>,
    last_modified: Option<i64>,
    guid: String,
    url: Option<String>,
    url_hash: Option<i64>,
}

/// Read the bookmark tree of a places database.
///
/// Children are ordered by position. The tags root is skipped: tag
/// folders are not bookmarks.
///
/// # Errors
///
/// Returns `FingerprintMismatch` if a place's stored `url_hash` is nonzero
/// and differs from the URL's fingerprint, `MissingUri` for a link without
/// a place, `UnknownType` for separators and other non-link, non-folder rows,
/// and `MissingRoot` if there is no places root.
pub fn extract_store(conn: &Connection) -> Result<BookmarkNode> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.type, b.fk, b.parent, b.position, b.title, b.dateAdded,
                b.lastModified, b.guid, p.url, p.url_hash
         FROM moz_bookmarks b
         LEFT JOIN moz_places p ON p.id = b.fk
         ORDER BY b.parent, b.position",
    )?;

    let mut root = None;
    let mut children_of: HashMap<i64, Vec<StoreRow>> = HashMap::new();
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<i64>>(3)?,
            StoreRow {
                id: row.get(0)?,
                type_code: row.get(1)?,
                fk: row.get(2)?,
                position: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
                title: row.get(5)?,
                date_added: row.get(6)?,
                last_modified: row.get(7)?,
                guid: row.get(8)?,
                url: row.get(9)?,
                url_hash: row.get(10)?,
            },
        ))
    })?;

    let root_guid = RootRole::Root.store_guid();
    for row in rows {
        let (parent, row) = row?;
        if row.guid == root_guid {
            root = Some(row);
        } else if let Some(parent) = parent {
            children_of.entry(parent).or_default().push(row);
        }
    }

    let root = root.ok_or_else(|| IntegrityViolation::MissingRoot {
        detail: format!("no {root_guid} row in moz_bookmarks"),
    })?;

    let tree = build_node(root, &mut children_of)?;
    debug!(nodes = tree.count(), "extracted store tree");
    Ok(tree)
}

fn build_node(row: StoreRow, children_of: &mut HashMap<i64, Vec<StoreRow>>) -> Result<BookmarkNode> {
    let is_places_root = row.guid == RootRole::Root.store_guid();
    let root = RootRole::from_store_guid(&row.guid).filter(|r| r.store_guid() == row.guid);

    let kind = match row.type_code {
        TYPE_BOOKMARK => {
            let (Some(_), Some(url)) = (row.fk, row.url) else {
                return Err(IntegrityViolation::MissingUri { guid: row.guid }.into());
            };
            let stored = row.url_hash.unwrap_or_default();
            if !matches_stored(&url, stored) {
                return Err(IntegrityViolation::FingerprintMismatch {
                    computed: stored_fingerprint(&url),
                    url,
                    stored,
                }
                .into());
            }
            if stored == 0 {
                warn!(guid = %row.guid, url = %url, "place has no url_hash yet; accepting");
            }
            NodeKind::Link { uri: url }
        }
        TYPE_FOLDER => {
            let mut children = Vec::new();
            for child in children_of.remove(&row.id).unwrap_or_default() {
                if is_places_root && child.guid == RootRole::Tags.store_guid() {
                    continue;
                }
                children.push(build_node(child, children_of)?);
            }
            NodeKind::Folder { children }
        }
        type_code => {
            return Err(IntegrityViolation::UnknownType {
                guid: row.guid,
                type_code,
            }
            .into());
        }
    };

    Ok(BookmarkNode {
        guid: row.guid,
        title: row.title.unwrap_or_default(),
        index: row.position,
        date_added: row.date_added.unwrap_or_default(),
        last_modified: row.last_modified.unwrap_or_default(),
        id: Some(row.id),
        root,
        kind,
    })
}

/// Validate a parsed snapshot and convert it to a tree.
///
/// Checks that guids are unique, that each root role appears at most once
/// and the top node is the places root, and that `typeCode` agrees with the
/// presence of `uri` (links have one, folders don't).
///
/// The menu, toolbar, unfiled and mobile folders must sit directly under the
/// root with their store guids. Importing a snapshot without them would
/// delete built-in folders.
///
/// # Errors
///
/// Returns the first integrity violation found.
pub fn validate_snapshot(raw: SnapshotNode) -> Result<BookmarkNode> {
    if raw.root != Some(RootRole::Root) {
        return Err(IntegrityViolation::MissingRoot {
            detail: format!("top node {} is not tagged placesRoot", raw.guid),
        }
        .into());
    }
    let mut seen = Validation::default();
    let tree = seen.convert(raw)?;
    check_top_folders(&tree)?;
    Ok(tree)
}

/// Roots every snapshot must carry under `placesRoot`. Tags are never
/// exported, so they are not required.
const REQUIRED_TOP_FOLDERS: [RootRole; 4] = [
    RootRole::Menu,
    RootRole::Toolbar,
    RootRole::Unfiled,
    RootRole::Mobile,
];

fn check_top_folders(tree: &BookmarkNode) -> Result<()> {
    for role in REQUIRED_TOP_FOLDERS {
        let guid = role.store_guid();
        let present = tree
            .children()
            .iter()
            .any(|child| child.root == Some(role) && child.guid == guid);
        if !present {
            return Err(IntegrityViolation::MissingRoot {
                detail: format!("{guid} ({role}) must be a child of the places root"),
            }
            .into());
        }
    }
    Ok(())
}

#[derive(Default)]
struct Validation {
    guids: HashSet<String>,
    roles: HashSet<RootRole>,
}

impl Validation {
    fn convert(&mut self, raw: SnapshotNode) -> Result<BookmarkNode> {
        if !self.guids.insert(raw.guid.clone()) {
            return Err(IntegrityViolation::DuplicateGuid { guid: raw.guid }.into());
        }
        if let Some(role) = raw.root {
            if !self.roles.insert(role) {
                return Err(IntegrityViolation::DuplicateRoot {
                    role: role.to_string(),
                    guid: raw.guid,
                }
                .into());
            }
        }

        let kind = match raw.type_code {
            TYPE_BOOKMARK => {
                if raw.children.as_ref().is_some_and(|c| !c.is_empty()) {
                    return Err(IntegrityViolation::TypeCodeMismatch {
                        guid: raw.guid,
                        type_code: raw.type_code,
                        detail: "it has children",
                    }
                    .into());
                }
                let Some(uri) = raw.uri else {
                    return Err(IntegrityViolation::MissingUri { guid: raw.guid }.into());
                };
                NodeKind::Link { uri }
            }
            TYPE_FOLDER => {
                if raw.uri.is_some() {
                    return Err(IntegrityViolation::TypeCodeMismatch {
                        guid: raw.guid,
                        type_code: raw.type_code,
                        detail: "it carries a uri",
                    }
                    .into());
                }
                let children = raw
                    .children
                    .unwrap_or_default()
                    .into_iter()
                    .map(|child| self.convert(child))
                    .collect::<Result<Vec<_>>>()?;
                NodeKind::Folder { children }
            }
            type_code => {
                return Err(IntegrityViolation::UnknownType {
                    guid: raw.guid,
                    type_code,
                }
                .into());
            }
        };

        Ok(BookmarkNode {
            guid: raw.guid,
            title: raw.title.unwrap_or_default(),
            index: raw.index,
            date_added: raw.date_added,
            last_modified: raw.last_modified,
            id: raw.id,
            root: raw.root,
            kind,
        })
    }
}
