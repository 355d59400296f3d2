//! Flat, parent-linked rows used for diffing.
//!
//! Nested trees compare badly under structural edits, so both sides of a
//! reconciliation are flattened to `guid → FlatRow` first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rows keyed by guid.
pub type Rows = BTreeMap<String, FlatRow>;

/// Whether a row is a link (with its URL) or a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Link { uri: String },
    Folder,
}

/// One bookmark with its parent recorded explicitly.
///
/// The root's `parent` is its own guid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RowRecord", from = "RowRecord")]
pub struct FlatRow {
    pub parent: String,
    pub title: String,
    pub index: i64,
    pub date_added: i64,
    pub last_modified: i64,
    pub kind: RowKind,
}

impl FlatRow {
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match &self.kind {
            RowKind::Link { uri } => Some(uri),
            RowKind::Folder => None,
        }
    }

    #[must_use]
    pub const fn is_link(&self) -> bool {
        matches!(self.kind, RowKind::Link { .. })
    }

    /// Whether this row is the synthetic root (its own parent).
    #[must_use]
    pub fn is_root_of(&self, guid: &str) -> bool {
        self.parent == guid
    }
}

/// Wire form of a row: `uri` present only for links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowRecord {
    parent: String,
    title: String,
    index: i64,
    date_added: i64,
    last_modified: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
}

impl From<FlatRow> for RowRecord {
    fn from(row: FlatRow) -> Self {
        let uri = match row.kind {
            RowKind::Link { uri } => Some(uri),
            RowKind::Folder => None,
        };
        Self {
            parent: row.parent,
            title: row.title,
            index: row.index,
            date_added: row.date_added,
            last_modified: row.last_modified,
            uri,
        }
    }
}

impl From<RowRecord> for FlatRow {
    fn from(rec: RowRecord) -> Self {
        Self {
            parent: rec.parent,
            title: rec.title,
            index: rec.index,
            date_added: rec.date_added,
            last_modified: rec.last_modified,
            kind: rec.uri.map_or(RowKind::Folder, |uri| RowKind::Link { uri }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_json_shape() {
        let row = FlatRow {
            parent: "toolbar_____".into(),
            title: "Example".into(),
            index: 0,
            date_added: 1,
            last_modified: 2,
            kind: RowKind::Link {
                uri: "http://example.org/".into(),
            },
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["parent"], "toolbar_____");
        assert_eq!(json["dateAdded"], 1);
        assert_eq!(json["uri"], "http://example.org/");

        let back: FlatRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_folder_row_has_no_uri() {
        let row = FlatRow {
            parent: "p".into(),
            title: String::new(),
            index: 3,
            date_added: 0,
            last_modified: 0,
            kind: RowKind::Folder,
        };
        assert!(!row.is_link());
        assert_eq!(row.uri(), None);
        assert!(serde_json::to_value(&row).unwrap().get("uri").is_none());
    }
}
