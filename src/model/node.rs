//! Hierarchical bookmark model and its JSON snapshot form.
//!
//! The snapshot format is the one Firefox writes from
//! "Organize Bookmarks → Backup", minus favicons.

use serde::{Deserialize, Serialize};

/// `moz_bookmarks.type` for a link.
pub const TYPE_BOOKMARK: i64 = 1;

/// `moz_bookmarks.type` for a folder.
pub const TYPE_FOLDER: i64 = 2;

/// MIME-like type string mirroring [`TYPE_BOOKMARK`].
pub const TYPE_NAME_BOOKMARK: &str = "text/x-moz-place";

/// MIME-like type string mirroring [`TYPE_FOLDER`].
pub const TYPE_NAME_FOLDER: &str = "text/x-moz-place-container";

/// One of the fixed structural folders every places database has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RootRole {
    #[serde(rename = "placesRoot")]
    Root,
    #[serde(rename = "bookmarksMenuFolder")]
    Menu,
    #[serde(rename = "toolbarFolder")]
    Toolbar,
    #[serde(rename = "tagsFolder")]
    Tags,
    #[serde(rename = "unfiledBookmarksFolder")]
    Unfiled,
    #[serde(rename = "mobileFolder")]
    Mobile,
}

impl RootRole {
    pub const ALL: [Self; 6] = [
        Self::Root,
        Self::Menu,
        Self::Toolbar,
        Self::Tags,
        Self::Unfiled,
        Self::Mobile,
    ];

    /// Short name, also the unpadded form of the store guid.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Menu => "menu",
            Self::Toolbar => "toolbar",
            Self::Tags => "tags",
            Self::Unfiled => "unfiled",
            Self::Mobile => "mobile",
        }
    }

    /// The guid Firefox gives this root: the short name padded to 12 chars with `_`.
    #[must_use]
    pub fn store_guid(&self) -> String {
        format!("{:_<12}", self.as_str())
    }

    /// Recognize a root by its store guid.
    #[must_use]
    pub fn from_store_guid(guid: &str) -> Option<Self> {
        let short = guid.trim_end_matches('_');
        Self::ALL.into_iter().find(|r| r.as_str() == short)
    }
}

impl std::fmt::Display for RootRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Link or folder. A node never changes kind after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Link { uri: String },
    Folder { children: Vec<BookmarkNode> },
}

/// A bookmark or folder with its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkNode {
    pub guid: String,
    pub title: String,
    /// Zero-based position among siblings.
    pub index: i64,
    /// Microseconds since the epoch.
    pub date_added: i64,
    /// Microseconds since the epoch, never before `date_added`.
    pub last_modified: i64,
    /// Store-local row id, informational only.
    pub id: Option<i64>,
    pub root: Option<RootRole>,
    pub kind: NodeKind,
}

impl BookmarkNode {
    /// The node's URL, if it is a link.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Link { uri } => Some(uri),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Child nodes; empty for links.
    #[must_use]
    pub fn children(&self) -> &[BookmarkNode] {
        match &self.kind {
            NodeKind::Link { .. } => &[],
            NodeKind::Folder { children } => children,
        }
    }

    #[must_use]
    pub const fn type_code(&self) -> i64 {
        match self.kind {
            NodeKind::Link { .. } => TYPE_BOOKMARK,
            NodeKind::Folder { .. } => TYPE_FOLDER,
        }
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Self::count).sum::<usize>()
    }

    /// Convert to the serializable snapshot form.
    #[must_use]
    pub fn to_snapshot(&self) -> SnapshotNode {
        let children: Vec<SnapshotNode> = self.children().iter().map(Self::to_snapshot).collect();
        SnapshotNode {
            guid: self.guid.clone(),
            title: Some(self.title.clone()),
            index: self.index,
            date_added: self.date_added,
            last_modified: self.last_modified,
            id: self.id,
            type_code: self.type_code(),
            type_name: match self.kind {
                NodeKind::Link { .. } => TYPE_NAME_BOOKMARK.to_string(),
                NodeKind::Folder { .. } => TYPE_NAME_FOLDER.to_string(),
            },
            root: self.root,
            uri: self.uri().map(String::from),
            children: (!children.is_empty()).then_some(children),
        }
    }
}

/// A node as it appears in a JSON snapshot, before validation.
///
/// Field order matches Firefox's backups. `children` is omitted, not
/// empty, when a folder has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    pub guid: String,
    #[serde(default)]
    pub title: Option<String>,
    pub index: i64,
    pub date_added: i64,
    pub last_modified: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub type_code: i64,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<RootRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SnapshotNode>>,
}
