//! Data models for placesync.
//!
//! - [`BookmarkNode`] - the nested tree, as extracted from a store or snapshot
//! - [`SnapshotNode`] - the JSON snapshot form of a node, before validation
//! - [`FlatRow`] - the parent-linked row form used for diffing

pub mod node;
pub mod row;

pub use node::{
    BookmarkNode, NodeKind, RootRole, SnapshotNode, TYPE_BOOKMARK, TYPE_FOLDER,
    TYPE_NAME_BOOKMARK, TYPE_NAME_FOLDER,
};
pub use row::{FlatRow, RowKind, Rows};
