//! Row-set diffing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{FlatRow, Rows};

/// A row present on both sides with at least one differing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub old: FlatRow,
    pub new: FlatRow,
}

/// A field of [`FlatRow`] that can differ between two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Parent,
    Title,
    Index,
    DateAdded,
    LastModified,
    Uri,
}

impl Field {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Title => "title",
            Self::Index => "index",
            Self::DateAdded => "dateAdded",
            Self::LastModified => "lastModified",
            Self::Uri => "uri",
        }
    }
}

impl Change {
    /// Fields that differ, in row order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<Field> {
        let (a, b) = (&self.old, &self.new);
        [
            (Field::Parent, a.parent != b.parent),
            (Field::Title, a.title != b.title),
            (Field::Index, a.index != b.index),
            (Field::DateAdded, a.date_added != b.date_added),
            (Field::LastModified, a.last_modified != b.last_modified),
            (Field::Uri, a.kind != b.kind),
        ]
        .into_iter()
        .filter_map(|(field, differs)| differs.then_some(field))
        .collect()
    }

    #[must_use]
    pub fn uri_changed(&self) -> bool {
        self.old.uri() != self.new.uri()
    }

    #[must_use]
    pub fn parent_changed(&self) -> bool {
        self.old.parent != self.new.parent
    }
}

/// The three partitions of a comparison between row sets A and B.
///
/// When reconciling, A is the store and B is the target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diff {
    pub only_in_a: Rows,
    pub changed: BTreeMap<String, Change>,
    pub only_in_b: Rows,
}

impl Diff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.only_in_a.is_empty() && self.changed.is_empty() && self.only_in_b.is_empty()
    }

    /// Total number of differing guids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.only_in_a.len() + self.changed.len() + self.only_in_b.len()
    }

    /// The same diff seen from the other side.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            only_in_a: self.only_in_b,
            changed: self
                .changed
                .into_iter()
                .map(|(guid, c)| (guid, Change { old: c.new, new: c.old }))
                .collect(),
            only_in_b: self.only_in_a,
        }
    }
}

/// Compare two row sets by guid.
///
/// Rows present on both sides are `changed` if any field differs.
#[must_use]
pub fn diff(a: &Rows, b: &Rows) -> Diff {
    let only_in_a = a
        .iter()
        .filter(|(guid, _)| !b.contains_key(*guid))
        .map(|(guid, row)| (guid.clone(), row.clone()))
        .collect();
    let only_in_b = b
        .iter()
        .filter(|(guid, _)| !a.contains_key(*guid))
        .map(|(guid, row)| (guid.clone(), row.clone()))
        .collect();
    let changed = a
        .iter()
        .filter_map(|(guid, old)| {
            let new = b.get(guid)?;
            (old != new).then(|| {
                (
                    guid.clone(),
                    Change {
                        old: old.clone(),
                        new: new.clone(),
                    },
                )
            })
        })
        .collect();

    Diff {
        only_in_a,
        changed,
        only_in_b,
    }
}
