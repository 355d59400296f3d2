//! Shared strategies: random bookmark forests with stable guids.
//!
//! Entry `i` always gets guid `node{i:08}` and is a folder iff `i % 3 == 0`,
//! so two independently generated forests agree on each guid's kind.

#![allow(dead_code)]

use std::collections::HashMap;

use placesync::model::{BookmarkNode, NodeKind, RootRole};
use proptest::prelude::*;
use proptest::sample::Index;

pub const ROOT_GUID: &str = "root________";

/// Parent pick, title, timestamp, site.
pub type Entry = (Index, String, i64, u8);

pub fn arb_entries(max: usize) -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(
        (
            any::<Index>(),
            "[a-zA-Z0-9 ]{0,12}",
            1_600_000_000_000_000_i64..1_700_000_000_000_000,
            any::<u8>(),
        ),
        0..max,
    )
}

pub fn guid(i: usize) -> String {
    format!("node{i:08}")
}

pub fn is_folder(i: usize) -> bool {
    i % 3 == 0
}

/// Build the entries into children lists keyed by parent guid.
///
/// Each entry's parent is one of `tops` or an earlier folder entry.
pub fn forest(entries: &[Entry], tops: &[&str]) -> HashMap<String, Vec<BookmarkNode>> {
    let mut candidates: Vec<String> = tops.iter().map(ToString::to_string).collect();
    let mut parents = Vec::with_capacity(entries.len());
    for (i, (pick, ..)) in entries.iter().enumerate() {
        parents.push(candidates[pick.index(candidates.len())].clone());
        if is_folder(i) {
            candidates.push(guid(i));
        }
    }

    // Children always come after their parent, so build back to front.
    let mut children: HashMap<String, Vec<BookmarkNode>> = HashMap::new();
    for (i, (_, title, stamp, site)) in entries.iter().enumerate().rev() {
        let kind = if is_folder(i) {
            let mut kids = children.remove(&guid(i)).unwrap_or_default();
            reindex(&mut kids);
            NodeKind::Folder { children: kids }
        } else {
            NodeKind::Link {
                uri: format!("https://site{}.example/", site % 4),
            }
        };
        children
            .entry(parents[i].clone())
            .or_default()
            .push(BookmarkNode {
                guid: guid(i),
                title: title.clone(),
                index: 0,
                date_added: *stamp,
                last_modified: *stamp,
                id: None,
                root: None,
                kind,
            });
    }
    for kids in children.values_mut() {
        reindex(kids);
    }
    children
}

/// Restore entry order (children were pushed back to front) and number them.
fn reindex(kids: &mut [BookmarkNode]) {
    kids.reverse();
    for (index, kid) in kids.iter_mut().enumerate() {
        kid.index = i64::try_from(index).unwrap();
    }
}

/// A standalone tree: everything hangs off a single places root.
pub fn tree(entries: &[Entry]) -> BookmarkNode {
    let children = forest(entries, &[ROOT_GUID])
        .remove(ROOT_GUID)
        .unwrap_or_default();
    BookmarkNode {
        guid: ROOT_GUID.to_string(),
        title: String::new(),
        index: 0,
        date_added: 0,
        last_modified: 0,
        id: None,
        root: Some(RootRole::Root),
        kind: NodeKind::Folder { children },
    }
}
