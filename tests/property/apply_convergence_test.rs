//! Property-based tests for applying diffs to a places store.
//!
//! Starting from a fresh store, two arbitrary forests are imported in turn
//! under the built-in folders. After each apply, extracting the store again
//! must give exactly the target rows.

mod common;

use common::{arb_entries, forest};
use placesync::model::{BookmarkNode, NodeKind, RootRole};
use placesync::storage::PlacesStore;
use placesync::sync::{apply, diff, extract_store, to_rows};
use proptest::prelude::*;

const TOPS: [&str; 4] = ["menu________", "toolbar_____", "unfiled_____", "mobile______"];

/// The store's current tree with the built-in folders' contents replaced.
fn target(store: &PlacesStore, entries: &[common::Entry]) -> BookmarkNode {
    let mut tree = extract_store(store.conn()).unwrap();
    let mut contents = forest(entries, &TOPS);
    let NodeKind::Folder { children } = &mut tree.kind else {
        panic!("places root is a folder");
    };
    for top in children.iter_mut() {
        assert!(top.root.is_some_and(|r| r != RootRole::Root));
        top.kind = NodeKind::Folder {
            children: contents.remove(&top.guid).unwrap_or_default(),
        };
    }
    tree
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn apply_converges(first in arb_entries(30), second in arb_entries(30)) {
        let mut store = PlacesStore::open_memory().unwrap();

        for entries in [&first, &second] {
            let target_rows = to_rows(&target(&store, entries)).unwrap();
            let current = to_rows(&extract_store(store.conn()).unwrap()).unwrap();
            let pending = diff(&current, &target_rows);

            store.mutate("converge", |tx| apply(&pending, tx)).unwrap();

            let after = to_rows(&extract_store(store.conn()).unwrap()).unwrap();
            let remaining = diff(&after, &target_rows);
            prop_assert!(remaining.is_empty(), "left over: {:?}", remaining);
        }
    }
}
