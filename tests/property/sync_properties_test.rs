//! Property-based tests for flattening, diffing and ordering.
//!
//! These check the row-level laws over arbitrary bookmark trees: flattening
//! round-trips, diffs are symmetric and empty against themselves, and the
//! dependency order always puts parents first.

mod common;

use std::collections::HashMap;

use common::{arb_entries, tree};
use placesync::model::Rows;
use placesync::sync::{deletion_order, diff, order, rows_to_tree, to_rows};
use proptest::prelude::*;

fn positions(order: &[String]) -> HashMap<&str, usize> {
    order
        .iter()
        .enumerate()
        .map(|(i, guid)| (guid.as_str(), i))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rows_round_trip_through_tree(entries in arb_entries(40)) {
        let rows = to_rows(&tree(&entries)).unwrap();
        let rebuilt = rows_to_tree(&rows).unwrap();
        prop_assert_eq!(to_rows(&rebuilt).unwrap(), rows);
    }

    #[test]
    fn diff_with_self_is_empty(entries in arb_entries(40)) {
        let rows = to_rows(&tree(&entries)).unwrap();
        prop_assert!(diff(&rows, &rows).is_empty());
    }

    #[test]
    fn diff_is_symmetric(a in arb_entries(30), b in arb_entries(30)) {
        let a = to_rows(&tree(&a)).unwrap();
        let b = to_rows(&tree(&b)).unwrap();

        let forward = diff(&a, &b);
        let backward = diff(&b, &a);
        prop_assert_eq!(&forward.only_in_a, &backward.only_in_b);
        prop_assert_eq!(&forward.only_in_b, &backward.only_in_a);
        prop_assert_eq!(forward.changed.len(), backward.changed.len());
        for (guid, change) in &forward.changed {
            let other = &backward.changed[guid];
            prop_assert_eq!(&change.old, &other.new);
            prop_assert_eq!(&change.new, &other.old);
        }
    }

    #[test]
    fn order_puts_parents_first(
        entries in arb_entries(40),
        mask in prop::collection::vec(any::<bool>(), 41),
    ) {
        let rows = to_rows(&tree(&entries)).unwrap();
        // Any subset of a tree's rows is a forest.
        let subset: Rows = rows
            .into_iter()
            .zip(mask)
            .filter_map(|(row, keep)| keep.then_some(row))
            .collect();

        let inserts = order(&subset).unwrap();
        prop_assert_eq!(inserts.len(), subset.len());
        let at = positions(&inserts);
        prop_assert_eq!(at.len(), subset.len());
        for (guid, row) in &subset {
            if row.parent != *guid && subset.contains_key(&row.parent) {
                prop_assert!(at[row.parent.as_str()] < at[guid.as_str()]);
            }
        }

        let deletes = deletion_order(&subset).unwrap();
        let at = positions(&deletes);
        for (guid, row) in &subset {
            if row.parent != *guid && subset.contains_key(&row.parent) {
                prop_assert!(at[guid.as_str()] < at[row.parent.as_str()]);
            }
        }
    }
}
