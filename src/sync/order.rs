//! Dependency ordering for inserts and deletes.
//!
//! A subset of a tree's rows forms a forest: rows whose parent is outside
//! the subset (or who are their own parent) are its roots. Inserts walk the
//! forest parent first; deletes walk it in reverse, children first.

use std::collections::HashMap;

use crate::error::{IntegrityViolation, Result};
use crate::model::Rows;

/// Order guids so every row comes after its parent (if the parent is in `rows`).
///
/// Each subset root is followed immediately by a depth-first walk of its
/// descendants. Siblings are visited by `index`, then guid.
///
/// # Errors
///
/// Returns `Cycle` if some rows are only reachable through each other.
/// Rows built by [`crate::sync::to_rows`] never form a cycle.
pub fn order(rows: &Rows) -> Result<Vec<String>> {
    let mut roots = Vec::new();
    let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
    for (guid, row) in rows {
        if rows.contains_key(&row.parent) && row.parent != *guid {
            children_of.entry(row.parent.as_str()).or_default().push(guid);
        } else {
            roots.push(guid.as_str());
        }
    }
    for siblings in children_of.values_mut() {
        siblings.sort_by_key(|guid| (rows[*guid].index, *guid));
    }

    let mut result = Vec::with_capacity(rows.len());
    let mut stack: Vec<&str> = roots.into_iter().rev().collect();
    while let Some(guid) = stack.pop() {
        result.push(guid.to_string());
        if let Some(children) = children_of.remove(guid) {
            stack.extend(children.into_iter().rev());
        }
    }

    if result.len() != rows.len() {
        if let Some(guid) = children_of.values().flatten().next() {
            return Err(IntegrityViolation::Cycle {
                guid: (*guid).to_string(),
            }
            .into());
        }
    }
    Ok(result)
}

/// Order guids children first, for deletion.
///
/// # Errors
///
/// Same as [`order`].
pub fn deletion_order(rows: &Rows) -> Result<Vec<String>> {
    let mut result = order(rows)?;
    result.reverse();
    Ok(result)
}
