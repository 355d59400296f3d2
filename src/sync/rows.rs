//! Flattening trees into rows, and rebuilding trees from rows.

use std::collections::HashMap;

use crate::error::{IntegrityViolation, Result};
use crate::model::{BookmarkNode, FlatRow, NodeKind, RowKind, Rows, TYPE_BOOKMARK};

/// Flatten a tree into `guid → FlatRow`, depth first from the root.
///
/// The root's `parent` is its own guid.
///
/// # Errors
///
/// Returns `SelfParent` if a non-root node has its parent's guid, and
/// `DuplicateGuid` if a guid is visited twice.
pub fn to_rows(tree: &BookmarkNode) -> Result<Rows> {
    let mut rows = Rows::new();
    visit(tree, &tree.guid, &mut rows)?;
    Ok(rows)
}

fn visit(node: &BookmarkNode, parent: &str, rows: &mut Rows) -> Result<()> {
    if !rows.is_empty() && node.guid == parent {
        return Err(IntegrityViolation::SelfParent {
            guid: node.guid.clone(),
        }
        .into());
    }
    if rows.contains_key(&node.guid) {
        return Err(IntegrityViolation::DuplicateGuid {
            guid: node.guid.clone(),
        }
        .into());
    }

    let kind = match &node.kind {
        NodeKind::Link { uri } => RowKind::Link { uri: uri.clone() },
        NodeKind::Folder { .. } => RowKind::Folder,
    };
    rows.insert(
        node.guid.clone(),
        FlatRow {
            parent: parent.to_string(),
            title: node.title.clone(),
            index: node.index,
            date_added: node.date_added,
            last_modified: node.last_modified,
            kind,
        },
    );

    for child in node.children() {
        visit(child, &node.guid, rows)?;
    }
    Ok(())
}

/// Rebuild a tree from rows.
///
/// Siblings are ordered by `index`, then guid. Store ids and root roles
/// are not part of a row and come back as `None`.
///
/// # Errors
///
/// Returns `MissingRoot` unless exactly one row is its own parent,
/// `TypeCodeMismatch` if a link has children, and `Orphan` for rows not
/// reachable from the root.
pub fn rows_to_tree(rows: &Rows) -> Result<BookmarkNode> {
    let mut roots = rows.iter().filter(|(guid, row)| row.is_root_of(guid));
    let (root_guid, root_row) = match (roots.next(), roots.next()) {
        (Some(root), None) => root,
        (None, _) => {
            return Err(IntegrityViolation::MissingRoot {
                detail: "no row is its own parent".to_string(),
            }
            .into());
        }
        (Some((a, _)), Some((b, _))) => {
            return Err(IntegrityViolation::MissingRoot {
                detail: format!("both {a} and {b} claim to be the root"),
            }
            .into());
        }
    };

    let mut children_of: HashMap<&str, Vec<(&str, &FlatRow)>> = HashMap::new();
    for (guid, row) in rows {
        if !row.is_root_of(guid) {
            children_of
                .entry(row.parent.as_str())
                .or_default()
                .push((guid.as_str(), row));
        }
    }
    for siblings in children_of.values_mut() {
        siblings.sort_by(|(ga, a), (gb, b)| a.index.cmp(&b.index).then_with(|| ga.cmp(gb)));
    }

    let tree = build(root_guid, root_row, &mut children_of)?;
    if tree.count() != rows.len() {
        let mut reached = Rows::new();
        visit(&tree, &tree.guid, &mut reached)?;
        if let Some(guid) = rows.keys().find(|g| !reached.contains_key(*g)) {
            return Err(IntegrityViolation::Orphan { guid: guid.clone() }.into());
        }
    }
    Ok(tree)
}

fn build(
    guid: &str,
    row: &FlatRow,
    children_of: &mut HashMap<&str, Vec<(&str, &FlatRow)>>,
) -> Result<BookmarkNode> {
    let children = children_of.remove(guid).unwrap_or_default();
    let kind = match &row.kind {
        RowKind::Link { uri } => {
            if !children.is_empty() {
                return Err(IntegrityViolation::TypeCodeMismatch {
                    guid: guid.to_string(),
                    type_code: TYPE_BOOKMARK,
                    detail: "it has children",
                }
                .into());
            }
            NodeKind::Link { uri: uri.clone() }
        }
        RowKind::Folder => NodeKind::Folder {
            children: children
                .into_iter()
                .map(|(g, r)| build(g, r, children_of))
                .collect::<Result<Vec<_>>>()?,
        },
    };

    Ok(BookmarkNode {
        guid: guid.to_string(),
        title: row.title.clone(),
        index: row.index,
        date_added: row.date_added,
        last_modified: row.last_modified,
        id: None,
        root: None,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::RootRole;

    fn node(guid: &str, index: i64, kind: NodeKind) -> BookmarkNode {
        BookmarkNode {
            guid: guid.into(),
            title: format!("title {guid}"),
            index,
            date_added: 100,
            last_modified: 200,
            id: None,
            root: None,
            kind,
        }
    }

    fn link(guid: &str, index: i64) -> BookmarkNode {
        node(
            guid,
            index,
            NodeKind::Link {
                uri: format!("https://example.org/{guid}"),
            },
        )
    }

    fn folder(guid: &str, index: i64, children: Vec<BookmarkNode>) -> BookmarkNode {
        node(guid, index, NodeKind::Folder { children })
    }

    fn sample() -> BookmarkNode {
        let mut root = folder(
            "root________",
            0,
            vec![
                folder("toolbar_____", 0, vec![link("a", 0), folder("f", 1, vec![link("b", 0)])]),
                folder("unfiled_____", 1, vec![]),
            ],
        );
        root.root = Some(RootRole::Root);
        root
    }

    #[test]
    fn test_to_rows_links_parents() {
        let rows = to_rows(&sample()).unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows["root________"].parent, "root________");
        assert_eq!(rows["toolbar_____"].parent, "root________");
        assert_eq!(rows["b"].parent, "f");
        assert_eq!(rows["b"].uri(), Some("https://example.org/b"));
        assert_eq!(rows["f"].kind, RowKind::Folder);
    }

    #[test]
    fn test_to_rows_rejects_duplicate() {
        let tree = folder("r", 0, vec![link("x", 0), link("x", 1)]);
        assert!(matches!(
            to_rows(&tree),
            Err(Error::Integrity(IntegrityViolation::DuplicateGuid { .. }))
        ));
    }

    #[test]
    fn test_to_rows_rejects_self_parent() {
        let tree = folder("r", 0, vec![folder("f", 0, vec![link("f", 0)])]);
        assert!(matches!(
            to_rows(&tree),
            Err(Error::Integrity(IntegrityViolation::SelfParent { .. }))
        ));
    }

    #[test]
    fn test_rebuild_round_trip() {
        let rows = to_rows(&sample()).unwrap();
        let rebuilt = rows_to_tree(&rows).unwrap();
        assert_eq!(to_rows(&rebuilt).unwrap(), rows);
        assert_eq!(rebuilt.children()[0].children()[1].guid, "f");
    }

    #[test]
    fn test_rebuild_rejects_orphan() {
        let mut rows = to_rows(&sample()).unwrap();
        rows.get_mut("b").unwrap().parent = "nowhere".into();
        assert!(matches!(
            rows_to_tree(&rows),
            Err(Error::Integrity(IntegrityViolation::Orphan { .. }))
        ));
    }

    #[test]
    fn test_rebuild_rejects_two_roots() {
        let mut rows = to_rows(&sample()).unwrap();
        rows.get_mut("unfiled_____").unwrap().parent = "unfiled_____".into();
        assert!(matches!(
            rows_to_tree(&rows),
            Err(Error::Integrity(IntegrityViolation::MissingRoot { .. }))
        ));
    }
}
