//! Bookmark reconciliation.
//!
//! - **Extract**: places store or JSON snapshot → [`BookmarkNode`](crate::model::BookmarkNode) tree
//! - **Rows**: tree → `guid → FlatRow` mapping (and back)
//! - **Diff**: two row sets → only-in-A / changed / only-in-B
//! - **Order**: parent-first insertion order, child-first deletion order
//! - **Apply**: a diff → inserts, updates and deletes on one transaction
//!
//! # Flow
//!
//! An import extracts the store and validates the snapshot, flattens both
//! to rows, diffs them with the store as side A, and applies the diff:
//! inserts parent first, then updates, then deletes child first. URLs are
//! resolved to `moz_places` rows by fingerprint, creating the place (and
//! its `moz_origins` row) when missing.
//!
//! # Example
//!
//! ```ignore
//! use placesync::sync::{Importer, read_snapshot, validate_snapshot};
//!
//! let target = validate_snapshot(read_snapshot(path)?)?;
//! let mut importer = Importer::new(&mut store);
//! let outcome = importer.import(&target, |diff| !diff.is_empty())?;
//! ```

mod apply;
mod diff;
mod extract;
mod file;
mod guid;
mod import;
mod order;
mod report;
mod rows;

pub use apply::{ApplyStats, apply, split_origin};
pub use diff::{Change, Diff, Field, diff};
pub use extract::{Source, extract, extract_store, validate_snapshot};
pub use file::{atomic_write, read_snapshot, render_snapshot, write_snapshot};
pub use guid::{GUID_LEN, generate_guid};
pub use import::{ImportOutcome, Importer};
pub use order::{deletion_order, order};
pub use report::{ReportLine, format_change, print_report, report_lines, write_report};
pub use rows::{rows_to_tree, to_rows};
