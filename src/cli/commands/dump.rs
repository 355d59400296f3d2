//! Dump command implementation.

use std::path::PathBuf;

use crate::cli::commands::existing_places_path;
use crate::error::Result;
use crate::storage::PlacesStore;
use crate::sync::{extract_store, render_snapshot, write_snapshot};

/// Write the store's bookmark tree as a snapshot, to `output` or stdout.
///
/// The database is opened read-only.
///
/// # Errors
///
/// Returns an error if the database cannot be read, fails integrity checks,
/// or the output file exists without `overwrite`.
pub fn execute(
    output: Option<&PathBuf>,
    overwrite: bool,
    places_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let places = existing_places_path(places_path)?;
    let store = PlacesStore::open_read_only(&places)?;
    let tree = extract_store(store.conn())?;

    let Some(output) = output else {
        print!("{}", render_snapshot(&tree)?);
        return Ok(());
    };

    write_snapshot(output, &tree, overwrite)?;
    if json {
        let payload = serde_json::json!({
            "success": true,
            "places": places.display().to_string(),
            "output": output.display().to_string(),
            "bookmarks": tree.count(),
        });
        println!("{payload}");
    } else {
        println!("Wrote {} bookmarks to {}", tree.count(), output.display());
    }
    Ok(())
}
