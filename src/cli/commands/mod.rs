//! Command implementations.

pub mod completions;
pub mod diff;
pub mod dump;
pub mod import;
pub mod version;

use std::path::{Path, PathBuf};

use crate::config::resolve_places_path;
use crate::error::{Error, Result};

/// Resolve the places database and make sure it exists.
///
/// A missing file is `PlacesNotFound` rather than a SQLite open error, and
/// is never created.
fn existing_places_path(places_path: Option<&PathBuf>) -> Result<PathBuf> {
    let path = resolve_places_path(places_path.map(PathBuf::as_path))?;
    if !path.is_file() {
        return Err(Error::PlacesNotFound { searched: path });
    }
    Ok(path)
}

/// Display label for a path in reports.
fn label(path: &Path) -> String {
    path.display().to_string()
}
