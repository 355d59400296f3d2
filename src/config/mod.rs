//! Configuration management.
//!
//! Locating the Firefox places database and naming backups taken before an
//! import.
//!
//! Resolution priority for the places database:
//! 1. `--places-path` flag, or the `PLACESYNC_PLACES` environment variable
//!    (both handled by clap)
//! 2. The most recently modified `places.sqlite` in a
//!    `~/.mozilla/firefox/*.default*/` profile

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::{Error, Result};

/// File name of the places database inside a profile.
pub const PLACES_FILE: &str = "places.sqlite";

const SQLITE_SUFFIX: &str = ".sqlite";

/// The Firefox profiles directory, `~/.mozilla/firefox`.
#[must_use]
pub fn firefox_profiles_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".mozilla").join("firefox"))
}

/// Resolve the places database path.
///
/// Relative paths are made absolute against the current directory.
///
/// # Errors
///
/// Returns `PlacesNotFound` if no path was given and no default profile
/// has a places database.
pub fn resolve_places_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => {
            let profiles = firefox_profiles_dir().ok_or_else(|| {
                Error::Config("Could not determine the home directory".to_string())
            })?;
            newest_places_in(&profiles).ok_or(Error::PlacesNotFound { searched: profiles })?
        }
    };
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    debug!(path = %path.display(), "Resolved places database");
    Ok(path)
}

/// Find the most recently modified places database among the default
/// profiles (`*.default*`) in `profiles_dir`.
#[must_use]
pub fn newest_places_in(profiles_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(profiles_dir).ok()?;
    entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| is_default_profile(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path().join(PLACES_FILE))
        .filter_map(|places| {
            let modified = fs::metadata(&places).and_then(|m| m.modified()).ok()?;
            Some((modified, places))
        })
        .max_by_key(|(modified, _): &(SystemTime, PathBuf)| *modified)
        .map(|(_, places)| places)
}

/// Matches the `*.default*` glob: `<salt>.default`, `<salt>.default-release`, ...
fn is_default_profile(dir_name: &str) -> bool {
    dir_name.contains(".default")
}

/// Where the pre-import backups go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPaths {
    /// Copy of the database.
    pub sqlite: PathBuf,
    /// JSON snapshot of the bookmarks.
    pub json: PathBuf,
}

/// Name the backups for `places`, taken at `now`.
///
/// `/p/places.sqlite` becomes `/p/places_before_20240131_235959.sqlite`
/// and `.json`.
///
/// # Errors
///
/// Returns `InvalidArgument` if the path does not end in `.sqlite`.
pub fn backup_paths(places: &Path, now: DateTime<Local>) -> Result<BackupPaths> {
    let full = places.to_string_lossy();
    let base = full.strip_suffix(SQLITE_SUFFIX).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "places path must end in {SQLITE_SUFFIX}: {}",
            places.display()
        ))
    })?;
    let stamp = now.format("%Y%m%d_%H%M%S");
    Ok(BackupPaths {
        sqlite: PathBuf::from(format!("{base}_before_{stamp}.sqlite")),
        json: PathBuf::from(format!("{base}_before_{stamp}.json")),
    })
}
