//! Snapshot file operations.
//!
//! Snapshots are pretty-printed JSON (two-space indent, trailing newline).
//! Writes either refuse to touch an existing file or replace it atomically:
//! write to a temp file, sync to disk, then rename.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{BookmarkNode, SnapshotNode};

/// Read and parse a snapshot file. The result is not validated yet.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid snapshot JSON.
pub fn read_snapshot(path: &Path) -> Result<SnapshotNode> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Render a tree as snapshot JSON, with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_snapshot(tree: &BookmarkNode) -> Result<String> {
    let mut out = serde_json::to_string_pretty(&tree.to_snapshot())?;
    out.push('\n');
    Ok(out)
}

/// Write a tree as a snapshot file.
///
/// Without `overwrite` the file must not exist yet.
///
/// # Errors
///
/// Returns `InvalidArgument` if the file exists and `overwrite` is false,
/// or an I/O error.
pub fn write_snapshot(path: &Path, tree: &BookmarkNode, overwrite: bool) -> Result<()> {
    let content = render_snapshot(tree)?;
    if overwrite {
        return atomic_write(path, &content);
    }

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::InvalidArgument(format!(
                "{} already exists (use --overwrite to replace it)",
                path.display()
            )),
            _ => Error::Io(e),
        })?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Write content to a file atomically.
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}
