//! Diff command implementation.

use std::path::Path;

use crate::cli::commands::label;
use crate::error::Result;
use crate::sync::{diff, print_report, read_snapshot, to_rows, validate_snapshot};

/// Compare two snapshot files and print the differences.
///
/// # Errors
///
/// Returns an error if either file cannot be read or is structurally invalid.
pub fn execute(a: &Path, b: &Path, json: bool) -> Result<()> {
    let a_rows = to_rows(&validate_snapshot(read_snapshot(a)?)?)?;
    let b_rows = to_rows(&validate_snapshot(read_snapshot(b)?)?)?;
    let result = diff(&a_rows, &b_rows);

    if json {
        let payload = serde_json::json!({
            "a": label(a),
            "b": label(b),
            "changes": result.len(),
            "diff": result,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if result.is_empty() {
        println!("No changes");
    } else {
        print_report(&result, &label(a), &label(b))?;
    }
    Ok(())
}
