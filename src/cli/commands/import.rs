//! Import command implementation.
//!
//! Backs the places database up (a SQLite copy and a JSON dump, unless
//! `--no-backup`), shows the changes, asks for confirmation, and applies
//! them in one transaction. With `--json` the changes and the prompt go to
//! stderr so stdout holds only the result payload.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use colored::Colorize;
use tracing::warn;

use crate::cli::commands::{existing_places_path, label};
use crate::config::{BackupPaths, backup_paths};
use crate::error::Result;
use crate::storage::PlacesStore;
use crate::sync::{
    ApplyStats, ImportOutcome, Importer, extract_store, read_snapshot, validate_snapshot,
    write_report, write_snapshot,
};

const PROMPT: &str = "Really import the above changes? Press CTRL-C to abort, or RETURN to proceed.";

/// Options for the import command.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub no_backup: bool,
    pub no_confirm: bool,
    pub silent: bool,
}

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if the snapshot is invalid, the backup fails, or the
/// apply is rejected. Nothing is written to the database on error.
pub fn execute(
    path: &Path,
    options: ImportOptions,
    places_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let target = validate_snapshot(read_snapshot(path)?)?;
    let places = existing_places_path(places_path)?;
    let backups = backup_paths(&places, Local::now())?;

    let mut store = PlacesStore::open(&places)?;
    if !options.no_backup {
        write_backups(&store, &backups)?;
    }

    let (places_label, snapshot_label) = (label(&places), label(path));
    let outcome = Importer::new(&mut store).import(&target, |diff| {
        if !options.silent {
            // stdout carries the JSON payload under --json.
            let shown = if json {
                write_report(&mut io::stderr().lock(), diff, &places_label, &snapshot_label)
            } else {
                write_report(&mut io::stdout().lock(), diff, &places_label, &snapshot_label)
            };
            if let Err(e) = shown {
                warn!(error = %e, "Could not print the pending changes");
                return false;
            }
        }
        options.no_confirm || confirm_on_stdin()
    })?;

    if json {
        print_json(&outcome, &places, (!options.no_backup).then_some(&backups))?;
        return Ok(());
    }

    match outcome {
        ImportOutcome::NoChanges => {
            if !options.silent {
                println!("No changes");
            }
        }
        ImportOutcome::Declined { .. } => println!("Aborting."),
        ImportOutcome::Applied { stats, .. } => {
            if !options.silent {
                print_stats(&stats);
            }
        }
    }
    Ok(())
}

fn write_backups(store: &PlacesStore, backups: &BackupPaths) -> Result<()> {
    store.backup_to(&backups.sqlite)?;
    let current = extract_store(store.conn())?;
    write_snapshot(&backups.json, &current, false)?;
    Ok(())
}

/// Ask on stderr until the user presses RETURN on an empty line.
///
/// End of input (or a read error) declines.
fn confirm_on_stdin() -> bool {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        eprint!("{PROMPT}");
        if io::stderr().flush().is_err() {
            return false;
        }
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                eprintln!();
                return false;
            }
            Ok(_) if line.trim_end_matches(['\r', '\n']).is_empty() => return true,
            Ok(_) => {}
        }
    }
}

fn print_stats(stats: &ApplyStats) {
    println!("{}", "Import complete".green().bold());
    println!("  Inserted: {}", stats.inserted);
    println!("  Updated:  {}", stats.updated);
    println!("  Deleted:  {}", stats.deleted);
    if stats.places_created > 0 || stats.origins_created > 0 {
        println!(
            "  {}",
            format!(
                "({} new places, {} new origins)",
                stats.places_created, stats.origins_created
            )
            .dimmed()
        );
    }
}

fn print_json(
    outcome: &ImportOutcome,
    places: &Path,
    backups: Option<&BackupPaths>,
) -> Result<()> {
    let backup = backups.map(|b| {
        serde_json::json!({
            "sqlite": label(&b.sqlite),
            "json": label(&b.json),
        })
    });
    let payload = match outcome {
        ImportOutcome::NoChanges => serde_json::json!({
            "success": true,
            "places": label(places),
            "backup": backup,
            "applied": false,
            "changes": 0,
        }),
        ImportOutcome::Declined { diff } => serde_json::json!({
            "success": false,
            "places": label(places),
            "backup": backup,
            "applied": false,
            "changes": diff.len(),
        }),
        ImportOutcome::Applied { diff, stats } => serde_json::json!({
            "success": true,
            "places": label(places),
            "backup": backup,
            "applied": true,
            "changes": diff.len(),
            "stats": stats,
        }),
    };
    println!("{}", serde_json::to_string(&payload)?);
    Ok(())
}
