//! Human-readable diff reports.

use std::io::{self, Write};

use colored::Colorize;

use crate::error::Result;
use crate::model::FlatRow;
use crate::sync::diff::{Change, Diff, Field};

/// One line of a diff report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    /// Section heading, e.g. `Only in places.sqlite:`.
    Header(String),
    Entry(String),
}

/// Build the report for `diff`, labelling the two sides.
///
/// Sections are "Only in A", "Only in B", then "Changed"; empty sections
/// are left out.
#[must_use]
pub fn report_lines(diff: &Diff, a_label: &str, b_label: &str) -> Vec<ReportLine> {
    let mut lines = Vec::with_capacity(diff.len() + 3);

    for (label, rows) in [(a_label, &diff.only_in_a), (b_label, &diff.only_in_b)] {
        if rows.is_empty() {
            continue;
        }
        lines.push(ReportLine::Header(format!("Only in {label}:")));
        lines.extend(rows.values().map(|row| ReportLine::Entry(format_row(row))));
    }

    if !diff.changed.is_empty() {
        lines.push(ReportLine::Header("Changed:".to_string()));
        lines.extend(
            diff.changed
                .values()
                .map(|change| ReportLine::Entry(format_change(change))),
        );
    }
    lines
}

/// Write the report to `out`, headers in bold.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_report<W: Write>(
    out: &mut W,
    diff: &Diff,
    a_label: &str,
    b_label: &str,
) -> io::Result<()> {
    for line in report_lines(diff, a_label, b_label) {
        match line {
            ReportLine::Header(text) => writeln!(out, "{}", text.bold())?,
            ReportLine::Entry(text) => writeln!(out, "{text}")?,
        }
    }
    out.flush()
}

/// Print the report to stdout.
///
/// # Errors
///
/// Returns an I/O error if stdout is closed.
pub fn print_report(diff: &Diff, a_label: &str, b_label: &str) -> Result<()> {
    write_report(&mut io::stdout().lock(), diff, a_label, b_label)?;
    Ok(())
}

fn format_row(row: &FlatRow) -> String {
    format!("- {} {}", row.title, row.uri().unwrap_or("(folder)"))
}

/// Format one changed row: `- <title> <uri> [field: old -> new]...`.
///
/// Title and URI are shown as `old -> new` inline when they differ. Every
/// differing field, title and URI included, then follows in brackets.
#[must_use]
pub fn format_change(change: &Change) -> String {
    let (old, new) = (&change.old, &change.new);
    let mut parts = vec!["-".to_string(), arrow(&old.title, &new.title)];
    parts.push(arrow(
        old.uri().unwrap_or("(folder)"),
        new.uri().unwrap_or("(folder)"),
    ));

    for field in change.changed_fields() {
        let (before, after) = match field {
            Field::Parent => (old.parent.clone(), new.parent.clone()),
            Field::Index => (old.index.to_string(), new.index.to_string()),
            Field::DateAdded => (old.date_added.to_string(), new.date_added.to_string()),
            Field::LastModified => (
                old.last_modified.to_string(),
                new.last_modified.to_string(),
            ),
            Field::Title => (old.title.clone(), new.title.clone()),
            Field::Uri => (
                old.uri().unwrap_or("(folder)").to_string(),
                new.uri().unwrap_or("(folder)").to_string(),
            ),
        };
        parts.push(format!("[{}: {before} -> {after}]", field.as_str()));
    }
    parts.join(" ")
}

fn arrow(old: &str, new: &str) -> String {
    if old == new {
        new.to_string()
    } else {
        format!("{old} -> {new}")
    }
}
