//! Error types for placesync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=argument, 5=integrity, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output on stderr when `--json` is given
//!
//! Every error aborts the whole reconciliation. Nothing is downgraded to a
//! warning and nothing is retried automatically.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for placesync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    DatabaseError,
    StoreChanged,

    // Not Found (exit 3)
    PlacesNotFound,

    // Argument (exit 4)
    InvalidArgument,

    // Integrity (exit 5)
    IntegrityViolation,
    MalformedUrl,

    // Reference (exit 6)
    UnresolvedReference,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::PlacesNotFound => "PLACES_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::StoreChanged => "STORE_CHANGED",
            Self::IntegrityViolation => "INTEGRITY_VIOLATION",
            Self::MalformedUrl => "MALFORMED_URL",
            Self::UnresolvedReference => "UNRESOLVED_REFERENCE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code (2-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::DatabaseError | Self::StoreChanged => 2,
            Self::PlacesNotFound => 3,
            Self::InvalidArgument => 4,
            Self::IntegrityViolation | Self::MalformedUrl => 5,
            Self::UnresolvedReference => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether re-running can succeed without fixing the input data.
    ///
    /// Integrity and reference errors need the snapshot or the store fixed
    /// first.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InvalidArgument | Self::StoreChanged)
    }
}

// ── Integrity Violations ──────────────────────────────────────

/// Structural problems found in a tree, a row set, or a diff.
///
/// These are always fatal and are raised before any mutation happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    #[error("guid {guid} appears more than once")]
    DuplicateGuid { guid: String },

    #[error("bookmark {guid} is its own parent")]
    SelfParent { guid: String },

    #[error("url_hash mismatch for {url}: stored {stored}, computed {computed}")]
    FingerprintMismatch {
        url: String,
        stored: i64,
        computed: i64,
    },

    #[error("bookmark {guid} changes kind between link and folder")]
    KindMismatch { guid: String },

    #[error("bookmark {guid} has type code {type_code} but {detail}")]
    TypeCodeMismatch {
        guid: String,
        type_code: i64,
        detail: &'static str,
    },

    #[error("bookmark {guid} has unsupported type code {type_code}")]
    UnknownType { guid: String, type_code: i64 },

    #[error("link {guid} has no url")]
    MissingUri { guid: String },

    #[error("root role {role} is used more than once (second use on {guid})")]
    DuplicateRoot { role: String, guid: String },

    #[error("tree has no places root: {detail}")]
    MissingRoot { detail: String },

    #[error("bookmark {guid} is not reachable from the root")]
    Orphan { guid: String },

    #[error("bookmark {guid} is part of a parent cycle")]
    Cycle { guid: String },
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in placesync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Integrity violation: {0}")]
    Integrity(#[from] IntegrityViolation),

    #[error("Unresolved reference: bookmark {guid} refers to {parent}, which is not in the store")]
    UnresolvedReference { guid: String, parent: String },

    #[error("Malformed URL (no scheme separator): {url}")]
    MalformedUrl { url: String },

    #[error("Places database not found (searched {})", searched.display())]
    PlacesNotFound { searched: PathBuf },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Places database changed while waiting for confirmation")]
    StoreChanged,
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Integrity(_) => ErrorCode::IntegrityViolation,
            Self::UnresolvedReference { .. } => ErrorCode::UnresolvedReference,
            Self::MalformedUrl { .. } => ErrorCode::MalformedUrl,
            Self::PlacesNotFound { .. } => ErrorCode::PlacesNotFound,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::StoreChanged => ErrorCode::StoreChanged,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::PlacesNotFound { .. } => Some(
                "Pass --places-path <profile>/places.sqlite or set PLACESYNC_PLACES".to_string(),
            ),

            Self::UnresolvedReference { parent, .. } => Some(format!(
                "Folder '{parent}' must exist in the store or be part of the snapshot. \
                 Run `placesync dump` to compare against the current store."
            )),

            Self::Integrity(IntegrityViolation::FingerprintMismatch { .. }) => Some(
                "The places database is inconsistent. Let Firefox run a maintenance pass \
                 (about:support → Verify Integrity) before importing."
                    .to_string(),
            ),

            Self::Integrity(IntegrityViolation::KindMismatch { guid }) => Some(format!(
                "Give the new entry a fresh guid instead of reusing '{guid}'."
            )),

            Self::StoreChanged => {
                Some("Re-run the import to review the new changes".to_string())
            }

            Self::MalformedUrl { .. } => {
                Some("URLs need a scheme, e.g. https://example.org/".to_string())
            }

            Self::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                Some("Close Firefox before importing; it holds a lock on places.sqlite".to_string())
            }

            Self::Integrity(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
