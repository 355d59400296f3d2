//! placesync - reconcile a Firefox places database with a JSON snapshot.
//!
//! This crate provides the core functionality for the `placesync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Bookmark trees, flat rows and the snapshot format
//! - [`url_hash`] - The places URL fingerprint
//! - [`storage`] - SQLite access to `places.sqlite`
//! - [`sync`] - Extraction, diffing, ordering and applying changes
//! - [`config`] - Places path discovery and backup naming
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod sync;
pub mod url_hash;

pub use error::{Error, Result};
