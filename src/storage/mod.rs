//! SQLite storage layer for placesync.
//!
//! # Submodules
//!
//! - [`places`] - `PlacesStore`: opening databases and the transaction protocol
//! - [`schema`] - places schema and root seeding for fresh databases
//! - [`backup`] - online backups before an import

pub mod backup;
pub mod places;
pub mod schema;

pub use places::PlacesStore;
pub use schema::ROOT_PARENT_ID;
