//! URL fingerprinting compatible with Firefox's `url_hash` column.
//!
//! `moz_places.url_hash` is computed by Firefox with its `HashURL` helper:
//! the low 32 bits hash the whole URL, the next 16 bits hash the scheme.
//! Lookups by fingerprint only work if we reproduce it bit for bit.

const GOLDEN_RATIO: u32 = 0x9E37_79B9;

/// Mask for the scheme half of the fingerprint.
const PREFIX_MASK: u32 = 0x0000_FFFF;

fn add_to_hash(hash: u32, byte: u8) -> u32 {
    GOLDEN_RATIO.wrapping_mul(hash.rotate_left(5) ^ u32::from(byte))
}

fn hash_simple(s: &str) -> u32 {
    s.bytes().fold(0, add_to_hash)
}

/// Compute the 48-bit fingerprint of a URL.
///
/// The scheme is everything before the first `:`. A string without a
/// colon hashes the whole string as its own scheme.
///
/// # Example
///
/// ```
/// assert_eq!(placesync::url_hash::fingerprint("http://example.org/"), 125_508_604_170_377);
/// ```
#[must_use]
pub fn fingerprint(url: &str) -> u64 {
    let prefix = url.split_once(':').map_or(url, |(scheme, _)| scheme);
    (u64::from(hash_simple(prefix) & PREFIX_MASK) << 32) | u64::from(hash_simple(url))
}

/// The fingerprint as stored in SQLite's signed integer column.
#[must_use]
#[allow(clippy::cast_possible_wrap)] // 48 bits always fit
pub fn stored_fingerprint(url: &str) -> i64 {
    fingerprint(url) as i64
}

/// Check a stored fingerprint against a URL.
///
/// A stored value of 0 means Firefox has not computed the hash yet and is
/// accepted for any URL.
#[must_use]
pub fn matches_stored(url: &str, stored: i64) -> bool {
    stored == 0 || stored == stored_fingerprint(url)
}
