//! Places GUID generation.
//!
//! Firefox's `GenerateGUID` base64url-encodes 9 random bytes into a
//! 12-character id. New place records get ids in the same format so they
//! are indistinguishable from ones Firefox created.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use uuid::Uuid;

/// Length of a places guid in characters.
pub const GUID_LEN: usize = 12;

/// Generate a new 12-character places guid.
///
/// The 72 random bits come from a v4 UUID, skipping the bytes that carry
/// its version and variant bits.
#[must_use]
pub fn generate_guid() -> String {
    let uuid = Uuid::new_v4();
    let bytes = uuid.as_bytes();
    let mut raw = [0_u8; 9];
    raw[..6].copy_from_slice(&bytes[..6]);
    raw[6..].copy_from_slice(&bytes[9..12]);
    URL_SAFE_NO_PAD.encode(raw)
}
