//! Book identifiers.
//!
//! Ids are 12 bytes rendered as 24 lowercase hex characters: a big-endian
//! unix timestamp in seconds followed by 8 random bytes. Lookups accept
//! either hex case and normalize to lowercase.

use uuid::Uuid;

pub const ID_LEN: usize = 24;

pub fn new_id() -> String {
    let seconds = chrono::Utc::now().timestamp() as u32;
    let random = Uuid::new_v4();

    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    bytes[4..].copy_from_slice(&random.as_bytes()[..8]);
    hex::encode(bytes)
}

/// Shape check only, says nothing about whether the id exists.
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && hex::decode(id).is_ok()
}

pub fn normalize_id(id: &str) -> String {
    id.to_ascii_lowercase()
}
