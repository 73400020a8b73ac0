//! Persisted recording list: the comma encoding and the key-value stores
//! it is written through.

mod encoding;
mod store;

pub use {
    encoding::{DELIMITER, decode_list, encode_list},
    store::{FileKeyValueStore, MemoryKeyValueStore},
};

/// Fixed storage key holding the encoded recording list.
pub const RECORDINGS_KEY: &str = "recordings";
