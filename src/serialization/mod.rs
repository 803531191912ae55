//! Saved-game surfaces.
//!
//! This module defines the [`Snapshot`] of a game (grid, score and flags) with
//! JSON and postcard encodings, and the [`StateStore`] persistence boundary with
//! an in-memory and a directory-backed implementation.

mod snapshot;
mod store;

pub use snapshot::{
    Format,
    Snapshot,
    SerializationError,
    to_json,
    from_json,
    to_postcard_bytes,
    from_postcard_bytes,
    encode,
    decode,
};
pub use store::{FileStore, MemoryStore, StateStore};
