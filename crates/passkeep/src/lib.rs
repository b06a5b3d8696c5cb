//! passkeep - Local credential manager
//!
//! Named secrets (password entries with category, website and login)
//! kept in one flat text file. Every mutation rewrites the file.
//!
//! The encrypt/decrypt operations are a single-byte XOR over the stored
//! secrets. That is obfuscation, not encryption: anyone holding the file
//! can reverse it.

pub mod entry;
pub mod generator;
pub mod store;
pub mod transform;

pub use entry::{Entry, EntryKind};
pub use generator::{generate, Charset, GeneratorError};
pub use store::{AddOutcome, SortKey, Store, StoreError};
pub use transform::{transform, DEFAULT_KEY};
