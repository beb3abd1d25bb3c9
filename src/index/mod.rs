//! On-disk vector index.
//!
//! The index is a directory tree rooted at a configurable path, with one
//! subdirectory per collection holding its entries as JSON. The whole tree is
//! relocatable, which is what the export/import lifecycle relies on.

mod archive;
mod store;
pub mod types;

pub use store::IndexStore;
pub use types::{ChunkMetadata, EntryInsert, IndexError, QueryHit, StoredEntry};
