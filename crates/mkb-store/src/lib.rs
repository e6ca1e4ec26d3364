//! Filesystem-backed document store for the knowledge base
//!
//! Documents are markdown files organized into a fixed set of category
//! folders under a single base directory. Every document carries a JSON
//! metadata header followed by an H1 title and the raw body. The store
//! performs no caching and maintains no search index: every query is a
//! linear scan over the files on disk.

pub mod category;
pub mod document;
pub mod error;
pub mod index;
pub mod store;

pub use category::Category;
pub use document::{Document, Metadata};
pub use error::StoreError;
pub use index::IndexBuilder;
pub use store::{CategoryStats, DocEntry, KbStats, KnowledgeBase, SearchHit};

/// Name of the regenerated index artifact at the store root.
pub const INDEX_FILENAME: &str = "INDEX.md";
