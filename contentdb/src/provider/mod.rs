//! Pluggable storage backends behind the repository façade.

mod file;
mod sqlite;

pub use file::FileProvider;
pub use sqlite::{SqliteBackend, SqliteProvider};

use crate::error::Result;
use crate::record::{EntityMeta, Record};

/// Physical storage for one entity kind. The façade composes these
/// primitives; swapping the backend never touches façade call sites.
pub trait Provider<M: EntityMeta> {
    /// All slugs currently stored, sorted.
    fn slugs(&self) -> Result<Vec<String>>;

    fn exists(&self, slug: &str) -> Result<bool>;

    /// Load and decode one record. Distinguishes `NotFound` from
    /// `Validation`; the lenient façade surface collapses both.
    fn fetch(&self, slug: &str) -> Result<Record<M>>;

    /// Load every decodable record. Records that fail to decode or
    /// validate are logged and skipped, never surfaced partially.
    fn fetch_all(&self) -> Result<Vec<Record<M>>>;

    /// Create or overwrite one record.
    fn put(&self, slug: &str, meta: &M, body: &str) -> Result<()>;

    fn remove(&self, slug: &str) -> Result<()>;

    /// Relocate a record to a new slug, writing the given (possibly
    /// updated) content. Two-phase: the new slug is written before the old
    /// one is removed, so a failure in between leaves both resolving.
    fn rename(&self, old_slug: &str, new_slug: &str, meta: &M, body: &str) -> Result<()>;
}
