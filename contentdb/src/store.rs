//! Slug-keyed file store: physical persistence for one entity kind.
//!
//! One directory per kind under the content root, one file per record,
//! keyed by slug. The store knows nothing about frontmatter or schemas;
//! it moves bytes.

use crate::error::{ContentError, Result};
use crate::schema::EntityKind;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Filesystem-safe slug: letters, digits, then letters/digits/`.`/`_`/`-`.
/// Media slugs are filenames, so dots are allowed after the first character.
pub fn is_valid_slug(slug: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());
    re.is_match(slug)
}

/// Derive a slug from free text (e.g. a title).
pub fn slugify(input: &str) -> String {
    slug::slugify(input)
}

/// Walk upward from `start` until a directory containing `content/` is
/// found. Falls back to `start` itself.
pub fn resolve_content_root(start: &Path) -> PathBuf {
    let mut dir = start;
    loop {
        let candidate = dir.join("content");
        if candidate.is_dir() {
            return candidate;
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => return start.join("content"),
        }
    }
}

/// File store for one entity kind's directory.
pub struct SlugStore {
    kind: EntityKind,
    dir: PathBuf,
}

impl SlugStore {
    pub fn new(content_root: &Path, kind: EntityKind) -> Self {
        SlugStore {
            kind,
            dir: content_root.join(kind.directory()),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}.{}", self.kind.extension()))
    }

    pub fn exists(&self, slug: &str) -> bool {
        is_valid_slug(slug) && self.path_for(slug).is_file()
    }

    /// Read the raw contents of one record file.
    pub fn read(&self, slug: &str) -> Result<String> {
        if !is_valid_slug(slug) {
            return Err(ContentError::InvalidSlug(slug.to_string()));
        }
        let path = self.path_for(slug);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ContentError::NotFound {
                kind: self.kind,
                slug: slug.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Create or overwrite one record file.
    pub fn write(&self, slug: &str, contents: &str) -> Result<()> {
        if !is_valid_slug(slug) {
            return Err(ContentError::InvalidSlug(slug.to_string()));
        }
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(slug), contents)?;
        Ok(())
    }

    pub fn delete(&self, slug: &str) -> Result<()> {
        if !is_valid_slug(slug) {
            return Err(ContentError::InvalidSlug(slug.to_string()));
        }
        let path = self.path_for(slug);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ContentError::NotFound {
                kind: self.kind,
                slug: slug.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Enumerate every slug in this kind's directory. Reads the whole
    /// directory on each call; there is no cached index.
    pub fn list_slugs(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let pattern = format!("{}/*.{}", self.dir.display(), self.kind.extension());
        let mut slugs: Vec<String> = glob::glob(&pattern)
            .map_err(|e| ContentError::Other(format!("Glob error: {e}")))?
            .filter_map(|r| r.ok())
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(ToString::to_string)
            })
            .filter(|slug| is_valid_slug(slug))
            .collect();

        slugs.sort();
        Ok(slugs)
    }

    /// Move a record to a new slug: check the target is free, write the new
    /// file, delete the old one.
    ///
    /// Not atomic. A crash or concurrent reader between the write and the
    /// delete observes both slugs resolving to the same content, and a
    /// failure in that window leaves the store duplicated rather than
    /// rolled back.
    pub fn rename(&self, old_slug: &str, new_slug: &str, contents: &str) -> Result<()> {
        if self.exists(new_slug) {
            return Err(ContentError::AlreadyExists {
                kind: self.kind,
                slug: new_slug.to_string(),
            });
        }
        self.write(new_slug, contents)?;
        self.delete(old_slug)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(kind: EntityKind) -> (TempDir, SlugStore) {
        let tmp = TempDir::new().unwrap();
        let store = SlugStore::new(tmp.path(), kind);
        (tmp, store)
    }

    #[test]
    fn test_write_read_delete() {
        let (_tmp, store) = store(EntityKind::Post);
        store.write("hello", "contents").unwrap();
        assert!(store.exists("hello"));
        assert_eq!(store.read("hello").unwrap(), "contents");

        store.delete("hello").unwrap();
        assert!(!store.exists("hello"));
        assert!(matches!(
            store.read("hello"),
            Err(ContentError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let (_tmp, store) = store(EntityKind::Page);
        assert!(matches!(
            store.delete("ghost"),
            Err(ContentError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_slugs_sorted() {
        let (_tmp, store) = store(EntityKind::Post);
        for slug in ["zebra", "alpha", "mango"] {
            store.write(slug, "x").unwrap();
        }
        assert_eq!(store.list_slugs().unwrap(), vec!["alpha", "mango", "zebra"]);
    }

    #[test]
    fn test_list_ignores_foreign_extensions() {
        let (tmp, store) = store(EntityKind::Post);
        store.write("real", "x").unwrap();
        std::fs::write(tmp.path().join("posts/notes.txt"), "x").unwrap();
        assert_eq!(store.list_slugs().unwrap(), vec!["real"]);
    }

    #[test]
    fn test_invalid_slug_rejected() {
        let (_tmp, store) = store(EntityKind::Post);
        for bad in ["../escape", "", ".hidden", "a/b", "spaced out"] {
            assert!(
                matches!(store.write(bad, "x"), Err(ContentError::InvalidSlug(_))),
                "slug should be rejected: {bad:?}"
            );
        }
        // media-style filename slugs are fine
        assert!(is_valid_slug("IMG_2024.jpg"));
    }

    #[test]
    fn test_rename_moves_file() {
        let (_tmp, store) = store(EntityKind::Post);
        store.write("old", "body").unwrap();
        store.rename("old", "new", "body").unwrap();
        assert!(!store.exists("old"));
        assert_eq!(store.read("new").unwrap(), "body");
    }

    #[test]
    fn test_rename_refuses_occupied_target() {
        let (_tmp, store) = store(EntityKind::Post);
        store.write("a", "one").unwrap();
        store.write("b", "two").unwrap();
        assert!(matches!(
            store.rename("a", "b", "one"),
            Err(ContentError::AlreadyExists { .. })
        ));
        // no mutation happened
        assert_eq!(store.read("a").unwrap(), "one");
        assert_eq!(store.read("b").unwrap(), "two");
    }

    #[test]
    fn test_resolve_content_root_walks_up() {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("content");
        let nested = tmp.path().join("apps/site");
        std::fs::create_dir_all(&content).unwrap();
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(resolve_content_root(&nested), content);
    }

    #[test]
    fn test_resolve_content_root_fallback() {
        let tmp = TempDir::new().unwrap();
        let root = resolve_content_root(tmp.path());
        assert_eq!(root, tmp.path().join("content"));
    }
}
