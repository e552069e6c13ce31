//! The structured-database-backed provider: records live in a single
//! SQLite table keyed by (kind, slug), metadata stored as JSON. Used by
//! the database-backed CMS variant; semantics mirror the file provider.

use crate::error::{ContentError, Result};
use crate::markdown;
use crate::provider::Provider;
use crate::record::{EntityMeta, Record};
use rusqlite::{params, Connection, OptionalExtension};
use std::marker::PhantomData;
use std::path::Path;
use std::rc::Rc;

/// A SQLite database shared by the providers of all five kinds.
pub struct SqliteBackend {
    conn: Rc<Connection>,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let backend = SqliteBackend { conn: Rc::new(conn) };
        backend.initialize_tables()?;
        Ok(backend)
    }

    /// In-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let backend = SqliteBackend { conn: Rc::new(conn) };
        backend.initialize_tables()?;
        Ok(backend)
    }

    fn initialize_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                kind TEXT NOT NULL,
                slug TEXT NOT NULL,
                meta_json TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (kind, slug)
            );

            CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind);
            ",
        )?;
        Ok(())
    }

    /// A provider handle for one entity kind over this database.
    pub fn provider<M: EntityMeta>(&self) -> SqliteProvider<M> {
        SqliteProvider {
            conn: Rc::clone(&self.conn),
            _meta: PhantomData,
        }
    }
}

pub struct SqliteProvider<M> {
    conn: Rc<Connection>,
    _meta: PhantomData<M>,
}

impl<M: EntityMeta> SqliteProvider<M> {
    fn decode_row(slug: String, meta_json: &str, body: String) -> Result<Record<M>> {
        let meta: M = serde_json::from_str(meta_json)
            .map_err(|e| ContentError::Validation(format!("{}/{slug}: {e}", M::KIND)))?;
        let html = Some(markdown::render(&body));
        Ok(Record {
            slug,
            meta,
            body,
            html,
        })
    }
}

impl<M: EntityMeta> Provider<M> for SqliteProvider<M> {
    fn slugs(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT slug FROM records WHERE kind = ?1 ORDER BY slug")?;
        let rows = stmt.query_map(params![M::KIND.to_string()], |row| row.get(0))?;
        let mut slugs = Vec::new();
        for slug in rows {
            slugs.push(slug?);
        }
        Ok(slugs)
    }

    fn exists(&self, slug: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE kind = ?1 AND slug = ?2",
            params![M::KIND.to_string(), slug],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn fetch(&self, slug: &str) -> Result<Record<M>> {
        let row = self
            .conn
            .query_row(
                "SELECT meta_json, body FROM records WHERE kind = ?1 AND slug = ?2",
                params![M::KIND.to_string(), slug],
                |row| {
                    let meta_json: String = row.get(0)?;
                    let body: String = row.get(1)?;
                    Ok((meta_json, body))
                },
            )
            .optional()?;

        match row {
            Some((meta_json, body)) => Self::decode_row(slug.to_string(), &meta_json, body),
            None => Err(ContentError::NotFound {
                kind: M::KIND,
                slug: slug.to_string(),
            }),
        }
    }

    fn fetch_all(&self) -> Result<Vec<Record<M>>> {
        let mut stmt = self.conn.prepare(
            "SELECT slug, meta_json, body FROM records WHERE kind = ?1 ORDER BY slug",
        )?;
        let rows = stmt.query_map(params![M::KIND.to_string()], |row| {
            let slug: String = row.get(0)?;
            let meta_json: String = row.get(1)?;
            let body: String = row.get(2)?;
            Ok((slug, meta_json, body))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (slug, meta_json, body) = row?;
            match Self::decode_row(slug.clone(), &meta_json, body) {
                Ok(record) => records.push(record),
                Err(e) => {
                    log::warn!("Skipping {}/{slug}: {e}", M::KIND);
                }
            }
        }
        Ok(records)
    }

    fn put(&self, slug: &str, meta: &M, body: &str) -> Result<()> {
        let meta_json = serde_json::to_string(meta)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO records (kind, slug, meta_json, body, updated_at)
             VALUES (?1, ?2, ?3, ?4, datetime('now'))",
            params![M::KIND.to_string(), slug, meta_json, body],
        )?;
        Ok(())
    }

    fn remove(&self, slug: &str) -> Result<()> {
        let affected = self.conn.execute(
            "DELETE FROM records WHERE kind = ?1 AND slug = ?2",
            params![M::KIND.to_string(), slug],
        )?;
        if affected == 0 {
            return Err(ContentError::NotFound {
                kind: M::KIND,
                slug: slug.to_string(),
            });
        }
        Ok(())
    }

    fn rename(&self, old_slug: &str, new_slug: &str, meta: &M, body: &str) -> Result<()> {
        if self.exists(new_slug)? {
            return Err(ContentError::AlreadyExists {
                kind: M::KIND,
                slug: new_slug.to_string(),
            });
        }
        self.put(new_slug, meta, body)?;
        self.remove(old_slug)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CategoryMeta, PostMeta};

    fn meta(title: &str) -> PostMeta {
        PostMeta {
            title: title.into(),
            date: None,
            tags: vec!["t".into()],
            excerpt: None,
            category: None,
            author: None,
            media: None,
            seo_title: None,
            seo_description: None,
        }
    }

    #[test]
    fn test_put_fetch_round_trip() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let provider: SqliteProvider<PostMeta> = backend.provider();

        provider.put("hello", &meta("Hello"), "Body\n").unwrap();
        let record = provider.fetch("hello").unwrap();
        assert_eq!(record.meta.title, "Hello");
        assert_eq!(record.body, "Body\n");
        assert!(record.html.is_some());
    }

    #[test]
    fn test_kinds_are_isolated() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let posts: SqliteProvider<PostMeta> = backend.provider();
        let categories: SqliteProvider<CategoryMeta> = backend.provider();

        posts.put("shared-slug", &meta("Post"), "").unwrap();
        categories
            .put(
                "shared-slug",
                &CategoryMeta {
                    title: "Category".into(),
                    description: None,
                },
                "",
            )
            .unwrap();

        assert_eq!(posts.fetch("shared-slug").unwrap().meta.title, "Post");
        assert_eq!(
            categories.fetch("shared-slug").unwrap().meta.title,
            "Category"
        );
        assert_eq!(posts.slugs().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let provider: SqliteProvider<PostMeta> = backend.provider();
        assert!(matches!(
            provider.remove("ghost"),
            Err(ContentError::NotFound { .. })
        ));
    }

    #[test]
    fn test_rename_refuses_occupied_target() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let provider: SqliteProvider<PostMeta> = backend.provider();
        provider.put("a", &meta("A"), "").unwrap();
        provider.put("b", &meta("B"), "").unwrap();
        assert!(matches!(
            provider.rename("a", "b", &meta("A"), ""),
            Err(ContentError::AlreadyExists { .. })
        ));
    }
}
