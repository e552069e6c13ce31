//! The repository façade: the public per-kind API composing store,
//! validation, filter, sort, and pagination.
//!
//! Construction is explicit: a repository owns exactly one provider and is
//! passed to callers, there is no process-global instance. Read methods
//! come in two flavors: `get` propagates the precise failure, the `find_*`
//! family swallows failures into absence after logging (the contract HTTP
//! callers map to 404/empty).

use crate::error::{ContentError, Result};
use crate::provider::{FileProvider, Provider};
use crate::query::{paginate, sort_records, Filters, Page, PageRequest, SortSpec};
use crate::record::{EntityMeta, PostMeta, Record};
use crate::schema::EntityKind;
use crate::store;
use std::path::Path;

/// Partial update: any subset of slug, metadata, and body.
#[derive(Debug, Clone)]
pub struct RecordPatch<M> {
    pub slug: Option<String>,
    pub meta: Option<M>,
    pub body: Option<String>,
}

impl<M> Default for RecordPatch<M> {
    fn default() -> Self {
        RecordPatch {
            slug: None,
            meta: None,
            body: None,
        }
    }
}

impl<M> RecordPatch<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(slug: impl Into<String>) -> Self {
        RecordPatch {
            slug: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_meta(mut self, meta: M) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// What a successful update did: the slug the record now lives under, and
/// whether that differs from the one the caller addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub slug: String,
    pub renamed: bool,
}

pub struct Repository<M: EntityMeta> {
    provider: Box<dyn Provider<M>>,
}

impl<M: EntityMeta> Repository<M> {
    pub fn new(provider: Box<dyn Provider<M>>) -> Self {
        Repository { provider }
    }

    /// File-backed repository over the given content root.
    pub fn open(content_root: &Path) -> Self {
        Repository::new(Box::new(FileProvider::<M>::new(content_root)))
    }

    pub fn kind(&self) -> EntityKind {
        M::KIND
    }

    // ── Read path ──────────────────────────────────────────────────

    /// Precise lookup: `NotFound`, `Validation`, and IO failures stay
    /// distinguishable.
    pub fn get(&self, slug: &str) -> Result<Record<M>> {
        self.provider.fetch(slug)
    }

    /// Lenient lookup: any failure is logged and collapsed to `None`.
    pub fn find_by_slug(&self, slug: &str) -> Option<Record<M>> {
        match self.provider.fetch(slug) {
            Ok(record) => Some(record),
            Err(ContentError::NotFound { .. }) => None,
            Err(e) => {
                log::warn!("{}/{slug} treated as absent: {e}", M::KIND);
                None
            }
        }
    }

    pub fn find_all(&self) -> Vec<Record<M>> {
        match self.provider.fetch_all() {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Listing {} failed: {e}", M::KIND);
                Vec::new()
            }
        }
    }

    pub fn find_with_filters(&self, filters: &Filters, sort: Option<&SortSpec>) -> Vec<Record<M>> {
        let mut records = filters.apply(self.find_all());
        if let Some(spec) = sort {
            sort_records(&mut records, spec);
        }
        records
    }

    pub fn find_with_pagination(
        &self,
        filters: &Filters,
        sort: Option<&SortSpec>,
        request: &PageRequest,
    ) -> Page<Record<M>> {
        paginate(self.find_with_filters(filters, sort), request)
    }

    // ── Write path ─────────────────────────────────────────────────

    /// Create a record. The slug is taken as given, or derived from the
    /// title when absent. Fails with `AlreadyExists` if the slug is taken.
    pub fn create(&self, slug: Option<&str>, mut meta: M, body: &str) -> Result<String> {
        meta.normalize();
        let slug = match slug {
            Some(s) => s.to_string(),
            None => store::slugify(meta.title()),
        };
        if !store::is_valid_slug(&slug) {
            return Err(ContentError::InvalidSlug(slug));
        }
        if self.provider.exists(&slug)? {
            return Err(ContentError::AlreadyExists {
                kind: M::KIND,
                slug,
            });
        }
        self.provider.put(&slug, &meta, body)?;
        Ok(slug)
    }

    /// Apply a partial update: metadata-only, body-only, slug rename, or
    /// any combination. A rename is two-phase (write new, delete old) and
    /// fails with `AlreadyExists` before any mutation if the target slug
    /// is occupied.
    pub fn update(&self, slug: &str, patch: RecordPatch<M>) -> Result<UpdateOutcome> {
        let existing = self.provider.fetch(slug)?;
        let mut meta = patch.meta.unwrap_or(existing.meta);
        meta.normalize();
        let body = patch.body.unwrap_or(existing.body);
        let new_slug = patch.slug.unwrap_or_else(|| slug.to_string());

        if new_slug == slug {
            self.provider.put(slug, &meta, &body)?;
            return Ok(UpdateOutcome {
                slug: new_slug,
                renamed: false,
            });
        }

        if !store::is_valid_slug(&new_slug) {
            return Err(ContentError::InvalidSlug(new_slug));
        }
        if self.provider.exists(&new_slug)? {
            return Err(ContentError::AlreadyExists {
                kind: M::KIND,
                slug: new_slug,
            });
        }
        self.provider.rename(slug, &new_slug, &meta, &body)?;
        Ok(UpdateOutcome {
            slug: new_slug,
            renamed: true,
        })
    }

    pub fn delete(&self, slug: &str) -> Result<()> {
        self.provider.remove(slug)
    }
}

impl Repository<PostMeta> {
    /// Posts referencing the given category slug, no referential check.
    pub fn find_by_category(&self, category: &str) -> Vec<Record<PostMeta>> {
        self.find_all()
            .into_iter()
            .filter(|r| r.meta.category.as_deref() == Some(category))
            .collect()
    }

    /// Posts referencing the given author slug.
    pub fn find_by_author(&self, author: &str) -> Vec<Record<PostMeta>> {
        self.find_all()
            .into_iter()
            .filter(|r| r.meta.author.as_deref() == Some(author))
            .collect()
    }
}
