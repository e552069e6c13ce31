//! The five repositories composed into one site-level handle, plus the
//! cross-kind ranked search and the whole-root validation report.

use crate::provider::SqliteBackend;
use crate::record::{AuthorMeta, CategoryMeta, EntityMeta, MediaMeta, PageMeta, PostMeta};
use crate::repo::Repository;
use crate::schema::EntityKind;
use crate::search::{merge_results, score_post, substring_match, SearchResult};
use crate::store::SlugStore;
use crate::{record, Result};
use serde::Serialize;
use std::path::Path;

/// One logical store per entity kind, explicitly constructed.
pub struct ContentDb {
    pub pages: Repository<PageMeta>,
    pub posts: Repository<PostMeta>,
    pub authors: Repository<AuthorMeta>,
    pub categories: Repository<CategoryMeta>,
    pub media: Repository<MediaMeta>,
}

impl ContentDb {
    /// File-backed repositories over a content root directory.
    pub fn open(content_root: &Path) -> Self {
        ContentDb {
            pages: Repository::open(content_root),
            posts: Repository::open(content_root),
            authors: Repository::open(content_root),
            categories: Repository::open(content_root),
            media: Repository::open(content_root),
        }
    }

    /// SQLite-backed repositories over a shared database.
    pub fn open_sqlite(backend: &SqliteBackend) -> Self {
        ContentDb {
            pages: Repository::new(Box::new(backend.provider())),
            posts: Repository::new(Box::new(backend.provider())),
            authors: Repository::new(Box::new(backend.provider())),
            categories: Repository::new(Box::new(backend.provider())),
            media: Repository::new(Box::new(backend.provider())),
        }
    }

    /// Ranked search across kinds. Posts carry a relevance score; pages,
    /// authors, and categories match by substring and rank below every
    /// scored post. A blank query yields an empty response.
    pub fn search(&self, query: &SearchQuery) -> SearchResponse {
        let q = query.query.trim();
        if q.is_empty() {
            return SearchResponse {
                results: Vec::new(),
                total: 0,
            };
        }

        let mut hits: Vec<SearchResult> = Vec::new();

        if query.wants(EntityKind::Post) {
            for record in self.posts.find_all() {
                if let Some(score) = score_post(q, &record) {
                    hits.push(SearchResult::from_record(&record, Some(score)));
                }
            }
        }
        if query.wants(EntityKind::Category) {
            for record in self.categories.find_all() {
                if substring_match(q, &record) {
                    hits.push(SearchResult::from_record(&record, None));
                }
            }
        }
        if query.wants(EntityKind::Author) {
            for record in self.authors.find_all() {
                if substring_match(q, &record) {
                    hits.push(SearchResult::from_record(&record, None));
                }
            }
        }
        if query.wants(EntityKind::Page) {
            for record in self.pages.find_all() {
                if substring_match(q, &record) {
                    hits.push(SearchResult::from_record(&record, None));
                }
            }
        }

        let total = hits.len();
        SearchResponse {
            results: merge_results(hits, query.effective_limit()),
            total,
        }
    }
}

/// A free-text search request.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: String,
    /// Restrict to these kinds; `None` searches every searchable kind.
    pub kinds: Option<Vec<EntityKind>>,
    pub limit: Option<i64>,
}

impl SearchQuery {
    pub const DEFAULT_LIMIT: usize = 20;

    pub fn new(query: impl Into<String>) -> Self {
        SearchQuery {
            query: query.into(),
            ..Self::default()
        }
    }

    fn wants(&self, kind: EntityKind) -> bool {
        match &self.kinds {
            Some(kinds) => kinds.contains(&kind),
            None => true,
        }
    }

    fn effective_limit(&self) -> usize {
        match self.limit {
            Some(n) if n >= 1 => n as usize,
            _ => Self::DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Matches before truncation to the limit.
    pub total: usize,
}

/// One record that failed schema validation or decoding.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub kind: EntityKind,
    pub slug: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub checked: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Decode every record file under a content root and report the ones that
/// would be treated as absent at query time.
pub fn validate_content_root(content_root: &Path) -> Result<ValidationReport> {
    let mut report = ValidationReport {
        checked: 0,
        issues: Vec::new(),
    };

    validate_kind::<PageMeta>(content_root, &mut report)?;
    validate_kind::<PostMeta>(content_root, &mut report)?;
    validate_kind::<AuthorMeta>(content_root, &mut report)?;
    validate_kind::<CategoryMeta>(content_root, &mut report)?;
    validate_kind::<MediaMeta>(content_root, &mut report)?;

    Ok(report)
}

fn validate_kind<M: EntityMeta>(content_root: &Path, report: &mut ValidationReport) -> Result<()> {
    let store = SlugStore::new(content_root, M::KIND);
    for slug in store.list_slugs()? {
        report.checked += 1;
        let outcome = store
            .read(&slug)
            .and_then(|raw| record::decode::<M>(&slug, &raw));
        if let Err(e) = outcome {
            report.issues.push(ValidationIssue {
                kind: M::KIND,
                slug,
                message: e.to_string(),
            });
        }
    }
    Ok(())
}
