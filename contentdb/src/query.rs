//! Filter, sort, and pagination engines over decoded records.
//!
//! Predicates combine with AND; the tag predicate itself is an OR over the
//! supplied list. Sorting is deterministic: ties on the primary key break
//! by ascending slug.

use crate::record::{EntityMeta, Record};
use crate::validation;
use std::cmp::Ordering;
use std::str::FromStr;

/// Predicate set for a filtered listing. `None` on an axis means no
/// filtering on that axis.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    /// Match records carrying any of these tags.
    pub tags: Option<Vec<String>>,
    /// Case-insensitive substring over the kind's searchable fields.
    pub search: Option<String>,
    /// Minimum size in bytes (media only).
    pub min_size: Option<u64>,
    /// Maximum size in bytes (media only).
    pub max_size: Option<u64>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.tags.is_none()
            && self.search.is_none()
            && self.min_size.is_none()
            && self.max_size.is_none()
    }

    pub fn matches<M: EntityMeta>(&self, record: &Record<M>) -> bool {
        if let Some(wanted) = &self.tags {
            let tags = record.meta.tags();
            if !wanted.iter().any(|t| tags.iter().any(|have| have == t)) {
                return false;
            }
        }

        if let Some(term) = &self.search {
            let needle = term.to_lowercase();
            if !needle.is_empty() {
                let hit = record
                    .meta
                    .search_text()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle));
                if !hit {
                    return false;
                }
            }
        }

        if self.min_size.is_some() || self.max_size.is_some() {
            let size = record.meta.size().unwrap_or(0);
            if let Some(min) = self.min_size {
                if size < min {
                    return false;
                }
            }
            if let Some(max) = self.max_size {
                if size > max {
                    return false;
                }
            }
        }

        true
    }

    pub fn apply<M: EntityMeta>(&self, records: Vec<Record<M>>) -> Vec<Record<M>> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Title,
    Size,
    /// Alias for [`SortField::Date`]; there is no distinct creation
    /// timestamp in the stored format.
    Created,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortField::Date),
            "title" | "name" => Ok(SortField::Title),
            "size" => Ok(SortField::Size),
            "created" => Ok(SortField::Created),
            other => Err(format!("Unknown sort field: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("Unknown sort direction: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        SortSpec { field, direction }
    }

    pub fn descending_date() -> Self {
        SortSpec::new(SortField::Date, SortDirection::Desc)
    }
}

/// Sort in place. Strings compare case-insensitively, dates by parsed
/// timestamp (missing date = epoch zero), sizes numerically.
pub fn sort_records<M: EntityMeta>(records: &mut [Record<M>], spec: &SortSpec) {
    records.sort_by(|a, b| {
        let primary = match spec.field {
            SortField::Date | SortField::Created => {
                validation::sort_timestamp(a.meta.date()).cmp(&validation::sort_timestamp(b.meta.date()))
            }
            SortField::Title => a
                .meta
                .title()
                .to_lowercase()
                .cmp(&b.meta.title().to_lowercase()),
            SortField::Size => a.meta.size().unwrap_or(0).cmp(&b.meta.size().unwrap_or(0)),
        };
        let primary = match spec.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        match primary {
            Ordering::Equal => a.slug.cmp(&b.slug),
            other => other,
        }
    });
}

/// A pagination request. Garbage input is clamped, never an error: pages
/// below 1 become 1, sizes below 1 become [`PageRequest::DEFAULT_SIZE`].
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl PageRequest {
    pub const DEFAULT_SIZE: usize = 10;

    pub fn new(page: i64, page_size: i64) -> Self {
        PageRequest {
            page: if page < 1 { 1 } else { page as usize },
            page_size: if page_size < 1 {
                Self::DEFAULT_SIZE
            } else {
                page_size as usize
            },
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(1, Self::DEFAULT_SIZE as i64)
    }
}

/// One page of a filtered, sorted collection. `total` counts the whole
/// filtered collection, independent of the page size.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub has_more: bool,
}

/// Slice a sorted, filtered collection. A page past the end yields an
/// empty slice with `has_more = false`.
pub fn paginate<T>(items: Vec<T>, request: &PageRequest) -> Page<T> {
    let total = items.len();
    let start = (request.page() - 1).saturating_mul(request.page_size());
    let page_items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(request.page_size())
        .collect();
    let has_more = request.page() * request.page_size() < total;

    Page {
        items: page_items,
        total,
        has_more,
    }
}
