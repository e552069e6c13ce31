pub mod error;
pub mod markdown;
pub mod provider;
pub mod query;
pub mod record;
pub mod repo;
pub mod schema;
pub mod search;
pub mod site;
pub mod store;
pub mod validation;

pub use error::{ContentError, Result};
pub use query::{Filters, Page, PageRequest, SortDirection, SortField, SortSpec};
pub use record::{
    AuthorMeta, CategoryMeta, EntityMeta, MediaMeta, PageMeta, PostMeta, Record,
};
pub use repo::{RecordPatch, Repository, UpdateOutcome};
pub use schema::EntityKind;
pub use search::SearchResult;
pub use site::{ContentDb, SearchQuery, SearchResponse};
