use crate::schema::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Record not found: {kind}/{slug}")]
    NotFound { kind: EntityKind, slug: String },

    #[error("Slug already exists: {kind}/{slug}")]
    AlreadyExists { kind: EntityKind, slug: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid slug: '{0}'")]
    InvalidSlug(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ContentError>;
