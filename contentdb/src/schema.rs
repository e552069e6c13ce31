//! Entity kinds and their frontmatter field contracts.
//!
//! Each of the five entity kinds maps to one directory under the content
//! root and carries a fixed table of [`FieldSpec`]s. The validator
//! (`crate::validation`) checks raw frontmatter against these tables before
//! anything is deserialized into a typed metadata struct.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five record kinds, each with its own store and schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Page,
    Post,
    Author,
    Category,
    Media,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Page,
        EntityKind::Post,
        EntityKind::Author,
        EntityKind::Category,
        EntityKind::Media,
    ];

    /// Directory name for this kind under the content root.
    pub fn directory(&self) -> &'static str {
        match self {
            EntityKind::Page => "pages",
            EntityKind::Post => "posts",
            EntityKind::Author => "authors",
            EntityKind::Category => "categories",
            EntityKind::Media => "media",
        }
    }

    /// File extension for record files of this kind.
    pub fn extension(&self) -> &'static str {
        "md"
    }

    /// The frontmatter field contract for this kind.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            EntityKind::Page => PAGE_FIELDS,
            EntityKind::Post => POST_FIELDS,
            EntityKind::Author => AUTHOR_FIELDS,
            EntityKind::Category => CATEGORY_FIELDS,
            EntityKind::Media => MEDIA_FIELDS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Page => "page",
            EntityKind::Post => "post",
            EntityKind::Author => "author",
            EntityKind::Category => "category",
            EntityKind::Media => "media",
        };
        f.write_str(s)
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page" | "pages" => Ok(EntityKind::Page),
            "post" | "posts" => Ok(EntityKind::Post),
            "author" | "authors" => Ok(EntityKind::Author),
            "category" | "categories" => Ok(EntityKind::Category),
            "media" => Ok(EntityKind::Media),
            other => Err(format!("Unknown entity kind: '{other}'")),
        }
    }
}

/// Primitive type a frontmatter field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Date,
    StringList,
}

/// Declaration of one frontmatter field: name, type, whether it is
/// required, and an optional closed set of allowed string values.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub enum_values: Option<&'static [&'static str]>,
}

const fn field(name: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required,
        enum_values: None,
    }
}

pub const MEDIA_TYPES: &[&str] = &["image", "video", "audio", "document"];

const PAGE_FIELDS: &[FieldSpec] = &[
    field("title", FieldKind::String, true),
    field("description", FieldKind::String, false),
    field("date", FieldKind::Date, false),
    field("seo_title", FieldKind::String, false),
    field("seo_description", FieldKind::String, false),
];

const POST_FIELDS: &[FieldSpec] = &[
    field("title", FieldKind::String, true),
    field("date", FieldKind::Date, false),
    field("tags", FieldKind::StringList, false),
    field("excerpt", FieldKind::String, false),
    field("category", FieldKind::String, false),
    field("author", FieldKind::String, false),
    field("media", FieldKind::String, false),
    field("seo_title", FieldKind::String, false),
    field("seo_description", FieldKind::String, false),
];

const AUTHOR_FIELDS: &[FieldSpec] = &[
    field("name", FieldKind::String, true),
    field("bio", FieldKind::String, false),
    field("avatar", FieldKind::String, false),
];

const CATEGORY_FIELDS: &[FieldSpec] = &[
    field("title", FieldKind::String, true),
    field("description", FieldKind::String, false),
];

const MEDIA_FIELDS: &[FieldSpec] = &[
    field("title", FieldKind::String, true),
    field("url", FieldKind::String, true),
    FieldSpec {
        name: "type",
        kind: FieldKind::String,
        required: false,
        enum_values: Some(MEDIA_TYPES),
    },
    field("alt", FieldKind::String, false),
    field("size", FieldKind::Number, false),
    field("width", FieldKind::Number, false),
    field("height", FieldKind::Number, false),
    field("duration", FieldKind::Number, false),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_directories_are_distinct() {
        let dirs: std::collections::HashSet<_> =
            EntityKind::ALL.iter().map(|k| k.directory()).collect();
        assert_eq!(dirs.len(), EntityKind::ALL.len());
    }

    #[test]
    fn test_kind_from_str_accepts_plural() {
        assert_eq!("posts".parse::<EntityKind>().unwrap(), EntityKind::Post);
        assert_eq!("category".parse::<EntityKind>().unwrap(), EntityKind::Category);
        assert!("widgets".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_required_fields_per_kind() {
        let required = |k: EntityKind| {
            k.fields()
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(required(EntityKind::Post), vec!["title"]);
        assert_eq!(required(EntityKind::Media), vec!["title", "url"]);
        assert_eq!(required(EntityKind::Author), vec!["name"]);
    }
}
