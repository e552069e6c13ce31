//! Record files: YAML frontmatter + free-text body, decoded into typed
//! metadata per entity kind.

use crate::error::Result;
use crate::markdown;
use crate::schema::EntityKind;
use crate::validation;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A decoded record: slug identity, validated metadata, raw body, and the
/// body rendered to HTML (read path only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record<M> {
    pub slug: String,
    pub meta: M,
    pub body: String,
    pub html: Option<String>,
}

impl<M> Record<M> {
    pub fn new(slug: impl Into<String>, meta: M, body: impl Into<String>) -> Self {
        Record {
            slug: slug.into(),
            meta,
            body: body.into(),
            html: None,
        }
    }
}

/// Typed metadata for one entity kind.
///
/// The accessor defaults cover kinds that lack a field (e.g. categories have
/// no tags); `search_text` feeds the substring filter and the unscored
/// search path.
pub trait EntityMeta:
    Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static
{
    const KIND: EntityKind;

    fn title(&self) -> &str;

    fn date(&self) -> Option<&str> {
        None
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    fn size(&self) -> Option<u64> {
        None
    }

    fn description(&self) -> Option<&str> {
        None
    }

    fn excerpt(&self) -> Option<&str> {
        None
    }

    /// Field values scanned by the case-insensitive substring filter.
    fn search_text(&self) -> Vec<&str>;

    /// Canonicalize date-like fields before a write, mirroring what the
    /// read-path validator does to raw frontmatter.
    fn normalize(&mut self) {}
}

// ── Per-kind metadata ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
}

impl EntityMeta for PageMeta {
    const KIND: EntityKind = EntityKind::Page;

    fn title(&self) -> &str {
        &self.title
    }

    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn search_text(&self) -> Vec<&str> {
        let mut out = vec![self.title.as_str()];
        out.extend(self.description.as_deref());
        out
    }

    fn normalize(&mut self) {
        normalize_date_field(&mut self.date);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
}

impl EntityMeta for PostMeta {
    const KIND: EntityKind = EntityKind::Post;

    fn title(&self) -> &str {
        &self.title
    }

    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }

    fn search_text(&self) -> Vec<&str> {
        let mut out = vec![self.title.as_str()];
        out.extend(self.excerpt.as_deref());
        out.extend(self.tags.iter().map(String::as_str));
        out
    }

    fn normalize(&mut self) {
        normalize_date_field(&mut self.date);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl EntityMeta for AuthorMeta {
    const KIND: EntityKind = EntityKind::Author;

    fn title(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    fn search_text(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        out.extend(self.bio.as_deref());
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntityMeta for CategoryMeta {
    const KIND: EntityKind = EntityKind::Category;

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn search_text(&self) -> Vec<&str> {
        let mut out = vec![self.title.as_str()];
        out.extend(self.description.as_deref());
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaMeta {
    pub title: String,
    pub url: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl EntityMeta for MediaMeta {
    const KIND: EntityKind = EntityKind::Media;

    fn title(&self) -> &str {
        &self.title
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn description(&self) -> Option<&str> {
        self.alt.as_deref()
    }

    fn search_text(&self) -> Vec<&str> {
        let mut out = vec![self.title.as_str()];
        out.extend(self.alt.as_deref());
        out
    }
}

fn normalize_date_field(field: &mut Option<String>) {
    if let Some(raw) = field.as_deref() {
        if let Some(canonical) = validation::normalize_date(raw) {
            *field = Some(canonical);
        }
    }
}

// ── Codec ──────────────────────────────────────────────────────────

/// Split a raw record file into its frontmatter mapping and body text.
///
/// A file without a frontmatter block yields an empty mapping and the whole
/// text as body; required-field validation then rejects it downstream.
pub fn split_frontmatter(raw: &str) -> Result<(serde_yaml::Value, String)> {
    let Some(rest) = strip_delimiter_line(raw) else {
        return Ok((
            serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
            raw.to_string(),
        ));
    };

    // Closing delimiter: a line consisting of exactly "---"
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &rest[..offset];
            let body = rest[offset + line.len()..]
                .strip_prefix("\r\n")
                .or_else(|| rest[offset + line.len()..].strip_prefix('\n'))
                .unwrap_or(&rest[offset + line.len()..]);
            let meta: serde_yaml::Value = serde_yaml::from_str(yaml)?;
            let meta = if meta.is_null() {
                serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
            } else {
                meta
            };
            return Ok((meta, body.to_string()));
        }
        offset += line.len();
    }

    // Unterminated block: treat the whole file as body
    Ok((
        serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
        raw.to_string(),
    ))
}

fn strip_delimiter_line(raw: &str) -> Option<&str> {
    raw.strip_prefix("---\r\n")
        .or_else(|| raw.strip_prefix("---\n"))
}

/// Decode a raw record file: split, validate against the kind's contract,
/// deserialize into typed metadata, and render the body to HTML.
pub fn decode<M: EntityMeta>(slug: &str, raw: &str) -> Result<Record<M>> {
    let (mut meta_value, body) = split_frontmatter(raw)?;
    let result = validation::validate_metadata(M::KIND, &mut meta_value)?;
    for warning in &result.warnings {
        log::warn!("{}/{slug}: {warning}", M::KIND);
    }

    let meta: M = serde_yaml::from_value(meta_value)?;
    let html = Some(markdown::render(&body));

    Ok(Record {
        slug: slug.to_string(),
        meta,
        body,
        html,
    })
}

/// Serialize metadata + body back into the stored file format.
pub fn encode<M: EntityMeta>(meta: &M, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(meta)?;
    Ok(format!("---\n{yaml}---\n\n{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContentError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_frontmatter() {
        let raw = "---\ntitle: Hello\ntags: [\"a\", \"b\"]\n---\n\n# Body\n";
        let (meta, body) = split_frontmatter(raw).unwrap();
        assert_eq!(meta["title"], serde_yaml::Value::String("Hello".into()));
        assert_eq!(meta["tags"].as_sequence().unwrap().len(), 2);
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_without_frontmatter() {
        let (meta, body) = split_frontmatter("just text\n").unwrap();
        assert!(meta.as_mapping().unwrap().is_empty());
        assert_eq!(body, "just text\n");
    }

    #[test]
    fn test_decode_post() {
        let raw = "---\ntitle: First Post\ndate: '2024-03-01'\ntags: [\"rust\"]\n---\n\nHello *world*.\n";
        let record: Record<PostMeta> = decode("first-post", raw).unwrap();
        assert_eq!(record.slug, "first-post");
        assert_eq!(record.meta.title, "First Post");
        assert_eq!(record.meta.date.as_deref(), Some("2024-03-01T00:00:00+00:00"));
        assert_eq!(record.meta.tags, vec!["rust"]);
        assert_eq!(record.body, "Hello *world*.\n");
        assert!(record.html.as_deref().unwrap().contains("<em>world</em>"));
    }

    #[test]
    fn test_decode_rejects_missing_title() {
        let raw = "---\ndate: '2024-03-01'\n---\n\nBody\n";
        let err = decode::<PostMeta>("x", raw).unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));
    }

    #[test]
    fn test_round_trip_preserves_body_and_meta() {
        let meta = PostMeta {
            title: "Round Trip".into(),
            date: Some("2024-03-01T00:00:00+00:00".into()),
            tags: vec!["a".into(), "b".into()],
            excerpt: Some("short".into()),
            category: Some("tech".into()),
            author: None,
            media: None,
            seo_title: None,
            seo_description: None,
        };
        let body = "# Heading\n\nSome **bold** text.\n";
        let encoded = encode(&meta, body).unwrap();
        let decoded: Record<PostMeta> = decode("round-trip", &encoded).unwrap();
        assert_eq!(decoded.meta, meta);
        assert_eq!(decoded.body, body);
    }

    #[test]
    fn test_media_type_field_rename() {
        let raw = "---\ntitle: Logo\nurl: /img/logo.png\ntype: image\nsize: 2048\n---\n\n";
        let record: Record<MediaMeta> = decode("logo.png", raw).unwrap();
        assert_eq!(record.meta.media_type.as_deref(), Some("image"));
        assert_eq!(record.meta.size, Some(2048));
    }
}
