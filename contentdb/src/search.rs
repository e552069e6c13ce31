//! Relevance scoring and the uniform cross-kind result shape.
//!
//! Posts get a term-frequency, field-weighted score; the other kinds match
//! by case-insensitive substring with no score. The score is an opaque
//! monotonic ranking signal: callers may rely on ordering, not on values.

use crate::record::{EntityMeta, PostMeta, Record};
use crate::schema::EntityKind;
use serde::Serialize;

/// One search hit in the merged, uniform shape.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: EntityKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SearchResult {
    pub fn from_record<M: EntityMeta>(record: &Record<M>, score: Option<f64>) -> Self {
        SearchResult {
            id: record.slug.clone(),
            title: record.meta.title().to_string(),
            description: record.meta.description().map(ToString::to_string),
            kind: M::KIND,
            url: format!("/{}/{}", M::KIND.directory(), record.slug),
            excerpt: record.meta.excerpt().map(ToString::to_string),
            tags: record.meta.tags().to_vec(),
            score,
        }
    }

    fn effective_score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// Lowercase, split on non-alphanumerics, drop single-character tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.len() >= 2)
        .map(String::from)
        .collect()
}

const WEIGHT_TITLE: f64 = 4.0;
const WEIGHT_TAGS: f64 = 2.5;
const WEIGHT_EXCERPT: f64 = 1.5;
const WEIGHT_BODY: f64 = 1.0;
const PHRASE_BONUS: f64 = 5.0;

/// Score a post against a query. `None` means no match.
pub fn score_post(query: &str, record: &Record<PostMeta>) -> Option<f64> {
    let terms = tokenize(query);
    if terms.is_empty() {
        return None;
    }

    let title = tokenize(&record.meta.title);
    let tags: Vec<String> = record
        .meta
        .tags
        .iter()
        .flat_map(|t| tokenize(t))
        .collect();
    let excerpt = tokenize(record.meta.excerpt.as_deref().unwrap_or(""));
    let body = tokenize(&record.body);

    let mut score = 0.0;
    for term in &terms {
        score += term_frequency(term, &title) * WEIGHT_TITLE;
        score += term_frequency(term, &tags) * WEIGHT_TAGS;
        score += term_frequency(term, &excerpt) * WEIGHT_EXCERPT;
        score += term_frequency(term, &body) * WEIGHT_BODY;
    }

    if score == 0.0 {
        return None;
    }

    // Whole query appearing in the title outranks scattered term hits
    if record
        .meta
        .title
        .to_lowercase()
        .contains(&query.trim().to_lowercase())
    {
        score += PHRASE_BONUS;
    }

    Some(score)
}

fn term_frequency(term: &str, tokens: &[String]) -> f64 {
    tokens.iter().filter(|t| *t == term).count() as f64
}

/// Unscored substring match over a kind's searchable fields.
pub fn substring_match<M: EntityMeta>(query: &str, record: &Record<M>) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    record
        .meta
        .search_text()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Merge heterogeneous hits into one globally-ranked list, truncated to
/// `limit`. Scored hits sort above unscored ones by construction; ties
/// break by slug for determinism.
pub fn merge_results(mut results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        b.effective_score()
            .total_cmp(&a.effective_score())
            .then_with(|| a.id.cmp(&b.id))
    });
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PostMeta;

    fn post(slug: &str, title: &str, tags: &[&str], body: &str) -> Record<PostMeta> {
        Record::new(
            slug,
            PostMeta {
                title: title.into(),
                date: None,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                excerpt: None,
                category: None,
                author: None,
                media: None,
                seo_title: None,
                seo_description: None,
            },
            body,
        )
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Hello, World!"), vec!["hello", "world"]);
        assert_eq!(tokenize("a I"), Vec::<String>::new());
    }

    #[test]
    fn test_title_hit_outranks_body_hit() {
        let in_title = post("t", "Rust at the Edge", &[], "nothing relevant");
        let in_body = post("b", "Weekly Notes", &[], "we tried rust briefly");
        let st = score_post("rust", &in_title).unwrap();
        let sb = score_post("rust", &in_body).unwrap();
        assert!(st > sb, "title={st} body={sb}");
    }

    #[test]
    fn test_no_match_is_none() {
        let record = post("p", "Gardening", &["soil"], "plants");
        assert!(score_post("kubernetes", &record).is_none());
        assert!(score_post("", &record).is_none());
    }

    #[test]
    fn test_phrase_in_title_gets_bonus() {
        let exact = post("e", "Async Rust Patterns", &[], "");
        let scattered = post("s", "Patterns for Rust, mostly async", &[], "");
        let se = score_post("async rust", &exact).unwrap();
        let ss = score_post("async rust", &scattered).unwrap();
        assert!(se > ss);
    }

    #[test]
    fn test_merge_scored_above_unscored() {
        let scored = SearchResult {
            id: "zzz-post".into(),
            title: "ZZZ".into(),
            description: None,
            kind: EntityKind::Post,
            url: "/posts/zzz-post".into(),
            excerpt: None,
            tags: vec![],
            score: Some(1.0),
        };
        let unscored = SearchResult {
            id: "aaa-category".into(),
            title: "AAA".into(),
            description: None,
            kind: EntityKind::Category,
            url: "/categories/aaa-category".into(),
            excerpt: None,
            tags: vec![],
            score: None,
        };
        let merged = merge_results(vec![unscored, scored], 10);
        // scored first despite alphabetical order favoring the category
        assert_eq!(merged[0].id, "zzz-post");
    }

    #[test]
    fn test_merge_truncates_to_limit() {
        let results: Vec<SearchResult> = (0..5)
            .map(|i| SearchResult {
                id: format!("r{i}"),
                title: format!("R{i}"),
                description: None,
                kind: EntityKind::Page,
                url: format!("/pages/r{i}"),
                excerpt: None,
                tags: vec![],
                score: Some(i as f64),
            })
            .collect();
        let merged = merge_results(results, 2);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "r4");
    }

    #[test]
    fn test_substring_match_on_description() {
        let record = Record::new(
            "tech",
            crate::record::CategoryMeta {
                title: "Tech".into(),
                description: Some("Software and hardware".into()),
            },
            "",
        );
        assert!(substring_match("HARDWARE", &record));
        assert!(!substring_match("gardening", &record));
        assert!(!substring_match("   ", &record));
    }
}
