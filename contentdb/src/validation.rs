//! Frontmatter validation against a kind's field contract.
//!
//! Required fields must be present and correctly typed or validation fails.
//! Optional fields pass through when correctly typed and are dropped (with a
//! warning) otherwise. Date fields are rewritten to a canonical RFC 3339
//! string regardless of the source representation.

use crate::error::{ContentError, Result};
use crate::schema::{EntityKind, FieldKind, FieldSpec};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Result of validating one record's frontmatter.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validate and normalize frontmatter in place.
///
/// On success the mapping contains every declared field in its canonical
/// form: wrongly-typed optional fields are removed, dates are rewritten to
/// RFC 3339. Returns `ContentError::Validation` listing all errors when a
/// required field is missing or malformed.
pub fn validate_metadata(kind: EntityKind, data: &mut serde_yaml::Value) -> Result<ValidationResult> {
    let result = normalize(kind, data);

    if !result.is_ok() {
        return Err(ContentError::Validation(format!(
            "{kind} frontmatter invalid:\n  - {}",
            result.errors.join("\n  - ")
        )));
    }

    Ok(result)
}

/// Check and normalize without failing; errors are collected in the result.
pub fn normalize(kind: EntityKind, data: &mut serde_yaml::Value) -> ValidationResult {
    let mut result = ValidationResult::default();

    let mapping = match data.as_mapping_mut() {
        Some(m) => m,
        None => {
            result.errors.push("Frontmatter must be a YAML mapping".into());
            return result;
        }
    };

    for spec in kind.fields() {
        let key = serde_yaml::Value::String(spec.name.to_string());
        let value = mapping.get(&key).cloned();

        let present = matches!(&value, Some(v) if *v != serde_yaml::Value::Null);
        if !present {
            if spec.required {
                result
                    .errors
                    .push(format!("Required field '{}' is missing", spec.name));
            }
            mapping.remove(&key);
            continue;
        }

        let value = value.unwrap();
        match check_field(spec, &value) {
            FieldOutcome::Keep => {}
            FieldOutcome::Replace(canonical) => {
                mapping.insert(key, canonical);
            }
            FieldOutcome::Invalid(message) => {
                if spec.required {
                    result.errors.push(message);
                } else {
                    result.warnings.push(message);
                    mapping.remove(&key);
                }
            }
        }
    }

    result
}

enum FieldOutcome {
    Keep,
    Replace(serde_yaml::Value),
    Invalid(String),
}

fn check_field(spec: &FieldSpec, value: &serde_yaml::Value) -> FieldOutcome {
    match spec.kind {
        FieldKind::String => {
            let s = match value.as_str() {
                Some(s) => s,
                None => {
                    return FieldOutcome::Invalid(format!(
                        "Field '{}' expected string, got {}",
                        spec.name,
                        type_name(value)
                    ))
                }
            };
            if let Some(allowed) = spec.enum_values {
                if !allowed.contains(&s) {
                    return FieldOutcome::Invalid(format!(
                        "Field '{}' value '{s}' is not one of {allowed:?}",
                        spec.name
                    ));
                }
            }
            FieldOutcome::Keep
        }
        FieldKind::Number => {
            if value.is_number() {
                FieldOutcome::Keep
            } else {
                FieldOutcome::Invalid(format!(
                    "Field '{}' expected number, got {}",
                    spec.name,
                    type_name(value)
                ))
            }
        }
        FieldKind::Date => {
            let raw = match value.as_str() {
                Some(s) => s.to_string(),
                // serde_yaml has no native date type, but numbers do show up
                // as timestamps in imported content
                None => match value.as_i64() {
                    Some(n) => n.to_string(),
                    None => {
                        return FieldOutcome::Invalid(format!(
                            "Field '{}' expected date string, got {}",
                            spec.name,
                            type_name(value)
                        ))
                    }
                },
            };
            match normalize_date(&raw) {
                Some(canonical) => FieldOutcome::Replace(serde_yaml::Value::String(canonical)),
                None => FieldOutcome::Invalid(format!(
                    "Field '{}' value '{raw}' is not a recognizable date",
                    spec.name
                )),
            }
        }
        FieldKind::StringList => {
            let seq = match value.as_sequence() {
                Some(s) => s,
                None => {
                    return FieldOutcome::Invalid(format!(
                        "Field '{}' expected list, got {}",
                        spec.name,
                        type_name(value)
                    ))
                }
            };
            if seq.iter().all(|v| v.is_string()) {
                FieldOutcome::Keep
            } else {
                FieldOutcome::Invalid(format!(
                    "Field '{}' expected a list of strings",
                    spec.name
                ))
            }
        }
    }
}

/// Parse a date-like string in any accepted representation.
///
/// Accepted: RFC 3339, RFC 2822, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, and a
/// Unix-seconds integer. Anything else is `None`.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
    }
    if let Ok(secs) = raw.parse::<i64>() {
        return Utc.timestamp_opt(secs, 0).single();
    }
    None
}

/// Canonical RFC 3339 form of a date-like string, or `None` if unparseable.
pub fn normalize_date(raw: &str) -> Option<String> {
    parse_date(raw).map(|dt| dt.to_rfc3339())
}

/// Timestamp used for sorting: missing or unparseable dates are epoch zero.
pub fn sort_timestamp(raw: Option<&str>) -> i64 {
    raw.and_then(parse_date).map(|dt| dt.timestamp()).unwrap_or(0)
}

fn type_name(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "list",
        serde_yaml::Value::Mapping(_) => "object",
        serde_yaml::Value::Tagged(_) => "tagged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_post_frontmatter() {
        let mut data: serde_yaml::Value = serde_yaml::from_str(
            "title: Hello\ndate: '2024-03-01'\ntags: [\"rust\", \"cms\"]",
        )
        .unwrap();
        let result = validate_metadata(EntityKind::Post, &mut data).unwrap();
        assert!(result.is_ok());
        // date normalized to RFC 3339
        assert_eq!(
            data["date"],
            serde_yaml::Value::String("2024-03-01T00:00:00+00:00".into())
        );
    }

    #[test]
    fn test_missing_required_title() {
        let mut data: serde_yaml::Value =
            serde_yaml::from_str("date: '2024-03-01'").unwrap();
        let err = validate_metadata(EntityKind::Post, &mut data).unwrap_err();
        match err {
            ContentError::Validation(msg) => assert!(msg.contains("title")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_wrongly_typed_optional_is_dropped() {
        let mut data: serde_yaml::Value =
            serde_yaml::from_str("title: Hello\ntags: not-a-list").unwrap();
        let result = validate_metadata(EntityKind::Post, &mut data).unwrap();
        assert!(result.has_warnings());
        assert!(data.get("tags").is_none());
        assert_eq!(data["title"], serde_yaml::Value::String("Hello".into()));
    }

    #[test]
    fn test_wrongly_typed_required_fails() {
        let mut data: serde_yaml::Value = serde_yaml::from_str("title: 42").unwrap();
        assert!(validate_metadata(EntityKind::Post, &mut data).is_err());
    }

    #[test]
    fn test_media_type_enum() {
        let mut ok: serde_yaml::Value =
            serde_yaml::from_str("title: Logo\nurl: /img/logo.png\ntype: image").unwrap();
        assert!(validate_metadata(EntityKind::Media, &mut ok).is_ok());

        // 'type' is optional, so a bad value is dropped with a warning
        let mut bad: serde_yaml::Value =
            serde_yaml::from_str("title: Logo\nurl: /img/logo.png\ntype: hologram").unwrap();
        let result = validate_metadata(EntityKind::Media, &mut bad).unwrap();
        assert!(result.has_warnings());
        assert!(bad.get("type").is_none());
    }

    #[test]
    fn test_media_requires_url() {
        let mut data: serde_yaml::Value = serde_yaml::from_str("title: Logo").unwrap();
        assert!(validate_metadata(EntityKind::Media, &mut data).is_err());
    }

    #[test]
    fn test_date_representations_normalize_identically() {
        for raw in ["2024-03-01", "2024-03-01T00:00:00Z", "2024-03-01 00:00:00"] {
            assert_eq!(
                normalize_date(raw).as_deref(),
                Some("2024-03-01T00:00:00+00:00"),
                "input: {raw}"
            );
        }
        assert!(normalize_date("next tuesday").is_none());
    }

    #[test]
    fn test_sort_timestamp_missing_is_epoch() {
        assert_eq!(sort_timestamp(None), 0);
        assert_eq!(sort_timestamp(Some("garbage")), 0);
        assert!(sort_timestamp(Some("2024-03-01")) > 0);
    }
}
