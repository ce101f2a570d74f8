//! Provider record → [`NormalizedModel`] mapping.
//!
//! Every provider names its fields differently and is loose about types
//! (ids as numbers or strings, ages as strings, online flags as `0/1`).
//! [`normalize`] is a pure function over one raw JSON record; it only fails
//! when the identity fields are missing. [`normalize_batch`] applies it to a
//! whole upstream page and drops the records that fail.

use serde_json::Value;
use tracing::debug;

use crate::telemetry;
use crate::types::{NormalizedModel, ProviderId};
use crate::{FeedError, Result};

/// Ages outside this range are treated as unknown.
const PLAUSIBLE_AGE: std::ops::RangeInclusive<u64> = 18..=99;

/// Field names for one provider's record layout.
struct FieldMap {
    id: &'static [&'static str],
    name: &'static [&'static str],
    thumbnail: &'static [&'static str],
    tags: &'static [&'static str],
    age: &'static [&'static str],
    online: &'static [&'static str],
    performer_id: &'static [&'static str],
    /// Value for `is_online` when the record has no online field.
    online_default: bool,
}

const PARTNER_A_FIELDS: FieldMap = FieldMap {
    id: &["id"],
    name: &["username"],
    thumbnail: &["thumb", "thumbnail"],
    tags: &["tags"],
    age: &["age"],
    online: &["is_online"],
    performer_id: &["performer_id"],
    online_default: false,
};

const PARTNER_B_FIELDS: FieldMap = FieldMap {
    id: &["uid"],
    name: &["display_name"],
    thumbnail: &["image_url"],
    tags: &["categories"],
    age: &["age"],
    online: &["online"],
    performer_id: &["performer_id"],
    online_default: false,
};

// The free listing only contains live rooms.
const FREE_FIELDS: FieldMap = FieldMap {
    id: &["username"],
    name: &["display_name", "username"],
    thumbnail: &["image_url"],
    tags: &["tags"],
    age: &["age"],
    online: &[],
    performer_id: &[],
    online_default: true,
};

fn fields_for(provider: ProviderId) -> &'static FieldMap {
    match provider {
        ProviderId::PartnerA => &PARTNER_A_FIELDS,
        ProviderId::PartnerB => &PARTNER_B_FIELDS,
        ProviderId::Free => &FREE_FIELDS,
    }
}

/// Map one raw provider record to the canonical shape.
///
/// Missing optional fields get defaults (no tags, unknown age). Fails with
/// [`FeedError::MalformedRecord`] only when the id or name is missing.
pub fn normalize(provider: ProviderId, raw: &Value) -> Result<NormalizedModel> {
    let record = raw.as_object().ok_or_else(|| {
        FeedError::MalformedRecord(format!("{provider}: record is not a JSON object"))
    })?;
    let fields = fields_for(provider);
    // First non-null field among the aliases.
    let lookup = |names: &[&str]| {
        names
            .iter()
            .filter_map(|n| record.get(*n))
            .find(|v| !v.is_null())
    };
    // First alias holding a usable string or number.
    let identity = |names: &[&str]| {
        names
            .iter()
            .filter_map(|n| record.get(*n))
            .find_map(scalar_string)
    };

    let id = identity(fields.id)
        .ok_or_else(|| FeedError::MalformedRecord(format!("{provider}: record without id")))?;
    let name = identity(fields.name).ok_or_else(|| {
        FeedError::MalformedRecord(format!("{provider}: record {id} without name"))
    })?;

    Ok(NormalizedModel {
        thumbnail_url: lookup(fields.thumbnail)
            .and_then(Value::as_str)
            .map(absolute_url)
            .unwrap_or_default(),
        tags: lookup(fields.tags).map(parse_tags).unwrap_or_default(),
        age: lookup(fields.age).and_then(parse_age),
        is_online: lookup(fields.online)
            .and_then(parse_flag)
            .unwrap_or(fields.online_default),
        performer_id: lookup(fields.performer_id).and_then(scalar_string),
        provider_origin: provider,
        id,
        name,
    })
}

/// Normalize an upstream page, dropping records that fail.
///
/// Returns the surviving models in upstream order and the number of dropped
/// records.
pub fn normalize_batch(provider: ProviderId, records: &[Value]) -> (Vec<NormalizedModel>, usize) {
    let mut models = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for raw in records {
        match normalize(provider, raw) {
            Ok(model) => models.push(model),
            Err(e) => {
                debug!(provider = %provider, error = %e, "dropping malformed record");
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        metrics::counter!(telemetry::DROPPED_RECORDS_TOTAL, "provider" => provider.as_str())
            .increment(dropped as u64);
    }
    (models, dropped)
}

/// Coerce an image URL to absolute HTTPS form.
///
/// `//host/path` becomes `https://host/path`; `http(s)://` URLs pass
/// through; anything else (relative paths, blanks) becomes empty.
pub fn absolute_url(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix("//") {
        if rest.is_empty() {
            return String::new();
        }
        return format!("https://{rest}");
    }
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        return raw.to_string();
    }
    String::new()
}

/// Non-empty string or number rendered as a string.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Tags as a JSON array or a comma-separated string.
fn parse_tags(value: &Value) -> Vec<String> {
    let raw: Vec<&str> = match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(s) => s.split(',').collect(),
        _ => Vec::new(),
    };

    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn parse_age(value: &Value) -> Option<u32> {
    let age = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    PLAUSIBLE_AGE
        .contains(&age)
        .then(|| u32::try_from(age).ok())
        .flatten()
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "online" => Some(true),
            "0" | "false" | "no" | "offline" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
