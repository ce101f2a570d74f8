//! Canonical model listing shared by every provider.

use serde::{Deserialize, Serialize};

use super::ProviderId;

/// A model listing after normalization.
///
/// `id` is stable across refreshes and unique within `provider_origin` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedModel {
    pub id: String,
    pub name: String,
    /// Absolute `http(s)` URL, or empty when the upstream gave none.
    pub thumbnail_url: String,
    /// Lower-cased, deduplicated, upstream order preserved.
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performer_id: Option<String>,
    pub provider_origin: ProviderId,
}

impl NormalizedModel {
    /// Minimal listing with only identity fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, provider: ProviderId) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            thumbnail_url: String::new(),
            tags: Vec::new(),
            age: None,
            is_online: false,
            performer_id: None,
            provider_origin: provider,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn online(mut self, is_online: bool) -> Self {
        self.is_online = is_online;
        self
    }

    /// Key used by the merge step to drop duplicate listings.
    ///
    /// Best-effort: two different models sharing a display name on the same
    /// provider collapse into one, and the same model listed by two providers
    /// is kept twice.
    pub fn dedup_key(&self) -> (String, ProviderId) {
        (self.name.trim().to_lowercase(), self.provider_origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_and_skips_missing_age() {
        let model = NormalizedModel::new("1", "Ann", ProviderId::PartnerA).online(true);
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["thumbnailUrl"], "");
        assert_eq!(json["isOnline"], true);
        assert_eq!(json["providerOrigin"], "a");
        assert!(json.get("age").is_none());
    }

    #[test]
    fn dedup_key_ignores_case_and_whitespace() {
        let a = NormalizedModel::new("1", " Ann ", ProviderId::Free);
        let b = NormalizedModel::new("2", "ann", ProviderId::Free);
        let c = NormalizedModel::new("3", "ann", ProviderId::PartnerB);
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_ne!(a.dedup_key(), c.dedup_key());
    }
}
