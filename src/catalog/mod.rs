//! Static category taxonomy.
//!
//! The taxonomy is a local JSON file listing the categories the directory
//! exposes. It serves three purposes:
//!
//! - validating the `category` of incoming queries,
//! - translating a category slug to each provider's own spelling,
//! - supplying the tag vocabulary that tag statistics are counted against.
//!
//! ```json
//! {
//!   "default": "all",
//!   "categories": [
//!     { "slug": "all", "name": "All models" },
//!     { "slug": "couples", "name": "Couples",
//!       "tags": ["outdoor", "romantic"],
//!       "aliases": { "a": "couple", "b": "couples", "free": "c" } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_CATEGORY, ProviderId};
use crate::{FeedError, Result};

/// One browsable category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    /// Tags counted by tag statistics for this category. Empty means every
    /// observed tag is counted.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Provider-specific category names. Providers without an alias receive
    /// the slug itself.
    #[serde(default)]
    pub aliases: BTreeMap<ProviderId, String>,
}

impl Category {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            tags: Vec::new(),
            aliases: BTreeMap::new(),
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

    pub fn with_alias(mut self, provider: ProviderId, alias: impl Into<String>) -> Self {
        self.aliases.insert(provider, alias.into());
        self
    }
}

/// The set of known categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Slug used when a request names no category.
    #[serde(default = "default_slug")]
    pub default: String,
    pub categories: Vec<Category>,
}

fn default_slug() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Default for Taxonomy {
    /// A taxonomy with only the general `all` listing.
    fn default() -> Self {
        Self {
            default: default_slug(),
            categories: vec![Category::new(DEFAULT_CATEGORY, "All models")],
        }
    }
}

impl Taxonomy {
    /// Build a taxonomy from categories; the general listing is added when
    /// missing.
    pub fn new(categories: Vec<Category>) -> Self {
        let mut taxonomy = Self {
            default: default_slug(),
            categories,
        };
        taxonomy.ensure_default();
        taxonomy
    }

    /// Load the taxonomy from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FeedError::Configuration(format!("Failed to read taxonomy file {path:?}: {e}"))
        })?;
        Self::from_json(&content).map_err(|e| {
            FeedError::Configuration(format!("Failed to parse taxonomy file {path:?}: {e}"))
        })
    }

    /// Parse and validate taxonomy JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut taxonomy: Taxonomy = serde_json::from_str(json)?;
        for category in &mut taxonomy.categories {
            category.slug = category.slug.trim().to_ascii_lowercase();
            for tag in &mut category.tags {
                *tag = tag.trim().to_lowercase();
            }
            category.tags.retain(|t| !t.is_empty());
        }
        taxonomy.default = taxonomy.default.trim().to_ascii_lowercase();

        let mut seen = std::collections::BTreeSet::new();
        for category in &taxonomy.categories {
            if category.slug.is_empty() {
                return Err(FeedError::Configuration(
                    "category with empty slug".to_string(),
                ));
            }
            if !seen.insert(category.slug.as_str()) {
                return Err(FeedError::Configuration(format!(
                    "duplicate category '{}'",
                    category.slug
                )));
            }
        }
        taxonomy.ensure_default();
        Ok(taxonomy)
    }

    fn ensure_default(&mut self) {
        if !self.contains(&self.default) {
            let general = Category::new(self.default.clone(), "All models");
            self.categories.insert(0, general);
        }
    }

    /// Look up a category by slug (case-insensitive).
    pub fn get(&self, slug: &str) -> Option<&Category> {
        let slug = slug.trim();
        self.categories
            .iter()
            .find(|c| c.slug.eq_ignore_ascii_case(slug))
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    /// Resolve a requested slug: blank means the default category, unknown
    /// slugs are a validation error.
    pub fn resolve(&self, slug: Option<&str>) -> Result<&Category> {
        let slug = match slug.map(str::trim) {
            None | Some("") => self.default.as_str(),
            Some(s) => s,
        };
        self.get(slug)
            .ok_or_else(|| FeedError::Validation(format!("unknown category '{slug}'")))
    }

    /// Tag vocabulary for a category; empty for unknown categories.
    pub fn vocabulary(&self, slug: &str) -> &[String] {
        self.get(slug).map(|c| c.tags.as_slice()).unwrap_or_default()
    }

    /// The category name a provider expects.
    ///
    /// The default (general) category maps to an empty string, meaning "no
    /// category filter", unless it carries an explicit alias.
    pub fn provider_category(&self, slug: &str, provider: ProviderId) -> String {
        let Some(category) = self.get(slug) else {
            return slug.to_string();
        };
        if let Some(alias) = category.aliases.get(&provider) {
            return alias.clone();
        }
        if category.slug == self.default {
            String::new()
        } else {
            category.slug.clone()
        }
    }
}
