//! camfeed error types

use crate::types::ProviderId;

/// camfeed error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    // Provider/network errors
    /// Transport failure, timeout or non-2xx status from an upstream.
    #[error("provider {provider} unavailable: {reason}")]
    ProviderUnavailable { provider: ProviderId, reason: String },

    /// Upstream answered, but not with the documented payload shape.
    #[error("provider {provider} returned an unexpected payload: {reason}")]
    ProviderSchemaMismatch { provider: ProviderId, reason: String },

    // Data errors
    /// A single upstream record is missing its identity fields.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("JSON error: {0}")]
    Json(String),

    // Caller errors
    #[error("invalid query: {0}")]
    Validation(String),

    // Aggregate errors
    /// Every requested provider failed.
    #[error("all providers failed: {}", join_providers(.providers))]
    TotalFailure { providers: Vec<ProviderId> },

    #[error("no provider configured")]
    NoProvider,

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Translation errors
    #[error("translation failed: {0}")]
    Translation(String),
}

impl FeedError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Only upstream availability problems qualify. A schema mismatch means
    /// the upstream contract changed and repeating the call will not help.
    pub fn is_transient(&self) -> bool {
        matches!(self, FeedError::ProviderUnavailable { .. })
    }

    /// Provider the error originated from, if it is provider-scoped.
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            FeedError::ProviderUnavailable { provider, .. }
            | FeedError::ProviderSchemaMismatch { provider, .. } => Some(*provider),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Json(err.to_string())
    }
}

fn join_providers(providers: &[ProviderId]) -> String {
    providers
        .iter()
        .map(ProviderId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for camfeed operations
pub type Result<T> = std::result::Result<T, FeedError>;
