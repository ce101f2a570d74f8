//! Shared application state.

use std::sync::Arc;

use super::config::LimitsConfig;
use crate::Aggregator;
use crate::translate::TranslationQueue;
use crate::types::ProviderSelection;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    /// `None` when no translation backend is configured.
    pub translator: Option<TranslationQueue>,
    /// Used when a request names no provider or an unknown one.
    pub default_provider: ProviderSelection,
    pub limits: LimitsConfig,
}

impl AppState {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self {
            aggregator,
            translator: None,
            default_provider: ProviderSelection::All,
            limits: LimitsConfig::default(),
        }
    }

    pub fn with_translator(mut self, queue: TranslationQueue) -> Self {
        self.translator = Some(queue);
        self
    }

    pub fn with_default_provider(mut self, provider: ProviderSelection) -> Self {
        self.default_provider = provider;
        self
    }

    pub fn with_limits(mut self, limits: LimitsConfig) -> Self {
        self.limits = limits;
        self
    }
}
