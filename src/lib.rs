//! camfeed - Multi-provider webcam-model feed aggregator
//!
//! This crate fetches model listings from several upstream partner feeds,
//! normalizes their idiosyncratic record shapes into one schema, merges them
//! into a single paginated listing with tag statistics, and caches upstream
//! answers with per-provider TTLs.
//!
//! # Example
//!
//! ```rust,no_run
//! use camfeed::{CamFeed, Query};
//! use camfeed::providers::{Credentials, ProviderSettings};
//!
//! #[tokio::main]
//! async fn main() -> camfeed::Result<()> {
//!     let feed = CamFeed::builder()
//!         .partner_a(
//!             ProviderSettings::new("https://api.partner-a.example"),
//!             Credentials::new("site-1", "access-key"),
//!         )
//!         .free(ProviderSettings::new("https://rooms.example"))
//!         .build()?;
//!
//!     let page = feed
//!         .fetch_models(&Query::new().category("couples").limit(20))
//!         .await?;
//!
//!     for model in &page.items {
//!         println!("{} ({})", model.name, model.provider_origin);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Server (requires `server` feature)
//!
//! The [`server`] module exposes the aggregator as a small JSON API; the
//! `camfeedd` binary wires it up from a TOML config file.

pub mod aggregator;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod normalize;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod translate;
pub mod types;

// Re-export main types at crate root
pub use aggregator::{Aggregator, AggregatorBuilder, CamFeed};
pub use cache::{CacheConfig, FeedCache};
pub use catalog::{Category, Taxonomy};
pub use error::{FeedError, Result};
pub use providers::{ProviderClient, RetryConfig};
pub use translate::{HttpTranslator, TranslationQueue, TranslationRequest, Translator};

// Re-export all types
pub use types::{
    ModelPage, NormalizedModel, Pagination, ProviderId, ProviderQuery, ProviderSelection, Query,
    TagStat,
};
