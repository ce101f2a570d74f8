//! Public types for the camfeed API.

mod model;
mod page;
mod provider;
mod query;
mod stats;

pub use model::NormalizedModel;
pub use page::{ModelPage, Pagination};
pub use provider::{ProviderId, ProviderSelection};
pub use query::{DEFAULT_CATEGORY, DEFAULT_LIMIT, MAX_LIMIT, ProviderQuery, Query, clamp_limit};
pub use stats::TagStat;
