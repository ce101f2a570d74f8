//! Upstream provider clients.
//!
//! One [`ProviderClient`] implementation per upstream feed, plus the shared
//! HTTP plumbing and the retry decorator applied by the aggregator.

mod free;
pub(crate) mod http;
mod partner_a;
mod partner_b;
pub mod retry;
mod settings;
pub mod traits;

pub use free::FreeClient;
pub use http::{DEFAULT_TIMEOUT, USER_AGENT};
pub use partner_a::PartnerAClient;
pub use partner_b::PartnerBClient;
pub use retry::{RetryConfig, RetryingProvider};
pub use settings::{Credentials, ProviderSettings};
pub use traits::{DEFAULT_FETCH_LIMIT, ProviderClient, RawProviderResponse};
