//! Configuration loading for camfeedd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.camfeed/config.toml` (user)
//! 3. `/etc/camfeed/config.toml` (system)
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.camfeed/secrets.toml` (user, must be 0600)
//! 2. `/etc/camfeed/secrets.toml` (system, must be 0600)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::providers::{Credentials, ProviderSettings, RetryConfig};
use crate::types::{DEFAULT_LIMIT, MAX_LIMIT, ProviderId, ProviderSelection};
use crate::{Aggregator, CacheConfig, CamFeed, FeedError, Result, Taxonomy};

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub aggregator: AggregatorSection,
    /// Category taxonomy JSON file. Without it only the `all` listing exists.
    #[serde(default)]
    pub taxonomy_path: Option<PathBuf>,
    #[serde(default)]
    pub translation: Option<TranslationConfig>,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8080).
    #[serde(default = "default_address")]
    pub address: String,
    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            cors_origins: Vec::new(),
            limits: LimitsConfig::default(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8080".to_string()
}

/// Request limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Page size when a request gives none (default: 24).
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Largest page size a request may ask for (default: 100).
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_max_limit() -> usize {
    MAX_LIMIT
}

/// Upstream provider configurations. A provider is registered only when its
/// section is present (and, for the partner feeds, credentials are found).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub a: Option<ProviderConfig>,
    #[serde(default)]
    pub b: Option<ProviderConfig>,
    #[serde(default)]
    pub free: Option<ProviderConfig>,
}

/// One upstream's connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Listing TTL in seconds; falls back to `cache.default_ttl_secs`.
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
    /// Records requested per upstream call (default: 100).
    #[serde(default)]
    pub fetch_limit: Option<usize>,
}

impl ProviderConfig {
    fn settings(&self) -> ProviderSettings {
        let mut settings = ProviderSettings::new(&self.base_url);
        if let Some(secs) = self.timeout_secs {
            settings = settings.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.cache_ttl_secs {
            settings = settings.cache_ttl(Duration::from_secs(secs));
        }
        if let Some(limit) = self.fetch_limit {
            settings = settings.fetch_limit(limit);
        }
        settings
    }
}

/// Cache sizing and TTLs.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
    #[serde(default = "default_stats_ttl_secs")]
    pub stats_ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            default_ttl_secs: default_ttl_secs(),
            stats_ttl_secs: default_stats_ttl_secs(),
        }
    }
}

fn default_max_entries() -> u64 {
    10_000
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_stats_ttl_secs() -> u64 {
    600
}

impl From<&CacheSection> for CacheConfig {
    fn from(section: &CacheSection) -> Self {
        CacheConfig::new()
            .max_entries(section.max_entries)
            .default_ttl(Duration::from_secs(section.default_ttl_secs))
            .stats_ttl(Duration::from_secs(section.stats_ttl_secs))
    }
}

/// Fan-out behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorSection {
    /// Provider used when a request names none or an unknown one
    /// (`"all"`, `"a"`, `"b"` or `"free"`; default: `"all"`).
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Upper bound on one provider call in seconds, retries included (default: 15).
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    /// Attempts per provider call; 1 disables retries (default: 1).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

impl Default for AggregatorSection {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            call_timeout_secs: default_call_timeout_secs(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

fn default_provider() -> String {
    "all".to_string()
}

fn default_call_timeout_secs() -> u64 {
    15
}

fn default_retry_attempts() -> u32 {
    1
}

impl AggregatorSection {
    pub fn default_selection(&self) -> Result<ProviderSelection> {
        self.default_provider.parse().map_err(|e| {
            FeedError::Configuration(format!("aggregator.default_provider: {e}"))
        })
    }
}

/// Translation backend (LibreTranslate-compatible).
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_translation_timeout")]
    pub timeout_secs: u64,
}

fn default_translation_timeout() -> u64 {
    30
}

/// Secrets configuration (partner credentials).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub a: Option<PartnerSecret>,
    #[serde(default)]
    pub b: Option<PartnerSecret>,
    #[serde(default)]
    pub translation: Option<ApiKeySecret>,
}

/// Partner feed credentials.
#[derive(Clone, Deserialize)]
pub struct PartnerSecret {
    pub site_id: String,
    pub access_key: String,
}

impl std::fmt::Debug for PartnerSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerSecret")
            .field("site_id", &self.site_id)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// A single API key secret.
#[derive(Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl std::fmt::Debug for ApiKeySecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKeySecret(<redacted>)")
    }
}

/// Provider → (site id env var, access key env var) mapping.
const PROVIDER_ENV_VARS: &[(ProviderId, &str, &str)] = &[
    (ProviderId::PartnerA, "CAMFEED_A_SITE_ID", "CAMFEED_A_ACCESS_KEY"),
    (ProviderId::PartnerB, "CAMFEED_B_SITE_ID", "CAMFEED_B_ACCESS_KEY"),
];

const TRANSLATION_ENV_VAR: &str = "CAMFEED_TRANSLATION_API_KEY";

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.camfeed/config.toml`
    /// 3. `/etc/camfeed/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            FeedError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            FeedError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(FeedError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".camfeed").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/camfeed/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(FeedError::Configuration(
            "No config file found. Create ~/.camfeed/config.toml or /etc/camfeed/config.toml"
                .to_string(),
        ))
    }

    /// Load the taxonomy file, or the built-in `all`-only taxonomy.
    pub fn taxonomy(&self) -> Result<Taxonomy> {
        match &self.taxonomy_path {
            Some(path) => Taxonomy::load(path),
            None => Ok(Taxonomy::default()),
        }
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.camfeed/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/camfeed/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (credentials may come from env vars).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".camfeed").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/camfeed/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Load a specific secrets file after checking its permissions.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            FeedError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            FeedError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            FeedError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(FeedError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Credentials for a partner feed, falling back to its environment variables.
    pub fn credentials(&self, provider: ProviderId) -> Option<Credentials> {
        let from_file = match provider {
            ProviderId::PartnerA => self.a.as_ref(),
            ProviderId::PartnerB => self.b.as_ref(),
            ProviderId::Free => None,
        }
        .map(|s| Credentials::new(&s.site_id, &s.access_key));

        from_file.or_else(|| {
            let (_, site_var, key_var) = PROVIDER_ENV_VARS.iter().find(|(p, _, _)| *p == provider)?;
            let site_id = std::env::var(site_var).ok()?;
            let access_key = std::env::var(key_var).ok()?;
            Some(Credentials::new(site_id, access_key))
        })
    }

    /// Translation API key, falling back to `CAMFEED_TRANSLATION_API_KEY`.
    pub fn translation_key(&self) -> Option<String> {
        self.translation
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var(TRANSLATION_ENV_VAR).ok())
    }
}

/// Build an [`Aggregator`] from configuration.
///
/// Providers register in `a`, `b`, `free` order. A partner section without
/// credentials is skipped with a warning.
pub fn build_aggregator(config: &Config, secrets: &Secrets) -> Result<Aggregator> {
    let mut builder = CamFeed::builder();

    if let Some(ref a) = config.providers.a {
        match secrets.credentials(ProviderId::PartnerA) {
            Some(creds) => builder = builder.partner_a(a.settings(), creds),
            None => tracing::warn!(provider = "a", "no credentials found, provider disabled"),
        }
    }

    if let Some(ref b) = config.providers.b {
        match secrets.credentials(ProviderId::PartnerB) {
            Some(creds) => builder = builder.partner_b(b.settings(), creds),
            None => tracing::warn!(provider = "b", "no credentials found, provider disabled"),
        }
    }

    if let Some(ref free) = config.providers.free {
        builder = builder.free(free.settings());
    }

    builder
        .cache(CacheConfig::from(&config.cache))
        .taxonomy(config.taxonomy()?)
        .retry(RetryConfig::new().max_attempts(config.aggregator.retry_attempts))
        .call_timeout(Duration::from_secs(config.aggregator.call_timeout_secs))
        .max_limit(config.server.limits.max_limit)
        .build()
}
