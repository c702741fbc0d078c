use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    /// Path of the single persisted JSON blob holding the committed collection.
    pub store_path: PathBuf,
    /// Well-known KML resource silently imported on startup.
    pub bootstrap_kml_path: PathBuf,
    pub log_level: String,
    /// Discovery service base URL; discovery features are disabled when unset.
    pub discovery_url: Option<String>,
    pub discovery_api_key: Option<String>,
    pub discovery_timeout_secs: u64,
    pub discovery_max_retries: u32,
    pub discovery_retry_backoff_ms: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("store_path", &self.store_path)
            .field("bootstrap_kml_path", &self.bootstrap_kml_path)
            .field("log_level", &self.log_level)
            .field("discovery_url", &self.discovery_url)
            .field(
                "discovery_api_key",
                &self.discovery_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("discovery_timeout_secs", &self.discovery_timeout_secs)
            .field("discovery_max_retries", &self.discovery_max_retries)
            .field(
                "discovery_retry_backoff_ms",
                &self.discovery_retry_backoff_ms,
            )
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
