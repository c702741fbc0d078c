use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse. All variables have
/// defaults, so a missing variable is never an error.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let store_path = PathBuf::from(or_default("HOPMAP_STORE_PATH", "./data/venues.json"));
    let bootstrap_kml_path =
        PathBuf::from(or_default("HOPMAP_BOOTSTRAP_KML", "./data/default.kml"));
    let log_level = or_default("HOPMAP_LOG_LEVEL", "info");

    let discovery_url = lookup("HOPMAP_DISCOVERY_URL").ok();
    let discovery_api_key = lookup("HOPMAP_DISCOVERY_API_KEY").ok();
    let discovery_timeout_secs = parse_u64("HOPMAP_DISCOVERY_TIMEOUT_SECS", "30")?;
    let discovery_max_retries = parse_u32("HOPMAP_DISCOVERY_MAX_RETRIES", "2")?;
    let discovery_retry_backoff_ms = parse_u64("HOPMAP_DISCOVERY_RETRY_BACKOFF_MS", "500")?;

    let user_agent = or_default("HOPMAP_USER_AGENT", "hopmap/0.1 (venue-curation)");

    Ok(AppConfig {
        store_path,
        bootstrap_kml_path,
        log_level,
        discovery_url,
        discovery_api_key,
        discovery_timeout_secs,
        discovery_max_retries,
        discovery_retry_backoff_ms,
        user_agent,
    })
}
