//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the provider credentials are not all set, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! The result is validated before it is returned.
//!
//! ## Environment Variables
//! Required:
//! - `ZOHO_CLIENT_ID`, `ZOHO_CLIENT_SECRET`, `ZOHO_REFRESH_TOKEN`
//! - `ZOHO_WEBHOOK_SECRET`: shared secret expected in `x-webhook-secret`
//!
//! Optional:
//! - `ZOHO_ORG_ID_QC`, `ZOHO_ORG_ID_MTL`: organization ids per office
//! - `ZOHO_TOKEN_URL`, `ZOHO_API_BASE_URL`: provider endpoints
//! - `QUOTESYNC_DB_PATH`, `QUOTESYNC_DB_POOL_SIZE`
//! - `QUOTESYNC_PAGE_SIZE`, `QUOTESYNC_HTTP_TIMEOUT_SECS`
//! - `QUOTESYNC_SYNC_CRON`, `QUOTESYNC_SCHEDULER_ENABLED`,
//!   `QUOTESYNC_SYNC_JOB_TIMEOUT_SECS`
//! - `QUOTESYNC_RETENTION_FIRST_YEAR` and `QUOTESYNC_RETENTION_LAST_YEAR`
//!   (both or neither)
//! - `QUOTESYNC_BIND_ADDRESS`
//!
//! The department table can only be overridden from a file.
//!
//! ## File Locations
//! `config.{json,toml}` or `quotesync.{json,toml}` in the working directory,
//! its parent and grandparent, then the same names next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use quotesync_domain::{
    default_organizations, Config, Office, Organization, QuoteSyncError, Result, RetentionWindow,
};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `QuoteSyncError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `QuoteSyncError::Config` if a required variable is missing or an
/// optional one has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.provider.client_id = env_var("ZOHO_CLIENT_ID")?;
    config.provider.client_secret = env_var("ZOHO_CLIENT_SECRET")?;
    config.provider.refresh_token = env_var("ZOHO_REFRESH_TOKEN")?;
    config.webhook.secret = env_var("ZOHO_WEBHOOK_SECRET")?;

    if let Some(url) = env_opt("ZOHO_TOKEN_URL") {
        config.provider.token_url = url;
    }
    if let Some(url) = env_opt("ZOHO_API_BASE_URL") {
        config.provider.api_base_url = url;
    }
    config.provider.organizations = organizations_from_env();
    if let Some(size) = env_parse::<u32>("QUOTESYNC_PAGE_SIZE")? {
        config.provider.page_size = size;
    }
    if let Some(secs) = env_parse::<u64>("QUOTESYNC_HTTP_TIMEOUT_SECS")? {
        config.provider.request_timeout_secs = secs;
    }

    if let Some(path) = env_opt("QUOTESYNC_DB_PATH") {
        config.database.path = path;
    }
    if let Some(size) = env_parse::<u32>("QUOTESYNC_DB_POOL_SIZE")? {
        config.database.pool_size = size;
    }

    if let Some(cron) = env_opt("QUOTESYNC_SYNC_CRON") {
        config.sync.cron_expression = cron;
    }
    config.sync.scheduler_enabled = env_bool("QUOTESYNC_SCHEDULER_ENABLED", true);
    if let Some(secs) = env_parse::<u64>("QUOTESYNC_SYNC_JOB_TIMEOUT_SECS")? {
        config.sync.job_timeout_secs = secs;
    }
    config.sync.retention = retention_from_env()?;

    if let Some(addr) = env_opt("QUOTESYNC_BIND_ADDRESS") {
        config.server.bind_address = addr;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations (see
/// [`probe_config_paths`]). Format is chosen by extension.
///
/// # Errors
/// Returns `QuoteSyncError::Config` if the file is missing, unreadable, or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(QuoteSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            QuoteSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| QuoteSyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| QuoteSyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| QuoteSyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(QuoteSyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["config.json", "config.toml", "quotesync.json", "quotesync.toml"];
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join("..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Organization list with per-office id overrides.
fn organizations_from_env() -> Vec<Organization> {
    default_organizations()
        .into_iter()
        .map(|org| {
            let key = match org.office {
                Office::Qc => "ZOHO_ORG_ID_QC",
                Office::Mtl => "ZOHO_ORG_ID_MTL",
            };
            Organization { id: env_opt(key).unwrap_or(org.id), office: org.office }
        })
        .collect()
}

fn retention_from_env() -> Result<Option<RetentionWindow>> {
    let first = env_parse::<i32>("QUOTESYNC_RETENTION_FIRST_YEAR")?;
    let last = env_parse::<i32>("QUOTESYNC_RETENTION_LAST_YEAR")?;
    match (first, last) {
        (Some(first), Some(last)) => Ok(Some(RetentionWindow::new(first, last))),
        (None, None) => Ok(None),
        _ => Err(QuoteSyncError::Config(
            "QUOTESYNC_RETENTION_FIRST_YEAR and QUOTESYNC_RETENTION_LAST_YEAR must be set together"
                .to_string(),
        )),
    }
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        QuoteSyncError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Set and non-blank.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| QuoteSyncError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
