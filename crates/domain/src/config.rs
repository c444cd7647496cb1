//! Configuration structures
//!
//! A [`Config`] is built once at startup (see the infra loader) and shared
//! read-only by the orchestrator, webhook receiver and scheduler. Every
//! section has serde defaults so a config file only needs the secrets.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_DEPARTMENT_MAPPINGS, DEFAULT_ORG_ID_MTL, DEFAULT_ORG_ID_QC,
    DEFAULT_PAGE_SIZE, DEFAULT_SYNC_CRON, DEFAULT_TOKEN_URL,
};
use crate::errors::{QuoteSyncError, Result};
use crate::types::{Office, Rep, RetentionWindow};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Provider department label → canonical code.
    #[serde(default = "default_departments")]
    pub departments: BTreeMap<String, String>,
    /// Reps upserted into the local table at startup.
    #[serde(default)]
    pub seed_reps: Vec<Rep>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            provider: ProviderConfig::default(),
            sync: SyncConfig::default(),
            webhook: WebhookConfig::default(),
            server: ServerConfig::default(),
            departments: default_departments(),
            seed_reps: Vec::new(),
        }
    }
}

impl Config {
    /// Reject configurations the sync engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.provider.organizations.is_empty() {
            return Err(QuoteSyncError::Config("at least one organization is required".into()));
        }
        if self.provider.page_size == 0 {
            return Err(QuoteSyncError::Config("page_size must be positive".into()));
        }
        if self.webhook.secret.is_empty() {
            return Err(QuoteSyncError::Config("webhook secret must not be empty".into()));
        }
        if let Some(window) = self.sync.retention {
            if window.first_year > window.last_year {
                return Err(QuoteSyncError::Config(format!(
                    "retention window {}..{} is empty",
                    window.first_year, window.last_year
                )));
            }
        }
        Ok(())
    }

    /// Office of a configured organization id.
    pub fn office_for_organization(&self, organization_id: &str) -> Option<Office> {
        self.provider
            .organizations
            .iter()
            .find(|org| org.id == organization_id)
            .map(|org| org.office)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "quotesync.db".to_string(), pool_size: default_pool_size() }
    }
}

/// One provider tenant scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub office: Office,
}

/// Zoho Books credentials and listing parameters.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_organizations")]
    pub organizations: Vec<Organization>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            organizations: default_organizations(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("organizations", &self.organizations)
            .field("page_size", &self.page_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Six-field cron expression (seconds first).
    #[serde(default = "default_cron")]
    pub cron_expression: String,
    #[serde(default = "default_true")]
    pub scheduler_enabled: bool,
    #[serde(default = "default_job_timeout_secs")]
    pub job_timeout_secs: u64,
    /// Fixed window; when absent the current and prior year are used.
    #[serde(default)]
    pub retention: Option<RetentionWindow>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cron_expression: default_cron(),
            scheduler_enabled: true,
            job_timeout_secs: default_job_timeout_secs(),
            retention: None,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub secret: String,
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig").field("secret", &"<redacted>").finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: default_bind_address() }
    }
}

pub fn default_departments() -> BTreeMap<String, String> {
    DEFAULT_DEPARTMENT_MAPPINGS
        .iter()
        .map(|(label, code)| ((*label).to_string(), (*code).to_string()))
        .collect()
}

pub fn default_organizations() -> Vec<Organization> {
    vec![
        Organization { id: DEFAULT_ORG_ID_QC.to_string(), office: Office::Qc },
        Organization { id: DEFAULT_ORG_ID_MTL.to_string(), office: Office::Mtl },
    ]
}

fn default_pool_size() -> u32 {
    4
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_cron() -> String {
    DEFAULT_SYNC_CRON.to_string()
}

fn default_true() -> bool {
    true
}

fn default_job_timeout_secs() -> u64 {
    600
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}
