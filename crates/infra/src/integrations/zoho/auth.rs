//! Zoho OAuth refresh-token exchange

use std::time::Duration;

use async_trait::async_trait;
use quotesync_core::{AccessToken, TokenProvider};
use quotesync_domain::{ProviderConfig, QuoteSyncError, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::HttpClient;

/// Token endpoint reply. Zoho reports failures as `{"error": ...}`, often
/// with a 200 status.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges the configured refresh token for a fresh access token.
///
/// No caching: every call is one round trip to the token endpoint.
pub struct ZohoTokenProvider {
    http: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

impl ZohoTokenProvider {
    pub fn from_config(provider: &ProviderConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(provider.request_timeout_secs))
            .no_redirects()
            .build()?;

        Ok(Self {
            http,
            token_url: provider.token_url.clone(),
            client_id: provider.client_id.clone(),
            client_secret: provider.client_secret.clone(),
            refresh_token: provider.refresh_token.clone(),
        })
    }
}

#[async_trait]
impl TokenProvider for ZohoTokenProvider {
    #[instrument(skip(self), fields(token_url = %self.token_url))]
    async fn acquire(&self) -> Result<AccessToken> {
        if self.refresh_token.is_empty() {
            return Err(QuoteSyncError::Auth("No refresh token configured".into()));
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
        ];
        let request = self.http.request(Method::POST, &self.token_url).form(&params);
        let response = self.http.send(request).await?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            QuoteSyncError::Network(format!("failed to read token response: {err}"))
        })?;

        let parsed: Option<TokenEndpointResponse> = serde_json::from_str(&body).ok();
        match parsed.and_then(|reply| reply.access_token.map(|token| (token, reply.expires_in))) {
            Some((token, expires_in)) if status.is_success() && !token.is_empty() => {
                debug!(expires_in, "access token acquired");
                Ok(AccessToken::new(token))
            }
            _ => Err(QuoteSyncError::Auth(format!("Zoho token refresh failed: {body}"))),
        }
    }
}
