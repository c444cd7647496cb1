//! Zoho Books estimate listing

use std::time::Duration;

use async_trait::async_trait;
use quotesync_core::{AccessToken, EstimateSource, PageFetchError};
use quotesync_domain::{EstimatePage, Organization, ProviderConfig, RawEstimate, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::HttpClient;

const ESTIMATES_PATH: &str = "/books/v3/estimates";

#[derive(Debug, Deserialize)]
struct EstimateListResponse {
    #[serde(default)]
    estimates: Vec<RawEstimate>,
    #[serde(default)]
    page_context: Option<PageContext>,
}

#[derive(Debug, Default, Deserialize)]
struct PageContext {
    #[serde(default)]
    has_more_page: bool,
}

pub struct ZohoEstimateClient {
    http: HttpClient,
    endpoint: String,
}

impl ZohoEstimateClient {
    pub fn from_config(provider: &ProviderConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(provider.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}{ESTIMATES_PATH}", provider.api_base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl EstimateSource for ZohoEstimateClient {
    #[instrument(skip(self, token), fields(organization_id = %organization.id, office = %organization.office))]
    async fn fetch_page(
        &self,
        token: &AccessToken,
        organization: &Organization,
        page: u32,
        per_page: u32,
    ) -> std::result::Result<EstimatePage, PageFetchError> {
        let request = self
            .http
            .request(Method::GET, &self.endpoint)
            .bearer_auth(token.secret())
            .query(&[
                ("organization_id", organization.id.clone()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ]);

        let response = self
            .http
            .send(request)
            .await
            .map_err(|err| PageFetchError::transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| PageFetchError::transport(format!("failed to read listing: {err}")))?;

        if !status.is_success() {
            return Err(PageFetchError::http(status.as_u16(), body));
        }

        let listing: EstimateListResponse = serde_json::from_str(&body).map_err(|err| {
            PageFetchError::http(status.as_u16(), format!("unreadable listing: {err}"))
        })?;
        let has_more = listing.page_context.unwrap_or_default().has_more_page;

        debug!(page, count = listing.estimates.len(), has_more, "estimate page fetched");
        Ok(EstimatePage { estimates: listing.estimates, has_more })
    }
}
