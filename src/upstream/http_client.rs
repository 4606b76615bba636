//! HTTP client for the CDEK API

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::CdekConfig;
use crate::error::{AppError, Result};
use crate::gateway::request::{OfficeQuery, TariffCalculation};
use crate::upstream::traits::{AccessToken, CdekApi, UpstreamResponse};

const TOKEN_PATH: &str = "oauth/token";
const DELIVERY_POINTS_PATH: &str = "deliverypoints";
const TARIFF_LIST_PATH: &str = "calculator/tarifflist";

/// Identifies our traffic to the provider
const APP_NAME_HEADER: &str = "X-App-Name";
const APP_NAME: &str = "widget_pvz";

/// How a call's data is encoded
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` POST
    Form(Vec<(String, String)>),
    /// `application/json` POST
    Json(Value),
    /// GET with the pairs in the query string
    Query(Vec<(String, String)>),
}

/// reqwest-backed CDEK API client holding the server's credentials
pub struct CdekClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl CdekClient {
    /// Create a new client from configuration
    pub fn new(config: &CdekConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issue a single call to `path` relative to the base URL.
    ///
    /// The bearer token is attached when given. Non-2xx statuses are not
    /// errors here; the caller decides what to do with them.
    pub async fn send(
        &self,
        path: &str,
        body: RequestBody,
        token: Option<&AccessToken>,
    ) -> Result<UpstreamResponse> {
        let url = self.url(path);

        let request = match &body {
            RequestBody::Form(pairs) => self.client.post(&url).form(pairs),
            RequestBody::Json(value) => self.client.post(&url).json(value),
            RequestBody::Query(pairs) => self.client.get(&url).query(pairs),
        };

        let mut request = request
            .header(ACCEPT, "application/json")
            .header(APP_NAME_HEADER, APP_NAME);
        if let Some(token) = token {
            request = request.bearer_auth(token.secret());
        }

        debug!(path = %path, authorized = token.is_some(), "Sending upstream request");

        let response = request.send().await?;
        let status = response.status().as_u16();
        let added_headers = collect_prefixed_headers(response.headers());
        let body = response.text().await?;

        debug!(path = %path, status = status, "Upstream request completed");

        Ok(UpstreamResponse {
            status,
            body,
            added_headers,
        })
    }
}

/// Headers whose name starts with `x-`, as `name: value` lines
pub fn collect_prefixed_headers(headers: &HeaderMap) -> Vec<String> {
    headers
        .iter()
        .filter(|(name, _)| name.as_str().to_ascii_lowercase().starts_with("x-"))
        .map(|(name, value)| {
            format!("{}: {}", name.as_str(), String::from_utf8_lossy(value.as_bytes()))
        })
        .collect()
}

#[async_trait]
impl CdekApi for CdekClient {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    async fn fetch_token(&self) -> Result<AccessToken> {
        let form = vec![
            ("grant_type".to_string(), "client_credentials".to_string()),
            ("client_id".to_string(), self.client_id.clone()),
            ("client_secret".to_string(), self.client_secret.clone()),
        ];

        let response = self.send(TOKEN_PATH, RequestBody::Form(form), None).await?;
        AccessToken::from_token_response(&response)
    }

    async fn delivery_points(
        &self,
        token: &AccessToken,
        query: &OfficeQuery,
    ) -> Result<UpstreamResponse> {
        self.send(
            DELIVERY_POINTS_PATH,
            RequestBody::Query(query.to_query_pairs()),
            Some(token),
        )
        .await
    }

    async fn calculate_tariffs(
        &self,
        token: &AccessToken,
        calculation: &TariffCalculation,
    ) -> Result<UpstreamResponse> {
        self.send(
            TARIFF_LIST_PATH,
            RequestBody::Json(calculation.to_json()?),
            Some(token),
        )
        .await
    }
}
