//! The gateway service: authenticate, dispatch, relay

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::gateway::request::{Action, GatewayRequest, InputMap};
use crate::response::{append_upstream_headers, json_response};
use crate::upstream::{AccessToken, CdekApi, CdekClient, TokenCache, UpstreamResponse};

/// Relayed upstream result
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub body: Value,
    /// `x-` headers reported by the upstream, as `name: value`
    pub upstream_headers: Vec<String>,
    forward_headers: bool,
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let mut response = json_response(self.status, self.body);
        if self.forward_headers {
            append_upstream_headers(response.headers_mut(), &self.upstream_headers);
        }
        response
    }
}

/// Proxies widget requests to the CDEK API with server-held credentials
pub struct GatewayService {
    api: Arc<dyn CdekApi>,
    token_cache: Option<TokenCache>,
    forward_upstream_headers: bool,
}

impl GatewayService {
    /// Create a service that fetches a fresh token for every request
    pub fn new(api: Arc<dyn CdekApi>) -> Self {
        Self {
            api,
            token_cache: None,
            forward_upstream_headers: false,
        }
    }

    /// Build the service and its HTTP client from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = CdekClient::new(&settings.cdek)?;
        let mut service = Self::new(Arc::new(client))
            .with_forwarded_headers(settings.gateway.forward_upstream_headers);

        if settings.token_cache.enabled {
            info!("Access token cache enabled");
            service = service.with_token_cache(TokenCache::new(&settings.token_cache));
        }

        Ok(service)
    }

    pub fn with_token_cache(mut self, cache: TokenCache) -> Self {
        self.token_cache = Some(cache);
        self
    }

    pub fn with_forwarded_headers(mut self, enabled: bool) -> Self {
        self.forward_upstream_headers = enabled;
        self
    }

    /// Handle one merged input mapping.
    ///
    /// Validation happens before any upstream call. A token is obtained
    /// before the business call, which is skipped if authorization fails.
    pub async fn handle(&self, input: InputMap) -> Result<GatewayResponse> {
        let request = GatewayRequest::from_input(input)?;
        let action = request.action();
        tracing::Span::current().record("action", action.as_str());

        let token = self.access_token().await?;

        let upstream = match &request {
            GatewayRequest::Offices(query) => self.api.delivery_points(&token, query).await?,
            GatewayRequest::Calculate(calculation) => {
                self.api.calculate_tariffs(&token, calculation).await?
            }
        };

        if upstream.status == StatusCode::UNAUTHORIZED.as_u16() {
            if let Some(cache) = &self.token_cache {
                cache.invalidate(self.api.client_id());
            }
        }

        self.relay(action, upstream)
    }

    async fn access_token(&self) -> Result<AccessToken> {
        match &self.token_cache {
            Some(cache) => cache.get_or_fetch(self.api.as_ref()).await,
            None => self.api.fetch_token().await,
        }
    }

    fn relay(&self, action: Action, upstream: UpstreamResponse) -> Result<GatewayResponse> {
        let body = upstream.json()?;

        let status = if upstream.is_success() {
            StatusCode::OK
        } else {
            warn!(action = %action, status = upstream.status, "Upstream returned an error status");
            StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY)
        };

        if !upstream.added_headers.is_empty() {
            debug!(
                action = %action,
                headers = ?upstream.added_headers,
                forwarded = self.forward_upstream_headers,
                "Collected upstream x- headers"
            );
        }

        Ok(GatewayResponse {
            status,
            body,
            upstream_headers: upstream.added_headers,
            forward_headers: self.forward_upstream_headers,
        })
    }
}
