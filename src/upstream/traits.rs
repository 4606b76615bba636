//! Common traits and types for talking to the CDEK API

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::gateway::request::{OfficeQuery, TariffCalculation};

/// Bearer token issued by the `oauth/token` endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            value: value.into(),
            expires_in,
        }
    }

    pub fn secret(&self) -> &str {
        &self.value
    }

    /// Lifetime in seconds as reported by the provider
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }

    /// Extract the token from an `oauth/token` response.
    ///
    /// A JSON body without a non-empty `access_token` means the provider
    /// refused our credentials. `expires_in` is only a hint for the token
    /// cache; values that are not a non-negative number are ignored.
    pub fn from_token_response(response: &UpstreamResponse) -> Result<Self> {
        let parsed: Value = serde_json::from_str(&response.body).map_err(|e| {
            AppError::Upstream(format!(
                "Token endpoint returned status {} with a non-JSON body: {}",
                response.status, e
            ))
        })?;

        let token = match parsed.get("access_token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AppError::Unauthorized),
        };

        let expires_in = parsed.get("expires_in").and_then(lifetime_secs);
        Ok(Self::new(token, expires_in))
    }
}

fn lifetime_secs(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Raw result of one upstream call
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
    /// Response headers starting with `x-`, formatted as `name: value`
    pub added_headers: Vec<String>,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(|e| {
            AppError::Upstream(format!(
                "Upstream returned status {} with a non-JSON body: {}",
                self.status, e
            ))
        })
    }
}

/// Operations the gateway needs from the logistics provider
#[async_trait]
pub trait CdekApi: Send + Sync {
    /// Client identifier the credentials belong to
    fn client_id(&self) -> &str;

    /// Exchange the stored credentials for a bearer token
    async fn fetch_token(&self) -> Result<AccessToken>;

    /// List pickup points (`GET deliverypoints`)
    async fn delivery_points(
        &self,
        token: &AccessToken,
        query: &OfficeQuery,
    ) -> Result<UpstreamResponse>;

    /// Price a shipment across tariffs (`POST calculator/tarifflist`)
    async fn calculate_tariffs(
        &self,
        token: &AccessToken,
        calculation: &TariffCalculation,
    ) -> Result<UpstreamResponse>;
}
