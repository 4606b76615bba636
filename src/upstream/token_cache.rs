//! Optional reuse of access tokens across requests
//!
//! Without a cache every request performs its own `oauth/token` exchange.
//! When enabled, a token is kept per client identifier until shortly before
//! it expires.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::TokenCacheConfig;
use crate::error::Result;
use crate::upstream::traits::{AccessToken, CdekApi};

#[derive(Debug, Clone)]
struct CachedToken {
    token: AccessToken,
    expires_at: Instant,
}

/// Token cache keyed by client identifier
pub struct TokenCache {
    entries: DashMap<String, CachedToken>,
    max_ttl: Duration,
    refresh_margin: Duration,
}

impl TokenCache {
    pub fn new(config: &TokenCacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            max_ttl: Duration::from_secs(config.max_ttl_secs),
            refresh_margin: Duration::from_secs(config.refresh_margin_secs),
        }
    }

    /// Return a live cached token or fetch and remember a new one
    pub async fn get_or_fetch(&self, api: &dyn CdekApi) -> Result<AccessToken> {
        if let Some(token) = self.get(api.client_id()) {
            debug!(client_id = %api.client_id(), "Reusing cached access token");
            return Ok(token);
        }

        let token = api.fetch_token().await?;
        self.store(api.client_id(), &token);
        Ok(token)
    }

    fn get(&self, client_id: &str) -> Option<AccessToken> {
        let entry = self.entries.get(client_id)?;
        if entry.expires_at > Instant::now() {
            Some(entry.token.clone())
        } else {
            None
        }
    }

    fn store(&self, client_id: &str, token: &AccessToken) {
        let lifetime = token
            .expires_in()
            .map(Duration::from_secs)
            .unwrap_or(self.max_ttl)
            .min(self.max_ttl)
            .saturating_sub(self.refresh_margin);

        if lifetime.is_zero() {
            self.entries.remove(client_id);
            return;
        }

        self.entries.insert(
            client_id.to_string(),
            CachedToken {
                token: token.clone(),
                expires_at: Instant::now() + lifetime,
            },
        );
    }

    /// Drop the token for a client, e.g. after the provider rejected it
    pub fn invalidate(&self, client_id: &str) {
        if self.entries.remove(client_id).is_some() {
            debug!(client_id = %client_id, "Invalidated cached access token");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
