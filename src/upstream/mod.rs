//! Upstream module - CDEK API trait, HTTP client, and token cache

pub mod http_client;
pub mod token_cache;
pub mod traits;

pub use http_client::{CdekClient, RequestBody};
pub use token_cache::TokenCache;
pub use traits::{AccessToken, CdekApi, UpstreamResponse};
