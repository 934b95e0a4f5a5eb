//! Store reachability checks
//!
//! Before any phase runs, each store an enabled phase depends on must answer a
//! plain GET with HTTP 200. Anything else stops the process.

use crate::config::Config;
use crate::error::{AccessError, StoreKind};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

#[async_trait]
pub trait StoreProbe: Send + Sync {
    async fn probe(&self, store: StoreKind, url: &str) -> Result<(), AccessError>;
}

/// GETs the store root with reqwest
#[derive(Debug, Clone)]
pub struct HttpStoreProbe {
    client: reqwest::Client,
}

impl HttpStoreProbe {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        // Certificates are not verified.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

impl Default for HttpStoreProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreProbe for HttpStoreProbe {
    async fn probe(&self, store: StoreKind, url: &str) -> Result<(), AccessError> {
        debug!(store = %store, url, "Probing store");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AccessError::Unreachable {
                store,
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(AccessError::UnexpectedStatus {
                store,
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

/// Stores the enabled phases depend on, collection store first
pub fn required_stores(config: &Config) -> Vec<(StoreKind, &str)> {
    let mut stores = Vec::with_capacity(2);
    if config.phases.needs_collection_store() {
        stores.push((StoreKind::Collection, config.collection_url.as_str()));
    }
    if config.phases.needs_enrichment_store() {
        stores.push((StoreKind::Enrichment, config.enrichment_url.as_str()));
    }
    stores
}
