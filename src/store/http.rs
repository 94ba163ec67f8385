//! HTTP store client

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use super::schema::{self, BatchObjectResponse, BatchObjectsRequest, ReferencePayload};
use super::{AST_NODE_CLASS, BatchResult, ObjectStore, StoreObject};
use crate::config::ProxyConfig;
use crate::{Error, Result};

/// Network client for the backing object store.
///
/// Cloning is cheap and clones share the underlying connection pool, so one
/// instance serves every concurrent ingest call.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    /// Build a client bound to `base_url` without contacting the store.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Connection(format!("invalid store url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Connection(format!("store url {} cannot be a base", base_url)));
        }

        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Build a client from configuration and wait until the store is ready.
    pub async fn connect(config: &ProxyConfig) -> Result<Self> {
        let base_url = config.store_base_url()?;
        tracing::info!("Connecting to store at {}", base_url);

        let store = Self::new(&base_url, config.request_timeout())?;
        store
            .await_ready(config.ready_attempts, config.ready_delay())
            .await?;

        tracing::info!("Successfully connected to store");
        Ok(store)
    }

    /// Single readiness poll. Transport errors count as "not ready".
    pub async fn is_ready(&self) -> bool {
        let url = match self.endpoint(schema::READY_SEGMENTS) {
            Ok(url) => url,
            Err(_) => return false,
        };

        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Readiness check failed: {}", e);
                false
            }
        }
    }

    /// Poll readiness up to `max_attempts` times, sleeping `retry_delay`
    /// between polls. Returns the number of polls it took.
    pub async fn await_ready(&self, max_attempts: u32, retry_delay: Duration) -> Result<u32> {
        let max_attempts = max_attempts.max(1);

        for attempt in 1..=max_attempts {
            if self.is_ready().await {
                return Ok(attempt);
            }

            if attempt < max_attempts {
                tracing::warn!(
                    "Store not ready, retrying in {:?}... ({}/{})",
                    retry_delay,
                    attempt,
                    max_attempts
                );
                tokio::time::sleep(retry_delay).await;
            }
        }

        tracing::error!("Store not ready after {} attempts", max_attempts);
        Err(Error::NotReady { attempts: max_attempts })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::Connection(format!("store url {} cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    async fn batch_write_objects(&self, objects: &[StoreObject]) -> Result<BatchResult> {
        let url = self.endpoint(schema::BATCH_OBJECTS_SEGMENTS)?;

        let response = self
            .client
            .post(url)
            .json(&BatchObjectsRequest { objects })
            .send()
            .await
            .map_err(|e| Error::Write(format!("batch request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Write(format!("batch rejected with {}: {}", status, body)));
        }

        let parsed: Vec<BatchObjectResponse> = response
            .json()
            .await
            .map_err(|e| Error::Write(format!("unreadable batch response: {}", e)))?;

        let results = parsed
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let fallback = objects.get(i).map(|o| o.id.as_str()).unwrap_or("");
                r.into_result(fallback)
            })
            .collect();

        Ok(BatchResult::new(results))
    }

    async fn create_reference(
        &self,
        source_id: &str,
        reference_property: &str,
        target_class: &str,
        target_id: &str,
    ) -> Result<()> {
        let url = self.endpoint(&schema::reference_segments(
            AST_NODE_CLASS,
            source_id,
            reference_property,
        ))?;
        let payload = ReferencePayload {
            beacon: schema::beacon(target_class, target_id),
        };

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Write(format!("reference request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Write(format!("reference rejected with {}: {}", status, body)));
        }

        Ok(())
    }
}
