//! Remote catalog retrieval.

use async_trait::async_trait;
use dex_proto::{decode_record_json, CreatureRecord, RecordDecodeError};
use reqwest::Client;
use thiserror::Error;
use tracing::trace;

use crate::config::ViewerConfig;

/// Any way a single record retrieval can go wrong. The viewer treats every
/// variant the same; the distinction only shows up in the log.
#[derive(Debug, Error)]
pub enum RetrievalFailure {
    #[error("request for creature {id} failed: {source}")]
    Transport {
        id: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("catalog returned status {status} for creature {id}")]
    Status { id: u32, status: u16 },
    #[error("malformed record for creature {id}: {source}")]
    Malformed {
        id: u32,
        #[source]
        source: RecordDecodeError,
    },
}

impl RetrievalFailure {
    pub fn id(&self) -> u32 {
        match self {
            RetrievalFailure::Transport { id, .. }
            | RetrievalFailure::Status { id, .. }
            | RetrievalFailure::Malformed { id, .. } => *id,
        }
    }
}

#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    async fn fetch(&self, id: u32) -> Result<CreatureRecord, RetrievalFailure>;
}

/// Catalog backed by `GET {base_url}/{id}`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(config.catalog_base_url.clone(), builder.build()?))
    }

    pub fn record_url(&self, id: u32) -> String {
        format!("{}/{}", self.base_url, id)
    }

    /// Whether an image asset answers a `HEAD` with a success status.
    pub async fn asset_available(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                trace!(target: "dex::catalog", url, error = %err, "asset.check_failed");
                false
            }
        }
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn fetch(&self, id: u32) -> Result<CreatureRecord, RetrievalFailure> {
        let url = self.record_url(id);
        trace!(target: "dex::catalog", %url, "catalog.request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RetrievalFailure::Transport { id, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalFailure::Status {
                id,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| RetrievalFailure::Transport { id, source })?;

        decode_record_json(&body).map_err(|source| RetrievalFailure::Malformed { id, source })
    }
}
