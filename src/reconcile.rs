//! Merging a read-only baseline product list with the mutable store.
//!
//! The baseline (a bundled file or a remote list) is authoritative: on an id
//! collision the baseline record wins and the store's copy is ignored. Store
//! records only fill the gaps. The baseline is re-read on every call.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::entity::Product;
use crate::error::{Result, TaarifaError};

/// Merge `backup` into `baseline` by id, baseline first.
///
/// Records from `backup` are appended in order when their id has not been
/// seen yet; baseline records are never replaced.
pub fn merge(baseline: Vec<Product>, backup: Vec<Product>) -> Vec<Product> {
    let mut seen: HashSet<String> = baseline.iter().map(|p| p.id.clone()).collect();
    let mut merged = baseline;

    for product in backup {
        if seen.insert(product.id.clone()) {
            merged.push(product);
        }
    }

    merged
}

/// Where the read-only baseline list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaselineSource {
    File(PathBuf),
    Remote(String),
}

impl BaselineSource {
    /// `http://` and `https://` locations are fetched remotely; anything else
    /// is a file path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            BaselineSource::Remote(location.to_string())
        } else {
            BaselineSource::File(PathBuf::from(location))
        }
    }

    /// Read the baseline once. No retries.
    pub async fn fetch(&self, client: &reqwest::Client) -> Result<Vec<Product>> {
        let body = match self {
            BaselineSource::File(path) => tokio::fs::read_to_string(path).await?,
            BaselineSource::Remote(url) => {
                let response = client.get(url).send().await?.error_for_status()?;
                response.text().await?
            }
        };

        let payload: BaselinePayload =
            serde_json::from_str(&body).map_err(|e| TaarifaError::Parse(e.to_string()))?;
        Ok(payload.into_products())
    }
}

impl std::fmt::Display for BaselineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaselineSource::File(path) => write!(f, "{}", path.display()),
            BaselineSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// A baseline is either a bare array or the `{success, data}` API envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum BaselinePayload {
    List(Vec<Product>),
    Envelope { data: Vec<Product> },
}

impl BaselinePayload {
    fn into_products(self) -> Vec<Product> {
        match self {
            BaselinePayload::List(products) | BaselinePayload::Envelope { data: products } => {
                products
            }
        }
    }
}

/// Produces the reconciled product view.
#[derive(Clone, Default)]
pub struct Reconciler {
    baseline: Option<BaselineSource>,
    client: reqwest::Client,
}

impl Reconciler {
    pub fn new(baseline: Option<BaselineSource>) -> Self {
        Self::with_client(baseline, reqwest::Client::new())
    }

    pub fn with_client(baseline: Option<BaselineSource>, client: reqwest::Client) -> Self {
        Self { baseline, client }
    }

    pub fn baseline(&self) -> Option<&BaselineSource> {
        self.baseline.as_ref()
    }

    /// Baseline merged with `backup`. Never fails: if the baseline cannot be
    /// read, `backup` is returned on its own.
    pub async fn load(&self, backup: Vec<Product>) -> Vec<Product> {
        let Some(source) = &self.baseline else {
            return backup;
        };

        match source.fetch(&self.client).await {
            Ok(baseline) => {
                debug!(
                    source = %source,
                    baseline = baseline.len(),
                    backup = backup.len(),
                    "merging baseline with store"
                );
                merge(baseline, backup)
            }
            Err(e) => {
                warn!(source = %source, error = %e, "baseline unavailable, using store only");
                backup
            }
        }
    }

    pub async fn find_by_hash(&self, backup: Vec<Product>, hash: &str) -> Option<Product> {
        self.load(backup).await.into_iter().find(|p| p.hash == hash)
    }

    pub async fn find_by_id(&self, backup: Vec<Product>, id: &str) -> Option<Product> {
        self.load(backup).await.into_iter().find(|p| p.id == id)
    }
}
