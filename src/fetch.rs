//! Bundle archive download.
//!
//! The whole archive is pulled into memory by a single GET. The timeout covers
//! the request and the body transfer together; when it fires the in-flight
//! future is dropped, which tears down the connection and discards whatever
//! was already received.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::store::BundleIdentifier;

#[derive(Debug, Clone)]
pub struct FetchedBundle {
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`.
    pub sha256: String,
}

impl FetchedBundle {
    pub fn new(bytes: Vec<u8>) -> Self {
        let sha256 = compute_hash(&bytes);
        Self { bytes, sha256 }
    }
}

pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Source of bundle archives. The provisioner only talks to the network
/// through this trait.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        source: &BundleIdentifier,
        timeout: Duration,
    ) -> Result<FetchedBundle, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Check that `source` is an http(s) URL.
pub fn validate_source(source: &BundleIdentifier) -> Result<url::Url, FetchError> {
    let parsed = url::Url::parse(source.as_str())
        .map_err(|e| FetchError::InvalidSource(redact(source.as_str()), e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(FetchError::InvalidSource(
            redact(source.as_str()),
            format!(
                "unsupported scheme: {} (only http/https allowed)",
                parsed.scheme()
            ),
        ));
    }
    Ok(parsed)
}

/// Identifiers are frequently signed URLs; keep query strings out of logs.
pub fn redact(source: &str) -> String {
    match source.split_once('?') {
        Some((base, _)) => format!("{}?…", base),
        None => source.to_string(),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        source: &BundleIdentifier,
        timeout: Duration,
    ) -> Result<FetchedBundle, FetchError> {
        if timeout.is_zero() {
            return Err(FetchError::InvalidTimeout);
        }
        let url = validate_source(source)?;

        debug!(source = %redact(source.as_str()), ?timeout, "fetching bundle");
        let start = std::time::Instant::now();

        let transfer = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::SourceUnreachable(e.without_url().to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::SourceRejected {
                    status: status.as_u16(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| FetchError::SourceUnreachable(e.without_url().to_string()))?;
            Ok(bytes.to_vec())
        };

        let bytes = tokio::time::timeout(timeout, transfer)
            .await
            .map_err(|_| FetchError::Timeout(timeout))??;

        let bundle = FetchedBundle::new(bytes);
        info!(
            bytes = bundle.bytes.len(),
            sha256 = %bundle.sha256,
            elapsed = ?start.elapsed(),
            "bundle downloaded"
        );
        Ok(bundle)
    }
}
