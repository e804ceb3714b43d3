//! Icon download and decoding.

use std::future::Future;
use std::time::Duration;

use forecast_core::{IconConfig, ReqwestErrorExt};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use crate::cached_image::CachedImage;
use crate::error::IconError;
use crate::retry::{with_retry, RetryConfig};

/// Retrieves and decodes the image at a URL.
pub trait ImageFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<CachedImage, IconError>> + Send;
}

/// Downloads icons over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration, user_agent: &str, retry: RetryConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, retry })
    }

    pub fn from_config(config: &IconConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            Duration::from_secs(config.request_timeout_secs),
            &config.user_agent,
            RetryConfig::new(
                config.max_retries,
                config.retry_initial_delay_ms,
                config.retry_max_delay_ms,
            ),
        )
    }
}

impl ImageFetcher for HttpImageFetcher {
    #[instrument(skip(self, url), fields(url = %url), level = "debug")]
    async fn fetch(&self, url: &Url) -> Result<CachedImage, IconError> {
        let network_error = |e: reqwest::Error| IconError::Network {
            url: url.to_string(),
            source: e.into_network_error(),
        };

        let response = with_retry(&self.retry, || self.client.get(url.clone()).send())
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IconError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(network_error)?;
        tracing::debug!("Downloaded {} bytes", bytes.len());

        // decoding is CPU-bound
        let decoded = tokio::task::spawn_blocking(move || CachedImage::decode(&bytes))
            .await
            .map_err(|e| IconError::Task(e.to_string()))?;

        decoded.map_err(|e| IconError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
