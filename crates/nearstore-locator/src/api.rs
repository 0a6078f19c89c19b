//! Thin client for the backend store endpoints.

use std::time::Duration;

use nearstore_core::Store;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::retry::{parse_retry_after, RetryPolicy};

/// HTTP client for `GET /api/stores` and `GET /api/stores/{id}`.
///
/// Transient failures (network errors, 5xx, 429) are retried up to
/// `max_retries` additional times, waiting as long as the server's
/// `Retry-After` asks or backing off exponentially otherwise.
pub struct StoreApiClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl StoreApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`ApiError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            retry: RetryPolicy::new(max_retries, backoff_base_ms),
        })
    }

    /// Fetch every store the backend knows about.
    ///
    /// # Errors
    ///
    /// - [`ApiError::UnexpectedStatus`] / [`ApiError::NotFound`] on non-2xx.
    /// - [`ApiError::Http`] on network failure after retries.
    /// - [`ApiError::Deserialize`] if the body is not a store list.
    pub async fn list_stores(&self) -> Result<Vec<Store>, ApiError> {
        let url = self.endpoint(&["api", "stores"])?;
        let stores: Vec<Store> = self.get_json(url).await?;
        tracing::debug!(count = stores.len(), "fetched store list");
        Ok(stores)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if no store has `id`, otherwise the same
    /// errors as [`Self::list_stores`].
    pub async fn get_store(&self, id: &str) -> Result<Store, ApiError> {
        let url = self.endpoint(&["api", "stores", id])?;
        self.get_json(url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "base URL cannot carry a path".to_owned(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.retry.run(|| {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();

                if status == StatusCode::NOT_FOUND {
                    return Err(ApiError::NotFound {
                        url: url.to_string(),
                    });
                }
                if !status.is_success() {
                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(parse_retry_after);
                    return Err(ApiError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                        retry_after,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| ApiError::Deserialize {
                    context: url.to_string(),
                    source: e,
                })
            }
        })
        .await
    }
}
