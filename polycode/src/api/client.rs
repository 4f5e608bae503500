use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::content::Content;
use super::error::ApiError;
use super::ContentApi;

/// Polycode content API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    auth_header: String,
    retry_config: RetryConfig,
}

/// Which failures a request may be repeated after
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Retry {
    /// Idempotent requests: 429, 5xx and connection failures
    Always,
    /// Requests with side effects: 429 only
    RateLimitOnly,
}

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(endpoint: &str, api_token: &str) -> Result<Self, ApiError> {
        Self::with_config(endpoint, api_token, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        endpoint: &str,
        api_token: &str,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{}: not a base URL",
                endpoint
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(retry_config.timeout_seconds))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header: format!("Bearer {}", api_token),
                retry_config,
            }),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Execute a GET request with retry logic
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.url(segments)?;
        let response = self
            .execute_with_retry(
                || {
                    tracing::debug!("GET request to: {}", url);
                    self.inner
                        .http_client
                        .get(url.clone())
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .send()
                },
                url.path(),
                Retry::Always,
            )
            .await?;
        Self::parse_success_response(response).await
    }

    /// Execute a POST request; only rate-limited attempts are retried since a
    /// failed POST may still have created the resource
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(segments)?;
        let response = self
            .execute_with_retry(
                || {
                    tracing::debug!("POST request to: {}", url);
                    self.inner
                        .http_client
                        .post(url.clone())
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .json(body)
                        .send()
                },
                url.path(),
                Retry::RateLimitOnly,
            )
            .await?;
        Self::parse_success_response(response).await
    }

    /// Execute a PUT request with retry logic
    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(segments)?;
        let response = self
            .execute_with_retry(
                || {
                    tracing::debug!("PUT request to: {}", url);
                    self.inner
                        .http_client
                        .put(url.clone())
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .json(body)
                        .send()
                },
                url.path(),
                Retry::Always,
            )
            .await?;
        Self::parse_success_response(response).await
    }

    /// Execute a DELETE request with retry logic, discarding any body
    pub async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.url(segments)?;
        self.execute_with_retry(
            || {
                tracing::debug!("DELETE request to: {}", url);
                self.inner
                    .http_client
                    .delete(url.clone())
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .send()
            },
            url.path(),
            Retry::Always,
        )
        .await
        .map(|_| ())
    }

    /// Execute request with retry logic
    /// 429 is always retried with exponential backoff; 5xx and connection
    /// failures only under `Retry::Always`
    async fn execute_with_retry<F, Fut>(
        &self,
        request_fn: F,
        path: &str,
        retry_policy: Retry,
    ) -> Result<reqwest::Response, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let retry = &self.inner.retry_config;
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= retry.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    retry.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    retry.max_backoff_ms,
                );
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::AuthError);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        if retry_policy == Retry::RateLimitOnly {
                            return Err(ApiError::ServiceUnavailable);
                        }
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(Self::error_from_response(response, path).await);
                    }
                }
                Err(e) => {
                    if retry_policy == Retry::RateLimitOnly {
                        return Err(if e.is_timeout() {
                            ApiError::Timeout(retry.timeout_seconds)
                        } else if e.is_connect() {
                            ApiError::ServiceUnavailable
                        } else {
                            ApiError::RequestError(e)
                        });
                    }
                    if e.is_timeout() {
                        last_error = Some(ApiError::Timeout(retry.timeout_seconds));
                    } else if e.is_connect() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    async fn parse_success_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    async fn error_from_response(response: reqwest::Response, path: &str) -> ApiError {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return ApiError::NotFound(path.to_string());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!("API error response: {}", message);

        ApiError::ApiError {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl ContentApi for Client {
    async fn create_content(&self, content: &Content) -> Result<Content, ApiError> {
        self.post(&["content"], content).await
    }

    async fn get_content(&self, id: &str) -> Result<Content, ApiError> {
        self.get(&["content", id]).await
    }

    async fn update_content(&self, content: &Content) -> Result<Content, ApiError> {
        self.put(&["content", &content.id], content).await
    }

    async fn delete_content(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&["content", id]).await
    }
}
