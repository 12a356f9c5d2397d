//! Pooled client bound to one downstream service
//!
//! Every call has a fixed timeout and no retries. Transport failures surface
//! as `ServiceUnavailable` (503); error envelopes from the downstream service
//! are relayed with their original status.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::auth::INTERNAL_TOKEN_HEADER;
use crate::envelope::Envelope;
use crate::error::AppError;

#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    service: Arc<str>,
    base_url: Arc<str>,
    timeout: Duration,
    internal_token: Option<Arc<str>>,
}

impl ServiceClient {
    /// Create a client for `service` rooted at `base_url`
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(service: &str, base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client for {service}: {e}")))?;

        Ok(Self {
            http,
            service: service.into(),
            base_url: base_url.trim_end_matches('/').into(),
            timeout,
            internal_token: None,
        })
    }

    /// Attach the shared internal secret to every request built by [`Self::request`]
    #[must_use]
    pub fn with_internal_token(mut self, token: &str) -> Self {
        self.internal_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn http(&self) -> &Client {
        &self.http
    }

    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Start a request against this service
    pub fn request(&self, method: Method, path_and_query: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path_and_query));
        match &self.internal_token {
            Some(token) => builder.header(INTERNAL_TOKEN_HEADER, token.as_ref()),
            None => builder,
        }
    }

    /// Send a request, mapping transport failures to `ServiceUnavailable`
    ///
    /// # Errors
    /// `ServiceUnavailable` on timeout, connection failure or any other transport error
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!(service = %self.service, timeout = ?self.timeout, "Upstream request timed out");
                AppError::unavailable(format!("{} timed out", self.service))
            } else {
                tracing::warn!(service = %self.service, error = %e, "Upstream request failed");
                AppError::unavailable(format!("{} is unreachable", self.service))
            }
        })
    }

    /// Send a request and unwrap the `data` of its envelope
    ///
    /// # Errors
    /// `ServiceUnavailable` on transport failure, `Upstream` for error envelopes
    pub async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let response = self.send(request).await?;
        self.read_envelope(response).await
    }

    /// Like [`Self::call`] but a 404 yields `None`
    ///
    /// # Errors
    /// `ServiceUnavailable` on transport failure, `Upstream` for other error envelopes
    pub async fn call_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, AppError> {
        let response = self.send(request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.read_envelope(response).await.map(Some)
    }

    async fn read_envelope<T: DeserializeOwned>(&self, response: Response) -> Result<T, AppError> {
        let status = response.status();
        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            tracing::warn!(service = %self.service, %status, error = %e, "Unreadable upstream response");
            AppError::unavailable(format!("{} returned an unreadable response", self.service))
        })?;

        envelope.into_data(status.as_u16())
    }
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
