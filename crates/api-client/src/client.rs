use crate::error::{ApiError, ApiResult};
use api_shared::ErrorRes;
use chords_core::CoreConfig;
use reqwest::{header, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Thin JSON client. No retries and no token refresh; a failed call is simply reported.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url`. A missing trailing slash is added so relative paths
    /// resolve below it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `base_url` does not parse and
    /// [`ApiError::CannotBeABase`] if it cannot have paths joined onto it.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ApiError::MissingBaseUrl);
        }
        // A trailing slash makes `Url::join` append instead of replacing the last segment.
        let normalized = format!("{}/", trimmed.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|source| ApiError::InvalidBaseUrl {
            url: trimmed.to_string(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::CannotBeABase(trimmed.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        })
    }

    /// # Errors
    ///
    /// Returns [`ApiError::MissingBaseUrl`] when no base URL is configured, otherwise as
    /// [`ApiClient::new`].
    pub fn from_config(cfg: &CoreConfig) -> ApiResult<Self> {
        let base_url = cfg.api_base_url().ok_or(ApiError::MissingBaseUrl)?;
        Ok(Self::new(base_url)?.with_token(cfg.api_token().map(str::to_string)))
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET` `path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidBaseUrl`] if `path` cannot be joined onto the base URL
    /// - [`ApiError::Request`] if the request cannot be sent
    /// - [`ApiError::Status`] for a non-2xx response, carrying its error message
    /// - [`ApiError::Decode`] if the body is not the expected JSON
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.resolve(path)?;
        self.execute::<T, ()>(Method::GET, url, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        self.execute(Method::POST, url, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        self.execute(Method::PUT, url, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.resolve(path)?;
        self.execute::<T, ()>(Method::DELETE, url, None).await
    }

    fn resolve(&self, path: &str) -> ApiResult<Url> {
        let path = path.trim_start_matches('/');
        self.base_url
            .join(path)
            .map_err(|source| ApiError::InvalidBaseUrl {
                url: format!("{}{}", self.base_url, path),
                source,
            })
    }

    /// Base URL extended by `segments`, each percent-encoded as a single path segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::CannotBeABase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one JSON request, attaching the bearer token when set, and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Request`] if the request cannot be sent
    /// - [`ApiError::Status`] for a non-2xx response, carrying its error message
    /// - [`ApiError::Decode`] if the body is not the expected JSON
    pub(crate) async fn execute<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!(%method, %url, "api request");
        let mut request = self
            .http
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::Request)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorRes>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            tracing::warn!(status = status.as_u16(), %message, "api request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        response.json::<T>().await.map_err(ApiError::Decode)
    }
}
