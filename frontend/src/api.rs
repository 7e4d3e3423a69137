//! API client for communicating with the AHKFlow backend.

use ahkflow_types::VERSION_PATH;
use futures_util::future::Abortable;
use reqwest::header::{ACCEPT, CACHE_CONTROL, PRAGMA};
use reqwest::Url;
use serde_json::Value;
#[cfg(target_arch = "wasm32")]
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ApiHttpClientOptions;

pub use futures_util::future::{AbortHandle, AbortRegistration, Aborted};

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// HTTP client could not be constructed
    Client(String),
    /// Network error
    Network(String),
    /// Request did not complete within the configured timeout
    Timeout,
    /// HTTP error with status code
    Http(u16, String),
    /// Response body is not the expected JSON
    Decode(String),
    /// Response JSON has no usable `version` field
    MissingVersion,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Client(msg) => write!(f, "Client error: {}", msg),
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Timeout => write!(f, "Request timed out"),
            ApiError::Http(code, msg) => write!(f, "HTTP {} error: {}", code, msg),
            ApiError::Decode(msg) => write!(f, "Decode error: {}", msg),
            ApiError::MissingVersion => write!(f, "Response has no version"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Client for the version endpoint of the AHKFlow API.
#[derive(Clone)]
pub struct VersionClient {
    version_url: Url,
    client: reqwest::Client,
    #[cfg(target_arch = "wasm32")]
    timeout: Duration,
}

impl VersionClient {
    /// Create a client for the configured backend.
    pub fn new(options: &ApiHttpClientOptions) -> ApiResult<Self> {
        let version_url = options
            .base_address
            .join(VERSION_PATH)
            .map_err(|e| ApiError::Client(e.to_string()))?;

        let builder = reqwest::Client::builder();
        // The browser fetch API has no transport timeout; see `try_fetch_version`.
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(options.timeout);
        let client = builder
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            version_url,
            client,
            #[cfg(target_arch = "wasm32")]
            timeout: options.timeout,
        })
    }

    /// Absolute URL of the version endpoint.
    pub fn version_url(&self) -> &Url {
        &self.version_url
    }

    /// Fetch the backend version.
    ///
    /// Returns `None` if the request fails for any reason; the cause is
    /// logged but not reported to the caller.
    pub async fn fetch_version(&self) -> Option<String> {
        match self.try_fetch_version().await {
            Ok(version) => {
                info!("Successfully fetched version: {}", version);
                Some(version)
            }
            Err(e) => {
                warn!("Failed to fetch version from {}: {}", self.version_url, e);
                None
            }
        }
    }

    /// Fetch the backend version, aborting when the paired [`AbortHandle`]
    /// is triggered.
    pub async fn fetch_version_abortable(
        &self,
        registration: AbortRegistration,
    ) -> Result<Option<String>, Aborted> {
        Abortable::new(self.fetch_version(), registration).await
    }

    /// Fetch the backend version, keeping the failure reason.
    pub async fn try_fetch_version(&self) -> ApiResult<String> {
        #[cfg(target_arch = "wasm32")]
        {
            with_timeout(self.request_version(), self.timeout).await
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.request_version().await
        }
    }

    async fn request_version(&self) -> ApiResult<String> {
        debug!("Fetching version from: {}", self.version_url);

        let response = self
            .client
            .get(self.version_url.clone())
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(status, text));
        }

        let body = response.bytes().await?;
        parse_version(&body)
    }
}

/// Extract the version from a response body.
///
/// The body must be a JSON object. A missing, null or blank `version` is
/// reported separately from a body that is not the expected shape.
fn parse_version(body: &[u8]) -> ApiResult<String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ApiError::Decode("expected a JSON object".to_string()))?;

    match object.get("version") {
        Some(Value::String(version)) if !version.trim().is_empty() => Ok(version.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => Err(ApiError::MissingVersion),
        Some(other) => Err(ApiError::Decode(format!(
            "version is not a string: {}",
            other
        ))),
    }
}

/// Race `future` against a browser timer.
#[cfg(target_arch = "wasm32")]
async fn with_timeout<F>(future: F, timeout: Duration) -> ApiResult<String>
where
    F: std::future::Future<Output = ApiResult<String>>,
{
    use futures_util::future::{select, Either};

    let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
    let future = std::pin::pin!(future);
    let timer = std::pin::pin!(gloo_timers::future::TimeoutFuture::new(millis));

    match select(future, timer).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => Err(ApiError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_url_is_relative_to_base() {
        let options = ApiHttpClientOptions::new("http://localhost:7600").unwrap();
        let client = VersionClient::new(&options).unwrap();

        assert_eq!(
            client.version_url().as_str(),
            "http://localhost:7600/api/v1/version"
        );
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version(br#"{"version":"1.4.0"}"#),
            Ok("1.4.0".to_string())
        );
    }

    #[test]
    fn test_parse_version_ignores_extra_fields() {
        assert_eq!(
            parse_version(br#"{"version":"2.0.0","commit":"abc12345"}"#),
            Ok("2.0.0".to_string())
        );
    }

    #[test]
    fn test_parse_version_missing_field() {
        assert_eq!(parse_version(br#"{}"#), Err(ApiError::MissingVersion));
        assert_eq!(
            parse_version(br#"{"version":null}"#),
            Err(ApiError::MissingVersion)
        );
        assert_eq!(
            parse_version(br#"{"version":""}"#),
            Err(ApiError::MissingVersion)
        );
    }

    #[test]
    fn test_parse_version_malformed() {
        assert!(matches!(
            parse_version(b"<html>oops</html>"),
            Err(ApiError::Decode(_))
        ));
        assert!(matches!(
            parse_version(br#"["1.4.0"]"#),
            Err(ApiError::Decode(_))
        ));
        assert!(matches!(
            parse_version(br#"{"version":140}"#),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::Http(500, "boom".to_string()).to_string(),
            "HTTP 500 error: boom"
        );
        assert_eq!(ApiError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn test_error_converts_to_boxed_error() {
        fn build() -> Result<VersionClient, Box<dyn std::error::Error>> {
            let options = ApiHttpClientOptions::new("http://localhost:7600")?;
            Ok(VersionClient::new(&options)?)
        }

        let boxed: Box<dyn std::error::Error> = Box::new(ApiError::Timeout);
        assert_eq!(boxed.to_string(), "Request timed out");
        assert!(build().is_ok());
    }
}
