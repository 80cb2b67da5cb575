//! HTTP backend configuration.

use std::time::Duration;

use famcal_core::EventId;
use url::Url;

use crate::error::{BackendError, BackendResult};

/// Configuration for [`HttpBackend`](super::HttpBackend).
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL of the family calendar API, always ending in `/`.
    pub base_url: Url,

    /// Bearer token sent with every request.
    pub auth_token: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl HttpBackendConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Creates a configuration for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL does not parse or is not
    /// http(s).
    pub fn new(base_url: impl AsRef<str>) -> BackendResult<Self> {
        let mut url = Url::parse(base_url.as_ref()).map_err(|e| {
            BackendError::configuration(format!("invalid base URL {:?}", base_url.as_ref()))
                .with_source(e)
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(BackendError::configuration(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        // Url::join replaces the last segment unless the path ends in '/'
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            auth_token: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("famcal/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Builder: set the bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Builder: set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// URL of the event resource.
    pub fn event_url(&self, event_id: EventId) -> BackendResult<Url> {
        self.join(&format!("calendar/events/{}", event_id))
    }

    /// URL of the conflict-check resource for an event.
    pub fn conflicts_url(&self, event_id: EventId) -> BackendResult<Url> {
        self.join(&format!("calendar/events/{}/conflicts", event_id))
    }

    fn join(&self, path: &str) -> BackendResult<Url> {
        self.base_url.join(path).map_err(|e| {
            BackendError::configuration(format!("cannot build URL for {}", path)).with_source(e)
        })
    }
}
