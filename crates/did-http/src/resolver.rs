use std::time::Duration;

use did_core::error::Err;
use did_core::{tracerr, DidDocument, Resolution, Resolver, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Environment variable holding the resolver base URL.
pub const RESOLVER_URL_ENV: &str = "DID_RESOLVER_URL";

/// Environment variable holding an optional request timeout, in whole seconds.
pub const RESOLVER_TIMEOUT_ENV: &str = "DID_RESOLVER_TIMEOUT_SECS";

/// Options for an [`HttpResolver`].
#[derive(Clone, Debug, Default)]
pub struct HttpResolverOptions {
    /// Base URL of the universal resolver.
    pub resolver_url: String,

    /// HTTP client to send requests with. A default client is built when not set.
    pub client: Option<reqwest::Client>,

    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

/// Resolves DIDs by asking a universal resolver over HTTP.
#[derive(Clone, Debug)]
pub struct HttpResolver {
    resolver_url: String,
    client: reqwest::Client,
    timeout: Option<Duration>,
}

// Universal resolver response body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolverResponse {
    document: Value,
    #[serde(default)]
    resolver_metadata: Option<Value>,
}

impl HttpResolver {
    /// Create a resolver for the universal resolver at `resolver_url`.
    #[must_use]
    pub fn new(resolver_url: impl Into<String>) -> Self {
        Self::with_options(HttpResolverOptions {
            resolver_url: resolver_url.into(),
            ..HttpResolverOptions::default()
        })
    }

    /// Create a resolver from options.
    #[must_use]
    pub fn with_options(options: HttpResolverOptions) -> Self {
        Self {
            resolver_url: options.resolver_url,
            client: options.client.unwrap_or_default(),
            timeout: options.timeout,
        }
    }

    /// Create a resolver configured by the environment: `DID_RESOLVER_URL` (required) and
    /// `DID_RESOLVER_TIMEOUT_SECS` (optional).
    ///
    /// # Errors
    ///
    /// * `Err::InvalidConfig` - the URL is not set or the timeout is not a whole number.
    pub fn from_env() -> Result<Self> {
        let Ok(resolver_url) = std::env::var(RESOLVER_URL_ENV) else {
            tracerr!(Err::InvalidConfig, "{RESOLVER_URL_ENV} is not set");
        };

        let timeout = match std::env::var(RESOLVER_TIMEOUT_ENV) {
            Ok(secs) => {
                let Ok(secs) = secs.trim().parse::<u64>() else {
                    tracerr!(Err::InvalidConfig, "{RESOLVER_TIMEOUT_ENV} is not a number: {secs}");
                };
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self::with_options(HttpResolverOptions {
            resolver_url,
            client: None,
            timeout,
        }))
    }

    /// The resolver base URL.
    #[must_use]
    pub fn resolver_url(&self) -> &str {
        &self.resolver_url
    }

    /// The request URL for `did`.
    #[must_use]
    pub fn identifier_url(&self, did: &str) -> String {
        let slash = if self.resolver_url.ends_with('/') { "" } else { "/" };
        format!("{}{slash}1.0/identifiers/{did}", self.resolver_url)
    }
}

impl Resolver for HttpResolver {
    async fn resolve(&self, did: &str) -> Result<Resolution> {
        let url = self.identifier_url(did);
        tracing::trace!("resolving {did} at {url}");

        let mut request = self.client.get(&url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let res = match request.send().await {
            Ok(res) => res,
            Err(e) => tracerr!(Err::RequestError, "Error sending DID resolution request: {e}"),
        };

        let status = res.status();
        tracing::trace!("resolver returned {status} for {did}");
        if status == StatusCode::NOT_FOUND {
            tracerr!(Err::NotFound, "Decentralized ID Document not found for {did}");
        }
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            tracerr!(Err::ResolutionFailed, "Universal Resolver reported an error: {reason}");
        }

        let body = match res.json::<ResolverResponse>().await {
            Ok(body) => body,
            Err(e) => tracerr!(Err::DeserializationError, "invalid resolver response: {e}"),
        };

        Ok(Resolution {
            did_document: DidDocument::from_json(body.document)?,
            metadata: body.resolver_metadata,
        })
    }
}
