//! HTTPS transports used to fetch records.

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use std::{sync::Arc, time::Duration};
use url::Url;

#[cfg(feature = "reqwest")]
mod reqwest_client;

/// Time allowed for a single request, including reading the body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcome of a GET request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// The server answered.
    Received {
        /// HTTP status of the response.
        status: StatusCode,
        /// Response body decoded as UTF-8.
        body: String,
    },
    /// No usable response: connection failure, timeout, bad URL, etc.
    Failed {
        /// Description of what went wrong.
        reason: String,
    },
}

impl Response {
    /// Gets the response's body, which is empty if no response was received.
    pub fn body(&self) -> &str {
        match self {
            Self::Received { body, .. } => body,
            Self::Failed { .. } => "",
        }
    }
}

/// Represents the ability to perform HTTPS GET requests.
///
/// Implementations never fail outright: transport-level problems are
/// reported as [`Response::Failed`] and bounded by [`REQUEST_TIMEOUT`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET request for `url` with the given headers.
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Response;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Response {
        (**self).get(url, headers).await
    }
}
