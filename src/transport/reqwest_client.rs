//! Transport backed by [`reqwest`].

use super::{Response, Transport, REQUEST_TIMEOUT};
use async_trait::async_trait;
use http::HeaderMap;
use url::Url;

#[async_trait]
impl Transport for reqwest::Client {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Response {
        let request = reqwest::Client::get(self, url.clone())
            .headers(headers.clone())
            .timeout(REQUEST_TIMEOUT);
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                #[cfg(feature = "log")]
                tracing::debug!(%url, error = %err, timeout = err.is_timeout(), "request failed");
                return Response::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => Response::Received { status, body },
            Err(err) => Response::Failed {
                reason: err.to_string(),
            },
        }
    }
}
