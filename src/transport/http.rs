//! HTTP transport backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;

use crate::transport::{Headers, Transport, TransportError, TransportResponse, TransportResult};

/// Issues check-in requests over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Use a preconfigured client (proxies, TLS roots, user agent).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
        timeout: Duration,
    ) -> TransportResult<TransportResponse> {
        let mut request = self.client.post(url).timeout(timeout).json(body);
        for (name, values) in headers {
            for value in values {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(
                url = %url,
                timeout = e.is_timeout(),
                connect = e.is_connect(),
                error = %e,
                "Check-in request failed without a response"
            );
            TransportError::Connect(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Connect(format!("failed to read response body: {e}")))?
            .to_vec();

        if status >= 400 {
            return Err(TransportError::Http {
                status,
                headers,
                body,
            });
        }

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    headers
}
