//! `reqwest`-backed transport.

use super::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::config::RetailerConfig;
use crate::errors::{CheckoutError, TransportError};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Sends requests with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport with the given request timeout.
    ///
    /// Cookies are managed by the session, so the client keeps no jar of
    /// its own.
    pub fn new(timeout: Duration) -> Result<Self, CheckoutError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build client: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Creates a transport from retailer settings.
    pub fn from_config(config: &RetailerConfig) -> Result<Self, CheckoutError> {
        Self::new(config.timeout())
    }

    /// The configured request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(format!("no response within {:?}", self.timeout))
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let started = Instant::now();
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| TransportError::Request(format!("failed to encode body: {e}")))?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(|e| self.classify(&e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(|e| self.classify(&e))?;

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status,
            duration_ms,
            "http exchange"
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_timeout() {
        let config = RetailerConfig::new().with_timeout(2.5);
        let transport = ReqwestTransport::from_config(&config).unwrap();
        assert_eq!(transport.timeout(), Duration::from_millis(2500));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let result = transport
            .send(HttpRequest::get("http://127.0.0.1:9/unreachable"))
            .await;

        assert!(matches!(
            result,
            Err(TransportError::Connect(_) | TransportError::Request(_) | TransportError::Timeout(_))
        ));
    }
}
