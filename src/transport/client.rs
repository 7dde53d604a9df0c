//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::config::TargetConfig;
use crate::transport::{HeaderEntry, HttpResponse, ResponseBody, Transport, TransportError};

/// Issues GET requests against a base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(config: &TargetConfig) -> Result<Self, TransportError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| TransportError::InvalidTarget {
            target: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout: config.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path (or absolute URL) against the base URL.
    pub fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url.join(path).map_err(|e| TransportError::InvalidTarget {
            target: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        match self.timeout {
            Some(limit) if err.is_timeout() => TransportError::Timeout(limit),
            _ => TransportError::Request(error_chain(&err)),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(path)?;

        let mut request = self.client.get(url);
        if let Some(limit) = self.timeout {
            request = request.timeout(limit);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                HeaderEntry::new(name.as_str(), String::from_utf8_lossy(value.as_bytes()))
            })
            .collect();

        let timeout = self.timeout;
        let body = ResponseBody::new(Box::pin(async move {
            match response.bytes().await {
                Ok(bytes) => Ok(bytes.to_vec()),
                Err(e) if e.is_timeout() => Err(TransportError::Timeout(timeout.unwrap_or_default())),
                Err(e) => Err(TransportError::Body(error_chain(&e))),
            }
        }));

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

/// reqwest hides the useful cause (e.g. "connection refused") in the source chain.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        let config = TargetConfig {
            base_url: base.to_string(),
            ..TargetConfig::default()
        };
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn resolves_paths_against_base() {
        let t = transport("http://127.0.0.1:8080/app/");
        assert_eq!(t.resolve("/status").unwrap().as_str(), "http://127.0.0.1:8080/status");
        assert_eq!(t.resolve("about.html").unwrap().as_str(), "http://127.0.0.1:8080/app/about.html");
        assert_eq!(t.resolve("http://other:9000/x").unwrap().as_str(), "http://other:9000/x");
    }

    #[test]
    fn rejects_unparseable_base() {
        let config = TargetConfig {
            base_url: "not a url".into(),
            ..TargetConfig::default()
        };
        assert!(matches!(
            HttpTransport::new(&config),
            Err(TransportError::InvalidTarget { .. })
        ));
    }
}
