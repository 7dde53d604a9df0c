//! Scripted in-memory transport.
//!
//! Replies are registered per path; unknown paths fail like an unreachable
//! host. Used by tests and by hosts that want to dry-run the harness.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::transport::{reason_phrase, HeaderEntry, HttpResponse, ResponseBody, Transport, TransportError};

/// What the transport does for a given path.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Respond {
        status: u16,
        headers: Vec<HeaderEntry>,
        body: String,
        delay: Duration,
    },
    /// Fail at the transport level after `delay`.
    Fail { message: String, delay: Duration },
    /// Never resolve.
    Hang,
}

impl ScriptedReply {
    pub fn status(status: u16) -> Self {
        Self::Respond {
            status,
            headers: Vec::new(),
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn body(status: u16, body: impl Into<String>) -> Self {
        Self::Respond {
            status,
            headers: Vec::new(),
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail {
            message: message.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        if let Self::Respond { headers, .. } = &mut self {
            headers.push(HeaderEntry::new(key, value));
        }
        self
    }

    pub fn after(mut self, by: Duration) -> Self {
        match &mut self {
            Self::Respond { delay, .. } | Self::Fail { delay, .. } => *delay = by,
            Self::Hang => {}
        }
        self
    }
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, ScriptedReply>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, path: &str, reply: ScriptedReply) -> Self {
        self.set(path, reply);
        self
    }

    /// Replace the reply for a path.
    pub fn set(&self, path: &str, reply: ScriptedReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), reply);
    }

    /// Paths requested so far, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_string());

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned();

        match reply {
            Some(ScriptedReply::Respond { status, headers, body, delay }) => {
                tokio::time::sleep(delay).await;
                Ok(HttpResponse {
                    status,
                    status_text: reason_phrase(status),
                    headers,
                    body: ResponseBody::ready(body.into_bytes()),
                })
            }
            Some(ScriptedReply::Fail { message, delay }) => {
                tokio::time::sleep(delay).await;
                Err(TransportError::Request(message))
            }
            Some(ScriptedReply::Hang) => std::future::pending().await,
            None => Err(TransportError::Request(format!("no route to {path}"))),
        }
    }
}
