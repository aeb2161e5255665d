//! One HTTP round-trip per call, with no knowledge of the AList envelope.
//!
//! # Design
//! `Transport` turns `(method, path, token, body)` into an `HttpRequest`
//! value and hands it to an `Executor`. The executor is the only place that
//! touches the network. `UreqExecutor` is the default; tests plug in an
//! executor that returns canned responses.
//!
//! There are no retries. A failed attempt is reported to the caller as-is.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Body argument for calls that send no payload.
pub const NO_BODY: Option<&()> = None;

/// Executes a single `HttpRequest`.
///
/// Implementations must return every HTTP status as data; only failures
/// that leave no status to report become `TransportError`. The whole
/// round-trip, body included, must finish within `timeout` or fail with
/// `TransportError::Timeout`.
pub trait Executor: Send + Sync {
    fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

/// Blocking executor on a shared `ureq` agent.
///
/// Response bodies are read with ureq's default size limit (10 MB). A larger
/// body fails with `TransportError::Io` naming the limit.
#[derive(Clone)]
pub struct UreqExecutor {
    agent: ureq::Agent,
}

impl UreqExecutor {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for UreqExecutor {
    fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError> {
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self
                    .agent
                    .get(&request.url)
                    .config()
                    .timeout_global(Some(timeout))
                    .build();
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self
                    .agent
                    .post(&request.url)
                    .config()
                    .timeout_global(Some(timeout))
                    .build();
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(map_ureq_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    header_text(value.as_bytes()),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(map_body_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout(err.to_string()),
        ureq::Error::Http(_) | ureq::Error::BadUri(_) => TransportError::Encode(err.to_string()),
        other => TransportError::Connection(other.to_string()),
    }
}

fn map_body_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout(err.to_string()),
        ureq::Error::BodyExceedsLimit(limit) => {
            TransportError::Io(format!("response body exceeds the {limit} byte limit"))
        }
        other => TransportError::Io(other.to_string()),
    }
}

/// Header values are not guaranteed to be UTF-8; keep them readable.
fn header_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Sends JSON requests relative to a configured base URL.
///
/// Holds only immutable configuration, so one `Transport` can be shared
/// across threads.
#[derive(Clone)]
pub struct Transport {
    config: ClientConfig,
    executor: Arc<dyn Executor>,
}

impl Transport {
    /// Transport backed by `UreqExecutor`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_executor(config, UreqExecutor::new())
    }

    /// Transport backed by a caller-supplied executor. Every call hands it
    /// `config.timeout`.
    pub fn with_executor(config: ClientConfig, executor: impl Executor + 'static) -> Self {
        Self {
            config,
            executor: Arc::new(executor),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the request without sending it.
    ///
    /// Every request carries `Content-Type: application/json`; the
    /// `Authorization` header is present only when `token` is given.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<HttpRequest, TransportError> {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| TransportError::Encode(e.to_string()))?;

        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(token) = token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }

        Ok(HttpRequest {
            method,
            url: self.config.url(path),
            headers,
            body,
        })
    }

    pub fn send<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpResponse, TransportError> {
        let request = self.build_request(method, path, None, body)?;
        self.executor.execute(&request, self.config.timeout)
    }

    pub fn send_authenticated<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        token: &str,
        body: Option<&B>,
    ) -> Result<HttpResponse, TransportError> {
        let request = self.build_request(method, path, Some(token), body)?;
        self.executor.execute(&request, self.config.timeout)
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Returns queued responses in order and records every request it sees,
    /// along with the timeout it was given.
    #[derive(Clone, Default)]
    pub struct FakeExecutor {
        responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
        requests: Arc<Mutex<Vec<(HttpRequest, Duration)>>>,
    }

    impl FakeExecutor {
        pub fn replying(status: u16, body: &str) -> Self {
            let fake = Self::default();
            fake.push(Ok(HttpResponse::new(status, body)));
            fake
        }

        pub fn failing(err: TransportError) -> Self {
            let fake = Self::default();
            fake.push(Err(err));
            fake
        }

        pub fn push(&self, response: Result<HttpResponse, TransportError>) {
            self.responses.lock().unwrap().push_back(response);
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            let seen = self.requests.lock().unwrap();
            seen.iter().map(|(request, _)| request.clone()).collect()
        }

        pub fn last_request(&self) -> HttpRequest {
            self.requests().pop().expect("no request was executed")
        }

        pub fn last_timeout(&self) -> Duration {
            let seen = self.requests.lock().unwrap();
            seen.last().map(|(_, timeout)| *timeout).expect("no request was executed")
        }
    }

    impl Executor for FakeExecutor {
        fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push((request.clone(), timeout));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no response queued")
        }
    }
}
