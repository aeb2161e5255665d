//! Synchronous client for the AList HTTP API.
//!
//! # Design
//! `AlistClient` holds a `Transport` (base URL, timeout, executor) and an
//! event sink, and nothing else. It never stores a token: every
//! authenticated operation takes one explicitly, so a single client can be
//! shared between threads and between users.
//!
//! Every endpoint runs the same protocol through `call`: encode the body,
//! send it (with a bearer token when required), then hand the response to
//! `envelope`. The operations themselves live in `auth` and `fs`.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::envelope;
use crate::error::ApiError;
use crate::event::{ClientEvent, EventSink, Silent};
use crate::http::{HttpMethod, HttpResponse};
use crate::transport::{Executor, Transport};

/// A remote endpoint: method and path relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: &'static str,
}

impl Endpoint {
    pub const fn get(path: &'static str) -> Self {
        Self {
            method: HttpMethod::Get,
            path,
        }
    }

    pub const fn post(path: &'static str) -> Self {
        Self {
            method: HttpMethod::Post,
            path,
        }
    }
}

#[derive(Clone)]
pub struct AlistClient {
    transport: Transport,
    sink: Arc<dyn EventSink>,
}

impl AlistClient {
    /// Client on the default blocking HTTP executor.
    pub fn new(config: ClientConfig) -> Self {
        Self::from_transport(Transport::new(config))
    }

    pub fn with_executor(config: ClientConfig, executor: impl Executor + 'static) -> Self {
        Self::from_transport(Transport::with_executor(config, executor))
    }

    pub fn from_transport(transport: Transport) -> Self {
        Self {
            transport,
            sink: Arc::new(Silent),
        }
    }

    /// Install a sink for diagnostic events. The default is `Silent`.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    /// Run one endpoint and decode its `data` as `T`.
    pub(crate) fn call<B, T>(
        &self,
        endpoint: Endpoint,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let result = self
            .round_trip(endpoint, token, body)
            .and_then(|response| envelope::decode(&response));
        self.finish(endpoint, result)
    }

    /// Run one endpoint whose success carries no payload.
    pub(crate) fn call_unit<B>(
        &self,
        endpoint: Endpoint,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let result = self
            .round_trip(endpoint, token, body)
            .and_then(|response| envelope::acknowledge(&response));
        self.finish(endpoint, result)
    }

    fn round_trip<B>(
        &self,
        endpoint: Endpoint,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<HttpResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.sink.record(&ClientEvent::RequestSent {
            method: endpoint.method,
            path: endpoint.path,
            authenticated: token.is_some(),
        });
        let response = match token {
            Some(token) => self
                .transport
                .send_authenticated(endpoint.method, endpoint.path, token, body)?,
            None => self.transport.send(endpoint.method, endpoint.path, body)?,
        };
        self.sink.record(&ClientEvent::ResponseReceived {
            path: endpoint.path,
            status: response.status,
            bytes: response.body.len(),
        });
        Ok(response)
    }

    fn finish<T>(&self, endpoint: Endpoint, result: Result<T, ApiError>) -> Result<T, ApiError> {
        match &result {
            Ok(_) => self.sink.record(&ClientEvent::Completed {
                path: endpoint.path,
            }),
            Err(ApiError::Api { code, message }) => self.sink.record(&ClientEvent::Rejected {
                path: endpoint.path,
                code: *code,
                message,
            }),
            Err(other) => self.sink.record(&ClientEvent::Failed {
                path: endpoint.path,
                kind: other.kind(),
            }),
        }
        result
    }
}

impl fmt::Debug for AlistClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlistClient")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
