//! Diagnostic events emitted while an operation runs.
//!
//! The client records events through an injected `EventSink` and is silent
//! unless one is installed. Events never carry tokens, passwords or request
//! bodies.

use crate::http::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent<'a> {
    RequestSent {
        method: HttpMethod,
        path: &'a str,
        authenticated: bool,
    },
    ResponseReceived {
        path: &'a str,
        status: u16,
        bytes: usize,
    },
    /// The server answered with an envelope code other than 200.
    Rejected {
        path: &'a str,
        code: i64,
        message: &'a str,
    },
    /// The call ended with a transport, protocol or decode error.
    Failed {
        path: &'a str,
        kind: &'static str,
    },
    Completed {
        path: &'a str,
    },
}

/// Receives client events. `record` must not block and cannot fail.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &ClientEvent<'_>);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl EventSink for Silent {
    fn record(&self, _event: &ClientEvent<'_>) {}
}

/// Forwards events to `tracing` under the `alist_core` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &ClientEvent<'_>) {
        match event {
            ClientEvent::RequestSent {
                method,
                path,
                authenticated,
            } => tracing::debug!(%method, path, authenticated, "sending request"),
            ClientEvent::ResponseReceived {
                path,
                status,
                bytes,
            } => tracing::debug!(path, status, bytes, "response received"),
            ClientEvent::Rejected {
                path,
                code,
                message,
            } => tracing::warn!(path, code, message, "request rejected by server"),
            ClientEvent::Failed { path, kind } => tracing::warn!(path, kind, "request failed"),
            ClientEvent::Completed { path } => tracing::debug!(path, "request completed"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Keeps a text rendering of every event for assertions.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn record(&self, event: &ClientEvent<'_>) {
            self.events.lock().unwrap().push(format!("{event:?}"));
        }
    }
}
