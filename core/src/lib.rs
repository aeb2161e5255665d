//! Synchronous client for the AList file-storage HTTP API.
//!
//! # Overview
//! Logs a user in (plaintext or pre-hashed password, optional 2FA code),
//! manages 2FA enrolment, and lists, fetches, creates, renames and removes
//! remote entries. Every call is one blocking HTTP round-trip.
//!
//! # Design
//! - `AlistClient` holds only fixed configuration. Tokens are passed to each
//!   authenticated call and never stored.
//! - `Transport` builds plain-data `HttpRequest` values and runs them through
//!   an `Executor`; `UreqExecutor` is the default.
//! - Every reply goes through `envelope`: HTTP status first, then the
//!   `{code, message, data}` envelope, then the typed payload.
//! - Diagnostics go to an injected `EventSink`; the default is `Silent`.

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod event;
pub mod fs;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{AlistClient, Endpoint};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use error::{ApiError, ConfigError, TransportError};
pub use event::{ClientEvent, EventSink, Silent, TracingSink};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Executor, Transport, UreqExecutor, NO_BODY};
pub use types::{
    Credentials, FileEntry, GetQuery, ListQuery, Listing, MkdirRequest, RemoveRequest, RenameRequest,
    TwoFactorSecret, UserProfile, VerifyTwoFactor,
};
