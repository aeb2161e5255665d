//! The `{code, message, data}` envelope wrapped around every AList reply.
//!
//! # Design
//! Decoding happens in two passes. The envelope is read first with `data`
//! left as untyped JSON, so a rejection such as
//! `{"code":400,"message":"wrong password","data":null}` surfaces as
//! `ApiError::Api` even though `null` is not a valid payload. Only after the
//! code is 200 is `data` decoded into the operation's type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Envelope code that marks success.
pub const SUCCESS: i64 = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: T,
}

/// Check status, decode the envelope, check the code, decode `data`.
///
/// A non-200 HTTP status fails with `ApiError::Protocol` before the body is
/// looked at.
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    let envelope = open(response)?;
    serde_json::from_value(envelope.data).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Like `decode`, but for operations whose success carries no payload.
/// Whatever `data` holds is ignored.
pub fn acknowledge(response: &HttpResponse) -> Result<(), ApiError> {
    open(response).map(|_| ())
}

fn open(response: &HttpResponse) -> Result<Envelope, ApiError> {
    if response.status != 200 {
        return Err(ApiError::Protocol {
            status: response.status,
            body: response.body_text(),
        });
    }
    let envelope: Envelope =
        serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;
    if envelope.code != SUCCESS {
        return Err(ApiError::Api {
            code: envelope.code,
            message: envelope.message,
        });
    }
    Ok(envelope)
}
