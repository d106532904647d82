// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Miele event client.
//!
//! Errors are layered the same way data flows through the crate:
//!
//! - [`ProtocolError`] - the transport failed (DNS, TLS, reset, no runtime)
//! - [`ParseError`] - why a received chunk could not be decoded
//! - [`DecodeError`] - a [`ParseError`] together with the offending bytes
//! - [`Error`] - what a subscriber actually receives
//!
//! Subscribers only ever see [`Error`]. Transport details are logged and then
//! collapsed into [`Error::Connectivity`]; decode failures keep the raw
//! payload so callers can inspect what the server sent.

use bytes::Bytes;
use thiserror::Error;

/// The error delivered to subscription callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The underlying connection failed. The subscription is terminated.
    #[error("connectivity error")]
    Connectivity,

    /// A chunk was received but could not be decoded into devices.
    ///
    /// The subscription stays open; later chunks may decode fine.
    #[error("invalid data ({} bytes)", payload.len())]
    InvalidData {
        /// The raw chunk exactly as received.
        payload: Bytes,
    },
}

impl Error {
    /// Returns the raw payload for [`Error::InvalidData`].
    #[must_use]
    pub fn payload(&self) -> Option<&Bytes> {
        match self {
            Self::InvalidData { payload } => Some(payload),
            Self::Connectivity => None,
        }
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Self::InvalidData {
            payload: err.payload,
        }
    }
}

/// Errors raised by a streaming transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request or body stream failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the server failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The transport needs a Tokio runtime and none was running.
    #[error("no tokio runtime available to drive the connection")]
    NoRuntime,
}

/// Reasons a chunk fails to decode.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The response status was not 200.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// The chunk is not valid UTF-8.
    #[error("chunk is not valid UTF-8")]
    InvalidUtf8,

    /// The chunk does not have the expected event framing.
    #[error("unexpected chunk format: {0}")]
    UnexpectedFormat(String),

    /// A `data:` payload is not the expected JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A chunk that could not be decoded, with the bytes that caused it.
#[derive(Debug, Error)]
#[error("failed to decode chunk: {reason}")]
pub struct DecodeError {
    /// The raw chunk exactly as received.
    pub payload: Bytes,
    /// Why decoding failed.
    #[source]
    pub reason: ParseError,
}

impl DecodeError {
    /// Creates a decode error for the given payload.
    #[must_use]
    pub fn new(payload: Bytes, reason: ParseError) -> Self {
        Self { payload, reason }
    }
}

/// A specialized Result type for subscription deliveries.
pub type Result<T> = std::result::Result<T, Error>;
