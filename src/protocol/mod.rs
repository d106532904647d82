// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Streaming transports for the appliance event API.
//!
//! A transport opens one long-lived GET request and reports every chunk of
//! the response body as it arrives. The [`StreamingClient`] trait is the
//! seam between the subscription service and the network.
//!
//! # Transports
//!
//! - [`HttpClient`]: reqwest-based transport (requires the `http` feature)
//! - [`VerboseClient`]: decorator that logs every delivery of another transport
//!
//! # Delivery contract
//!
//! For each call to [`StreamingClient::get`] the callback receives zero or
//! more `Ok(Chunk)` values, one per chunk received on the wire, in receipt
//! order, optionally followed by a single terminal `Err(ProtocolError)`. A
//! clean end of stream delivers nothing further.
//!
//! Once the connection is over, for whatever reason, the transport drops
//! every clone of the callback it holds. Callers observe the end of a stream
//! through that release.

#[cfg(feature = "http")]
mod http;
mod verbose;

#[cfg(feature = "http")]
pub use http::{HttpClient, HttpConfig};
pub use verbose::VerboseClient;

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::task::AbortHandle;
use url::Url;

use crate::error::ProtocolError;

/// Request header names mapped to values.
pub type Headers = BTreeMap<String, String>;

/// Outcome of one transport delivery.
pub type ChunkResult = Result<Chunk, ProtocolError>;

/// Callback invoked by a transport for every delivery.
pub type ChunkCallback = Arc<dyn Fn(ChunkResult) + Send + Sync>;

/// Response metadata attached to every delivered chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    status: u16,
    url: Url,
}

impl ResponseMeta {
    /// Creates response metadata.
    #[must_use]
    pub fn new(status: u16, url: Url) -> Self {
        Self { status, url }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the URL of the response (after redirects).
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// One piece of a streamed response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    body: Bytes,
    meta: ResponseMeta,
}

impl Chunk {
    /// Creates a chunk.
    #[must_use]
    pub fn new(body: impl Into<Bytes>, meta: ResponseMeta) -> Self {
        Self {
            body: body.into(),
            meta,
        }
    }

    /// Returns the raw bytes of this chunk.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the response metadata.
    #[must_use]
    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    /// Splits the chunk into body and metadata.
    #[must_use]
    pub fn into_parts(self) -> (Bytes, ResponseMeta) {
        (self.body, self.meta)
    }
}

/// Handle to an open streaming connection.
///
/// Closing or dropping the handle stops the task driving the connection.
/// Transports that cannot cancel return [`Connection::detached`].
#[derive(Debug, Default)]
pub struct Connection {
    abort: Option<AbortHandle>,
}

impl Connection {
    /// Creates a handle that aborts the given task when closed.
    #[must_use]
    pub fn new(abort: AbortHandle) -> Self {
        Self { abort: Some(abort) }
    }

    /// Creates a handle that controls nothing.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Returns `true` once the driving task has finished or been aborted.
    ///
    /// Detached handles always report `true`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.abort.as_ref().is_none_or(AbortHandle::is_finished)
    }

    /// Closes the connection.
    pub fn close(mut self) {
        self.abort_task();
    }

    fn abort_task(&mut self) {
        if let Some(abort) = self.abort.take() {
            abort.abort();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.abort_task();
    }
}

/// A transport able to stream the body of a GET request.
pub trait StreamingClient: Send + Sync {
    /// Opens a GET request to `url` with `headers` and streams the response.
    ///
    /// `on_event` is called from a single task, strictly in receipt order.
    /// Failures are reported through `on_event`, never returned. When the
    /// connection ends, cleanly or not, `on_event` is dropped.
    fn get(&self, url: &Url, headers: &Headers, on_event: ChunkCallback) -> Connection;
}

impl<C: StreamingClient + ?Sized> StreamingClient for Arc<C> {
    fn get(&self, url: &Url, headers: &Headers, on_event: ChunkCallback) -> Connection {
        (**self).get(url, headers, on_event)
    }
}

impl<C: StreamingClient + ?Sized> StreamingClient for Box<C> {
    fn get(&self, url: &Url, headers: &Headers, on_event: ChunkCallback) -> Connection {
        (**self).get(url, headers, on_event)
    }
}
