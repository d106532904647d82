// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Test utilities for code built on top of this crate.
//!
//! [`ClientSpy`] is a [`StreamingClient`] that never touches the network. It
//! records every request and lets the test push chunks or errors into any of
//! them, synchronously, on the calling thread. [`ClientSpy::finish`] ends a
//! request cleanly by releasing its callback, as a transport does when the
//! server closes the stream.
//!
//! ```
//! use std::sync::Arc;
//! use miele_events::MieleService;
//! use miele_events::testing::ClientSpy;
//!
//! let spy = Arc::new(ClientSpy::new());
//! let service = MieleService::new(Arc::clone(&spy));
//!
//! service.subscribe(&"http://any-url.com".parse().unwrap(), "secret", |result| {
//!     println!("{result:?}");
//! });
//!
//! assert_eq!(spy.request_count(), 1);
//! assert!(spy.complete_with_chunk(0, 200, "event: devices\ndata: {}\n\n"));
//! ```

use std::fmt;

use bytes::Bytes;
use parking_lot::Mutex;
use url::Url;

use crate::error::ProtocolError;
use crate::protocol::{Chunk, ChunkCallback, Connection, Headers, ResponseMeta, StreamingClient};

/// A request captured by [`ClientSpy`].
struct RecordedRequest {
    url: Url,
    headers: Headers,
    /// `None` once the request has been finished.
    on_event: Option<ChunkCallback>,
}

/// Transport double that records requests and replays scripted deliveries.
#[derive(Default)]
pub struct ClientSpy {
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ClientSpy {
    /// Creates a spy with no recorded requests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of `get` calls received.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Returns the URLs of every recorded request, in call order.
    #[must_use]
    pub fn requested_urls(&self) -> Vec<Url> {
        self.requests.lock().iter().map(|r| r.url.clone()).collect()
    }

    /// Returns the headers sent with the request at `index`.
    #[must_use]
    pub fn requested_headers(&self, index: usize) -> Option<Headers> {
        self.requests.lock().get(index).map(|r| r.headers.clone())
    }

    /// Delivers a chunk with the given status to the request at `index`.
    ///
    /// The response URL is the requested URL. Returns `false` if no such
    /// request was made or it has been finished.
    pub fn complete_with_chunk(&self, index: usize, status: u16, body: impl Into<Bytes>) -> bool {
        let Some((url, on_event)) = self.recorded(index) else {
            return false;
        };

        on_event(Ok(Chunk::new(body, ResponseMeta::new(status, url))));
        true
    }

    /// Delivers a transport error to the request at `index`.
    ///
    /// Returns `false` if no such request was made or it has been finished.
    pub fn complete_with_error(&self, index: usize, error: ProtocolError) -> bool {
        let Some((_, on_event)) = self.recorded(index) else {
            return false;
        };

        on_event(Err(error));
        true
    }

    /// Ends the request at `index` cleanly, without a delivery.
    ///
    /// The spy drops its callback, so no further completion reaches it.
    /// Returns `false` if no such request was made or it was already finished.
    pub fn finish(&self, index: usize) -> bool {
        let released = self
            .requests
            .lock()
            .get_mut(index)
            .and_then(|r| r.on_event.take());

        // Dropped here, outside the lock.
        released.is_some()
    }

    /// Clones out the request data so callbacks run without the lock held.
    fn recorded(&self, index: usize) -> Option<(Url, ChunkCallback)> {
        let requests = self.requests.lock();
        let request = requests.get(index)?;
        Some((request.url.clone(), request.on_event.clone()?))
    }
}

impl StreamingClient for ClientSpy {
    fn get(&self, url: &Url, headers: &Headers, on_event: ChunkCallback) -> Connection {
        self.requests.lock().push(RecordedRequest {
            url: url.clone(),
            headers: headers.clone(),
            on_event: Some(on_event),
        });
        Connection::detached()
    }
}

impl fmt::Debug for ClientSpy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSpy")
            .field("request_count", &self.request_count())
            .finish()
    }
}
