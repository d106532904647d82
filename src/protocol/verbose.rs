// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Logging decorator for streaming transports.

use std::sync::Arc;

use url::Url;

use crate::protocol::{ChunkCallback, ChunkResult, Connection, Headers, StreamingClient};

/// Wraps a [`StreamingClient`] and logs every delivery before forwarding it.
///
/// Chunks are logged at `info` level with their status, URL and body (decoded
/// lossily as UTF-8); transport errors at `warn`. Deliveries are passed on
/// unchanged.
///
/// # Examples
///
/// ```no_run
/// use miele_events::MieleService;
/// use miele_events::protocol::{HttpClient, VerboseClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = VerboseClient::new(HttpClient::new()?);
/// let service = MieleService::new(client);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VerboseClient<C> {
    inner: C,
}

impl<C> VerboseClient<C> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Returns the wrapped transport.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwraps the decorator.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: StreamingClient> StreamingClient for VerboseClient<C> {
    fn get(&self, url: &Url, headers: &Headers, on_event: ChunkCallback) -> Connection {
        let logging: ChunkCallback = Arc::new(move |result: ChunkResult| {
            match &result {
                Ok(chunk) => tracing::info!(
                    status = chunk.meta().status(),
                    url = %chunk.meta().url(),
                    body = %String::from_utf8_lossy(chunk.body()),
                    "Received event stream chunk"
                ),
                Err(error) => tracing::warn!(error = %error, "Event stream failed"),
            }
            on_event(result);
        });

        self.inner.get(url, headers, logging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;

    use crate::error::ProtocolError;
    use crate::testing::ClientSpy;

    #[test]
    fn forwards_request_unchanged() {
        let spy = Arc::new(ClientSpy::new());
        let client = VerboseClient::new(Arc::clone(&spy));
        let url: Url = "http://any-url.com/events".parse().unwrap();
        let headers = Headers::from([("Accept".to_string(), "text/event-stream".to_string())]);

        let _connection = client.get(&url, &headers, Arc::new(|_: ChunkResult| {}));

        assert_eq!(spy.requested_urls(), vec![url]);
        assert_eq!(spy.requested_headers(0), Some(headers));
    }

    #[test]
    fn forwards_every_delivery_in_order() {
        let spy = Arc::new(ClientSpy::new());
        let client = VerboseClient::new(Arc::clone(&spy));
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let _connection = client.get(
            &"http://any-url.com".parse().unwrap(),
            &Headers::new(),
            Arc::new(move |result: ChunkResult| {
                let entry = match result {
                    Ok(chunk) => format!("{}:{}", chunk.meta().status(), chunk.body().len()),
                    Err(error) => error.to_string(),
                };
                sink.lock().push(entry);
            }),
        );

        spy.complete_with_chunk(0, 200, "first");
        spy.complete_with_chunk(0, 500, bytes::Bytes::from_static(b"\xff\xfe"));
        spy.complete_with_error(0, ProtocolError::ConnectionFailed("reset".to_string()));

        assert_eq!(
            *received.lock(),
            vec![
                "200:5".to_string(),
                "500:2".to_string(),
                "connection failed: reset".to_string(),
            ]
        );
    }

    #[test]
    fn into_inner_returns_wrapped_client() {
        let client = VerboseClient::new(ClientSpy::new());
        assert_eq!(client.inner().request_count(), 0);
        assert_eq!(client.into_inner().request_count(), 0);
    }
}
