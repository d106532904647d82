// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP streaming transport built on reqwest.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::error::ProtocolError;
use crate::protocol::{Chunk, ChunkCallback, Connection, Headers, ResponseMeta, StreamingClient};

// ============================================================================
// HttpConfig - Connection settings for the streaming transport
// ============================================================================

/// Configuration for the HTTP streaming transport.
///
/// Event streams stay open indefinitely. Only connection establishment is
/// bounded; there is no total request timeout.
///
/// # Examples
///
/// ```
/// use miele_events::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new()
///     .with_connect_timeout(Duration::from_secs(5))
///     .with_tcp_keepalive(Some(Duration::from_secs(30)))
///     .with_user_agent("my-app/1.0");
///
/// assert_eq!(config.connect_timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    connect_timeout: Duration,
    tcp_keepalive: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpConfig {
    /// Default connection timeout.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default TCP keep-alive interval.
    pub const DEFAULT_TCP_KEEPALIVE: Duration = Duration::from_mins(1);

    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            tcp_keepalive: Some(Self::DEFAULT_TCP_KEEPALIVE),
            user_agent: None,
        }
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the TCP keep-alive interval, or disables it with `None`.
    #[must_use]
    pub fn with_tcp_keepalive(mut self, interval: Option<Duration>) -> Self {
        self.tcp_keepalive = interval;
        self
    }

    /// Sets the `User-Agent` header sent with every request.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the TCP keep-alive interval.
    #[must_use]
    pub fn tcp_keepalive(&self) -> Option<Duration> {
        self.tcp_keepalive
    }

    /// Returns the user agent, if set.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        let mut builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .tcp_keepalive(self.tcp_keepalive);

        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder.build().map_err(ProtocolError::Http)?;

        Ok(HttpClient { client })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HttpClient - reqwest-backed StreamingClient
// ============================================================================

/// HTTP transport streaming response bodies with reqwest.
///
/// Every [`get`](StreamingClient::get) spawns one Tokio task that sends the
/// request and forwards each body chunk as it arrives. It must be called
/// from within a Tokio runtime; otherwise the callback immediately receives
/// [`ProtocolError::NoRuntime`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use miele_events::protocol::{ChunkResult, Headers, HttpClient, StreamingClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let url = "https://api.example.com/v1/devices/all/events".parse()?;
///
/// let _connection = client.get(&url, &Headers::new(), Arc::new(|result: ChunkResult| {
///     println!("{result:?}");
/// }));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a transport with the default [`HttpConfig`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, ProtocolError> {
        HttpConfig::default().into_client()
    }

    /// Builds the GET request for `url` with `headers`.
    fn build_request(&self, url: &Url, headers: &Headers) -> RequestBuilder {
        headers
            .iter()
            .fold(self.client.get(url.clone()), |request, (name, value)| {
                request.header(name, value)
            })
    }
}

impl StreamingClient for HttpClient {
    fn get(&self, url: &Url, headers: &Headers, on_event: ChunkCallback) -> Connection {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(url = %url, "Cannot open event stream outside a Tokio runtime");
            on_event(Err(ProtocolError::NoRuntime));
            return Connection::detached();
        };

        tracing::debug!(url = %url, "Opening event stream");

        let request = self.build_request(url, headers);
        let task = runtime.spawn(stream_response(request, on_event));

        Connection::new(task.abort_handle())
    }
}

/// Drives one event stream until it ends, then releases `on_event`.
async fn stream_response(request: RequestBuilder, on_event: ChunkCallback) {
    if let Err(e) = forward_body(request, &on_event).await {
        tracing::debug!(error = %e, "Event stream failed");
        on_event(Err(ProtocolError::Http(e)));
    }
}

/// Sends the request and forwards the body chunk by chunk.
async fn forward_body(request: RequestBuilder, on_event: &ChunkCallback) -> reqwest::Result<()> {
    let response = request.send().await?;

    let meta = ResponseMeta::new(response.status().as_u16(), response.url().clone());
    tracing::debug!(status = meta.status(), url = %meta.url(), "Event stream opened");

    let mut body = response.bytes_stream();

    while let Some(bytes) = body.next().await.transpose()? {
        tracing::trace!(len = bytes.len(), "Received event stream chunk");
        on_event(Ok(Chunk::new(bytes, meta.clone())));
    }

    tracing::debug!(url = %meta.url(), "Event stream closed by server");
    Ok(())
}
