// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription service for the appliance event stream.
//!
//! # Architecture
//!
//! ```text
//! MieleService::subscribe(url, secret, callback)
//!                     ↓
//!     StreamingClient::get(url, headers, on_event)
//!                     ↓  (one call per received chunk)
//!        Weak<ServiceInner>.upgrade() + active check
//!                     ↓
//!        DeviceMapper::map(chunk, meta)
//!                     ↓
//!           User callback invoked
//! ```
//!
//! The transport-side closure owns a [`Route`]. When the transport releases
//! the closure at the end of the stream, the route removes the subscription.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{ChunkResult, Headers, StreamingClient};
use crate::subscription::{SubscriptionId, SubscriptionRegistry};
use crate::telemetry::DeviceMapper;
use crate::types::Device;

/// Media type requested from the event endpoint.
const EVENT_STREAM: &str = "text/event-stream";

/// Language of the localized values in the payloads.
const LANGUAGE: &str = "it";

/// Builds the fixed request headers for an event-stream subscription.
fn event_stream_headers(secret: &str) -> Headers {
    Headers::from([
        ("Accept".to_string(), EVENT_STREAM.to_string()),
        ("Accept-Language".to_string(), LANGUAGE.to_string()),
        ("Authorization".to_string(), format!("Bearer {secret}")),
    ])
}

/// State shared with transport callbacks through a weak reference.
#[derive(Debug)]
struct ServiceInner {
    /// Cleared when the owning service is dropped.
    active: AtomicBool,
    registry: SubscriptionRegistry,
}

/// Streams appliance state from the event endpoint.
///
/// Each call to [`subscribe`](Self::subscribe) opens one long-lived GET
/// request through the transport and delivers one result per received chunk:
///
/// - `Ok(devices)` when the chunk decodes (possibly an empty set)
/// - `Err(Error::InvalidData { .. })` when it does not; the stream stays open
/// - `Err(Error::Connectivity)` once if the connection fails; nothing follows
///
/// When the server closes the stream cleanly the subscriber receives nothing
/// more and the subscription is released.
///
/// Results for one subscription arrive in the order chunks arrive on the
/// wire. Nothing is merged or deduplicated across chunks, and failed
/// connections are not retried.
///
/// # Lifetime
///
/// The service owns its subscriber callbacks and connections. Transport
/// callbacks only hold a weak reference back, so dropping the service stops
/// every delivery and closes every connection it opened.
///
/// A result that is already being handed to the subscriber on another thread
/// when the service is dropped may still arrive after `drop` returns. No
/// delivery starts once `drop` has returned.
///
/// # Examples
///
/// ```no_run
/// use miele_events::MieleService;
/// use miele_events::protocol::HttpClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = MieleService::new(HttpClient::new()?);
///     let url = "https://api.mcs3.miele.com/v1/devices/all/events".parse()?;
///
///     service.subscribe(&url, "access-token", |result| match result {
///         Ok(devices) => {
///             for device in devices {
///                 println!("{} {}: {}", device.id(), device.program(), device.program_state());
///             }
///         }
///         Err(e) => eprintln!("{e}"),
///     });
///
///     tokio::signal::ctrl_c().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MieleService<C> {
    client: C,
    inner: Arc<ServiceInner>,
}

impl<C: StreamingClient> MieleService<C> {
    /// Creates a service using the given transport.
    ///
    /// No request is sent until [`subscribe`](Self::subscribe) is called.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            inner: Arc::new(ServiceInner {
                active: AtomicBool::new(true),
                registry: SubscriptionRegistry::new(),
            }),
        }
    }

    /// Opens an event stream at `url` authenticated with `secret`.
    ///
    /// The request carries `Accept: text/event-stream`,
    /// `Accept-Language: it` and `Authorization: Bearer <secret>`.
    /// `on_result` is called once per received chunk for as long as both the
    /// connection and this service are alive.
    ///
    /// The returned [`SubscriptionId`] tags this subscription's log events and
    /// can be ignored. Subscriptions end on transport failure, on a clean end
    /// of stream, or when the service is dropped; there is no way to cancel a
    /// single one.
    pub fn subscribe<F>(&self, url: &Url, secret: &str, on_result: F) -> SubscriptionId
    where
        F: Fn(Result<HashSet<Device>>) + Send + Sync + 'static,
    {
        let id = self.inner.registry.register(on_result);
        let route = Route {
            inner: Arc::downgrade(&self.inner),
            id,
        };

        tracing::debug!(subscription = %id, url = %url, "Subscribing to event stream");

        let connection = self.client.get(
            url,
            &event_stream_headers(secret),
            Arc::new(move |result: ChunkResult| route.deliver(result)),
        );

        self.inner.registry.attach(id, connection);
        id
    }

    /// Returns the number of subscriptions still receiving results.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C> Drop for MieleService<C> {
    fn drop(&mut self) {
        self.inner.active.store(false, Ordering::Release);
        self.inner.registry.clear();
    }
}

/// Link from one transport connection back to its subscription.
///
/// Dropping the route, which the transport does when the stream is over,
/// removes the subscription without notifying the subscriber.
struct Route {
    inner: Weak<ServiceInner>,
    id: SubscriptionId,
}

impl Route {
    /// Returns the service state if it may still receive deliveries.
    fn live_inner(&self) -> Option<Arc<ServiceInner>> {
        let Some(inner) = self.inner.upgrade() else {
            tracing::trace!(subscription = %self.id, "Dropping delivery for released service");
            return None;
        };

        if !inner.active.load(Ordering::Acquire) {
            tracing::trace!(subscription = %self.id, "Dropping delivery for inactive service");
            return None;
        }

        Some(inner)
    }

    /// Routes one transport delivery to the subscriber.
    fn deliver(&self, result: ChunkResult) {
        let id = self.id;
        let Some(inner) = self.live_inner() else {
            return;
        };

        match result {
            Ok(chunk) => {
                let Some(callback) = inner.registry.callback(id) else {
                    tracing::trace!(subscription = %id, "Dropping delivery for ended subscription");
                    return;
                };

                let (body, meta) = chunk.into_parts();
                let mapped = DeviceMapper::map(&body, &meta).map_err(|e| {
                    tracing::debug!(subscription = %id, reason = %e.reason, "Rejected event chunk");
                    Error::from(e)
                });

                if let Ok(devices) = &mapped {
                    tracing::trace!(subscription = %id, count = devices.len(), "Decoded devices");
                }

                // The service may have been dropped while the chunk was mapped.
                if inner.active.load(Ordering::Acquire) {
                    callback(mapped);
                }
            }
            Err(error) => {
                tracing::warn!(subscription = %id, error = %error, "Event stream connection failed");

                if let Some(callback) = inner.registry.remove(id) {
                    callback(Err(Error::Connectivity));
                }
            }
        }
    }
}

impl Drop for Route {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };

        if inner.registry.remove(self.id).is_some() {
            tracing::debug!(subscription = %self.id, "Event stream ended");
        }
    }
}
