// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriber callbacks and the registry that owns them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::Result;
use crate::protocol::Connection;
use crate::types::Device;

/// Unique identifier for a subscription.
///
/// IDs are unique within one service's lifetime and are mainly useful to
/// correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Callback receiving one decoded result per received chunk.
pub type ResultCallback = Arc<dyn Fn(Result<HashSet<Device>>) + Send + Sync>;

/// One live subscription.
struct Entry {
    callback: ResultCallback,
    /// `None` until the transport has returned its handle.
    connection: Option<Connection>,
}

/// Registry of live subscriptions.
///
/// Each entry owns the subscriber callback and the connection feeding it.
/// Removing an entry closes its connection.
///
/// # Thread Safety
///
/// The registry uses `parking_lot::RwLock` internally. Callbacks are handed
/// out as cloned `Arc`s so they always run without the lock held.
pub struct SubscriptionRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    entries: RwLock<HashMap<SubscriptionId, Entry>>,
}

impl SubscriptionRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a subscriber callback and returns its ID.
    pub fn register<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Result<HashSet<Device>>) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.entries.write().insert(
            id,
            Entry {
                callback: Arc::new(callback),
                connection: None,
            },
        );
        id
    }

    /// Hands the connection for `id` to the registry.
    ///
    /// If the subscription is already gone (for example the transport failed
    /// synchronously), the connection is closed instead. Returns `true` if
    /// the connection was stored.
    pub fn attach(&self, id: SubscriptionId, connection: Connection) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(&id) {
            Some(entry) => {
                entry.connection = Some(connection);
                true
            }
            None => {
                drop(entries);
                connection.close();
                false
            }
        }
    }

    /// Returns the callback for `id`, if the subscription is live.
    #[must_use]
    pub fn callback(&self, id: SubscriptionId) -> Option<ResultCallback> {
        self.entries.read().get(&id).map(|e| Arc::clone(&e.callback))
    }

    /// Removes a subscription, closing its connection.
    ///
    /// Returns the callback so a final result can still be delivered.
    pub fn remove(&self, id: SubscriptionId) -> Option<ResultCallback> {
        let entry = self.entries.write().remove(&id)?;
        if let Some(connection) = entry.connection {
            connection.close();
        }
        Some(entry.callback)
    }

    /// Removes every subscription, closing all connections.
    pub fn clear(&self) {
        let drained: Vec<Entry> = self.entries.write().drain().map(|(_, e)| e).collect();
        drop(drained);
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if there are no live subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("subscription_count", &self.len())
            .finish()
    }
}
