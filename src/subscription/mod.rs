// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bookkeeping for live event-stream subscriptions.
//!
//! - [`SubscriptionId`] - identifies one subscription in logs and in the registry
//! - [`SubscriptionRegistry`] - subscriber callbacks and the connections they own
//!
//! The registry is owned by [`MieleService`](crate::MieleService). Transport
//! callbacks only hold a weak reference to it, so dropping the service drops
//! every subscriber callback and closes every connection.
//!
//! # Usage
//!
//! ```
//! use miele_events::subscription::SubscriptionRegistry;
//!
//! let registry = SubscriptionRegistry::new();
//! let id = registry.register(|result| println!("{result:?}"));
//!
//! assert_eq!(registry.len(), 1);
//! assert!(registry.remove(id).is_some());
//! assert!(registry.is_empty());
//! ```

mod callback;

pub use callback::{ResultCallback, SubscriptionId, SubscriptionRegistry};
