// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of event-stream chunks into appliance snapshots.
//!
//! The server pushes text in Server-Sent-Events framing:
//!
//! ```text
//! event: devices
//! data: {"1000":{"ident":{...},"state":{...}}}
//!
//! event: actions
//! data: {}
//!
//! ```
//!
//! Decoding happens in two stages:
//!
//! - [`extract_json_payloads`] pulls the JSON object payloads out of a chunk
//! - [`DeviceMapper`] validates the chunk and turns the payloads into
//!   [`Device`](crate::Device) values
//!
//! # Examples
//!
//! ```
//! use bytes::Bytes;
//! use miele_events::protocol::ResponseMeta;
//! use miele_events::telemetry::DeviceMapper;
//!
//! let meta = ResponseMeta::new(200, "https://example.com/events".parse().unwrap());
//! let chunk = Bytes::from_static(b"event: devices\ndata: {}\n\n");
//!
//! let devices = DeviceMapper::map(&chunk, &meta).unwrap();
//! assert!(devices.is_empty());
//! ```

mod frame;
mod mapper;

pub use frame::{DEVICES_EVENT_PREFIX, extract_json_payloads};
pub use mapper::DeviceMapper;
