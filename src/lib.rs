// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Miele Events - A Rust client for the Miele appliance event stream.
//!
//! The Miele cloud API pushes appliance state over a long-lived HTTP
//! connection framed as Server-Sent Events. This library keeps that
//! connection open and turns every received chunk into a set of
//! [`Device`] snapshots delivered to a callback.
//!
//! # Components
//!
//! - [`protocol`]: the [`StreamingClient`] transport seam, a reqwest transport
//!   and a logging decorator
//! - [`telemetry`]: event-frame parsing and JSON-to-[`Device`] mapping
//! - [`MieleService`]: opens subscriptions and delivers decoded results
//! - [`testing`]: a transport spy for tests
//!
//! # Quick Start
//!
//! ```no_run
//! use miele_events::MieleService;
//! use miele_events::protocol::HttpClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = MieleService::new(HttpClient::new()?);
//!     let url = "https://api.mcs3.miele.com/v1/devices/all/events".parse()?;
//!
//!     service.subscribe(&url, "access-token", |result| match result {
//!         Ok(devices) => println!("{} device(s) reported", devices.len()),
//!         Err(miele_events::Error::Connectivity) => eprintln!("connection lost"),
//!         Err(e) => eprintln!("skipped chunk: {e}"),
//!     });
//!
//!     tokio::signal::ctrl_c().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Delivery semantics
//!
//! - One result per received chunk, in arrival order
//! - Undecodable chunks yield [`Error::InvalidData`] with the raw bytes; the
//!   stream stays open
//! - A transport failure yields [`Error::Connectivity`] once and ends the
//!   subscription; there is no reconnect
//! - Appliances reporting a program state other than running or ended are
//!   left out of the result
//! - Dropping the [`MieleService`] stops all deliveries

pub mod error;
pub mod protocol;
mod service;
pub mod subscription;
pub mod telemetry;
pub mod testing;
pub mod types;

pub use error::{DecodeError, Error, ParseError, ProtocolError, Result};
#[cfg(feature = "http")]
pub use protocol::{HttpClient, HttpConfig};
pub use protocol::{Chunk, Connection, ResponseMeta, StreamingClient, VerboseClient};
pub use service::MieleService;
pub use subscription::SubscriptionId;
pub use telemetry::DeviceMapper;
pub use types::{Device, Measurement, ProgramState};
