// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain types decoded from the appliance event stream.
//!
//! # Types
//!
//! - [`Device`] - One appliance as reported by a `devices` event
//! - [`ProgramState`] - Running/Ended, derived from the raw status code
//! - [`Measurement`] - A value with an opaque unit symbol

mod device;
mod measurement;
mod program;

pub use device::Device;
pub use measurement::Measurement;
pub use program::ProgramState;
