// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance snapshot type.

use crate::types::{Measurement, ProgramState};

/// An appliance as reported in one `devices` event.
///
/// A `Device` is an immutable snapshot. Ids are unique within one delivered
/// result set, but the same id shows up again in later deliveries with
/// fresh state; nothing is merged across deliveries.
///
/// # Examples
///
/// ```
/// use miele_events::{Device, Measurement, ProgramState};
///
/// let device = Device::new(
///     "1000",
///     "Washing Machine",
///     "Wool",
///     ProgramState::Ended,
///     Measurement::new(123.0, "l"),
/// );
///
/// assert_eq!(device.id(), "1000");
/// assert_eq!(device.program_state(), ProgramState::Ended);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Device {
    id: String,
    appliance_type: String,
    program: String,
    program_state: ProgramState,
    water_consumption: Measurement,
}

impl Device {
    /// Creates a new device snapshot.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        appliance_type: impl Into<String>,
        program: impl Into<String>,
        program_state: ProgramState,
        water_consumption: Measurement,
    ) -> Self {
        Self {
            id: id.into(),
            appliance_type: appliance_type.into(),
            program: program.into(),
            program_state,
            water_consumption,
        }
    }

    /// Returns the vendor-assigned appliance identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the localized appliance type (e.g. "Washing Machine").
    #[must_use]
    pub fn appliance_type(&self) -> &str {
        &self.appliance_type
    }

    /// Returns the localized name of the current program.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the program state.
    #[must_use]
    pub fn program_state(&self) -> ProgramState {
        self.program_state
    }

    /// Returns the water consumed by the current program.
    #[must_use]
    pub fn water_consumption(&self) -> &Measurement {
        &self.water_consumption
    }
}
