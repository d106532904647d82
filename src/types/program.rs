// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Program state of an appliance.

use std::fmt;

/// State of the program currently loaded on an appliance.
///
/// Only two vendor status codes are recognized. Appliances reporting any
/// other code are left out of decoded results entirely.
///
/// # Examples
///
/// ```
/// use miele_events::ProgramState;
///
/// assert_eq!(ProgramState::from_raw(5), Some(ProgramState::Running));
/// assert_eq!(ProgramState::from_raw(7), Some(ProgramState::Ended));
/// assert_eq!(ProgramState::from_raw(-1), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramState {
    /// A program is running.
    Running,
    /// The program has finished.
    Ended,
}

impl ProgramState {
    /// Vendor status code for a running program.
    pub const RUNNING_CODE: i64 = 5;
    /// Vendor status code for a finished program.
    pub const ENDED_CODE: i64 = 7;

    /// Maps a raw vendor status code to a program state.
    ///
    /// Returns `None` for every code outside the recognized table.
    #[must_use]
    pub const fn from_raw(code: i64) -> Option<Self> {
        match code {
            Self::RUNNING_CODE => Some(Self::Running),
            Self::ENDED_CODE => Some(Self::Ended),
            _ => None,
        }
    }

    /// Returns the raw vendor status code.
    #[must_use]
    pub const fn raw(&self) -> i64 {
        match self {
            Self::Running => Self::RUNNING_CODE,
            Self::Ended => Self::ENDED_CODE,
        }
    }

    /// Returns a human-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Ended => "Ended",
        }
    }
}

impl fmt::Display for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
