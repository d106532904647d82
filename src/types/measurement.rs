// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Physical quantities reported by appliances.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A numeric value paired with a unit symbol.
///
/// The unit is passed through verbatim from the server (for example `"l"`).
/// No conversion or validation takes place.
///
/// Equality and hashing compare the bit pattern of `value`, so a
/// `Measurement` can live in a `HashSet` like any other field of
/// [`Device`](crate::Device).
///
/// # Examples
///
/// ```
/// use miele_events::Measurement;
///
/// let water = Measurement::new(123.0, "l");
/// assert_eq!(water.value(), 123.0);
/// assert_eq!(water.unit(), "l");
/// assert_eq!(water.to_string(), "123 l");
/// ```
#[derive(Debug, Clone)]
pub struct Measurement {
    value: f64,
    unit: String,
}

impl Measurement {
    /// Creates a new measurement.
    #[must_use]
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Returns the numeric value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the unit symbol.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl PartialEq for Measurement {
    fn eq(&self, other: &Self) -> bool {
        self.value.to_bits() == other.value.to_bits() && self.unit == other.unit
    }
}

impl Eq for Measurement {}

impl Hash for Measurement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.to_bits().hash(state);
        self.unit.hash(state);
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
