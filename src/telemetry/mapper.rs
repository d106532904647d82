// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping of `devices` event payloads to [`Device`] values.

use std::collections::{HashMap, HashSet};

use bytes::Bytes;
use serde::Deserialize;

use crate::error::{DecodeError, ParseError};
use crate::protocol::ResponseMeta;
use crate::telemetry::frame::{DEVICES_EVENT_PREFIX, extract_json_payloads};
use crate::types::{Device, Measurement, ProgramState};

/// HTTP status a chunk must carry to be decoded.
const STATUS_OK: u16 = 200;

/// State of one appliance inside a `devices` payload.
#[derive(Debug, Deserialize)]
struct ApplianceEntry {
    ident: Ident,
    state: ApplianceState,
}

#[derive(Debug, Deserialize)]
struct Ident {
    #[serde(rename = "type")]
    kind: Localized,
}

#[derive(Debug, Deserialize)]
struct ApplianceState {
    #[serde(rename = "ProgramID")]
    program_id: Localized,

    status: RawValue,

    #[serde(rename = "ecoFeedback")]
    eco_feedback: EcoFeedback,
}

/// A vendor value with its localized rendering.
#[derive(Debug, Deserialize)]
struct Localized {
    value_localized: String,
}

/// A vendor value in its raw numeric form.
#[derive(Debug, Deserialize)]
struct RawValue {
    value_raw: i64,
}

#[derive(Debug, Deserialize)]
struct EcoFeedback {
    #[serde(rename = "currentWaterConsumption")]
    current_water_consumption: RawMeasurement,
}

#[derive(Debug, Deserialize)]
struct RawMeasurement {
    unit: String,
    value: f64,
}

impl ApplianceEntry {
    /// Builds a device, or `None` when the status code is not recognized.
    fn into_device(self, id: String) -> Option<Device> {
        let Some(program_state) = ProgramState::from_raw(self.state.status.value_raw) else {
            tracing::trace!(
                device = %id,
                status = self.state.status.value_raw,
                "Dropping appliance with unrecognized program state"
            );
            return None;
        };

        let water = self.state.eco_feedback.current_water_consumption;

        Some(Device::new(
            id,
            self.ident.kind.value_localized,
            self.state.program_id.value_localized,
            program_state,
            Measurement::new(water.value, water.unit),
        ))
    }
}

/// Decodes event-stream chunks into sets of [`Device`].
///
/// A chunk is accepted only when:
///
/// 1. the response status is 200
/// 2. the body is UTF-8 text starting with `event: devices`
/// 3. every `data: {` payload decodes as a map from appliance id to state
///
/// Any failure rejects the whole chunk with a [`DecodeError`] carrying the
/// original bytes. Appliances whose status code is neither 5 (running) nor
/// 7 (ended) are dropped without error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceMapper;

impl DeviceMapper {
    /// Maps one chunk to the set of devices it describes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the status is not 200, the body is not
    /// UTF-8, the body does not start with `event: devices`, or any JSON
    /// payload fails to decode.
    pub fn map(body: &Bytes, meta: &ResponseMeta) -> Result<HashSet<Device>, DecodeError> {
        let reject = |reason| DecodeError::new(body.clone(), reason);

        if meta.status() != STATUS_OK {
            return Err(reject(ParseError::UnexpectedStatus(meta.status())));
        }

        let text = std::str::from_utf8(body).map_err(|_| reject(ParseError::InvalidUtf8))?;

        if !text.starts_with(DEVICES_EVENT_PREFIX) {
            return Err(reject(ParseError::UnexpectedFormat(format!(
                "chunk does not start with `{DEVICES_EVENT_PREFIX}`"
            ))));
        }

        let mut devices = HashSet::new();

        for payload in extract_json_payloads(text) {
            let entries: HashMap<String, ApplianceEntry> =
                serde_json::from_str(payload).map_err(|e| reject(ParseError::Json(e)))?;

            devices.extend(
                entries
                    .into_iter()
                    .filter_map(|(id, entry)| entry.into_device(id)),
            );
        }

        Ok(devices)
    }
}
