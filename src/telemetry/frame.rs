// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction of JSON payloads from event-stream text.

/// Text every accepted chunk must start with.
pub const DEVICES_EVENT_PREFIX: &str = "event: devices";

const DATA_FIELD: &str = "data: ";
const JSON_OBJECT_DATA: &str = "data: {";

/// Returns the JSON object payloads of every `data:` line in `text`.
///
/// Lines are split on `\n` (a trailing `\r` is dropped). Each line that
/// starts with `data: {` contributes the text after `data: `, in line order.
/// Which event a line belongs to is not tracked: callers are expected to
/// have checked that the chunk starts with [`DEVICES_EVENT_PREFIX`].
///
/// An empty result is valid and simply means no payload was present.
///
/// # Examples
///
/// ```
/// use miele_events::telemetry::extract_json_payloads;
///
/// let text = "event: devices\ndata: {\"a\":1}\n\nevent: actions\ndata: {}\n\n";
/// assert_eq!(extract_json_payloads(text), vec![r#"{"a":1}"#, "{}"]);
/// ```
#[must_use]
pub fn extract_json_payloads(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| line.starts_with(JSON_OBJECT_DATA))
        .map(|line| &line[DATA_FIELD.len()..])
        .collect()
}
