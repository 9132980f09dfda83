// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parse server-provided delay hints.
//!
//! Services use several headers to tell clients how long to wait before the
//! next request. The headers are checked in this order:
//!
//! * `retry-after-ms`, in milliseconds.
//! * `x-ms-retry-after-ms`, in milliseconds.
//! * `retry-after`, either in seconds or as an HTTP-date.
//!
//! Fractional values are accepted. Values that cannot be parsed are ignored.

use http::HeaderMap;
use std::time::Duration;

const MS_HEADERS: [&str; 2] = ["retry-after-ms", "x-ms-retry-after-ms"];
const RETRY_AFTER: &str = "retry-after";

/// Returns the delay requested by the service, if any.
///
/// # Example
/// ```
/// # use cloud_sdk_gax::retry_after::retry_after;
/// # use std::time::Duration;
/// let mut headers = http::HeaderMap::new();
/// headers.insert("retry-after", http::HeaderValue::from_static("5"));
/// assert_eq!(retry_after(&headers), Some(Duration::from_secs(5)));
/// ```
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    for name in MS_HEADERS {
        if let Some(d) = header_str(headers, name)
            .and_then(parse_seconds)
            .map(|ms| ms / 1000.0)
            .and_then(to_duration)
        {
            return Some(d);
        }
    }
    header_str(headers, RETRY_AFTER).and_then(parse_retry_after)
}

/// Parses a `Retry-After` value, in seconds or as an HTTP-date.
///
/// Dates in the past produce a zero delay.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    if let Some(d) = parse_seconds(value).and_then(to_duration) {
        return Some(d);
    }
    let when = chrono::DateTime::parse_from_rfc2822(value.trim()).ok()?;
    let delta = when.with_timezone(&chrono::Utc) - chrono::Utc::now();
    Some(delta.to_std().unwrap_or(Duration::ZERO))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn parse_seconds(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

fn to_duration(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}
