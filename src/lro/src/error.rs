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

//! Errors detected while interpreting the polling protocol.
//!
//! The pollers never return these errors directly. They are wrapped in a
//! [gax::error::Error] that also captures the last HTTP response received. Use
//! the error [source][std::error::Error::source] to recover the details:
//!
//! ```
//! # use cloud_sdk_lro::error::PollingError;
//! use std::error::Error as _;
//! fn is_bad_status(error: &gax::error::Error) -> bool {
//!     error
//!         .source()
//!         .and_then(|e| e.downcast_ref::<PollingError>())
//!         .is_some_and(|e| matches!(e, PollingError::BadStatus { .. }))
//! }
//! ```

pub(crate) const NO_STRATEGY: &str = "unable to find status link for polling";
pub(crate) const NO_BODY: &str =
    "the response from the long-running operation does not contain a body";
pub(crate) const NO_STATUS: &str = "no status found in body";
pub(crate) const OPERATION_FAILED: &str = "the operation failed or was canceled";

/// A violation of the polling protocol, or a terminal failure of the operation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum PollingError {
    /// The service returned a status code outside `{200, 201, 202, 204}`.
    #[error("invalid return status {status_code} for {method} operation")]
    BadStatus { status_code: u16, method: String },

    /// The response is missing information required by the protocol.
    #[error("{0}")]
    BadResponse(String),

    /// The operation reached a `Failed` or `Canceled` state, or the initial
    /// response does not represent a valid start state.
    #[error("{0}")]
    OperationFailed(String),
}

impl PollingError {
    pub(crate) fn bad_response<T: Into<String>>(message: T) -> Self {
        Self::BadResponse(message.into())
    }

    pub(crate) fn operation_failed<T: Into<String>>(message: T) -> Self {
        Self::OperationFailed(message.into())
    }

    /// Protocol violations mark the poller as failed. A reported terminal
    /// state does not, as the service already chose the final status.
    pub fn forces_failed_status(&self) -> bool {
        matches!(self, Self::BadStatus { .. } | Self::BadResponse(_))
    }
}

/// Either a protocol problem, which is reported against the latest response,
/// or an error from the transport or deserializer, which is passed through.
#[derive(Debug)]
pub(crate) enum Failure {
    Polling(PollingError),
    Client(gax::error::Error),
}

impl From<PollingError> for Failure {
    fn from(value: PollingError) -> Self {
        Self::Polling(value)
    }
}

impl From<gax::error::Error> for Failure {
    fn from(value: gax::error::Error) -> Self {
        Self::Client(value)
    }
}

/// Accepts the status codes used by the polling protocol.
pub(crate) fn validate_status(
    status_code: u16,
    method: &http::Method,
) -> std::result::Result<(), PollingError> {
    match status_code {
        200 | 201 | 202 | 204 => Ok(()),
        _ => Err(PollingError::BadStatus {
            status_code,
            method: method.to_string(),
        }),
    }
}
