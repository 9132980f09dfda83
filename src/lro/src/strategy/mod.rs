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

//! Strategies to poll long-running operations.
//!
//! Services expose the progress of a long-running operation using one of
//! several conventions. Each convention is implemented by a type implementing
//! [LongRunningOperation]. The poller picks the first strategy that can poll
//! the initial response, and uses it until the operation completes.
//!
//! The default strategies, in order of preference, are:
//!
//! * [OperationResourcePolling]: the initial response has an
//!   `operation-location` header pointing to a status resource.
//! * [LocationPolling]: the initial response has a `location` header. The
//!   service returns `202` until the operation completes.
//! * [StatusCheckPolling]: the initial response already contains the result.

use crate::error::PollingError;
use crate::options::LroOptions;
use crate::status::OperationStatus;
use gax::response::HttpResponse;

mod location;
mod operation_resource;
mod status_check;

pub use location::LocationPolling;
pub use operation_resource::OperationResourcePolling;
pub use status_check::StatusCheckPolling;

/// The result of the strategy operations.
pub type Result<T> = std::result::Result<T, PollingError>;

/// The URLs captured by a strategy.
///
/// Used to save and restore the strategy state in continuation tokens.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_url: Option<String>,
}

/// A convention to poll a long-running operation.
///
/// A strategy is selected once, using the initial response, and is never
/// replaced. The strategy owns any URLs it captures along the way.
pub trait LongRunningOperation: std::fmt::Debug + Send + Sync {
    /// A stable name for the strategy, saved in continuation tokens.
    fn kind(&self) -> &'static str;

    /// Returns true if this strategy can poll the operation started by
    /// `initial`.
    fn can_poll(&self, initial: &HttpResponse) -> bool;

    /// Captures the polling links and computes the initial status.
    ///
    /// Returns [PollingError::OperationFailed] if the response does not
    /// represent a valid start state.
    fn set_initial_status(&mut self, initial: &HttpResponse) -> Result<OperationStatus>;

    /// The URL to poll, if the strategy requires polling.
    fn polling_url(&self) -> Option<&str>;

    /// Computes the status from the latest polling response.
    fn get_status(&mut self, response: &HttpResponse) -> Result<OperationStatus>;

    /// The URL of the final resource, if any, once the operation succeeds.
    fn get_final_get_url(&self, response: &HttpResponse) -> Result<Option<String>>;

    /// Saves the captured URLs.
    fn snapshot(&self) -> StrategyState;

    /// Replaces the captured URLs.
    fn restore(&mut self, state: StrategyState);

    #[doc(hidden)]
    fn clone_box(&self) -> Box<dyn LongRunningOperation>;
}

impl Clone for Box<dyn LongRunningOperation> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// The strategies used when the application does not provide a list.
pub fn default_algorithms(options: &LroOptions) -> Vec<Box<dyn LongRunningOperation>> {
    vec![
        Box::new(OperationResourcePolling::new(options.clone())),
        Box::new(LocationPolling::default()),
        Box::new(StatusCheckPolling),
    ]
}

/// Returns the first strategy that can poll the operation started by
/// `initial`.
pub fn select<I>(algorithms: I, initial: &HttpResponse) -> Result<Box<dyn LongRunningOperation>>
where
    I: IntoIterator<Item = Box<dyn LongRunningOperation>>,
{
    algorithms
        .into_iter()
        .find(|a| a.can_poll(initial))
        .ok_or_else(|| PollingError::bad_response(crate::error::NO_STRATEGY))
}

/// Parses the body as JSON. An empty body is `Ok(None)`.
pub(crate) fn json_body(response: &HttpResponse) -> Result<Option<serde_json::Value>> {
    if response.is_empty_body() {
        return Ok(None);
    }
    serde_json::from_slice::<serde_json::Value>(&response.body)
        .map(Some)
        .map_err(|e| PollingError::bad_response(format!("cannot parse response body: {e}")))
}

/// The initial status codes accepted by the strategies.
fn is_start_state(status_code: u16) -> bool {
    matches!(status_code, 200 | 201 | 202 | 204)
}
