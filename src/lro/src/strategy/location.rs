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

use super::{LongRunningOperation, Result, StrategyState, is_start_state};
use crate::error::{OPERATION_FAILED, PollingError};
use crate::status::OperationStatus;
use gax::response::HttpResponse;

const LOCATION: &str = "location";

/// Polls the URL in the `location` header.
///
/// The service returns `202` while the operation is in progress. Any other
/// accepted status code means the operation succeeded, and the response body
/// is the final resource.
#[derive(Clone, Debug, Default)]
pub struct LocationPolling {
    location_url: Option<String>,
}

impl LongRunningOperation for LocationPolling {
    fn kind(&self) -> &'static str {
        "location"
    }

    fn can_poll(&self, initial: &HttpResponse) -> bool {
        initial.headers.contains_key(LOCATION)
    }

    fn set_initial_status(&mut self, initial: &HttpResponse) -> Result<OperationStatus> {
        self.location_url = initial
            .header(LOCATION)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        if is_start_state(initial.status_code) && self.location_url.is_some() {
            return Ok(OperationStatus::InProgress);
        }
        Err(PollingError::operation_failed(OPERATION_FAILED))
    }

    fn polling_url(&self) -> Option<&str> {
        self.location_url.as_deref()
    }

    fn get_status(&mut self, response: &HttpResponse) -> Result<OperationStatus> {
        if let Some(location) = response.header(LOCATION).filter(|u| !u.is_empty()) {
            self.location_url = Some(location.to_string());
        }
        match response.status_code {
            202 => Ok(OperationStatus::InProgress),
            _ => Ok(OperationStatus::Succeeded),
        }
    }

    fn get_final_get_url(&self, _response: &HttpResponse) -> Result<Option<String>> {
        Ok(None)
    }

    fn snapshot(&self) -> StrategyState {
        StrategyState {
            polling_url: self.location_url.clone(),
            location_url: None,
        }
    }

    fn restore(&mut self, state: StrategyState) {
        self.location_url = state.polling_url;
    }

    fn clone_box(&self) -> Box<dyn LongRunningOperation> {
        Box::new(self.clone())
    }
}
