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

use super::{LongRunningOperation, Result, StrategyState};
use crate::status::OperationStatus;
use gax::response::HttpResponse;

/// The fallback strategy: the initial response is the final result.
///
/// This strategy never polls. It can poll any response, so it should be the
/// last strategy in any list.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusCheckPolling;

impl LongRunningOperation for StatusCheckPolling {
    fn kind(&self) -> &'static str {
        "status-check"
    }

    fn can_poll(&self, _initial: &HttpResponse) -> bool {
        true
    }

    fn set_initial_status(&mut self, _initial: &HttpResponse) -> Result<OperationStatus> {
        Ok(OperationStatus::Succeeded)
    }

    fn polling_url(&self) -> Option<&str> {
        None
    }

    fn get_status(&mut self, _response: &HttpResponse) -> Result<OperationStatus> {
        Ok(OperationStatus::Succeeded)
    }

    fn get_final_get_url(&self, _response: &HttpResponse) -> Result<Option<String>> {
        Ok(None)
    }

    fn snapshot(&self) -> StrategyState {
        StrategyState::default()
    }

    fn restore(&mut self, _state: StrategyState) {}

    fn clone_box(&self) -> Box<dyn LongRunningOperation> {
        Box::new(*self)
    }
}
