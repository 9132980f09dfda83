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

use super::{LongRunningOperation, Result, StrategyState, is_start_state, json_body};
use crate::error::{NO_BODY, NO_STATUS, OPERATION_FAILED, PollingError};
use crate::options::{FinalStateVia, LroOptions};
use crate::status::OperationStatus;
use gax::response::{HttpResponse, RequestInfo};
use http::Method;

const OPERATION_LOCATION: &str = "operation-location";
const LOCATION: &str = "location";
const RESOURCE_LOCATION: &str = "resourceLocation";

/// Polls a status resource advertised in a response header.
///
/// The status resource is a JSON object with a `status` field. Once the
/// operation succeeds the final resource is located using, in order:
///
/// 1. The `location` header of the initial response, if the options request
///    [FinalStateVia::Location].
/// 2. Nothing, if the options request [FinalStateVia::AzureAsyncOperation] or
///    [FinalStateVia::OperationLocation] and the operation was started with a
///    `POST` request.
/// 3. The `resourceLocation` field of the last status resource.
/// 4. The URL of the initial request, if it was a `PUT` or `PATCH`.
/// 5. The `location` header of the initial response, if the initial request
///    was a `POST`.
#[derive(Clone, Debug)]
pub struct OperationResourcePolling {
    header: String,
    options: LroOptions,
    async_url: Option<String>,
    location_url: Option<String>,
    request: Option<RequestInfo>,
}

impl Default for OperationResourcePolling {
    fn default() -> Self {
        Self::new(LroOptions::default())
    }
}

impl OperationResourcePolling {
    pub fn new(options: LroOptions) -> Self {
        Self {
            header: OPERATION_LOCATION.to_string(),
            options,
            async_url: None,
            location_url: None,
            request: None,
        }
    }

    /// Use a different header to find the status resource.
    pub fn with_header<T: Into<String>>(mut self, v: T) -> Self {
        self.header = v.into();
        self
    }

    fn capture_urls(&mut self, response: &HttpResponse) {
        self.async_url = response
            .header(&self.header)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        if let Some(location) = response.header(LOCATION).filter(|l| !l.is_empty()) {
            self.location_url = Some(location.to_string());
        }
    }

    fn method(&self) -> Option<&Method> {
        self.request.as_ref().map(|r| &r.method)
    }
}

impl LongRunningOperation for OperationResourcePolling {
    fn kind(&self) -> &'static str {
        "operation-resource"
    }

    fn can_poll(&self, initial: &HttpResponse) -> bool {
        initial.headers.contains_key(self.header.as_str())
    }

    fn set_initial_status(&mut self, initial: &HttpResponse) -> Result<OperationStatus> {
        self.request = Some(initial.request.clone());
        self.capture_urls(initial);
        if is_start_state(initial.status_code) && self.async_url.is_some() {
            // The initial response may not include a status.
            return Ok(self
                .get_status(initial)
                .unwrap_or(OperationStatus::InProgress));
        }
        Err(PollingError::operation_failed(OPERATION_FAILED))
    }

    fn polling_url(&self) -> Option<&str> {
        self.async_url.as_deref()
    }

    fn get_status(&mut self, response: &HttpResponse) -> Result<OperationStatus> {
        let body = json_body(response)?.ok_or_else(|| PollingError::bad_response(NO_BODY))?;
        body.get("status")
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .map(OperationStatus::classify)
            .ok_or_else(|| PollingError::bad_response(NO_STATUS))
    }

    fn get_final_get_url(&self, response: &HttpResponse) -> Result<Option<String>> {
        let via = self.options.final_state_via();
        if via == Some(FinalStateVia::Location) {
            if let Some(location) = &self.location_url {
                return Ok(Some(location.clone()));
            }
        }
        if matches!(
            via,
            Some(FinalStateVia::AzureAsyncOperation | FinalStateVia::OperationLocation)
        ) && self.method() == Some(&Method::POST)
        {
            return Ok(None);
        }
        if let Some(body) = json_body(response)? {
            if let Some(resource) = body
                .get(RESOURCE_LOCATION)
                .and_then(serde_json::Value::as_str)
                .filter(|s| !s.is_empty())
            {
                return Ok(Some(resource.to_string()));
            }
        }
        match (&self.request, &self.location_url) {
            (Some(r), _) if r.method == Method::PUT || r.method == Method::PATCH => {
                Ok(Some(r.url.clone()))
            }
            (Some(r), Some(location)) if r.method == Method::POST => Ok(Some(location.clone())),
            _ => Ok(None),
        }
    }

    fn snapshot(&self) -> StrategyState {
        StrategyState {
            polling_url: self.async_url.clone(),
            location_url: self.location_url.clone(),
        }
    }

    fn restore(&mut self, state: StrategyState) {
        self.async_url = state.polling_url;
        self.location_url = state.location_url;
    }

    fn clone_box(&self) -> Box<dyn LongRunningOperation> {
        Box::new(self.clone())
    }
}
