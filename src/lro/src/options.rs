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

//! Configure the long-running operation pollers.
//!
//! Applications rarely need to change the defaults. The most common changes
//! are the delay between polling attempts, and how the final resource is
//! located once the operation completes.
//!
//! # Example
//! ```
//! # use cloud_sdk_lro::options::{FinalStateVia, LroOptions, PollerOptions};
//! use std::time::Duration;
//! let options = PollerOptions::default()
//!     .with_delay(Duration::from_secs(5))
//!     .with_lro_options(LroOptions::default().with_final_state_via(FinalStateVia::Location));
//! assert_eq!(options.delay(), Duration::from_secs(5));
//! ```

use crate::strategy::LongRunningOperation;
use gax::http_client::PathArgs;
use gax::options::{RequestOptions, RequestOptionsBuilder};
use std::time::Duration;

/// The delay between polling attempts when the service does not provide one.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(30);

/// How to locate the final resource of an operation-resource style operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalStateVia {
    /// `azure-async-operation`
    AzureAsyncOperation,
    /// `location`
    Location,
    /// `operation-location`
    OperationLocation,
}

impl FinalStateVia {
    /// The value as it appears in service descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AzureAsyncOperation => "azure-async-operation",
            Self::Location => "location",
            Self::OperationLocation => "operation-location",
        }
    }
}

impl std::fmt::Display for FinalStateVia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when parsing an unrecognized [FinalStateVia] value.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("unknown final-state-via value: {0}")]
pub struct UnknownFinalStateVia(String);

impl std::str::FromStr for FinalStateVia {
    type Err = UnknownFinalStateVia;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure-async-operation" => Ok(Self::AzureAsyncOperation),
            "location" => Ok(Self::Location),
            "operation-location" => Ok(Self::OperationLocation),
            _ => Err(UnknownFinalStateVia(s.to_string())),
        }
    }
}

/// Options that change how the operation strategies interpret responses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LroOptions {
    final_state_via: Option<FinalStateVia>,
}

impl LroOptions {
    pub fn with_final_state_via(mut self, v: FinalStateVia) -> Self {
        self.final_state_via = Some(v);
        self
    }

    pub fn final_state_via(&self) -> Option<FinalStateVia> {
        self.final_state_via
    }
}

/// Configuration for [LroPoller][crate::LroPoller] and
/// [blocking::LroPoller][crate::blocking::LroPoller].
#[derive(Clone, Debug)]
pub struct PollerOptions {
    delay: Duration,
    lro_options: LroOptions,
    path_args: PathArgs,
    request_options: RequestOptions,
    algorithms: Option<Vec<Box<dyn LongRunningOperation>>>,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            lro_options: LroOptions::default(),
            path_args: PathArgs::new(),
            request_options: RequestOptions::default(),
            algorithms: None,
        }
    }
}

impl PollerOptions {
    /// The delay between polling attempts.
    ///
    /// Services may override this value using a `Retry-After` header.
    pub fn with_delay(mut self, v: Duration) -> Self {
        self.delay = v;
        self
    }

    pub fn with_lro_options(mut self, v: LroOptions) -> Self {
        self.lro_options = v;
        self
    }

    /// Substitute `{name}` placeholders in the polling links.
    ///
    /// When any arguments are present, relative polling links are resolved
    /// against the client endpoint.
    pub fn with_path_arg<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.path_args.insert(key.into(), value.into());
        self
    }

    /// Options applied to every polling request.
    pub fn with_request_options(mut self, v: RequestOptions) -> Self {
        self.request_options = v;
        self
    }

    /// Replace the default list of operation strategies.
    ///
    /// The first strategy that can poll the initial response is used. Lists
    /// without a [StatusCheckPolling][crate::strategy::StatusCheckPolling]
    /// fallback may fail to find a strategy.
    pub fn with_algorithms<I>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn LongRunningOperation>>,
    {
        self.algorithms = Some(v.into_iter().collect());
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn lro_options(&self) -> &LroOptions {
        &self.lro_options
    }

    pub fn path_args(&self) -> &PathArgs {
        &self.path_args
    }

    pub fn request_options(&self) -> &RequestOptions {
        &self.request_options
    }

    pub(crate) fn algorithms(&self) -> Vec<Box<dyn LongRunningOperation>> {
        match &self.algorithms {
            Some(v) => v.clone(),
            None => crate::strategy::default_algorithms(&self.lro_options),
        }
    }
}

impl RequestOptionsBuilder for PollerOptions {
    fn with_user_agent<V: Into<String>>(mut self, v: V) -> Self {
        self.request_options.set_user_agent(v);
        self
    }

    fn with_attempt_timeout<V: Into<Duration>>(mut self, v: V) -> Self {
        self.request_options.set_attempt_timeout(v);
        self
    }

    fn with_client_request_id<V: Into<String>>(mut self, v: V) -> Self {
        self.request_options.set_client_request_id(v);
        self
    }
}
