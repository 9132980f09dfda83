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

//! A poller for applications without an async runtime.
//!
//! The [LroPoller] in this module has the same behavior as
//! [crate::LroPoller], but all the requests, and the delays between them, run
//! on the caller's thread.

use crate::error::Failure;
use crate::options::PollerOptions;
use crate::state::PollerCore;
use crate::status::OperationStatus;
use crate::{Deserializer, PollingMethod, PollingResult};
use gax::Result;
use gax::http_client::BlockingTransport;
use gax::response::HttpResponse;

/// Polls a long-running operation, blocking the current thread.
///
/// The poller is also an [Iterator]. Each item is the result of one polling
/// attempt, the last item is [PollingResult::Completed].
///
/// # Example
/// ```no_run
/// # use cloud_sdk_lro::{PollingMethod, blocking::LroPoller, json_deserializer, options::PollerOptions};
/// # fn sample(
/// #     client: impl gax::http_client::BlockingTransport,
/// #     initial: gax::response::HttpResponse,
/// # ) -> gax::Result<()> {
/// let poller = LroPoller::new(client, initial, json_deserializer::<serde_json::Value>(), PollerOptions::default())?;
/// for result in poller {
///     println!("{result:?}");
/// }
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct LroPoller<T, C> {
    client: C,
    core: PollerCore<T>,
}

impl<T, C> LroPoller<T, C>
where
    C: BlockingTransport,
{
    /// Starts polling the operation that returned `initial`.
    pub fn new(
        client: C,
        initial: HttpResponse,
        deserializer: Deserializer<T>,
        options: PollerOptions,
    ) -> Result<Self> {
        let core = PollerCore::initialize(initial, deserializer, options)?;
        Ok(Self { client, core })
    }

    /// Resumes polling from a [continuation token][PollingMethod::continuation_token].
    pub fn from_continuation_token(
        client: C,
        token: &str,
        deserializer: Deserializer<T>,
        options: PollerOptions,
    ) -> Result<Self> {
        let core = PollerCore::from_continuation_token(token, deserializer, options)?;
        Ok(Self { client, core })
    }

    /// Polls until the operation completes, then fetches the final resource.
    pub fn run(&mut self) -> Result<()> {
        self.drive().map_err(|f| self.core.fail(f))
    }

    /// Polls until the operation completes and returns the final resource.
    pub fn until_done(&mut self) -> Result<Option<T>> {
        self.run()?;
        self.core.resource()
    }

    /// Sends one status request and updates the status.
    pub fn update_status(&mut self) -> Result<()> {
        self.update().map_err(|f| self.core.fail(f))
    }

    /// Query the current status of the long-running operation.
    ///
    /// Returns `None` after returning [Completed][PollingResult::Completed].
    pub fn poll(&mut self) -> Option<PollingResult<T>> {
        if self.core.reported() {
            return None;
        }
        let result = match self.step() {
            Ok(Some(status)) => return Some(PollingResult::InProgress(status)),
            Ok(None) => self.core.resource(),
            Err(f) => Err(self.core.fail(f)),
        };
        self.core.set_reported();
        Some(PollingResult::Completed(result))
    }

    fn drive(&mut self) -> std::result::Result<(), Failure> {
        if self.core.resolved() {
            return Ok(());
        }
        if !self.core.finished() {
            self.update()?;
        }
        while !self.core.finished() {
            self.client.sleep(self.core.next_delay());
            self.update()?;
        }
        self.resolve()
    }

    fn step(&mut self) -> std::result::Result<Option<OperationStatus>, Failure> {
        if !self.core.finished() {
            if self.core.attempts() > 0 {
                self.client.sleep(self.core.next_delay());
            }
            self.update()?;
        }
        if !self.core.finished() {
            return Ok(Some(self.core.status().clone()));
        }
        if !self.core.resolved() {
            self.resolve()?;
        }
        Ok(None)
    }

    fn update(&mut self) -> std::result::Result<(), Failure> {
        let request = self
            .core
            .status_request(|t, a| self.client.format_url(t, a))?;
        let response = self.client.send(request, &self.core.request_options())?;
        self.core.absorb_status(response)
    }

    fn resolve(&mut self) -> std::result::Result<(), Failure> {
        let Some(request) = self
            .core
            .final_request(|t, a| self.client.format_url(t, a))?
        else {
            self.core.set_resolved();
            return Ok(());
        };
        tracing::debug!(url = %request.url, "fetching the final resource");
        let response = self.client.send(request, &self.core.request_options())?;
        self.core.absorb_final(response)
    }
}

impl<T, C> PollingMethod<T> for LroPoller<T, C> {
    fn status(&self) -> &OperationStatus {
        self.core.status()
    }

    fn resource(&self) -> Result<Option<T>> {
        self.core.resource()
    }

    fn continuation_token(&self) -> Result<String> {
        self.core.continuation_token()
    }

    fn polling_url(&self) -> Option<&str> {
        self.core.polling_url()
    }

    fn latest_response(&self) -> &HttpResponse {
        self.core.latest_response()
    }
}

impl<T, C> Iterator for LroPoller<T, C>
where
    C: BlockingTransport,
{
    type Item = PollingResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.poll()
    }
}
