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

use crate::error::Failure;
use crate::options::PollerOptions;
use crate::state::PollerCore;
use crate::status::OperationStatus;
use crate::{Deserializer, Poller, PollingMethod, PollingResult};
use gax::Result;
use gax::http_client::Transport;
use gax::response::HttpResponse;

/// Polls a long-running operation without blocking the current thread.
///
/// The poller suspends between polling attempts using the transport's
/// [sleep][Transport::sleep]. Dropping a pending `run()`, `update_status()`
/// or `poll()` future abandons the in-flight request, the poller keeps its
/// previous state and can be used again.
///
/// # Example
/// ```no_run
/// # use cloud_sdk_lro::{LroPoller, PollingMethod, json_deserializer, options::PollerOptions};
/// # async fn sample(
/// #     client: impl gax::http_client::Transport,
/// #     initial: gax::response::HttpResponse,
/// # ) -> gax::Result<()> {
/// let mut poller = LroPoller::new(client, initial, json_deserializer::<serde_json::Value>(), PollerOptions::default())?;
/// poller.run().await?;
/// println!("status={}, resource={:?}", poller.status(), poller.resource()?);
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct LroPoller<T, C> {
    client: C,
    core: PollerCore<T>,
}

impl<T, C> LroPoller<T, C>
where
    C: Transport,
{
    /// Starts polling the operation that returned `initial`.
    ///
    /// Fails if the initial response does not represent a valid start state.
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
    pub async fn run(&mut self) -> Result<()> {
        match self.drive().await {
            Ok(()) => Ok(()),
            Err(f) => Err(self.core.fail(f)),
        }
    }

    /// Polls until the operation completes and returns the final resource.
    pub async fn until_done(&mut self) -> Result<Option<T>> {
        self.run().await?;
        self.core.resource()
    }

    /// Sends one status request and updates the status.
    pub async fn update_status(&mut self) -> Result<()> {
        match self.update().await {
            Ok(()) => Ok(()),
            Err(f) => Err(self.core.fail(f)),
        }
    }

    async fn drive(&mut self) -> std::result::Result<(), Failure> {
        if self.core.resolved() {
            return Ok(());
        }
        if !self.core.finished() {
            self.update().await?;
        }
        while !self.core.finished() {
            self.client.sleep(self.core.next_delay()).await;
            self.update().await?;
        }
        self.resolve().await
    }

    async fn step(&mut self) -> std::result::Result<Option<OperationStatus>, Failure> {
        if !self.core.finished() {
            if self.core.attempts() > 0 {
                self.client.sleep(self.core.next_delay()).await;
            }
            self.update().await?;
        }
        if !self.core.finished() {
            return Ok(Some(self.core.status().clone()));
        }
        if !self.core.resolved() {
            self.resolve().await?;
        }
        Ok(None)
    }

    async fn update(&mut self) -> std::result::Result<(), Failure> {
        let request = self
            .core
            .status_request(|t, a| self.client.format_url(t, a))?;
        let options = self.core.request_options();
        let response = self.client.send(request, &options).await?;
        self.core.absorb_status(response)
    }

    async fn resolve(&mut self) -> std::result::Result<(), Failure> {
        let Some(request) = self
            .core
            .final_request(|t, a| self.client.format_url(t, a))?
        else {
            self.core.set_resolved();
            return Ok(());
        };
        tracing::debug!(url = %request.url, "fetching the final resource");
        let options = self.core.request_options();
        let response = self.client.send(request, &options).await?;
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

impl<T, C> Poller<T> for LroPoller<T, C>
where
    C: Transport,
{
    async fn poll(&mut self) -> Option<PollingResult<T>> {
        if self.core.reported() {
            return None;
        }
        let result = match self.step().await {
            Ok(Some(status)) => return Some(PollingResult::InProgress(status)),
            Ok(None) => self.core.resource(),
            Err(f) => Err(self.core.fail(f)),
        };
        self.core.set_reported();
        Some(PollingResult::Completed(result))
    }

    #[cfg(feature = "unstable-stream")]
    fn to_stream(self) -> impl futures::Stream<Item = PollingResult<T>> {
        use futures::stream::unfold;
        unfold(Some(self), move |state| async move {
            if let Some(mut poller) = state {
                if let Some(pr) = poller.poll().await {
                    return Some((pr, Some(poller)));
                }
            };
            None
        })
    }
}
