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

//! Types and functions to make LROs easier to use and to require less boilerplate.
//!
//! Some service methods start a long-running operation (LRO). The initial
//! response does not contain the result. Instead, it describes how to query
//! the progress of the operation. The pollers in this crate recognize the
//! common conventions, using only the headers and status code of the initial
//! response, and poll until the operation completes.
//!
//! # Example
//! ```no_run
//! # use cloud_sdk_lro::{LroPoller, json_deserializer, options::PollerOptions};
//! # async fn sample(
//! #     client: impl gax::http_client::Transport,
//! #     initial: gax::response::HttpResponse,
//! # ) -> gax::Result<()> {
//! let mut poller = LroPoller::new(
//!     client,
//!     initial,
//!     json_deserializer::<serde_json::Value>(),
//!     PollerOptions::default(),
//! )?;
//! let widget = poller.until_done().await?;
//! println!("the operation completed with {widget:?}");
//! # Ok(()) }
//! ```
//!
//! A poller must not be used from two places at the same time. All the
//! functions that change its state take `&mut self`.

use gax::Result;
use gax::response::HttpResponse;
use status::OperationStatus;
use std::future::Future;
use std::sync::Arc;

pub mod blocking;
pub mod continuation;
pub mod error;
pub mod options;
pub mod status;
pub mod strategy;

mod poller;
mod state;

pub use poller::LroPoller;

/// Converts the final response of an operation into the result type.
///
/// The pollers only call the deserializer for non-empty bodies.
pub type Deserializer<T> = Arc<dyn Fn(&HttpResponse) -> Result<T> + Send + Sync>;

/// Creates a [Deserializer] for JSON bodies.
pub fn json_deserializer<T>() -> Deserializer<T>
where
    T: serde::de::DeserializeOwned + 'static,
{
    Arc::new(|response: &HttpResponse| {
        serde_json::from_slice::<T>(&response.body).map_err(gax::error::Error::deser)
    })
}

/// The result of polling a Long-Running Operation (LRO).
///
/// # Parameters
/// * `T` - the response type. This is the type returned when the LRO completes
///   successfully.
#[derive(Debug)]
pub enum PollingResult<T> {
    /// The operation is still in progress.
    InProgress(OperationStatus),
    /// The operation completed. This includes the result, which is `None` if
    /// the final response had no body.
    ///
    /// Errors may come from the service, if the operation failed or the
    /// responses did not follow a supported protocol, or from the transport.
    /// The poller does not retry in either case.
    Completed(Result<Option<T>>),
}

/// Functions common to the blocking and non-blocking pollers.
pub trait PollingMethod<T> {
    /// The last known status of the operation.
    fn status(&self) -> &OperationStatus;

    /// Returns true if the operation reached a terminal state.
    fn finished(&self) -> bool {
        self.status().is_finished()
    }

    /// The deserialized latest response, `None` if the body is empty.
    fn resource(&self) -> Result<Option<T>>;

    /// Saves the poller state, see [continuation].
    fn continuation_token(&self) -> Result<String>;

    /// The URL used in the next status request, if any.
    fn polling_url(&self) -> Option<&str>;

    /// The last response received.
    fn latest_response(&self) -> &HttpResponse;
}

/// The trait implemented by LRO helpers.
///
/// # Parameters
/// * `T` - the response type, that is, the type of response included when the
///   long-running operation completes successfully.
pub trait Poller<T> {
    /// Query the current status of the long-running operation.
    ///
    /// Returns `None` after the poller returned
    /// [Completed][PollingResult::Completed].
    fn poll(&mut self) -> impl Future<Output = Option<PollingResult<T>>>;

    /// Convert a poller to a [futures::Stream].
    #[cfg(feature = "unstable-stream")]
    fn to_stream(self) -> impl futures::Stream<Item = PollingResult<T>>;
}
