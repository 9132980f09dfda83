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

//! The polling state machine, without any I/O.
//!
//! The blocking and non-blocking pollers own a [PollerCore] and a transport.
//! They ask the core for the next request, send it, and hand the response back
//! to the core. The core never changes state before a response is received, so
//! abandoning a pending request leaves the previous state intact.

use crate::Deserializer;
use crate::continuation::ContinuationToken;
use crate::error::{Failure, OPERATION_FAILED, PollingError, validate_status};
use crate::options::PollerOptions;
use crate::status::OperationStatus;
use crate::strategy::{LongRunningOperation, select};
use gax::error::Error;
use gax::http_client::{HttpRequest, PathArgs};
use gax::options::{CLIENT_REQUEST_ID_HEADER, RequestOptions};
use gax::response::HttpResponse;
use std::time::Duration;

const NO_POLLING_URL: &str = "the selected strategy does not provide a polling url";

pub(crate) type Result<T> = std::result::Result<T, Failure>;

pub(crate) struct PollerCore<T> {
    operation: Box<dyn LongRunningOperation>,
    status: OperationStatus,
    initial_response: HttpResponse,
    latest_response: HttpResponse,
    deserializer: Deserializer<T>,
    options: PollerOptions,
    attempts: u32,
    resolved: bool,
    reported: bool,
}

impl<T> std::fmt::Debug for PollerCore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollerCore")
            .field("operation", &self.operation)
            .field("status", &self.status)
            .field("initial_response", &self.initial_response)
            .field("latest_response", &self.latest_response)
            .field("options", &self.options)
            .field("attempts", &self.attempts)
            .field("resolved", &self.resolved)
            .field("reported", &self.reported)
            .finish_non_exhaustive()
    }
}

impl<T> PollerCore<T> {
    /// Selects a strategy and computes the initial status.
    pub fn initialize(
        initial: HttpResponse,
        deserializer: Deserializer<T>,
        options: PollerOptions,
    ) -> gax::Result<Self> {
        let mut operation =
            select(options.algorithms(), &initial).map_err(|e| Error::polling(&initial, e))?;
        validate_status(initial.status_code, &initial.request.method)
            .map_err(|e| Error::polling(&initial, e))?;
        let status = operation
            .set_initial_status(&initial)
            .map_err(|e| Error::polling(&initial, e))?;
        tracing::debug!(
            strategy = operation.kind(),
            polling_url = operation.polling_url(),
            %status,
            "long-running operation started"
        );
        Ok(Self {
            operation,
            status,
            latest_response: initial.clone(),
            initial_response: initial,
            deserializer,
            options,
            attempts: 0,
            resolved: false,
            reported: false,
        })
    }

    /// Restores a poller from a continuation token.
    pub fn from_continuation_token(
        token: &str,
        deserializer: Deserializer<T>,
        options: PollerOptions,
    ) -> gax::Result<Self> {
        let token = ContinuationToken::decode(token)?;
        let mut core = Self::initialize(token.initial_response()?, deserializer, options)?;
        if core.operation.kind() != token.strategy() {
            return Err(Error::deser(format!(
                "the continuation token was created with the {} strategy, but the {} strategy was selected",
                token.strategy(),
                core.operation.kind()
            )));
        }
        core.operation.restore(token.state());
        Ok(core)
    }

    pub fn status(&self) -> &OperationStatus {
        &self.status
    }

    pub fn finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn polling_url(&self) -> Option<&str> {
        self.operation.polling_url()
    }

    pub fn latest_response(&self) -> &HttpResponse {
        &self.latest_response
    }

    /// True once the operation is finished and the final resource fetched.
    pub fn resolved(&self) -> bool {
        self.resolved
    }

    /// True once [crate::PollingResult::Completed] was returned by `poll()`.
    pub fn reported(&self) -> bool {
        self.reported
    }

    pub fn set_reported(&mut self) {
        self.reported = true;
    }

    /// The request to query the operation status.
    pub fn status_request<F>(&self, format: F) -> Result<HttpRequest>
    where
        F: FnOnce(&str, &PathArgs) -> gax::Result<String>,
    {
        let link = self
            .operation
            .polling_url()
            .ok_or_else(|| PollingError::bad_response(NO_POLLING_URL))?;
        self.request(link, format)
    }

    /// The request to fetch the final resource, if any.
    ///
    /// Fails if the operation did not succeed.
    pub fn final_request<F>(&self, format: F) -> Result<Option<HttpRequest>>
    where
        F: FnOnce(&str, &PathArgs) -> gax::Result<String>,
    {
        if self.status.is_failed() {
            return Err(PollingError::operation_failed(OPERATION_FAILED).into());
        }
        match self.operation.get_final_get_url(&self.latest_response)? {
            None => Ok(None),
            Some(link) => self.request(&link, format).map(Some),
        }
    }

    fn request<F>(&self, link: &str, format: F) -> Result<HttpRequest>
    where
        F: FnOnce(&str, &PathArgs) -> gax::Result<String>,
    {
        let args = self.options.path_args();
        let url = if args.is_empty() {
            link.to_string()
        } else {
            format(link, args)?
        };
        Ok(HttpRequest::get(url))
    }

    /// The options for each request, including the client request id of the
    /// initial request.
    pub fn request_options(&self) -> RequestOptions {
        let mut options = self.options.request_options().clone();
        if options.client_request_id().is_none() {
            if let Some(id) = self
                .initial_response
                .request
                .headers
                .get(CLIENT_REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
            {
                options.set_client_request_id(id);
            }
        }
        options
    }

    /// Updates the status using the response to a status request.
    pub fn absorb_status(&mut self, response: HttpResponse) -> Result<()> {
        self.latest_response = response;
        self.attempts += 1;
        validate_status(
            self.latest_response.status_code,
            &self.latest_response.request.method,
        )?;
        let status = self.operation.get_status(&self.latest_response)?;
        if status != self.status {
            tracing::debug!(from = %self.status, to = %status, attempts = self.attempts, "status changed");
        }
        self.status = status;
        Ok(())
    }

    /// Records the response to the final request.
    pub fn absorb_final(&mut self, response: HttpResponse) -> Result<()> {
        self.latest_response = response;
        validate_status(
            self.latest_response.status_code,
            &self.latest_response.request.method,
        )?;
        self.set_resolved();
        Ok(())
    }

    pub fn set_resolved(&mut self) {
        tracing::info!(
            status = %self.status,
            attempts = self.attempts,
            "long-running operation completed"
        );
        self.resolved = true;
    }

    /// The delay before the next status request.
    pub fn next_delay(&self) -> Duration {
        let delay = gax::retry_after::retry_after(&self.latest_response.headers)
            .filter(|d| !d.is_zero())
            .unwrap_or(self.options.delay());
        tracing::debug!(?delay, "waiting before the next status request");
        delay
    }

    /// Converts a failure into the error returned to the application.
    ///
    /// Protocol violations mark the operation as failed. Client errors are
    /// returned unchanged.
    pub fn fail(&mut self, failure: Failure) -> Error {
        match failure {
            Failure::Client(e) => e,
            Failure::Polling(e) => {
                if e.forces_failed_status() {
                    self.status = OperationStatus::Failed;
                }
                tracing::warn!(
                    status_code = self.latest_response.status_code,
                    url = %self.latest_response.request.url,
                    "long-running operation failed: {e}"
                );
                Error::polling(&self.latest_response, e)
            }
        }
    }

    /// Deserializes the latest response. An empty body has no resource.
    pub fn resource(&self) -> gax::Result<Option<T>> {
        if self.latest_response.is_empty_body() {
            return Ok(None);
        }
        (self.deserializer)(&self.latest_response).map(Some)
    }

    pub fn continuation_token(&self) -> gax::Result<String> {
        ContinuationToken::new(&self.initial_response, self.operation.as_ref()).encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_deserializer;
    use crate::options::LroOptions;
    use crate::strategy::{LocationPolling, StatusCheckPolling};
    use gax::response::RequestInfo;
    use http::Method;
    use serde_json::{Value, json};
    use std::error::Error as _;
    use test_case::test_case;

    const OP_URL: &str = "https://example.com/operations/123";

    fn initial() -> HttpResponse {
        HttpResponse::new(202, "")
            .set_header("operation-location", OP_URL)
            .set_request(RequestInfo::new(Method::PUT, "https://example.com/widgets/w"))
    }

    fn new_core(initial: HttpResponse) -> gax::Result<PollerCore<Value>> {
        PollerCore::initialize(initial, json_deserializer(), PollerOptions::default())
    }

    fn polling_error(e: &Error) -> Option<&PollingError> {
        e.source().and_then(|s| s.downcast_ref::<PollingError>())
    }

    fn no_format(_: &str, _: &PathArgs) -> gax::Result<String> {
        Err(Error::other("unexpected call to format"))
    }

    #[test]
    fn initialize() -> anyhow::Result<()> {
        let core = new_core(initial())?;
        assert_eq!(core.status(), &OperationStatus::InProgress);
        assert!(!core.finished());
        assert_eq!(core.polling_url(), Some(OP_URL));
        assert_eq!(core.latest_response(), &initial());
        assert_eq!(core.attempts(), 0);
        Ok(())
    }

    #[test]
    fn initialize_status_check() -> anyhow::Result<()> {
        let core = new_core(HttpResponse::new(201, ""))?;
        assert_eq!(core.status(), &OperationStatus::Succeeded);
        assert!(core.finished());
        assert_eq!(core.polling_url(), None);
        Ok(())
    }

    #[test]
    fn initialize_bad_status() {
        let got = new_core(HttpResponse::new(418, "").set_header("operation-location", OP_URL));
        let err = got.unwrap_err();
        assert!(err.is_polling(), "{err:?}");
        assert_eq!(err.http_status_code(), Some(418));
        assert!(
            matches!(polling_error(&err), Some(PollingError::BadStatus { status_code: 418, .. })),
            "{err:?}"
        );
    }

    #[test]
    fn initialize_no_strategy() {
        let options = PollerOptions::default()
            .with_algorithms([Box::new(LocationPolling::default()) as Box<dyn LongRunningOperation>]);
        let got = PollerCore::<Value>::initialize(HttpResponse::new(201, ""), json_deserializer(), options);
        let err = got.unwrap_err();
        assert!(
            matches!(polling_error(&err), Some(PollingError::BadResponse(m)) if m == crate::error::NO_STRATEGY),
            "{err:?}"
        );
    }

    #[test]
    fn status_request() -> anyhow::Result<()> {
        let core = new_core(initial())?;
        let request = core.status_request(no_format).map_err(|f| anyhow::anyhow!("{f:?}"))?;
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, OP_URL);
        Ok(())
    }

    #[test]
    fn status_request_with_path_args() -> anyhow::Result<()> {
        let options = PollerOptions::default().with_path_arg("id", "123");
        let core = PollerCore::<Value>::initialize(
            HttpResponse::new(202, "").set_header("operation-location", "/operations/{id}"),
            json_deserializer(),
            options,
        )?;
        let request = core
            .status_request(|t, a| gax::http_client::format_url(Some("https://example.com"), t, a))
            .map_err(|f| anyhow::anyhow!("{f:?}"))?;
        assert_eq!(request.url, OP_URL);
        Ok(())
    }

    #[test]
    fn status_request_without_url() -> anyhow::Result<()> {
        let options = PollerOptions::default()
            .with_algorithms([Box::new(StatusCheckPolling) as Box<dyn LongRunningOperation>]);
        let core = PollerCore::<Value>::initialize(initial(), json_deserializer(), options)?;
        let got = core.status_request(no_format);
        assert!(
            matches!(got, Err(Failure::Polling(PollingError::BadResponse(ref m))) if m == NO_POLLING_URL),
            "{got:?}"
        );
        Ok(())
    }

    #[test]
    fn request_options_reinjects_request_id() -> anyhow::Result<()> {
        let initial = HttpResponse::new(202, "")
            .set_header("operation-location", OP_URL)
            .set_request(
                RequestInfo::new(Method::POST, "https://example.com/widgets:run")
                    .set_header(CLIENT_REQUEST_ID_HEADER, "req-123"),
            );
        let core = new_core(initial)?;
        let options = core.request_options();
        assert_eq!(options.client_request_id().as_deref(), Some("req-123"));
        Ok(())
    }

    #[test]
    fn request_options_explicit_request_id() -> anyhow::Result<()> {
        use gax::options::RequestOptionsBuilder;
        let initial = initial().set_request(
            RequestInfo::new(Method::PUT, "https://example.com/widgets/w")
                .set_header(CLIENT_REQUEST_ID_HEADER, "req-123"),
        );
        let options = PollerOptions::default().with_client_request_id("req-456");
        let core = PollerCore::<Value>::initialize(initial, json_deserializer(), options)?;
        assert_eq!(
            core.request_options().client_request_id().as_deref(),
            Some("req-456")
        );
        Ok(())
    }

    #[test]
    fn request_options_without_request_id() -> anyhow::Result<()> {
        let core = new_core(initial())?;
        assert_eq!(core.request_options().client_request_id(), &None);
        Ok(())
    }

    #[test]
    fn absorb_status() -> anyhow::Result<()> {
        let mut core = new_core(initial())?;
        core.absorb_status(HttpResponse::new(200, json!({"status": "Running"}).to_string()))
            .map_err(|f| anyhow::anyhow!("{f:?}"))?;
        assert_eq!(core.status(), &OperationStatus::Other("Running".to_string()));
        assert_eq!(core.attempts(), 1);
        core.absorb_status(HttpResponse::new(200, json!({"status": "Succeeded"}).to_string()))
            .map_err(|f| anyhow::anyhow!("{f:?}"))?;
        assert!(core.finished());
        assert_eq!(core.attempts(), 2);
        Ok(())
    }

    #[test]
    fn bad_status_forces_failed() -> anyhow::Result<()> {
        let mut core = new_core(initial())?;
        let failure = core.absorb_status(HttpResponse::new(418, "")).unwrap_err();
        let err = core.fail(failure);
        assert!(err.is_polling(), "{err:?}");
        assert_eq!(err.http_status_code(), Some(418));
        assert_eq!(core.status(), &OperationStatus::Failed);
        Ok(())
    }

    #[test]
    fn bad_response_forces_failed() -> anyhow::Result<()> {
        let mut core = new_core(initial())?;
        let failure = core.absorb_status(HttpResponse::new(200, "")).unwrap_err();
        let err = core.fail(failure);
        assert!(
            matches!(polling_error(&err), Some(PollingError::BadResponse(_))),
            "{err:?}"
        );
        assert_eq!(core.status(), &OperationStatus::Failed);
        Ok(())
    }

    #[test]
    fn operation_failed_keeps_status() -> anyhow::Result<()> {
        let mut core = new_core(initial())?;
        core.absorb_status(HttpResponse::new(200, json!({"status": "Canceled"}).to_string()))
            .map_err(|f| anyhow::anyhow!("{f:?}"))?;
        let failure = core.final_request(no_format).unwrap_err();
        let err = core.fail(failure);
        assert!(
            matches!(polling_error(&err), Some(PollingError::OperationFailed(_))),
            "{err:?}"
        );
        assert_eq!(core.status(), &OperationStatus::Canceled);
        Ok(())
    }

    #[test]
    fn client_errors_pass_through() -> anyhow::Result<()> {
        let mut core = new_core(initial())?;
        let err = core.fail(Failure::Client(Error::timeout("test-only")));
        assert!(err.is_timeout(), "{err:?}");
        assert_eq!(core.status(), &OperationStatus::InProgress);
        Ok(())
    }

    #[test]
    fn final_request() -> anyhow::Result<()> {
        let mut core = new_core(initial())?;
        core.absorb_status(HttpResponse::new(200, json!({"status": "Succeeded"}).to_string()))
            .map_err(|f| anyhow::anyhow!("{f:?}"))?;
        let request = core
            .final_request(no_format)
            .map_err(|f| anyhow::anyhow!("{f:?}"))?;
        assert_eq!(
            request.map(|r| r.url),
            Some("https://example.com/widgets/w".to_string())
        );
        assert!(!core.resolved());
        core.absorb_final(HttpResponse::new(200, json!({"name": "w"}).to_string()))
            .map_err(|f| anyhow::anyhow!("{f:?}"))?;
        assert!(core.resolved());
        assert_eq!(core.resource()?, Some(json!({"name": "w"})));
        Ok(())
    }

    #[test_case(&[], Duration::from_secs(30); "default")]
    #[test_case(&[("retry-after", "5")], Duration::from_secs(5); "seconds")]
    #[test_case(&[("retry-after-ms", "250")], Duration::from_millis(250); "milliseconds")]
    #[test_case(&[("retry-after", "0")], Duration::from_secs(30); "zero")]
    #[test_case(&[("retry-after", "soon")], Duration::from_secs(30); "invalid")]
    fn next_delay(headers: &[(&str, &str)], want: Duration) -> anyhow::Result<()> {
        let mut core = new_core(initial())?;
        let response = headers.iter().fold(
            HttpResponse::new(200, json!({"status": "Running"}).to_string()),
            |r, (k, v)| r.set_header(k, v),
        );
        core.absorb_status(response)
            .map_err(|f| anyhow::anyhow!("{f:?}"))?;
        assert_eq!(core.next_delay(), want);
        Ok(())
    }

    #[test]
    fn resource_empty_body() -> anyhow::Result<()> {
        let core = new_core(HttpResponse::new(204, ""))?;
        assert!(core.finished());
        assert_eq!(core.resource()?, None);
        Ok(())
    }

    #[test]
    fn resource_deserialization_error() -> anyhow::Result<()> {
        let core = new_core(HttpResponse::new(200, "not json"))?;
        let err = core.resource().unwrap_err();
        assert!(err.is_deserialization(), "{err:?}");
        Ok(())
    }

    #[test]
    fn continuation_token() -> anyhow::Result<()> {
        let options = PollerOptions::default()
            .with_lro_options(LroOptions::default())
            .with_algorithms([
                Box::new(LocationPolling::default()) as Box<dyn LongRunningOperation>,
                Box::new(StatusCheckPolling),
            ]);
        let initial = HttpResponse::new(202, "").set_header("location", "https://example.com/l1");
        let mut core = PollerCore::<Value>::initialize(initial, json_deserializer(), options.clone())?;
        core.absorb_status(HttpResponse::new(202, "").set_header("location", "https://example.com/l2"))
            .map_err(|f| anyhow::anyhow!("{f:?}"))?;
        let token = core.continuation_token()?;

        let restored = PollerCore::<Value>::from_continuation_token(&token, json_deserializer(), options)?;
        assert_eq!(restored.polling_url(), Some("https://example.com/l2"));
        assert_eq!(restored.status(), &OperationStatus::InProgress);
        Ok(())
    }

    #[test]
    fn continuation_token_strategy_mismatch() -> anyhow::Result<()> {
        let core = new_core(initial())?;
        let token = core.continuation_token()?;
        let options = PollerOptions::default().with_algorithms([
            Box::new(crate::strategy::OperationResourcePolling::default().with_header("x-status"))
                as Box<dyn LongRunningOperation>,
            Box::new(StatusCheckPolling),
        ]);
        let got = PollerCore::<Value>::from_continuation_token(&token, json_deserializer(), options);
        let err = got.unwrap_err();
        assert!(err.is_deserialization(), "{err:?}");
        Ok(())
    }
}
