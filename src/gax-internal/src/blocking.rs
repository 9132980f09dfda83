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

//! A blocking HTTP transport.
//!
//! Every call runs on the caller's thread. Do not create or use this client
//! from inside an async runtime.

use crate::api_header::BLOCKING_TRANSPORT;
use crate::http::{map_send_error, resolve_url, validate_endpoint};
use crate::options::{ClientConfig, request_headers, tracing_enabled};
use gax::Result;
use gax::client_builder::Error as BuilderError;
use gax::http_client::{BlockingTransport, HttpRequest, PathArgs};
use gax::options::RequestOptions;
use gax::response::{HttpResponse, RequestInfo};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ReqwestClient {
    inner: reqwest::blocking::Client,
    endpoint: Option<String>,
    user_agent: Option<String>,
    tracing: bool,
}

impl ReqwestClient {
    pub fn new(config: ClientConfig) -> gax::client_builder::Result<Self> {
        let endpoint = validate_endpoint(&config)?;
        let inner = reqwest::blocking::Client::builder()
            .build()
            .map_err(BuilderError::transport)?;
        Ok(Self {
            inner,
            endpoint,
            tracing: tracing_enabled(&config),
            user_agent: config.user_agent,
        })
    }

    pub fn execute(&self, request: HttpRequest, options: &RequestOptions) -> Result<HttpResponse> {
        let url = resolve_url(self.endpoint.as_deref(), &request.url)?;
        let span = if self.tracing {
            tracing::info_span!(
                "http_request",
                method = %request.method,
                url = %url,
                status_code = tracing::field::Empty,
            )
        } else {
            tracing::Span::none()
        };
        let _enter = span.enter();
        let response = self.request_attempt(request, url, options)?;
        span.record("status_code", response.status_code);
        Ok(response)
    }

    fn request_attempt(
        &self,
        request: HttpRequest,
        url: String,
        options: &RequestOptions,
    ) -> Result<HttpResponse> {
        let headers = request_headers(
            request.headers,
            options,
            self.user_agent.as_deref(),
            BLOCKING_TRANSPORT,
        )?;
        let mut builder = self
            .inner
            .request(request.method.clone(), url.as_str())
            .headers(headers.clone());
        if let Some(t) = options.attempt_timeout() {
            builder = builder.timeout(*t);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().map_err(map_send_error)?;
        let status_code = response.status().as_u16();
        let response_headers = response.headers().clone();
        let body = response.bytes().map_err(map_send_error)?;
        let info = RequestInfo::new(request.method, url).set_headers(headers);
        Ok(HttpResponse::new(status_code, body)
            .set_headers(response_headers)
            .set_request(info))
    }
}

impl BlockingTransport for ReqwestClient {
    fn send(&self, request: HttpRequest, options: &RequestOptions) -> Result<HttpResponse> {
        self.execute(request, options)
    }

    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay)
    }

    fn format_url(&self, template: &str, args: &PathArgs) -> Result<String> {
        gax::http_client::format_url(self.endpoint.as_deref(), template, args)
    }
}
