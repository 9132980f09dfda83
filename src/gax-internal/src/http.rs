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

use crate::api_header::ASYNC_TRANSPORT;
use crate::options::{ClientConfig, request_headers, tracing_enabled};
use gax::Result;
use gax::client_builder::Error as BuilderError;
use gax::error::Error;
use gax::http_client::{HttpRequest, PathArgs, Transport};
use gax::options::RequestOptions;
use gax::response::{HttpResponse, RequestInfo};
use std::time::Duration;
use tracing::Instrument;

/// A builder for [ReqwestClient].
pub type ClientBuilder = gax::client_builder::ClientBuilder<Factory>;

#[derive(Clone, Debug)]
pub struct ReqwestClient {
    inner: reqwest::Client,
    endpoint: Option<String>,
    user_agent: Option<String>,
    tracing: bool,
}

impl ReqwestClient {
    pub fn builder() -> ClientBuilder {
        gax::client_builder::internal::new_builder(Factory)
    }

    pub async fn new(config: ClientConfig) -> gax::client_builder::Result<Self> {
        let endpoint = validate_endpoint(&config)?;
        let inner = reqwest::Client::builder()
            .build()
            .map_err(BuilderError::transport)?;
        Ok(Self {
            inner,
            endpoint,
            tracing: tracing_enabled(&config),
            user_agent: config.user_agent,
        })
    }

    pub async fn execute(
        &self,
        request: HttpRequest,
        options: &RequestOptions,
    ) -> Result<HttpResponse> {
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
        let response = self.request_attempt(request, url, options);
        let response = response.instrument(span.clone()).await?;
        span.record("status_code", response.status_code);
        Ok(response)
    }

    async fn request_attempt(
        &self,
        request: HttpRequest,
        url: String,
        options: &RequestOptions,
    ) -> Result<HttpResponse> {
        let headers = request_headers(
            request.headers,
            options,
            self.user_agent.as_deref(),
            ASYNC_TRANSPORT,
        )?;
        let mut builder = self
            .inner
            .request(request.method.clone(), url.as_str())
            .headers(headers.clone());
        builder = options
            .attempt_timeout()
            .iter()
            .fold(builder, |b, t| b.timeout(*t));
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await.map_err(map_send_error)?;
        let status_code = response.status().as_u16();
        let response_headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_send_error)?;
        let info = RequestInfo::new(request.method, url).set_headers(headers);
        Ok(HttpResponse::new(status_code, body)
            .set_headers(response_headers)
            .set_request(info))
    }
}

impl Transport for ReqwestClient {
    async fn send(&self, request: HttpRequest, options: &RequestOptions) -> Result<HttpResponse> {
        self.execute(request, options).await
    }

    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await
    }

    fn format_url(&self, template: &str, args: &PathArgs) -> Result<String> {
        gax::http_client::format_url(self.endpoint.as_deref(), template, args)
    }
}

#[doc(hidden)]
pub struct Factory;

impl gax::client_builder::internal::ClientFactory for Factory {
    type Client = ReqwestClient;
    async fn build(self, config: ClientConfig) -> gax::client_builder::Result<Self::Client> {
        ReqwestClient::new(config).await
    }
}

pub(crate) fn validate_endpoint(
    config: &ClientConfig,
) -> gax::client_builder::Result<Option<String>> {
    if let Some(endpoint) = &config.endpoint {
        url::Url::parse(endpoint).map_err(BuilderError::endpoint)?;
    }
    Ok(config.endpoint.clone())
}

// Relative URLs are joined onto the endpoint.
pub(crate) fn resolve_url(endpoint: Option<&str>, url: &str) -> Result<String> {
    if url::Url::parse(url).is_ok() {
        return Ok(url.to_string());
    }
    match endpoint {
        Some(e) => gax::http_client::format_url(Some(e), url, &PathArgs::new()),
        None => Err(Error::ser(format!(
            "cannot send a request to the relative URL {url} without an endpoint"
        ))),
    }
}

pub(crate) fn map_send_error(err: reqwest::Error) -> Error {
    match err {
        e if e.is_timeout() => Error::timeout(e),
        e => Error::io(e),
    }
}
