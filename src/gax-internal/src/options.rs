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

use gax::error::Error;
use gax::options::{CLIENT_REQUEST_ID_HEADER, RequestOptions};
use http::{HeaderMap, HeaderName, HeaderValue};

// The client configuration for [crate::http::ReqwestClient] and the blocking
// client.
pub type ClientConfig = gax::client_builder::internal::ClientConfig;

pub(crate) const LOGGING_VAR: &str = "CLOUD_SDK_RUST_LOGGING";

// Returns true if the environment or client configuration enables tracing.
pub fn tracing_enabled(config: &ClientConfig) -> bool {
    if config.tracing {
        return true;
    }
    std::env::var(LOGGING_VAR)
        .map(|v| v == "true")
        .unwrap_or(false)
}

// Merges the request headers with the per-request options.
//
// Headers from the options replace headers in the request. The user agent in
// the options replaces the client default.
pub(crate) fn request_headers(
    mut headers: HeaderMap,
    options: &RequestOptions,
    default_user_agent: Option<&str>,
    transport: &str,
) -> gax::Result<HeaderMap> {
    for (name, value) in options.headers() {
        headers.insert(name.clone(), value.clone());
    }
    if let Some(id) = options.client_request_id() {
        headers.insert(
            HeaderName::from_static(CLIENT_REQUEST_ID_HEADER),
            HeaderValue::from_str(id).map_err(Error::ser)?,
        );
    }
    if let Some(agent) = options.user_agent().as_deref().or(default_user_agent) {
        headers.insert(
            http::header::USER_AGENT,
            HeaderValue::from_str(agent).map_err(Error::ser)?,
        );
    }
    headers.insert(
        HeaderName::from_static(crate::api_header::API_CLIENT_HEADER),
        HeaderValue::from_str(&crate::api_header::header_value(transport)).map_err(Error::ser)?,
    );
    Ok(headers)
}
