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

//! Response types.
//!
//! This module contains the raw HTTP response type consumed by the
//! long-running operation pollers. The pollers inspect the status code,
//! headers, and body of each response, and need to know which request
//! produced it.
//!
//! # Examples
//!
//! Creating a response for mocks
//!
//! ```
//! use cloud_sdk_gax::response::{HttpResponse, RequestInfo};
//! let response = HttpResponse::new(202, bytes::Bytes::new())
//!     .set_header("operation-location", "https://example.com/operations/123")
//!     .set_request(RequestInfo::new(http::Method::PUT, "https://example.com/widgets/w"));
//! assert_eq!(response.header("Operation-Location"), Some("https://example.com/operations/123"));
//! ```

use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// A raw HTTP response received from a service.
///
/// Responses are immutable once received. Header lookups are
/// case-insensitive.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status_code: u16,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body, possibly empty.
    pub body: bytes::Bytes,
    /// The request that produced this response.
    pub request: RequestInfo,
}

impl HttpResponse {
    /// Creates a new response with the given status code and body.
    ///
    /// The headers start empty, and the request defaults to a `GET` with an
    /// empty URL.
    pub fn new<B: Into<bytes::Bytes>>(status_code: u16, body: B) -> Self {
        Self {
            status_code,
            headers: HeaderMap::new(),
            body: body.into(),
            request: RequestInfo::default(),
        }
    }

    /// Replaces all the headers.
    pub fn set_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a single header.
    ///
    /// Invalid header names or values are ignored.
    pub fn set_header<V: AsRef<str>>(mut self, name: &str, value: V) -> Self {
        if let (Ok(n), Ok(v)) = (
            HeaderName::try_from(name),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(n, v);
        }
        self
    }

    /// Sets the request that produced this response.
    pub fn set_request(mut self, request: RequestInfo) -> Self {
        self.request = request;
        self
    }

    /// Returns the value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns true if the body has no content.
    pub fn is_empty_body(&self) -> bool {
        self.body.is_empty()
    }
}

/// Describes the request that produced a [HttpResponse].
#[derive(Clone, Debug, PartialEq)]
pub struct RequestInfo {
    /// The HTTP method.
    pub method: Method,
    /// The fully resolved request URL.
    pub url: String,
    /// The request headers.
    pub headers: HeaderMap,
}

impl RequestInfo {
    pub fn new<U: Into<String>>(method: Method, url: U) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Replaces all the request headers.
    pub fn set_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a single request header. Invalid names or values are ignored.
    pub fn set_header<V: AsRef<str>>(mut self, name: &str, value: V) -> Self {
        if let (Ok(n), Ok(v)) = (
            HeaderName::try_from(name),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(n, v);
        }
        self
    }
}

impl Default for RequestInfo {
    fn default() -> Self {
        Self::new(Method::GET, String::new())
    }
}
