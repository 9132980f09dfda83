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

use crate::Result;
use crate::error::Error;
use crate::options::RequestOptions;
use crate::response::HttpResponse;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::collections::BTreeMap;
use std::time::Duration;

/// Values substituted into `{name}` placeholders of a URL template.
pub type PathArgs = BTreeMap<String, String>;

/// A raw HTTP request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<bytes::Bytes>,
}

impl HttpRequest {
    pub fn new<U: Into<String>>(method: Method, url: U) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Creates a `GET` request, the only kind of request made while polling.
    pub fn get<U: Into<String>>(url: U) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn set_body<B: Into<bytes::Bytes>>(mut self, body: B) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a header, replacing any previous values.
    pub fn set_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// The non-blocking transport used by the long-running operation pollers.
///
/// Implementations send a single request, without retries, and return the
/// response regardless of its status code. Errors are reserved for problems
/// that prevent receiving a response, such as broken connections or timeouts.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the full response.
    fn send(
        &self,
        request: HttpRequest,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<HttpResponse>> + Send;

    /// Suspends the current task without blocking the executor.
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send;

    /// Substitutes `args` into `template` and resolves the result.
    ///
    /// The default implementation does not resolve relative URLs.
    fn format_url(&self, template: &str, args: &PathArgs) -> Result<String> {
        format_url(None, template, args)
    }
}

/// The blocking transport used by the long-running operation pollers.
///
/// Same contract as [Transport], but every call runs on the caller's thread.
pub trait BlockingTransport {
    fn send(&self, request: HttpRequest, options: &RequestOptions) -> Result<HttpResponse>;

    /// Blocks the current thread.
    fn sleep(&self, delay: Duration);

    fn format_url(&self, template: &str, args: &PathArgs) -> Result<String> {
        format_url(None, template, args)
    }
}

/// Formats a URL template.
///
/// Each `{name}` placeholder with a matching entry in `args` is replaced by
/// its value. Placeholders without a value are left unchanged.
///
/// If the result is not an absolute URL, and `base` is provided, the result is
/// appended to the path of `base`, which may itself contain placeholders.
///
/// # Example
/// ```
/// # use cloud_sdk_gax::http_client::{format_url, PathArgs};
/// let args = PathArgs::from([("region".to_string(), "us-east".to_string())]);
/// let url = format_url(Some("https://{region}.example.com/api"), "/operations/123", &args)?;
/// assert_eq!(url, "https://us-east.example.com/api/operations/123");
/// # cloud_sdk_gax::Result::<()>::Ok(())
/// ```
pub fn format_url(base: Option<&str>, template: &str, args: &PathArgs) -> Result<String> {
    let formatted = substitute(template, args);
    if formatted.is_empty() {
        return match base {
            Some(b) => Ok(substitute(b, args)),
            None => Err(Error::ser("cannot format an empty URL")),
        };
    }
    if url::Url::parse(&formatted).is_ok() {
        return Ok(formatted);
    }
    let Some(base) = base else {
        return Ok(formatted);
    };
    let base = substitute(base, args);
    let mut joined = url::Url::parse(&base).map_err(Error::ser)?;
    let (path, query) = match formatted.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (formatted.as_str(), None),
    };
    let path = format!(
        "{}/{}",
        joined.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    joined.set_path(&path);
    if let Some(q) = query {
        let merged = match joined.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{q}"),
            _ => q.to_string(),
        };
        joined.set_query(Some(&merged));
    }
    Ok(joined.to_string())
}

fn substitute(template: &str, args: &PathArgs) -> String {
    args.iter().fold(template.to_string(), |acc, (k, v)| {
        acc.replace(&format!("{{{k}}}"), v)
    })
}
