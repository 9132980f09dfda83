// Copyright 2024 Google LLC
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

//! Per request options.
//!
//! While the client defaults are intended to work for most applications, it
//! is sometimes necessary to customize individual requests. Applications
//! sometimes change the timeout for an specific call, or need to correlate the
//! requests made while polling a long-running operation with the request that
//! started it.

use http::{HeaderMap, HeaderName, HeaderValue};

/// The header used to correlate requests made on behalf of the same logical
/// operation.
///
/// The long-running operation pollers copy this header from the initial
/// request into every polling request.
pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// A set of options configuring a single request.
///
/// Application only use this class directly in mocks, where they may want to
/// verify their application has configured all the right request parameters and
/// options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    user_agent: Option<String>,
    attempt_timeout: Option<std::time::Duration>,
    client_request_id: Option<String>,
    headers: HeaderMap,
}

impl RequestOptions {
    /// Prepends this prefix to the user agent header value.
    pub fn set_user_agent<T: Into<String>>(&mut self, v: T) {
        self.user_agent = Some(v.into());
    }

    /// Gets the current user-agent prefix
    pub fn user_agent(&self) -> &Option<String> {
        &self.user_agent
    }

    /// Sets the per-attempt timeout.
    ///
    /// The transport does not retry, so this is the timeout for each request.
    /// Long-running operations are never timed out as a whole.
    pub fn set_attempt_timeout<T: Into<std::time::Duration>>(&mut self, v: T) {
        self.attempt_timeout = Some(v.into());
    }

    /// Gets the current per-attempt timeout.
    pub fn attempt_timeout(&self) -> &Option<std::time::Duration> {
        &self.attempt_timeout
    }

    /// Sets the value for the [CLIENT_REQUEST_ID_HEADER].
    pub fn set_client_request_id<T: Into<String>>(&mut self, v: T) {
        self.client_request_id = Some(v.into());
    }

    /// Gets the current client request id, if any.
    pub fn client_request_id(&self) -> &Option<String> {
        &self.client_request_id
    }

    /// Adds an extra header to the request.
    ///
    /// Returns an error if the name or value are not valid header components.
    pub fn insert_header<V: AsRef<str>>(&mut self, name: &str, value: V) -> crate::Result<()> {
        let name = HeaderName::try_from(name).map_err(crate::error::Error::ser)?;
        let value = HeaderValue::try_from(value.as_ref()).map_err(crate::error::Error::ser)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// The extra headers for the request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Implementations of this trait provide setters to configure request options.
///
/// The pollers and their option builders implement this trait so applications
/// can override the defaults for the requests they make.
pub trait RequestOptionsBuilder {
    /// Set the user agent header.
    fn with_user_agent<V: Into<String>>(self, v: V) -> Self;

    /// Sets the per-attempt timeout.
    fn with_attempt_timeout<V: Into<std::time::Duration>>(self, v: V) -> Self;

    /// Sets the client request id header.
    fn with_client_request_id<V: Into<String>>(self, v: V) -> Self;
}

impl RequestOptionsBuilder for RequestOptions {
    fn with_user_agent<V: Into<String>>(mut self, v: V) -> Self {
        self.set_user_agent(v);
        self
    }

    fn with_attempt_timeout<V: Into<std::time::Duration>>(mut self, v: V) -> Self {
        self.set_attempt_timeout(v);
        self
    }

    fn with_client_request_id<V: Into<String>>(mut self, v: V) -> Self {
        self.set_client_request_id(v);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let opts = RequestOptions::default();
        assert_eq!(opts.user_agent(), &None);
        assert_eq!(opts.attempt_timeout(), &None);
        assert_eq!(opts.client_request_id(), &None);
        assert!(opts.headers().is_empty(), "{opts:?}");
    }

    #[test]
    fn setters() {
        let mut opts = RequestOptions::default();
        opts.set_user_agent("test-agent");
        opts.set_attempt_timeout(Duration::from_secs(7));
        opts.set_client_request_id("req-123");
        assert_eq!(opts.user_agent().as_deref(), Some("test-agent"));
        assert_eq!(opts.attempt_timeout(), &Some(Duration::from_secs(7)));
        assert_eq!(opts.client_request_id().as_deref(), Some("req-123"));
    }

    #[test]
    fn builder() {
        let opts = RequestOptions::default()
            .with_user_agent("test-agent")
            .with_attempt_timeout(Duration::from_millis(250))
            .with_client_request_id("req-456");
        assert_eq!(opts.user_agent().as_deref(), Some("test-agent"));
        assert_eq!(opts.attempt_timeout(), &Some(Duration::from_millis(250)));
        assert_eq!(opts.client_request_id().as_deref(), Some("req-456"));
    }

    #[test]
    fn headers() -> anyhow::Result<()> {
        let mut opts = RequestOptions::default();
        opts.insert_header("x-test-header", "v1")?;
        assert_eq!(
            opts.headers()
                .get("x-test-header")
                .and_then(|v| v.to_str().ok()),
            Some("v1")
        );
        let err = opts.insert_header("bad header", "v2");
        assert!(matches!(&err, Err(e) if e.is_serialization()), "{err:?}");
        let err = opts.insert_header("x-good", "bad\nvalue");
        assert!(matches!(&err, Err(e) if e.is_serialization()), "{err:?}");
        Ok(())
    }
}
