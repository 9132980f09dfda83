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

use crate::response::HttpResponse;
use http::HeaderMap;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The core error returned by all client libraries.
///
/// The client libraries report errors from multiple sources. For example, the
/// transport may be unable to create the necessary connection to make a
/// request, the request may timeout before a response is received, or a
/// long-running operation may report a failure while it is being polled.
///
/// Most applications will just return the error or log it, without any further
/// action. However, some applications may need to interrogate the error
/// details. This type offers a series of predicates to determine the error
/// kind. The type also offers accessors to query the most common error details.
/// Applications can query the error [source][std::error::Error::source] for
/// deeper information.
///
/// # Example
/// ```
/// use cloud_sdk_gax::error::Error;
/// match example_function() {
///     Err(e) if e.is_polling() => {
///         println!("operation failed {e}, last status code {:?}", e.http_status_code());
///     },
///     Err(e) if e.is_timeout() => { println!("not enough time {e}"); },
///     Err(e) => { println!("some other error {e}"); },
///     Ok(_) => { println!("success, how boring"); },
/// }
///
/// fn example_function() -> Result<String, Error> {
///     // ... details omitted ...
///     # Err(Error::timeout("simulated"))
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

impl Error {
    /// Creates an error representing a timeout.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use cloud_sdk_gax::error::Error;
    /// let error = Error::timeout("simulated timeout");
    /// assert!(error.is_timeout());
    /// assert!(error.source().is_some());
    /// ```
    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            source: Some(source.into()),
        }
    }

    /// The request could not be completed before its deadline.
    ///
    /// This is always a client-side generated error. Note that the request may
    /// or may not have started, and it may or may not complete in the service.
    ///
    /// # Troubleshooting
    ///
    /// The most common cause of this problem is setting an attempt timeout
    /// based on the observed latency when the service is not under load.
    /// Consider increasing the timeout value to handle temporary latency
    /// increases too.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Not part of the public API, subject to change without notice.
    ///
    /// Creates an error representing a deserialization problem.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use cloud_sdk_gax::error::Error;
    /// let error = Error::deser("simulated problem");
    /// assert!(error.is_deserialization());
    /// assert!(error.source().is_some());
    /// ```
    #[cfg_attr(not(feature = "_internal-semver"), doc(hidden))]
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Deserialization,
            source: Some(source.into()),
        }
    }

    /// The response, or a continuation token, could not be deserialized.
    ///
    /// # Troubleshooting
    ///
    /// When resuming a long-running operation, verify the continuation token
    /// was produced by a compatible version of the client library, and that
    /// it was not truncated or modified in storage.
    ///
    /// Otherwise the most common cause for deserialization problems are bugs
    /// in the client library and (rarely) bugs in the service.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization)
    }

    /// Not part of the public API, subject to change without notice.
    ///
    /// Creates an error representing a serialization problem.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use cloud_sdk_gax::error::Error;
    /// let error = Error::ser("simulated problem");
    /// assert!(error.is_serialization());
    /// assert!(error.source().is_some());
    /// ```
    #[cfg_attr(not(feature = "_internal-semver"), doc(hidden))]
    pub fn ser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Serialization,
            source: Some(source.into()),
        }
    }

    /// The request, or a continuation token, could not be serialized.
    ///
    /// This is always a client-side generated error, generated before the
    /// request is made. This error is never transient: the serialization is
    /// deterministic and will fail on future attempts with the same input data.
    pub fn is_serialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Serialization)
    }

    /// Not part of the public API, subject to change without notice.
    ///
    /// A long-running operation failed, or could not be polled.
    ///
    /// The error captures the last HTTP response received while polling. The
    /// `source` describes why polling stopped.
    #[cfg_attr(not(feature = "_internal-semver"), doc(hidden))]
    pub fn polling<T: Into<BoxError>>(response: &HttpResponse, source: T) -> Self {
        let details = PollingDetails {
            status_code: response.status_code,
            headers: response.headers.clone(),
            payload: response.body.clone(),
            url: response.request.url.clone(),
        };
        Self {
            kind: ErrorKind::Polling(Box::new(details)),
            source: Some(source.into()),
        }
    }

    /// A long-running operation failed, or the service responses did not
    /// follow any of the supported polling protocols.
    ///
    /// The [source][std::error::Error::source] of the error describes the
    /// specific problem. The [http_status_code][Error::http_status_code],
    /// [http_headers][Error::http_headers], and
    /// [http_payload][Error::http_payload] describe the last response received
    /// while polling.
    ///
    /// # Troubleshooting
    ///
    /// If the operation reached a `Failed` or `Canceled` state, consult the
    /// payload for service-specific error details. Otherwise the service
    /// returned a status code or body the poller could not interpret. Use
    /// `format!("{:?}", ...)` to examine the full response.
    pub fn is_polling(&self) -> bool {
        matches!(self.kind, ErrorKind::Polling(_))
    }

    /// The HTTP status code of the last response received while polling.
    ///
    /// # Example
    /// ```
    /// use cloud_sdk_gax::error::Error;
    /// let e = search_for_thing("the thing");
    /// if let Some(code) = e.http_status_code() {
    ///     if code == 404 {
    ///         println!("cannot find the thing, more details in {e}");
    ///     }
    /// }
    ///
    /// fn search_for_thing(name: &str) -> Error {
    ///     # let response = cloud_sdk_gax::response::HttpResponse::new(404, "NOT FOUND");
    ///     # Error::polling(&response, "simulated")
    /// }
    /// ```
    pub fn http_status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Polling(d) => Some(d.status_code),
            _ => None,
        }
    }

    /// The headers, if any, associated with this error.
    ///
    /// Only errors raised while polling have this information.
    pub fn http_headers(&self) -> Option<&http::HeaderMap> {
        match &self.kind {
            ErrorKind::Polling(d) => Some(&d.headers),
            _ => None,
        }
    }

    /// The payload, if any, associated with this error.
    pub fn http_payload(&self) -> Option<&bytes::Bytes> {
        match &self.kind {
            ErrorKind::Polling(d) => Some(&d.payload),
            _ => None,
        }
    }

    /// The URL of the last request made while polling, if any.
    pub fn request_url(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Polling(d) => Some(d.url.as_str()),
            _ => None,
        }
    }

    /// Not part of the public API, subject to change without notice.
    ///
    /// A problem in the transport layer without a full HTTP response.
    ///
    /// Examples include: a broken connection after the request is sent, or a
    /// failure to resolve the service address.
    #[cfg_attr(not(feature = "_internal-semver"), doc(hidden))]
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Io,
            source: Some(source.into()),
        }
    }

    /// A problem in the transport layer without a full HTTP response.
    ///
    /// Examples include read or write problems, and broken connections.
    ///
    /// # Troubleshooting
    ///
    /// This indicates a problem completing the request. This type of error is
    /// rare, but includes crashes and restarts on proxies and load balancers.
    /// The long-running operation pollers never retry these errors, they stop
    /// polling and return the error unchanged.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io)
    }

    #[doc(hidden)]
    pub fn other<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Other,
            source: Some(source.into()),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::Serialization, Some(e)) => write!(f, "cannot serialize the request {e}"),
            (ErrorKind::Deserialization, Some(e)) => {
                write!(f, "cannot deserialize the response {e}")
            }
            (ErrorKind::Timeout, Some(e)) => {
                write!(f, "the request exceeded the request deadline {e}")
            }
            (ErrorKind::Io, Some(e)) => write!(f, "the transport reports an error: {e}"),
            (ErrorKind::Polling(d), Some(e)) => {
                write!(
                    f,
                    "the long-running operation failed, the last response was [{}] from {}: {e}",
                    d.status_code, d.url
                )
            }
            (ErrorKind::Other, Some(e)) => {
                write!(f, "an unclassified problem making a request: {e}")
            }
            (_, None) => unreachable!("no constructor allows this"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error))
    }
}

/// The type of error held by an [Error] instance.
#[derive(Debug)]
enum ErrorKind {
    Serialization,
    Deserialization,
    Timeout,
    Io,
    Polling(Box<PollingDetails>),
    /// A uncategorized error.
    Other,
}

#[derive(Debug)]
struct PollingDetails {
    status_code: u16,
    headers: HeaderMap,
    payload: bytes::Bytes,
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::RequestInfo;
    use std::error::Error as StdError;

    fn test_source() -> std::io::Error {
        std::io::Error::other("test-only-source")
    }

    fn test_headers() -> HeaderMap {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            "content-type",
            http::HeaderValue::from_static("application/json"),
        );
        headers
    }

    #[test]
    fn timeout() {
        let error = Error::timeout(test_source());
        assert!(error.is_timeout(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
        let got = error
            .source()
            .and_then(|e| e.downcast_ref::<std::io::Error>());
        assert!(got.is_some(), "{error:?}");
        assert!(error.to_string().contains("test-only-source"), "{error}");

        assert!(error.http_headers().is_none(), "{error:?}");
        assert!(error.http_status_code().is_none(), "{error:?}");
        assert!(error.http_payload().is_none(), "{error:?}");
        assert!(error.request_url().is_none(), "{error:?}");
    }

    #[test]
    fn deserialization() {
        let error = Error::deser(test_source());
        assert!(error.is_deserialization(), "{error:?}");
        assert!(!error.is_serialization(), "{error:?}");
        assert!(error.to_string().contains("test-only-source"), "{error}");
    }

    #[test]
    fn serialization() {
        let error = Error::ser(test_source());
        assert!(error.is_serialization(), "{error:?}");
        assert!(!error.is_deserialization(), "{error:?}");
        assert!(error.to_string().contains("test-only-source"), "{error}");
    }

    #[test]
    fn polling() {
        let response = HttpResponse::new(418, bytes::Bytes::from_static(b"teapot"))
            .set_headers(test_headers())
            .set_request(RequestInfo::new(http::Method::GET, "https://example.com/poll"));
        let error = Error::polling(&response, test_source());
        assert!(error.is_polling(), "{error:?}");
        assert!(!error.is_io(), "{error:?}");
        assert_eq!(error.http_status_code(), Some(418));
        assert_eq!(error.http_headers(), Some(&test_headers()));
        assert_eq!(
            error.http_payload(),
            Some(&bytes::Bytes::from_static(b"teapot"))
        );
        assert_eq!(error.request_url(), Some("https://example.com/poll"));
        let display = error.to_string();
        assert!(display.contains("[418]"), "{display}");
        assert!(display.contains("https://example.com/poll"), "{display}");
        assert!(display.contains("test-only-source"), "{display}");
        let got = error
            .source()
            .and_then(|e| e.downcast_ref::<std::io::Error>());
        assert!(got.is_some(), "{error:?}");
    }

    #[test]
    fn io() {
        let error = Error::io(test_source());
        assert!(error.is_io(), "{error:?}");
        assert!(!error.is_polling(), "{error:?}");
        assert!(error.to_string().contains("test-only-source"), "{error}");
        assert!(error.http_status_code().is_none(), "{error:?}");
        assert!(error.http_headers().is_none(), "{error:?}");
    }

    #[test]
    fn other() {
        let error = Error::other(test_source());
        assert!(!error.is_io(), "{error:?}");
        assert!(!error.is_polling(), "{error:?}");
        assert!(error.to_string().contains("test-only-source"), "{error}");
    }
}
