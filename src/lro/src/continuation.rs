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

//! Save and restore the state of a poller.
//!
//! A continuation token lets an application resume polling after a restart.
//! The token is an opaque string. It captures the initial response, the
//! selected strategy, and the URLs captured by that strategy. It does not
//! capture the client or the deserializer, the application provides these
//! when resuming.
//!
//! The token is the base64 encoding of a JSON object. Applications should not
//! depend on its contents.

use crate::strategy::{LongRunningOperation, StrategyState};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gax::error::Error;
use gax::response::{HttpResponse, RequestInfo};
use http::{HeaderMap, HeaderName, HeaderValue, Method};

const VERSION: u32 = 1;

/// The decoded contents of a continuation token.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuationToken {
    version: u32,
    status_code: u16,
    headers: Vec<(String, SavedValue)>,
    body: String,
    request: SavedRequest,
    strategy: String,
    #[serde(flatten)]
    state: StrategyState,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct SavedRequest {
    method: String,
    url: String,
    headers: Vec<(String, SavedValue)>,
}

// Header values that are not visible ASCII are saved as base64.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum SavedValue {
    Text(String),
    Binary { base64: String },
}

impl ContinuationToken {
    pub(crate) fn new(initial: &HttpResponse, strategy: &dyn LongRunningOperation) -> Self {
        Self {
            version: VERSION,
            status_code: initial.status_code,
            headers: save_headers(&initial.headers),
            body: STANDARD.encode(&initial.body),
            request: SavedRequest {
                method: initial.request.method.to_string(),
                url: initial.request.url.clone(),
                headers: save_headers(&initial.request.headers),
            },
            strategy: strategy.kind().to_string(),
            state: strategy.snapshot(),
        }
    }

    /// Encodes the token as an opaque string.
    pub fn encode(&self) -> gax::Result<String> {
        let json = serde_json::to_vec(self).map_err(Error::ser)?;
        Ok(STANDARD.encode(json))
    }

    /// Decodes a string produced by [encode][ContinuationToken::encode].
    pub fn decode(token: &str) -> gax::Result<Self> {
        let json = STANDARD.decode(token.trim()).map_err(Error::deser)?;
        let token = serde_json::from_slice::<Self>(&json).map_err(Error::deser)?;
        if token.version != VERSION {
            return Err(Error::deser(format!(
                "unsupported continuation token version {}",
                token.version
            )));
        }
        Ok(token)
    }

    /// The kind of strategy used to poll the operation.
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// The URL polled before the token was created.
    pub fn polling_url(&self) -> Option<&str> {
        self.state.polling_url.as_deref()
    }

    pub(crate) fn state(&self) -> StrategyState {
        self.state.clone()
    }

    /// Rebuilds the response that started the operation.
    pub fn initial_response(&self) -> gax::Result<HttpResponse> {
        let body = STANDARD.decode(&self.body).map_err(Error::deser)?;
        let method = Method::from_bytes(self.request.method.as_bytes()).map_err(Error::deser)?;
        let request = RequestInfo::new(method, self.request.url.clone())
            .set_headers(restore_headers(&self.request.headers)?);
        let response = HttpResponse::new(self.status_code, body)
            .set_headers(restore_headers(&self.headers)?)
            .set_request(request);
        Ok(response)
    }
}

fn save_headers(headers: &HeaderMap) -> Vec<(String, SavedValue)> {
    headers
        .iter()
        .map(|(k, v)| {
            let value = match v.to_str() {
                Ok(s) => SavedValue::Text(s.to_string()),
                Err(_) => SavedValue::Binary {
                    base64: STANDARD.encode(v.as_bytes()),
                },
            };
            (k.as_str().to_string(), value)
        })
        .collect()
}

fn restore_headers(saved: &[(String, SavedValue)]) -> gax::Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(saved.len());
    for (k, v) in saved {
        let name = HeaderName::try_from(k.as_str()).map_err(Error::deser)?;
        let value = match v {
            SavedValue::Text(s) => HeaderValue::from_bytes(s.as_bytes()),
            SavedValue::Binary { base64 } => {
                HeaderValue::from_bytes(&STANDARD.decode(base64).map_err(Error::deser)?)
            }
        }
        .map_err(Error::deser)?;
        headers.append(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{LocationPolling, OperationResourcePolling};

    const OP_URL: &str = "https://example.com/operations/123";

    fn initial() -> HttpResponse {
        HttpResponse::new(202, r#"{"status":"Running"}"#)
            .set_header("operation-location", OP_URL)
            .set_header("retry-after", "5")
            .set_request(
                RequestInfo::new(Method::PUT, "https://example.com/widgets/w")
                    .set_header("x-ms-client-request-id", "req-123"),
            )
    }

    fn started() -> anyhow::Result<OperationResourcePolling> {
        let mut strategy = OperationResourcePolling::default();
        strategy.set_initial_status(&initial())?;
        Ok(strategy)
    }

    #[test]
    fn restores_initial_response() -> anyhow::Result<()> {
        let strategy = started()?;
        let encoded = ContinuationToken::new(&initial(), &strategy).encode()?;
        let token = ContinuationToken::decode(&encoded)?;
        assert_eq!(token.strategy(), "operation-resource");
        assert_eq!(token.polling_url(), Some(OP_URL));
        assert_eq!(token.initial_response()?, initial());
        Ok(())
    }

    #[test]
    fn preserves_opaque_header_values() -> anyhow::Result<()> {
        let strategy = started()?;
        let mut response = initial();
        response.headers.insert(
            "x-widget-name",
            HeaderValue::from_bytes(b"caf\xe9 \xff")?,
        );
        let encoded = ContinuationToken::new(&response, &strategy).encode()?;
        let token = ContinuationToken::decode(&encoded)?;
        let got = token.initial_response()?;
        assert_eq!(
            got.headers.get("x-widget-name").map(|v| v.as_bytes()),
            Some(b"caf\xe9 \xff".as_slice())
        );
        assert_eq!(got, response);

        let json = serde_json::to_value(&token)?;
        let saved = json["headers"]
            .as_array()
            .and_then(|h| h.iter().find(|p| p[0] == "x-widget-name"))
            .cloned();
        assert_eq!(
            saved,
            Some(serde_json::json!(["x-widget-name", {"base64": "Y2Fm6SD/"}]))
        );
        Ok(())
    }

    #[test]
    fn preserves_strategy_state() -> anyhow::Result<()> {
        let mut strategy = LocationPolling::default();
        strategy.restore(StrategyState {
            polling_url: Some("https://example.com/next".to_string()),
            location_url: None,
        });
        let encoded = ContinuationToken::new(&initial(), &strategy).encode()?;
        let token = ContinuationToken::decode(&encoded)?;
        assert_eq!(token.strategy(), "location");
        assert_eq!(token.state(), strategy.snapshot());
        Ok(())
    }

    #[test]
    fn json_layout() -> anyhow::Result<()> {
        let strategy = started()?;
        let token = ContinuationToken::new(&initial(), &strategy);
        let got = serde_json::to_value(&token)?;
        assert_eq!(got["version"], 1);
        assert_eq!(got["statusCode"], 202);
        assert_eq!(got["strategy"], "operation-resource");
        assert_eq!(got["pollingUrl"], OP_URL);
        assert_eq!(got["request"]["method"], "PUT");
        Ok(())
    }

    #[test]
    fn bad_base64() {
        let got = ContinuationToken::decode("not base64!");
        assert!(matches!(got, Err(ref e) if e.is_deserialization()), "{got:?}");
    }

    #[test]
    fn bad_json() {
        let got = ContinuationToken::decode(&STANDARD.encode("{}"));
        assert!(matches!(got, Err(ref e) if e.is_deserialization()), "{got:?}");
    }

    #[test]
    fn bad_version() -> anyhow::Result<()> {
        let strategy = started()?;
        let mut token = ContinuationToken::new(&initial(), &strategy);
        token.version = 2;
        let encoded = STANDARD.encode(serde_json::to_vec(&token)?);
        let got = ContinuationToken::decode(&encoded);
        assert!(matches!(got, Err(ref e) if e.is_deserialization()), "{got:?}");
        Ok(())
    }

    #[test]
    fn bad_header() -> anyhow::Result<()> {
        let strategy = started()?;
        let mut token = ContinuationToken::new(&initial(), &strategy);
        token
            .headers
            .push(("bad header".to_string(), SavedValue::Text("v".to_string())));
        let got = token.initial_response();
        assert!(matches!(got, Err(ref e) if e.is_deserialization()), "{got:?}");
        Ok(())
    }
}
