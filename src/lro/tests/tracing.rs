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

//! Verify the pollers log the main transitions of an operation.

extern crate cloud_sdk_lro as lro;

#[cfg(test)]
mod tests {
    use gax::http_client::{BlockingTransport, HttpRequest};
    use gax::options::RequestOptions;
    use gaxi::blocking::ReqwestClient;
    use gaxi::options::ClientConfig;
    use httptest::{Expectation, Server, cycle, matchers::*, responders::*};
    use lro::blocking::LroPoller;
    use lro::json_deserializer;
    use lro::options::PollerOptions;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::{Layer, layer::Context};

    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    // Captures the level and fields of each event.
    #[derive(Clone, Default)]
    struct TestLayer {
        events: Arc<Mutex<Vec<(Level, HashMap<String, String>)>>>,
    }

    impl TestLayer {
        fn find(&self, message: &str) -> Option<(Level, HashMap<String, String>)> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .find(|(_, fields)| fields.get("message").map(String::as_str) == Some(message))
                .cloned()
        }
    }

    impl<S> Layer<S> for TestLayer
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut TestVisitor(&mut fields));
            self.events
                .lock()
                .unwrap()
                .push((*event.metadata().level(), fields));
        }
    }

    struct TestVisitor<'a>(&'a mut HashMap<String, String>);

    impl tracing::field::Visit for TestVisitor<'_> {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    fn client(server: &Server) -> Result<ReqwestClient> {
        let config = ClientConfig {
            endpoint: Some(format!("http://{}", server.addr())),
            ..Default::default()
        };
        Ok(ReqwestClient::new(config)?)
    }

    #[test]
    fn completed() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("PUT", "/widgets/w")).respond_with(
                status_code(201)
                    .insert_header("operation-location", server.url_str("/operations/3")),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/operations/3"))
                .times(2)
                .respond_with(cycle![
                    status_code(200).body(json!({"status": "Running"}).to_string()),
                    status_code(200).body(json!({"status": "Succeeded"}).to_string()),
                ]),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/widgets/w"))
                .respond_with(status_code(200).body(json!({"name": "w"}).to_string())),
        );

        let layer = TestLayer::default();
        use tracing_subscriber::prelude::*;
        let subscriber = tracing_subscriber::registry().with(layer.clone());

        let got = tracing::subscriber::with_default(subscriber, || -> Result<Option<Value>> {
            let client = client(&server)?;
            let initial = client.send(
                HttpRequest::new(http::Method::PUT, "/widgets/w"),
                &RequestOptions::default(),
            )?;
            let options = PollerOptions::default().with_delay(Duration::from_millis(10));
            let mut poller = LroPoller::new(client, initial, json_deserializer(), options)?;
            Ok(poller.until_done()?)
        })?;
        assert_eq!(got, Some(json!({"name": "w"})));

        let (level, fields) = layer
            .find("long-running operation started")
            .expect("missing start event");
        assert_eq!(level, Level::DEBUG);
        assert_eq!(fields.get("strategy").map(String::as_str), Some("operation-resource"));

        let (level, fields) = layer
            .find("long-running operation completed")
            .expect("missing completion event");
        assert_eq!(level, Level::INFO);
        assert_eq!(fields.get("status").map(String::as_str), Some("Succeeded"));
        assert_eq!(fields.get("attempts").map(String::as_str), Some("2"));
        Ok(())
    }

    #[test]
    fn failed() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("DELETE", "/widgets/w"))
                .respond_with(status_code(202).insert_header("location", "/widgets/w/status")),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/widgets/w/status"))
                .respond_with(status_code(500)),
        );

        let layer = TestLayer::default();
        use tracing_subscriber::prelude::*;
        let subscriber = tracing_subscriber::registry().with(layer.clone());

        let err = tracing::subscriber::with_default(subscriber, || -> Result<gax::error::Error> {
            let client = client(&server)?;
            let initial = client.send(
                HttpRequest::new(http::Method::DELETE, "/widgets/w"),
                &RequestOptions::default(),
            )?;
            let mut poller =
                LroPoller::new(client, initial, json_deserializer::<Value>(), PollerOptions::default())?;
            Ok(poller.run().unwrap_err())
        })?;
        assert!(err.is_polling(), "{err:?}");

        let events = layer.events.lock().unwrap();
        let (level, fields) = events
            .iter()
            .find(|(l, _)| *l == Level::WARN)
            .expect("missing warning");
        assert_eq!(*level, Level::WARN);
        assert_eq!(fields.get("status_code").map(String::as_str), Some("500"));
        Ok(())
    }
}
