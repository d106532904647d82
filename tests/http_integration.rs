// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP transport using wiremock.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use miele_events::protocol::{ChunkResult, Headers, HttpClient, StreamingClient, VerboseClient};
use miele_events::{Device, Error, Measurement, MieleService, ProgramState};
use tokio::sync::mpsc;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

const ENDED_WASHING_MACHINE: &str = "event: devices\ndata: {\"1000\":{\"ident\":{\"type\":{\"value_localized\":\"Washing Machine\"}},\"state\":{\"ProgramID\":{\"value_localized\":\"Wool\"},\"status\":{\"value_raw\":7},\"ecoFeedback\":{\"currentWaterConsumption\":{\"unit\":\"l\",\"value\":123.0}}}}}\n\nevent: actions\ndata: {}\n\n";

const EMPTY_DEVICES: &str = "event: devices\ndata: {}\n\n";

fn events_url(server: &MockServer) -> Url {
    format!("{}/v1/devices/all/events", server.uri())
        .parse()
        .unwrap()
}

/// Collects transport deliveries until the body has been fully received.
async fn collect_body(
    rx: &mut mpsc::UnboundedReceiver<ChunkResult>,
    expected_len: usize,
) -> Vec<u8> {
    let mut body = Vec::new();
    while body.len() < expected_len {
        let chunk = tokio::time::timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for chunk")
            .expect("transport callback dropped")
            .expect("transport reported an error");
        assert_eq!(chunk.meta().status(), 200);
        body.extend_from_slice(chunk.body());
    }
    body
}

// ============================================================================
// HttpClient Tests
// ============================================================================

mod http_client {
    use super::*;

    #[tokio::test]
    async fn sends_get_with_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/devices/all/events"))
            .and(header("Accept", "text/event-stream"))
            .and(header("X-Custom", "value"))
            .respond_with(ResponseTemplate::new(200).set_body_string("event: ping\n\n"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let headers = Headers::from([
            ("Accept".to_string(), "text/event-stream".to_string()),
            ("X-Custom".to_string(), "value".to_string()),
        ]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _connection = client.get(
            &events_url(&mock_server),
            &headers,
            Arc::new(move |result: ChunkResult| {
                let _ = tx.send(result);
            }),
        );

        let body = collect_body(&mut rx, "event: ping\n\n".len()).await;
        assert_eq!(body, b"event: ping\n\n");
    }

    #[tokio::test]
    async fn delivers_body_with_response_meta() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ENDED_WASHING_MACHINE))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let url = events_url(&mock_server);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _connection = client.get(
            &url,
            &Headers::new(),
            Arc::new(move |result: ChunkResult| {
                let _ = tx.send(result);
            }),
        );

        let first = tokio::time::timeout(WAIT, rx.recv())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(first.meta().url(), &url);

        let mut body = first.body().to_vec();
        body.extend(collect_body(&mut rx, ENDED_WASHING_MACHINE.len() - body.len()).await);
        assert_eq!(body, ENDED_WASHING_MACHINE.as_bytes());
    }

    #[tokio::test]
    async fn non_200_status_is_delivered_as_chunk() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _connection = client.get(
            &events_url(&mock_server),
            &Headers::new(),
            Arc::new(move |result: ChunkResult| {
                let _ = tx.send(result);
            }),
        );

        let chunk = tokio::time::timeout(WAIT, rx.recv())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(chunk.meta().status(), 401);
    }

    #[tokio::test]
    async fn connection_refused_delivers_error() {
        let client = HttpClient::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _connection = client.get(
            &"http://127.0.0.1:1/events".parse().unwrap(),
            &Headers::new(),
            Arc::new(move |result: ChunkResult| {
                let _ = tx.send(result);
            }),
        );

        let result = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn clean_end_of_stream_delivers_nothing_further() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_DEVICES))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _connection = client.get(
            &events_url(&mock_server),
            &Headers::new(),
            Arc::new(move |result: ChunkResult| {
                let _ = tx.send(result);
            }),
        );

        let body = collect_body(&mut rx, EMPTY_DEVICES.len()).await;
        assert_eq!(body, EMPTY_DEVICES.as_bytes());

        // The transport releases the callback, closing the channel without an error.
        let next = tokio::time::timeout(WAIT, rx.recv()).await.unwrap();
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn verbose_client_forwards_deliveries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("event: ping\n\n"))
            .mount(&mock_server)
            .await;

        let client = VerboseClient::new(HttpClient::new().unwrap());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _connection = client.get(
            &events_url(&mock_server),
            &Headers::new(),
            Arc::new(move |result: ChunkResult| {
                let _ = tx.send(result);
            }),
        );

        let body = collect_body(&mut rx, "event: ping\n\n".len()).await;
        assert_eq!(body, b"event: ping\n\n");
    }
}

// ============================================================================
// MieleService over HTTP
// ============================================================================

mod service {
    use super::*;

    #[tokio::test]
    async fn delivers_devices_end_to_end() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/devices/all/events"))
            .and(header("Authorization", "Bearer token-123"))
            .and(header("Accept", "text/event-stream"))
            .and(header("Accept-Language", "it"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ENDED_WASHING_MACHINE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let service = MieleService::new(HttpClient::new().unwrap());
        let (tx, mut rx) = mpsc::unbounded_channel();

        service.subscribe(&events_url(&mock_server), "token-123", move |result| {
            let _ = tx.send(result);
        });

        let result = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();

        let expected = Device::new(
            "1000",
            "Washing Machine",
            "Wool",
            ProgramState::Ended,
            Measurement::new(123.0, "l"),
        );
        assert_eq!(result, Ok(HashSet::from([expected])));
    }

    #[tokio::test]
    async fn server_close_releases_subscriptions() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_DEVICES))
            .expect(20)
            .mount(&mock_server)
            .await;

        let service = MieleService::new(HttpClient::new().unwrap());
        let url = events_url(&mock_server);
        let (tx, mut rx) = mpsc::unbounded_channel();

        for _ in 0..20 {
            let tx = tx.clone();
            service.subscribe(&url, "secret", move |result| {
                let _ = tx.send(result);
            });
        }
        drop(tx);

        let mut results = Vec::new();
        while let Some(result) = tokio::time::timeout(WAIT, rx.recv()).await.unwrap() {
            results.push(result);
        }

        // Every subscriber callback has been released once its stream ended.
        assert_eq!(results.len(), 20);
        assert!(results.iter().all(|r| *r == Ok(HashSet::new())));
        assert_eq!(service.subscription_count(), 0);
    }

    #[tokio::test]
    async fn rejected_status_delivers_invalid_data() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&mock_server)
            .await;

        let service = MieleService::new(HttpClient::new().unwrap());
        let (tx, mut rx) = mpsc::unbounded_channel();

        service.subscribe(&events_url(&mock_server), "secret", move |result| {
            let _ = tx.send(result);
        });

        let result = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert!(matches!(result, Err(Error::InvalidData { .. })));
    }

    #[tokio::test]
    async fn unreachable_server_delivers_connectivity() {
        let service = MieleService::new(HttpClient::new().unwrap());
        let (tx, mut rx) = mpsc::unbounded_channel();

        service.subscribe(
            &"http://127.0.0.1:1/events".parse().unwrap(),
            "secret",
            move |result| {
                let _ = tx.send(result);
            },
        );

        let result = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(result, Err(Error::Connectivity));

        // The subscription ends and the sender is dropped with it.
        let closed = tokio::time::timeout(WAIT, rx.recv()).await.unwrap();
        assert!(closed.is_none());
        assert_eq!(service.subscription_count(), 0);
    }

    #[tokio::test]
    async fn dropping_service_closes_the_stream() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(ENDED_WASHING_MACHINE)
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&mock_server)
            .await;

        let service = MieleService::new(HttpClient::new().unwrap());
        let (tx, mut rx) = mpsc::unbounded_channel();

        service.subscribe(&events_url(&mock_server), "secret", move |result| {
            let _ = tx.send(result);
        });
        drop(service);

        let closed = tokio::time::timeout(WAIT, rx.recv()).await.unwrap();
        assert!(closed.is_none());
    }
}
