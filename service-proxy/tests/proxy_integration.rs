//! Service proxy integration tests
//!
//! These tests drive the real reqwest transport against wiremock servers.

mod common;

use common::*;
use serde_json::{json, Value};
use service_proxy::{
    aggregate, enrich, AggregationRequest, ErrorKind, HealthStatus, RequestOptions, ServiceConfig,
    ServiceProxy,
};
use std::collections::HashMap;
use std::time::Duration;
use wiremock::{
    matchers::{body_json, header, header_exists, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn test_get_forwards_headers_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "2"))
        .and(header("x-api-key", "secret"))
        .and(header_exists("x-request-id"))
        .and(header_exists("x-request-timestamp"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-total-count", "42")
                .set_body_json(json!([{"id": 1}, {"id": 2}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ServiceConfig::new(format!("{}/api", server.uri())).with_header("x-api-key", "secret");
    let proxy = ServiceProxy::new("users", config).unwrap();

    let mut params = HashMap::new();
    params.insert("page".to_string(), "2".to_string());
    let response = proxy
        .get::<Value>("/users", Some(&params), RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!([{"id": 1}, {"id": 2}]));
    assert_eq!(response.headers["x-total-count"], "42");

    let received = server.received_requests().await.unwrap();
    let request_id = received[0].headers.get("x-request-id").unwrap().to_str().unwrap();
    assert!(request_id.starts_with("users-"));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_json(json!({"sku": "A-1", "quantity": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "ord_1"})))
        .expect(1)
        .mount(&server)
        .await;

    let proxy = proxy("orders", &server.uri(), 0);
    let response = proxy
        .post::<Value>("/orders", Some(&json!({"sku": "A-1", "quantity": 2})), RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.data["id"], "ord_1");
}

#[tokio::test]
async fn test_server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let proxy = proxy("flaky", &server.uri(), 2);
    let response = proxy
        .get::<Value>("/flaky", None, RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(response.data, json!({"ok": true}));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_retries_exhausted_returns_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "database unavailable"})))
        .expect(3)
        .mount(&server)
        .await;

    let proxy = proxy("items", &server.uri(), 2);
    let error = proxy
        .put::<Value>("/items/1", Some(&json!({"name": "x"})), RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::ServerError);
    assert_eq!(error.status, Some(500));
    assert_eq!(error.message, "database unavailable");
    assert_eq!(error.cause.unwrap()["message"], "database unavailable");
}

#[tokio::test]
async fn test_client_errors_fail_after_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "User not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let proxy = proxy("users", &server.uri(), 2);
    let error = proxy
        .get::<Value>("/users/404", None, RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::ClientError);
    assert_eq!(error.status, Some(404));
    assert_eq!(error.message, "User not found");
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let proxy = proxy("slow", &server.uri(), 3);
    let error = proxy
        .get::<Value>(
            "/slow",
            None,
            RequestOptions::default().timeout_ms(100).max_retries(0),
        )
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::Timeout);
    assert_eq!(error.status, Some(504));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let proxy = proxy("offline", &closed_port_url(), 2);

    let error = proxy
        .get::<Value>("/anything", None, RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::Network);
    assert_eq!(error.status, Some(503));
}

#[tokio::test]
async fn test_unresolvable_host_is_network_error() {
    let proxy = proxy("ghost", "http://nonexistent-host.invalid", 1);

    let error = proxy
        .get::<Value>("/users", None, RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::Network);
    assert_eq!(error.status, Some(503));
    assert!(error.message.to_ascii_lowercase().contains("dns error"));
}

#[tokio::test]
async fn test_configured_request_id_is_not_sent_twice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let config = ServiceConfig::new(server.uri()).with_header("X-Request-Id", "fixed");
    let proxy = ServiceProxy::new("users", config).unwrap();
    proxy
        .get::<Value>("/users", None, RequestOptions::default())
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let ids: Vec<&str> = received[0]
        .headers
        .get_all("x-request-id")
        .iter()
        .map(|value| value.to_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 1);
    assert!(ids[0].starts_with("users-"));
}

#[tokio::test]
async fn test_health_check_states() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let healthy = proxy("users", &server.uri(), 3).health_check().await;
    assert_eq!(healthy.status, HealthStatus::Healthy);
    assert!(healthy.error.is_none());

    let failing_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&failing_server)
        .await;

    let failing = proxy("orders", &failing_server.uri(), 3).health_check().await;
    assert_eq!(failing.status, HealthStatus::Unhealthy);
    assert!(failing.error.unwrap().contains("500"));

    let offline = proxy("offline", &closed_port_url(), 3).health_check().await;
    assert_eq!(offline.status, HealthStatus::Unhealthy);
    assert!(offline.error.is_some());
}

#[tokio::test]
async fn test_aggregate_across_backends() {
    let users_server = MockServer::start().await;
    let orders_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "name": "Grace"})))
        .mount(&users_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&orders_server)
        .await;

    let users = proxy("users", &users_server.uri(), 0);
    let orders = proxy("orders", &orders_server.uri(), 0);
    let offline = proxy("recommendations", &closed_port_url(), 0);

    let mut order_params = HashMap::new();
    order_params.insert("userId".to_string(), "7".to_string());

    let result = aggregate(&[
        AggregationRequest::new("user", &users, "/users/7"),
        AggregationRequest::new("orders", &orders, "/orders").with_params(order_params),
        AggregationRequest::new("recommendations", &offline, "/recommendations/7"),
    ])
    .await
    .unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result["user"], Some(json!({"id": 7, "name": "Grace"})));
    assert_eq!(result["orders"], None);
    assert_eq!(result["recommendations"], None);
}

#[tokio::test]
async fn test_enrich_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inventory/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"available": 12})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reviews/1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let catalog = proxy("catalog", &server.uri(), 0);
    let base = json!({"id": 1, "name": "Lamp", "reviews": []});

    let enriched = enrich(
        base.as_object().unwrap(),
        &[
            AggregationRequest::new("inventory", &catalog, "/inventory/1"),
            AggregationRequest::new("reviews", &catalog, "/reviews/1"),
        ],
    )
    .await
    .unwrap();

    assert_eq!(
        Value::Object(enriched),
        json!({"id": 1, "name": "Lamp", "reviews": [], "inventory": {"available": 12}})
    );
}
