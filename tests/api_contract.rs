//! Inbound API contract tests: validation, health, correlation headers.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

mod common;

#[tokio::test]
async fn missing_action_returns_400_without_touching_upstream() {
    let upstream_addr: SocketAddr = "127.0.0.1:28411".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28412".parse().unwrap();

    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let captured = seen.clone();
    common::start_mock_upstream(upstream_addr, move |request| {
        let captured = captured.clone();
        async move {
            captured.lock().unwrap().push(request);
            (200, "application/json", r#"{"success":true}"#.to_string())
        }
    })
    .await;
    let shutdown = common::spawn_proxy(proxy_addr, format!("http://{}/exec", upstream_addr)).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/api?foo=bar", proxy_addr))
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing action parameter");

    let res = client
        .post(format!("http://{}/api", proxy_addr))
        .header("content-type", "application/json")
        .body(r#"{"data":1}"#)
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 400);

    // An empty action is as good as a missing one.
    let res = client
        .get(format!("http://{}/api?action=", proxy_addr))
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 400);

    assert!(seen.lock().unwrap().is_empty(), "upstream must not be called");

    shutdown.trigger();
}

#[tokio::test]
async fn health_endpoint_answers_locally() {
    let proxy_addr: SocketAddr = "127.0.0.1:28422".parse().unwrap();

    // Target port is dead on purpose: /health must not depend on it.
    let shutdown = common::spawn_proxy(proxy_addr, "http://127.0.0.1:28421/exec".into()).await;

    let res = common::client()
        .get(format!("http://{}/health", proxy_addr))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    shutdown.trigger();
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let upstream_addr: SocketAddr = "127.0.0.1:28431".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28432".parse().unwrap();

    common::start_json_upstream(upstream_addr, 200, r#"{"success":true}"#).await;
    let shutdown = common::spawn_proxy(proxy_addr, format!("http://{}/exec", upstream_addr)).await;
    let client = common::client();

    // Generated when absent.
    let res = client
        .get(format!("http://{}/api?action=list", proxy_addr))
        .send()
        .await
        .expect("Proxy unreachable");
    assert!(res.headers().contains_key("x-request-id"));

    // Preserved when supplied by the caller.
    let res = client
        .get(format!("http://{}/api?action=list", proxy_addr))
        .header("x-request-id", "test-correlation-42")
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(
        res.headers().get("x-request-id").unwrap(),
        "test-correlation-42"
    );

    shutdown.trigger();
}
