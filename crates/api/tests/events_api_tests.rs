use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use fleet_agent_api::{create_api_routes, AppState};
use fleet_agent_application::registry::CollectorRegistry;
use fleet_agent_application::use_cases::KeepaliveResponder;
use fleet_agent_domain::{NodeInfo, ServerAddress, SharedNodeOverrides, SharedServerAddress};
use fleet_agent_infrastructure::http::HttpStatusReporter;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

fn test_state() -> AppState {
    let node_info = NodeInfo {
        node_id: "n1".into(),
        node_type: "collector".into(),
        region: "us".into(),
        namespace: "default".into(),
        version: "0.1.0".into(),
        capabilities: vec![],
        metadata: HashMap::new(),
    };
    let server_address = Arc::new(SharedServerAddress::new(ServerAddress {
        ip: "0.0.0.0".into(),
        port: 8090,
    }));
    let reporter = Arc::new(HttpStatusReporter::new(
        server_address.clone(),
        node_info.node_id.clone(),
        8,
    ));
    let responder = Arc::new(KeepaliveResponder::new(
        node_info,
        server_address,
        Arc::new(SharedNodeOverrides::new()),
        Arc::new(CollectorRegistry::new()),
        reporter,
    ));
    AppState::new(responder)
}

#[tokio::test]
async fn healthz_returns_ok() {
    let app = create_api_routes(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn events_keepalive_responds_with_node_snapshot() {
    let app = create_api_routes(test_state());
    let payload = json!({
        "action": "keepalive",
        "source": "control-plane",
        "timestamp": "2026-01-01T00:00:00Z",
        "request_id": "r-1",
        "data": {},
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["request_id"], "r-1");
    assert_eq!(value["data"]["node_id"], "n1");
}

#[tokio::test]
async fn events_unknown_action_reports_failure_without_500() {
    let app = create_api_routes(test_state());
    let payload = json!({
        "action": "bogus",
        "source": "control-plane",
        "timestamp": "2026-01-01T00:00:00Z",
        "request_id": "r-2",
        "data": null,
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["success"], false);
}
