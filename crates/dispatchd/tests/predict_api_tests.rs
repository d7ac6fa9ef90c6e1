//! Integration tests for the prediction API surface.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use dispatch_common::forest::ForestParams;
use dispatch_common::predictor::DispatchPredictor;
use dispatch_common::ticket::{Ticket, TicketUser};
use dispatch_common::trainer::{train, TrainParams};
use dispatchd::server::{app, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

fn labeled_ticket(subject: &str, full_name: &str) -> Ticket {
    Ticket {
        subject: subject.to_string(),
        user: Some(TicketUser { full_name: Some(full_name.to_string()) }),
        ..Ticket::default()
    }
}

/// Fit a small model and wrap it in the router under test.
fn test_app() -> axum::Router {
    let mut tickets = Vec::new();
    for i in 0..15 {
        tickets.push(labeled_ticket(&format!("printer jammed {}", i), "Carl Labrador"));
        tickets.push(labeled_ticket(&format!("vpn connection broken {}", i), "Michael Barbin"));
    }
    let params = TrainParams {
        forest: ForestParams { n_trees: 25, ..ForestParams::default() },
        ..TrainParams::default()
    };
    let outcome = train(&tickets, &params).unwrap();
    let state = AppState::new(DispatchPredictor::from_artifact(outcome.artifact));
    app(Arc::new(state))
}

async fn post_json(router: axum::Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn predicts_known_vocabulary() {
    let (status, body) = post_json(
        test_app(),
        "/v1/predict/dispatch",
        r#"{"subject": "printer jammed again"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tech"], "Carl L");
    assert!(body["confidence"].as_f64().unwrap() >= 0.5);
}

#[tokio::test]
async fn null_optional_fields_do_not_fail() {
    let (status, body) = post_json(
        test_app(),
        "/v1/predict/dispatch",
        r#"{"subject": "VPN down", "problem_type": null, "comments": null}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("tech").is_some());
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
}

#[tokio::test]
async fn comment_bodies_feed_the_prediction() {
    let (status, body) = post_json(
        test_app(),
        "/v1/predict/dispatch",
        r#"{"subject": "weird issue", "comments": [{"body": ""}, {"body": "vpn connection broken"}]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tech"], "Michael");
}

#[tokio::test]
async fn malformed_payload_is_a_client_error() {
    let (status, _) = post_json(test_app(), "/v1/predict/dispatch", "{ not json").await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn health_reports_model_classes() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    let classes = body["model_classes"].as_array().unwrap();
    assert_eq!(classes.len(), 2);
}
