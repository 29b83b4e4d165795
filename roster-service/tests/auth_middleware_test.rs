mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{sign, token_for, TestApp, TEST_SECRET, UNKNOWN_ID};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

const ROLE_READS: [&str; 4] = [
    "/role/all",
    "/role/user",
    "/role/org/65a1f0c2e4b0a1b2c3d4e5f6",
    "/role/65a1f0c2e4b0a1b2c3d4e5f6",
];

#[tokio::test]
async fn role_routes_require_token() {
    let app = TestApp::spawn();

    for uri in ROLE_READS {
        let (status, body) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "GET {}", uri);
        assert_eq!(body["code"], "Unauthorized");
        assert_eq!(body["status"], 401);
    }

    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let (status, _) = app
            .request(method.clone(), "/role/", None, Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} /role/", method);
    }

    assert_eq!(app.store.store_calls(), 0);
}

#[tokio::test]
async fn auth_runs_before_validation() {
    let app = TestApp::spawn();

    let (status, _) = app
        .request(
            Method::POST,
            "/role/",
            None,
            Some(json!({ "userId": "bad", "orgId": "bad", "role": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejects_bad_tokens() {
    let app = TestApp::spawn();
    let expired = sign(UNKNOWN_ID, TEST_SECRET, Duration::hours(-2));
    let foreign = sign(UNKNOWN_ID, "some-other-secret", Duration::minutes(15));

    for token in ["garbage", expired.as_str(), foreign.as_str()] {
        let (status, body) = app.get("/role/all", Some(token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "Unauthorized");
    }

    let (status, _) = app
        .request_raw(Method::GET, "/role/all", Some(""), String::new())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn accepts_valid_token() {
    let app = TestApp::spawn();
    let token = token_for(&ObjectId::new().to_hex());

    for uri in ROLE_READS {
        let (status, _) = app.get(uri, Some(&token)).await;
        assert_eq!(status, StatusCode::OK, "GET {}", uri);
    }
}

#[tokio::test]
async fn rsvp_routes_are_open_by_default() {
    let app = TestApp::spawn();

    let (status, _) = app.get("/rsvp/all", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            "/rsvp/",
            None,
            Some(json!({
                "userId": ObjectId::new().to_hex(),
                "eventId": ObjectId::new().to_hex()
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rsvp"], true);
}

#[tokio::test]
async fn rsvp_routes_can_require_token() {
    let app = TestApp::with_rsvp_auth(true);

    let (status, body) = app.get("/rsvp/all", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "Unauthorized");

    let (status, _) = app
        .request(
            Method::DELETE,
            "/rsvp/user",
            None,
            Some(json!({ "userId": UNKNOWN_ID, "eventId": UNKNOWN_ID })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.store_calls(), 0);

    let token = token_for(UNKNOWN_ID);
    let (status, body) = app.get("/rsvp/all", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_stays_public_when_rsvp_is_gated() {
    let app = TestApp::with_rsvp_auth(true);
    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
}
