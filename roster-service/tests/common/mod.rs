//! Test helpers for roster-service integration tests.
//!
//! Routers are built over the in-memory store, so no MongoDB is needed.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use roster_service::{
    build_router,
    config::{
        Environment, JwtConfig, MongoConfig, RosterConfig, RsvpConfig, SecurityConfig,
    },
    services::{AccessTokenClaims, InMemoryStore, JwtVerifier},
    startup::AppState,
};
use serde_json::Value;
use service_core::config::Config;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "roster-integration-secret";

/// A well-formed identifier nothing in a fresh store refers to.
pub const UNKNOWN_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
}

pub fn test_config(rsvp_require_auth: bool) -> RosterConfig {
    RosterConfig {
        common: Config {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        environment: Environment::Dev,
        service_name: "roster-service-test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        mongodb: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "roster_test".to_string(),
        },
        jwt: JwtConfig {
            public_key_path: None,
            secret: Some(TEST_SECRET.to_string()),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rsvp: RsvpConfig {
            require_auth: rsvp_require_auth,
        },
    }
}

/// Sign a token for `subject` the way the auth service would.
pub fn token_for(subject: &str) -> String {
    sign(subject, TEST_SECRET, Duration::minutes(15))
}

pub fn sign(subject: &str, secret: &str, expires_in: Duration) -> String {
    let now = Utc::now();
    let claims = AccessTokenClaims {
        sub: subject.to_string(),
        exp: (now + expires_in).timestamp(),
        iat: now.timestamp(),
        email: None,
        jti: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_rsvp_auth(false)
    }

    pub fn with_rsvp_auth(require_auth: bool) -> Self {
        let config = test_config(require_auth);
        let store = InMemoryStore::new();
        let jwt = JwtVerifier::new(&config.jwt).expect("Failed to create JWT verifier");

        let state = AppState {
            config,
            store: Arc::new(store.clone()),
            jwt,
        };

        Self {
            router: build_router(state),
            store,
        }
    }

    /// Send a request with an optional bearer token and JSON body, returning the
    /// status and the parsed body (`Value::Null` when the body is empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let raw = body.map(|b| b.to_string()).unwrap_or_default();
        self.request_raw(method, uri, token, raw).await
    }

    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }
}
