use std::sync::Arc;

use axum::{
    body::Body,
    http::{self, Request, StatusCode},
    Router,
};
use portal_shared::account::{
    handle::{AuthRes, RegisterReq},
    Level,
};
use serde::Serialize;
use tower::ServiceExt;

use crate::{
    account::mail::Mailer,
    auth::TokenKeys,
    storage::MemoryStorage,
    store::MemoryStore,
    Global,
};

mod account;
mod content;
mod course;

const SECRET: &str = "test-secret";
const PASSWORD: &str = "password123";
const BOUNDARY: &str = "portal-test-boundary";

/// A router over in-memory services.
struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    storage: Arc<MemoryStorage>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(MemoryStorage::new());
        let global = Global {
            store: store.clone(),
            storage: storage.clone(),
            mailer: Arc::new(Mailer::disabled()),
            tokens: Arc::new(TokenKeys::new(SECRET)),
        };
        Self {
            router: crate::router(global, "http://localhost:3000"),
            store,
            storage,
        }
    }

    /// Sends a request, returning the status and the JSON body.
    async fn send(&self, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Registers an account and returns its token and view.
    async fn register(&self, email: &str, matric_number: &str) -> AuthRes {
        let (status, body) = self
            .send(json(
                "POST",
                "/api/auth/register",
                None,
                &register_req(email, matric_number),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        serde_json::from_value(body).unwrap()
    }

    async fn admin(&self) -> String {
        self.register("admin@bowen.edu.ng", "admin/0001").await.token
    }

    async fn student(&self, email: &str) -> String {
        self.register(email, "3/1001").await.token
    }
}

fn register_req(email: &str, matric_number: &str) -> RegisterReq {
    RegisterReq {
        first_name: "Ada".to_owned(),
        last_name: "Obi".to_owned(),
        email: email.parse().unwrap(),
        matric_number: matric_number.to_owned(),
        phone_number: "08012345678".to_owned(),
        password: PASSWORD.to_owned(),
        level: Level::try_from(300).unwrap(),
    }
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> http::request::Builder {
    let builder = Request::builder().uri(uri).method(method);
    match token {
        Some(token) => builder.header(http::header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

fn json(method: &str, uri: &str, token: Option<&str>, body: &impl Serialize) -> Request<Body> {
    builder(method, uri, token)
        .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(serde_json::to_vec(body).unwrap().into())
        .unwrap()
}

fn empty(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    builder(method, uri, token).body(Body::empty()).unwrap()
}

/// A multipart body with a single file field.
fn multipart(uri: &str, token: Option<&str>, file_name: &str, data: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
        Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    builder("POST", uri, token)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn health() {
    let app = TestApp::new();
    let (status, body) = app.send(empty("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn cors_preflight() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/notes")
                .method("OPTIONS")
                .header(http::header::ORIGIN, "http://localhost:3000")
                .header(http::header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let headers = response.headers();
    assert_eq!(
        headers[http::header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[http::header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[http::header::ACCESS_CONTROL_MAX_AGE], "43200");
}
