//! Shared setup for the router tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use polaroid_api::{AppStateInner, router};
use polaroid_core::{Service, Settings};
use polaroid_db::Database;
use polaroid_gateway::Dispatcher;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const SECRET: &str = "test-secret-for-routes";

pub fn app() -> Router {
    let dispatcher = Dispatcher::new();
    let db = Database::open_in_memory().unwrap();
    let service = Arc::new(Service::new(db, Arc::new(dispatcher.clone()), Settings::default()));
    router(Arc::new(AppStateInner {
        service,
        dispatcher,
        jwt_secret: SECRET.into(),
    }))
}

pub async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn register(app: &Router, name: &str) -> (String, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "username": name, "email": format!("{}@example.com", name), "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    (
        body["user_id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

pub async fn upload(app: &Router, token: &str, title: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/cards",
        Some(token),
        Some(json!({ "title": title, "image_ref": "data:image/jpeg;base64,AAAA" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Two users who liked each other's cards. Returns their tokens and the match id.
pub async fn matched_pair(app: &Router, first: &str, second: &str) -> (String, String, String) {
    let (_, a) = register(app, first).await;
    let (_, b) = register(app, second).await;
    let a_card = upload(app, &a, "a").await;
    let b_card = upload(app, &b, "b").await;
    call(app, Method::POST, "/swipes", Some(&b), Some(json!({ "card_id": a_card, "type": "like" }))).await;
    let (_, body) = call(app, Method::POST, "/swipes", Some(&a), Some(json!({ "card_id": b_card, "type": "like" }))).await;
    let match_id = body["match_id"].as_str().unwrap().to_string();
    (a, b, match_id)
}
