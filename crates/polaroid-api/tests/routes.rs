//! Drives the router in-process, one request at a time.

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use common::{app, call, matched_pair, register, upload};

#[tokio::test]
async fn health_is_public_and_the_rest_needs_a_token() {
    let app = app();
    let res = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/feed", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "not authenticated");

    let (status, _) = call(&app, Method::GET, "/feed", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_me() {
    let app = app();
    let (user_id, _) = register(&app, "alice").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "username": "alice", "email": "other@example.com", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = call(&app, Method::GET, "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id.as_str());
    assert_eq!(me["username"], "alice");
}

#[tokio::test]
async fn short_password_is_rejected() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "username": "alice", "email": "alice@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn mutual_likes_open_a_conversation() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let (_, bobby) = register(&app, "bobby").await;
    let alices_card = upload(&app, &alice, "c2").await;
    let bobbys_card = upload(&app, &bobby, "c1").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/swipes",
        Some(&bobby),
        Some(json!({ "card_id": alices_card, "type": "like" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["match_id"].is_null());

    let (_, body) = call(
        &app,
        Method::POST,
        "/swipes",
        Some(&alice),
        Some(json!({ "card_id": bobbys_card, "type": "like" })),
    )
    .await;
    let match_id = body["match_id"].as_str().unwrap().to_string();

    let (status, detail) = call(&app, Method::GET, &format!("/matches/{}", match_id), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["other_username"], "bobby");
    assert_eq!(detail["card_i_liked"]["id"], bobbys_card.as_str());

    let uri = format!("/conversations/{}/messages", match_id);
    let (status, _) = call(&app, Method::POST, &uri, Some(&bobby), Some(json!({ "text": "hi!" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = call(&app, Method::GET, "/conversations", Some(&alice), None).await;
    assert_eq!(list[0]["unread_count"], 1);
    assert_eq!(list[0]["last_message"], "hi!");

    let (_, read) = call(&app, Method::POST, &format!("/conversations/{}/read", match_id), Some(&alice), None).await;
    assert_eq!(read["updated"], 1);

    let (_, notes) = call(&app, Method::GET, "/notifications", Some(&alice), None).await;
    let kinds: Vec<_> = notes.as_array().unwrap().iter().map(|n| n["type"].clone()).collect();
    assert!(kinds.contains(&json!("match")));
}

#[tokio::test]
async fn swipe_errors_map_to_status_codes() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let own = upload(&app, &alice, "mine").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/swipes",
        Some(&alice),
        Some(json!({ "card_id": own, "type": "like" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        Method::POST,
        "/swipes",
        Some(&alice),
        Some(json!({ "card_id": own, "type": "superlike" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Method::POST,
        "/swipes",
        Some(&alice),
        Some(json!({ "card_id": uuid::Uuid::new_v4(), "type": "reject" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "card not found");

    let (status, _) = call(&app, Method::DELETE, "/swipes/superlike", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_returns_cards_to_the_feed() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let (_, bobby) = register(&app, "bobby").await;
    let card = upload(&app, &bobby, "c1").await;

    call(&app, Method::POST, "/swipes", Some(&alice), Some(json!({ "card_id": card, "type": "bookmark" }))).await;
    let (_, feed) = call(&app, Method::GET, "/feed", Some(&alice), None).await;
    assert!(feed.as_array().unwrap().is_empty());

    let (_, bookmarked) = call(&app, Method::GET, "/swipes/bookmark", Some(&alice), None).await;
    assert_eq!(bookmarked[0]["owner_username"], "bobby");

    let (status, body) = call(&app, Method::DELETE, "/swipes/bookmark", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (_, feed) = call(&app, Method::GET, "/feed?limit=10", Some(&alice), None).await;
    assert_eq!(feed[0]["id"], card.as_str());
}

#[tokio::test]
async fn outsiders_cannot_read_a_thread() {
    let app = app();
    let (alice, _, match_id) = matched_pair(&app, "alice", "bobby").await;
    let (_, carol) = register(&app, "carol").await;

    let uri = format!("/conversations/{}/messages", match_id);
    let (status, _) = call(&app, Method::GET, &uri, Some(&carol), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::POST, &uri, Some(&alice), Some(json!({ "text": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_ids_in_the_path_are_json_errors() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;

    for uri in ["/matches/not-a-uuid", "/cards/42", "/conversations/nope/messages"] {
        let (status, body) = call(&app, Method::GET, uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn feed_cursor_walks_every_card_once() {
    let app = app();
    let (_, alice) = register(&app, "alice").await;
    let (_, bobby) = register(&app, "bobby").await;
    let mut uploaded = Vec::new();
    for i in 0..5 {
        uploaded.push(upload(&app, &bobby, &format!("c{}", i)).await);
    }

    let (_, first) = call(&app, Method::GET, "/feed?limit=3", Some(&alice), None).await;
    let first = first.as_array().unwrap().clone();
    assert_eq!(first.len(), 3);
    let last = &first[2];
    let uri = format!(
        "/feed?limit=3&before={}&before_id={}",
        last["created_at"].as_str().unwrap(),
        last["id"].as_str().unwrap()
    );
    let (status, rest) = call(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK, "{}", rest);

    let mut seen: Vec<String> = first
        .iter()
        .chain(rest.as_array().unwrap())
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    seen.sort();
    uploaded.sort();
    assert_eq!(seen, uploaded);
}
