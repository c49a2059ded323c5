//! HTTP surface: JSON routes over [`polaroid_core::Service`] plus the
//! `/gateway` WebSocket upgrade.

pub mod auth;
pub mod cards;
pub mod conversations;
pub mod error;
pub mod feed;
pub mod matches;
pub mod middleware;
pub mod notifications;
pub mod swipes;

use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
};
use polaroid_core::Service;
use polaroid_gateway::{Dispatcher, connection};

use crate::middleware::require_auth;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub service: Arc<Service>,
    pub dispatcher: Dispatcher,
    pub jwt_secret: String,
}

/// All routes, without transport layers (CORS, tracing) which the binary adds.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/gateway", get(ws_upgrade));

    let protected_routes = Router::new()
        .route("/me", get(auth::me))
        .route("/cards", post(cards::create_card))
        .route("/cards/mine", get(cards::list_own_cards))
        .route("/cards/{card_id}", get(cards::get_card))
        .route("/feed", get(feed::get_feed))
        .route("/swipes", post(swipes::swipe))
        .route("/swipes/{kind}", get(swipes::swiped_cards).delete(swipes::reset_swipes))
        .route("/matches", get(matches::list_matches))
        .route("/matches/{match_id}", get(matches::get_match))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read", post(notifications::mark_read))
        .route("/conversations", get(conversations::list_conversations))
        .route(
            "/conversations/{match_id}/messages",
            get(conversations::thread).post(conversations::send_message),
        )
        .route("/conversations/{match_id}/read", post(conversations::mark_read))
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        connection::handle_connection(
            socket,
            state.dispatcher.clone(),
            state.service.clone(),
            state.jwt_secret.clone(),
        )
    })
}
