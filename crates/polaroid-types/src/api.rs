use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CardFilter, SwipeKind};

// -- JWT Claims --

/// JWT claims shared by the REST middleware and the WebSocket gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Cards --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCardRequest {
    #[serde(default)]
    pub actor: String,
    #[serde(default)]
    pub title: String,
    pub image_ref: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub filter: CardFilter,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<u32>,
    /// Cursor: `created_at` of the last card seen.
    pub before: Option<DateTime<Utc>>,
    /// Cursor tie-break: id of the last card seen.
    pub before_id: Option<Uuid>,
}

// -- Swipes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwipeRequest {
    pub card_id: Uuid,
    #[serde(rename = "type")]
    pub kind: SwipeKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub swipe_id: Uuid,
    /// Set when this like completed (or re-confirmed) a match.
    pub match_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub removed: usize,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub updated: usize,
}
