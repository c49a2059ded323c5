use axum::{
    Extension, Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::IntoResponse,
};
use polaroid_types::api::{Claims, MarkReadResponse, SendMessageRequest};
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, blocking};

pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let conversations = blocking(&state, move |svc| svc.list_conversations(claims.sub)).await?;
    Ok(Json(conversations))
}

pub async fn thread(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(match_id) = path?;
    let messages = blocking(&state, move |svc| svc.thread(claims.sub, match_id)).await?;
    Ok(Json(messages))
}

/// Live subscribers of the thread get a fresh snapshot through the gateway.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(match_id) = path?;
    let Json(req) = payload?;
    let message = blocking(&state, move |svc| svc.send_message(match_id, claims.sub, &req.text)).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(match_id) = path?;
    let updated = blocking(&state, move |svc| svc.mark_thread_read(claims.sub, match_id)).await?;
    Ok(Json(MarkReadResponse { updated }))
}
