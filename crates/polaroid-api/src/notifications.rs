use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
};
use polaroid_types::api::{Claims, MarkReadResponse};

use crate::AppState;
use crate::error::{ApiError, blocking};

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = blocking(&state, move |svc| svc.list_notifications(claims.sub)).await?;
    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = blocking(&state, move |svc| svc.mark_notifications_read(claims.sub)).await?;
    Ok(Json(MarkReadResponse { updated }))
}
