use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
    response::IntoResponse,
};
use polaroid_types::api::Claims;
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, blocking};

pub async fn list_matches(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let matches = blocking(&state, move |svc| svc.list_matches(claims.sub)).await?;
    Ok(Json(matches))
}

pub async fn get_match(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(match_id) = path?;
    let detail = blocking(&state, move |svc| svc.get_match(claims.sub, match_id)).await?;
    Ok(Json(detail))
}
