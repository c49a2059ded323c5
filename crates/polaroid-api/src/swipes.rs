use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use polaroid_core::Error;
use polaroid_types::api::{Claims, ResetResponse, SwipeRequest, SwipeResponse};
use polaroid_types::models::SwipeKind;

use crate::AppState;
use crate::error::{ApiError, blocking};

/// Record a swipe. A like may complete a match, reported as `match_id`.
pub async fn swipe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SwipeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let outcome = blocking(&state, move |svc| svc.swipe(claims.sub, req.card_id, req.kind)).await?;

    Ok((
        StatusCode::CREATED,
        Json(SwipeResponse {
            swipe_id: outcome.swipe_id,
            match_id: outcome.match_id,
        }),
    ))
}

pub async fn swiped_cards(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let cards = blocking(&state, move |svc| svc.swiped_cards(claims.sub, kind)).await?;
    Ok(Json(cards))
}

pub async fn reset_swipes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let removed = blocking(&state, move |svc| svc.reset_swipes(claims.sub, kind)).await?;
    Ok(Json(ResetResponse { removed }))
}

fn parse_kind(raw: &str) -> Result<SwipeKind, ApiError> {
    raw.parse::<SwipeKind>()
        .map_err(|e| ApiError::Core(Error::InvalidInput(e.to_string())))
}
