use axum::{
    Extension, Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::IntoResponse,
};
use polaroid_types::api::{Claims, CreateCardRequest};
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, blocking};

pub async fn create_card(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateCardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let card = blocking(&state, move |svc| svc.create_card(claims.sub, req)).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn list_own_cards(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let cards = blocking(&state, move |svc| svc.list_own_cards(claims.sub)).await?;
    Ok(Json(cards))
}

pub async fn get_card(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(card_id) = path?;
    let card = blocking(&state, move |svc| svc.get_card(card_id)).await?;
    Ok(Json(card))
}
