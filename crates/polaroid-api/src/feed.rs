use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};
use polaroid_core::Page;
use polaroid_types::api::{Claims, FeedQuery};

use crate::AppState;
use crate::error::{ApiError, blocking};

/// `GET /feed?limit=&before=&before_id=`: pass the `created_at` and `id` of the
/// last card seen to fetch the next page.
pub async fn get_feed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let page = Page {
        limit: query.limit,
        before: query.before,
        before_id: query.before_id,
    };

    let cards = blocking(&state, move |svc| svc.get_feed(claims.sub, page)).await?;
    Ok(Json(cards))
}
