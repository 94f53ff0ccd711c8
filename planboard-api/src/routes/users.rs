/// User lookup endpoints
///
/// - `GET /api/users/search?q=` - Substring search over name and email
/// - `GET /api/users/:id` - Public profile slice

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use planboard_shared::models::user::{User, UserSummary};
use serde::Deserialize;

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Searches users by name or email substring
///
/// # Errors
///
/// - `400 Bad Request`: Empty query
pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query parameter 'q' is required".to_string()));
    }

    let users = User::search(&state.db, query).await?;
    Ok(Json(users))
}

/// Returns a user's public profile slice
///
/// # Errors
///
/// - `404 Not Found`: No such user
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserSummary>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    Ok(Json(user.into_summary()))
}
