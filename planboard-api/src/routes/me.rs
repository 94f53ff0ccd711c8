/// Profile endpoints for the authenticated caller
///
/// - `GET /api/me` - Current profile
/// - `PATCH /api/me` - Update name and email
/// - `POST /api/me/avatar` - Upload a new avatar image
/// - `PATCH /api/me/password` - Change the password
/// - `GET /api/me/tasks` - Tasks assigned to the caller
/// - `GET /api/me/summary` - Activity counts
/// - `GET /api/me/projects` - Projects the caller belongs to

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    storage,
};
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    Extension, Json,
};
use planboard_shared::{
    auth::{password, AuthUser},
    models::{
        project::Project,
        task::{Task, UserTask},
        user::{User, UserActivitySummary},
    },
};
use serde::Deserialize;
use validator::Validate;

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,

    #[validate(email(message = "invalid email format"))]
    pub email: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,

    #[validate(length(min = 8, message = "new password must be at least 8 characters"))]
    pub new_password: String,
}

async fn require_user(state: &AppState, id: i64) -> ApiResult<User> {
    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))
}

/// Returns the caller's profile
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<User>> {
    let user = require_user(&state, auth.id).await?;
    Ok(Json(user))
}

/// Updates the caller's name and email
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: Account no longer exists
pub async fn patch_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    req.validate().map_err(|e| validation_error(&e))?;

    let user = User::update_profile(&state.db, auth.id, &req.name, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    Ok(Json(user))
}

/// Accepts an avatar image upload and stores its URL on the profile
///
/// The image lands in the shared upload directory and the saved URL is
/// absolute when the request carries a Host header, so clients can use
/// it verbatim.
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<User>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let file_name = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| ApiError::BadRequest("file part has no filename".to_string()))?;

            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read file: {e}")))?;

            upload = Some((file_name, data.to_vec()));
            break;
        }
    }

    let (file_name, data) =
        upload.ok_or_else(|| ApiError::BadRequest("missing 'file' part".to_string()))?;

    let stored = storage::save_upload(&state.config.uploads.dir, &file_name, &data)
        .await
        .map_err(|e| ApiError::InternalError(format!("failed to store avatar: {e}")))?;

    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let url = avatar_url(host, &stored.stored_name);

    User::update_avatar(&state.db, auth.id, &url).await?;

    let user = require_user(&state, auth.id).await?;
    Ok(Json(user))
}

/// Builds the avatar URL, absolute when the request host is known
fn avatar_url(host: Option<&str>, stored_name: &str) -> String {
    let path = planboard_shared::models::attachment::public_url(stored_name);
    match host {
        Some(host) if !host.is_empty() => format!("http://{host}{path}"),
        _ => path,
    }
}

/// Changes the caller's password
///
/// Verifies the current password first (accepting a legacy plain-text
/// credential the same way login does), then stores an Argon2 hash of
/// the new one.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Current password does not match
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate().map_err(|e| validation_error(&e))?;

    let user = require_user(&state, auth.id).await?;

    let current_ok = if password::is_password_hash(&user.password) {
        password::verify_password(&req.current_password, &user.password)?
    } else {
        user.password == req.current_password
    };

    if !current_ok {
        return Err(ApiError::Unauthenticated(
            "current password is incorrect".to_string(),
        ));
    }

    let hash = password::hash_password(&req.new_password)?;
    User::update_password(&state.db, auth.id, &hash).await?;

    tracing::info!(user_id = auth.id, "password changed");

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// Lists the tasks assigned to the caller
pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<UserTask>>> {
    let tasks = Task::list_for_user(&state.db, auth.id).await?;
    Ok(Json(tasks))
}

/// Returns the caller's activity counts
pub async fn my_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<UserActivitySummary>> {
    let summary = User::activity_summary(&state.db, auth.id).await?;
    Ok(Json(summary))
}

/// Lists the projects the caller belongs to
pub async fn my_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list_for_user(&state.db, auth.id).await?;
    Ok(Json(projects))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_url_with_host() {
        assert_eq!(
            avatar_url(Some("api.example.com:8080"), "17_me.png"),
            "http://api.example.com:8080/uploads/17_me.png"
        );
    }

    #[test]
    fn test_avatar_url_without_host() {
        assert_eq!(avatar_url(None, "17_me.png"), "/uploads/17_me.png");
        assert_eq!(avatar_url(Some(""), "17_me.png"), "/uploads/17_me.png");
    }

    #[test]
    fn test_change_password_request_validation() {
        let ok: ChangePasswordRequest = serde_json::from_str(
            r#"{"currentPassword": "old", "newPassword": "longenough"}"#,
        )
        .unwrap();
        assert!(ok.validate().is_ok());

        let short: ChangePasswordRequest = serde_json::from_str(
            r#"{"currentPassword": "old", "newPassword": "short"}"#,
        )
        .unwrap();
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_profile_request_validation() {
        let bad = UpdateProfileRequest {
            name: "".to_string(),
            email: "valid@example.com".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
