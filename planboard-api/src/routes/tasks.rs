/// Task endpoints
///
/// - `GET /api/tasks/:id` - Fully expanded task detail
/// - `PATCH /api/tasks/:id` - Partial field update
/// - `PATCH /api/tasks/:id/move` - Move to a column/position
/// - `POST /api/tasks/:id/assignees` - Link an assignee by email or name
/// - `POST /api/tasks/:id/collaborators` - Link a collaborator
/// - `GET|POST /api/tasks/:id/comments`
/// - `GET|POST /api/tasks/:id/attachments`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    storage,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use planboard_shared::models::{
    attachment::{public_url, Attachment},
    comment::Comment,
    task::{Task, TaskDetail, UpdateTaskFields},
};
use serde::Deserialize;

/// Move request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    /// Target column
    pub status_id: i64,

    /// Position inside the column
    pub position: i32,
}

/// Assignee/collaborator request; the query is an exact email or name
#[derive(Debug, Deserialize)]
pub struct LinkUserRequest {
    pub query: String,
}

/// Comment request; the author is optional and absent means anonymous
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub text: String,

    #[serde(default)]
    pub author_id: Option<i64>,
}

async fn require_detail(state: &AppState, task_id: i64) -> ApiResult<TaskDetail> {
    Task::detail(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("task not found".to_string()))
}

/// Returns the fully expanded task
///
/// # Errors
///
/// - `404 Not Found`: No such task
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskDetail>> {
    let detail = require_detail(&state, id).await?;
    Ok(Json(detail))
}

/// Applies a partial field update and returns the refreshed task
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(fields): Json<UpdateTaskFields>,
) -> ApiResult<Json<TaskDetail>> {
    // 404 before writing anything
    require_detail(&state, id).await?;

    Task::update_fields(&state.db, id, &fields).await?;

    let detail = require_detail(&state, id).await?;
    Ok(Json(detail))
}

/// Moves a task to a column/position
///
/// A single two-column write; sibling positions are left alone.
pub async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<MoveTaskRequest>,
) -> ApiResult<Json<TaskDetail>> {
    require_detail(&state, id).await?;

    Task::move_to(&state.db, id, req.status_id, req.position).await?;

    let detail = require_detail(&state, id).await?;
    Ok(Json(detail))
}

async fn resolve_user(state: &AppState, query: &str) -> ApiResult<i64> {
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("query is required".to_string()));
    }

    Task::find_user_by_query(&state.db, query)
        .await?
        .ok_or_else(|| ApiError::BadRequest("user not found".to_string()))
}

/// Links an assignee resolved by exact email or name
///
/// # Errors
///
/// - `400 Bad Request`: Empty query or no matching user
/// - `404 Not Found`: No such task
pub async fn add_assignee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<LinkUserRequest>,
) -> ApiResult<Json<TaskDetail>> {
    require_detail(&state, id).await?;

    let user_id = resolve_user(&state, &req.query).await?;
    Task::add_assignee(&state.db, id, user_id).await?;

    let detail = require_detail(&state, id).await?;
    Ok(Json(detail))
}

/// Links a collaborator resolved by exact email or name
pub async fn add_collaborator(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<LinkUserRequest>,
) -> ApiResult<Json<TaskDetail>> {
    require_detail(&state, id).await?;

    let user_id = resolve_user(&state, &req.query).await?;
    Task::add_collaborator(&state.db, id, user_id).await?;

    let detail = require_detail(&state, id).await?;
    Ok(Json(detail))
}

/// Lists a task's comments, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Comment>>> {
    require_detail(&state, id).await?;

    let comments = Comment::list_for_task(&state.db, id).await?;
    Ok(Json(comments))
}

/// Adds a comment, optionally attributed
///
/// The author comes from the payload, not the token: a payload without
/// `authorId` produces an anonymous comment.
///
/// # Errors
///
/// - `400 Bad Request`: Empty comment text
/// - `404 Not Found`: No such task
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<Vec<Comment>>)> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("comment text is required".to_string()));
    }

    require_detail(&state, id).await?;

    Comment::create(&state.db, id, req.author_id, &req.text).await?;

    let comments = Comment::list_for_task(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(comments)))
}

/// Lists a task's attachments, newest first
pub async fn list_attachments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Attachment>>> {
    require_detail(&state, id).await?;

    let attachments = Attachment::list_for_task(&state.db, id).await?;
    Ok(Json(attachments))
}

/// Accepts a multipart upload and records it against the task
///
/// Expects one part named `file`. The binary is written to the upload
/// directory under a timestamp-prefixed name; only metadata goes to the
/// database.
///
/// # Errors
///
/// - `400 Bad Request`: Missing or unreadable `file` part
/// - `404 Not Found`: No such task
pub async fn upload_attachment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Attachment>)> {
    require_detail(&state, id).await?;

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

    let (file_name, data) = upload
        .ok_or_else(|| ApiError::BadRequest("missing 'file' part".to_string()))?;

    let stored = storage::save_upload(&state.config.uploads.dir, &file_name, &data)
        .await
        .map_err(|e| ApiError::InternalError(format!("failed to store upload: {e}")))?;

    let attachment_id =
        Attachment::create(&state.db, id, &file_name, &stored.stored_name, stored.size).await?;

    tracing::info!(task_id = id, attachment_id, "stored attachment");

    Ok((
        StatusCode::CREATED,
        Json(Attachment {
            id: attachment_id,
            file_name,
            size: stored.size,
            url: public_url(&stored.stored_name),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_request_camel_case() {
        let req: MoveTaskRequest =
            serde_json::from_str(r#"{"statusId": 4, "position": 2}"#).unwrap();
        assert_eq!(req.status_id, 4);
        assert_eq!(req.position, 2);
    }

    #[test]
    fn test_link_user_request() {
        let req: LinkUserRequest = serde_json::from_str(r#"{"query": "ada@example.com"}"#).unwrap();
        assert_eq!(req.query, "ada@example.com");
    }

    #[test]
    fn test_comment_request_carries_author_id() {
        let req: AddCommentRequest =
            serde_json::from_str(r#"{"text": "hi", "authorId": 123}"#).unwrap();
        assert_eq!(req.text, "hi");
        assert_eq!(req.author_id, Some(123));
    }

    #[test]
    fn test_comment_request_without_author_is_anonymous() {
        let req: AddCommentRequest = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert!(req.author_id.is_none());

        let req: AddCommentRequest =
            serde_json::from_str(r#"{"text": "hi", "authorId": null}"#).unwrap();
        assert!(req.author_id.is_none());
    }
}
