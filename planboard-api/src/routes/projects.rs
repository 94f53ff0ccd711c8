/// Project endpoints
///
/// - `GET /api/projects` - List all projects
/// - `POST /api/projects` - Create a project with members and columns
/// - `GET /api/projects/:id` - The board aggregation read
/// - `PATCH /api/projects/:id/duedate` - Set or clear the due date

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use planboard_shared::{
    auth::AuthUser,
    models::{
        board::Board,
        project::{CreateProject, Project},
    },
};
use serde::Deserialize;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: String,

    /// Optional due date as `YYYY-MM-DD`
    #[serde(default)]
    pub due_date: Option<String>,

    /// Member user IDs; the creator is added automatically
    #[serde(default)]
    pub team_ids: Vec<i64>,
}

/// Due date update request
///
/// An empty or absent value clears the date.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueDateRequest {
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Parses an optional `YYYY-MM-DD` field where empty means "clear"
fn parse_due_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw {
        None => Ok(None),
        Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("invalid date: {s}"))),
    }
}

/// Lists all projects
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list_all(&state.db).await?;
    Ok(Json(projects))
}

/// Creates a project
///
/// The authenticated creator is always part of the team, whether or not
/// the request lists them. The project row, member rows, and the three
/// default board columns are written in one transaction.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or malformed due date
/// - `500 Internal Server Error`: Server error
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate().map_err(|e| validation_error(&e))?;

    let due_date = parse_due_date(req.due_date.as_deref())?;

    let mut team_ids = req.team_ids;
    if !team_ids.contains(&auth.id) {
        team_ids.push(auth.id);
    }

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            due_date,
            team_ids,
        },
    )
    .await?;

    tracing::info!(project_id = project.id, "created project");

    Ok((StatusCode::CREATED, Json(project)))
}

/// The board read
///
/// Returns the project with its team, its columns in board order, and
/// every task grouped under its column with assignees attached.
///
/// # Errors
///
/// - `404 Not Found`: No such project
pub async fn get_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Board>> {
    let board = Board::load(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("project not found".to_string()))?;

    Ok(Json(board))
}

/// Sets or clears the project due date
///
/// # Errors
///
/// - `400 Bad Request`: Malformed date
/// - `404 Not Found`: No such project
pub async fn update_due_date(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<DueDateRequest>,
) -> ApiResult<Json<Project>> {
    let due_date = parse_due_date(req.due_date.as_deref())?;

    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("project not found".to_string()))?;

    Project::update_due_date(&state.db, id, due_date).await?;

    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("project not found".to_string()))?;

    Ok(Json(project))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_date() {
        assert_eq!(parse_due_date(None).unwrap(), None);
        assert_eq!(parse_due_date(Some("")).unwrap(), None);
        assert_eq!(
            parse_due_date(Some("2026-03-15")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 15)
        );
        assert!(parse_due_date(Some("15/03/2026")).is_err());
        assert!(parse_due_date(Some("not-a-date")).is_err());
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateProjectRequest =
            serde_json::from_str(r#"{"name": "Launch"}"#).unwrap();

        assert_eq!(req.name, "Launch");
        assert_eq!(req.description, "");
        assert!(req.due_date.is_none());
        assert!(req.team_ids.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_empty_name() {
        let req: CreateProjectRequest =
            serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_camel_case_fields() {
        let req: CreateProjectRequest = serde_json::from_str(
            r#"{"name": "Launch", "dueDate": "2026-01-01", "teamIds": [1, 2]}"#,
        )
        .unwrap();

        assert_eq!(req.due_date.as_deref(), Some("2026-01-01"));
        assert_eq!(req.team_ids, vec![1, 2]);
    }
}
