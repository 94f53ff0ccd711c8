/// Task model and database operations
///
/// Tasks belong to exactly one project and one status column, with an
/// ordering position inside the column. Field updates are independent,
/// unconditionally applied statements: there is no optimistic concurrency
/// check and a move does not renumber sibling positions, so concurrent
/// moves may produce duplicate or gapped positions. That is accepted, not
/// mitigated.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     status_id BIGINT NOT NULL REFERENCES statuses(id),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     position INTEGER NOT NULL DEFAULT 0,
///     due_date DATE,
///     priority VARCHAR(32)
/// );
/// ```
///
/// Task reads surface both the task's own due date and the parent
/// project's due date; older data kept the date only on the project, and
/// both fields stay visible until that migration is confirmed done.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::attachment::Attachment;
use super::comment::Comment;
use super::user::UserSummary;

/// Fully expanded task as returned by `GET /api/tasks/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub project_id: i64,
    pub project_name: String,
    pub status_id: i64,
    pub status_name: String,
    pub position: i32,
    /// The task's own due date
    pub due_date: Option<NaiveDate>,
    /// The parent project's due date, surfaced alongside during migration
    pub project_due_date: Option<NaiveDate>,
    pub priority: Option<String>,
    pub assignees: Vec<UserSummary>,
    pub collaborators: Vec<UserSummary>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, sqlx::FromRow)]
struct TaskCore {
    id: i64,
    title: String,
    description: Option<String>,
    project_id: i64,
    project_name: String,
    status_id: i64,
    status_name: String,
    position: i32,
    due_date: Option<NaiveDate>,
    project_due_date: Option<NaiveDate>,
    priority: Option<String>,
}

/// Partial field update for `PATCH /api/tasks/:id`
///
/// Each present field is applied as its own unconditional statement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<String>,
}

/// Row for the caller's task list (`GET /api/me/tasks`)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserTask {
    pub id: i64,
    pub title: String,
    pub project_id: i64,
    pub project_name: String,
    pub status_name: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<String>,
    pub comments_count: i64,
    pub attachments_count: i64,
}

pub struct Task;

impl Task {
    /// Loads the fully expanded task detail
    ///
    /// Five sequential reads: core row (joined to project and status),
    /// assignees, collaborators, attachments, comments. Not transactional;
    /// a torn snapshot under concurrent writes is accepted. Returns
    /// `Ok(None)` when the task does not exist.
    pub async fn detail(pool: &PgPool, task_id: i64) -> Result<Option<TaskDetail>, sqlx::Error> {
        let core = sqlx::query_as::<_, TaskCore>(
            r#"
            SELECT
                t.id, t.title, t.description,
                p.id AS project_id, p.name AS project_name,
                s.id AS status_id, s.title AS status_name,
                t.position, t.due_date,
                p.due_date AS project_due_date,
                t.priority
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            JOIN statuses s ON s.id = t.status_id
            WHERE t.id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(pool)
        .await?;

        let Some(core) = core else {
            return Ok(None);
        };

        let assignees = Self::linked_users(pool, "task_assignees", task_id).await?;
        let collaborators = Self::linked_users(pool, "task_collaborators", task_id).await?;
        let attachments = Attachment::list_for_task(pool, task_id).await?;
        let comments = Comment::list_for_task(pool, task_id).await?;

        Ok(Some(TaskDetail {
            id: core.id,
            title: core.title,
            description: core.description,
            project_id: core.project_id,
            project_name: core.project_name,
            status_id: core.status_id,
            status_name: core.status_name,
            position: core.position,
            due_date: core.due_date,
            project_due_date: core.project_due_date,
            priority: core.priority,
            assignees,
            collaborators,
            comments,
            attachments,
        }))
    }

    async fn linked_users(
        pool: &PgPool,
        link_table: &str,
        task_id: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        // link_table is one of two compile-time constants, never user input
        let query = format!(
            r#"
            SELECT u.id, u.name, u.email, u.avatar
            FROM users u
            JOIN {link_table} l ON l.user_id = u.id
            WHERE l.task_id = $1
            ORDER BY u.name
            "#
        );

        sqlx::query_as::<_, UserSummary>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Applies the present fields, each as its own statement
    pub async fn update_fields(
        pool: &PgPool,
        task_id: i64,
        fields: &UpdateTaskFields,
    ) -> Result<(), sqlx::Error> {
        if let Some(title) = &fields.title {
            sqlx::query("UPDATE tasks SET title = $2 WHERE id = $1")
                .bind(task_id)
                .bind(title)
                .execute(pool)
                .await?;
        }
        if let Some(description) = &fields.description {
            sqlx::query("UPDATE tasks SET description = $2 WHERE id = $1")
                .bind(task_id)
                .bind(description)
                .execute(pool)
                .await?;
        }
        if let Some(due_date) = fields.due_date {
            sqlx::query("UPDATE tasks SET due_date = $2 WHERE id = $1")
                .bind(task_id)
                .bind(due_date)
                .execute(pool)
                .await?;
        }
        if let Some(priority) = &fields.priority {
            sqlx::query("UPDATE tasks SET priority = $2 WHERE id = $1")
                .bind(task_id)
                .bind(priority)
                .execute(pool)
                .await?;
        }

        Ok(())
    }

    /// Moves a task to a column/position
    ///
    /// Two scalar writes in one statement. Siblings are not renumbered and
    /// no conflict detection runs, so repeated application of the same
    /// `{status_id, position}` is idempotent.
    pub async fn move_to(
        pool: &PgPool,
        task_id: i64,
        status_id: i64,
        position: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE tasks SET status_id = $2, position = $3 WHERE id = $1")
            .bind(task_id)
            .bind(status_id)
            .bind(position)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Resolves a user by exact email or name
    ///
    /// Used by the assignee/collaborator endpoints, which accept a free
    /// query string rather than an id.
    pub async fn find_user_by_query(
        pool: &PgPool,
        query: &str,
    ) -> Result<Option<i64>, sqlx::Error> {
        let id: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1 OR name = $1 LIMIT 1")
                .bind(query)
                .fetch_optional(pool)
                .await?;

        Ok(id.map(|(id,)| id))
    }

    /// Links a user as assignee; already-linked is a no-op
    pub async fn add_assignee(pool: &PgPool, task_id: i64, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO task_assignees (task_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Links a user as collaborator; already-linked is a no-op
    pub async fn add_collaborator(
        pool: &PgPool,
        task_id: i64,
        user_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO task_collaborators (task_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists the tasks assigned to a user, with comment/attachment counts
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<UserTask>, sqlx::Error> {
        sqlx::query_as::<_, UserTask>(
            r#"
            SELECT
                t.id, t.title,
                p.id AS project_id, p.name AS project_name,
                s.title AS status_name,
                t.due_date, t.priority,
                (SELECT COUNT(*) FROM task_comments c WHERE c.task_id = t.id) AS comments_count,
                (SELECT COUNT(*) FROM attachments a WHERE a.task_id = t.id) AS attachments_count
            FROM tasks t
            JOIN task_assignees ta ON ta.task_id = t.id
            JOIN projects p ON p.id = t.project_id
            JOIN statuses s ON s.id = t.status_id
            WHERE ta.user_id = $1
            ORDER BY p.name, t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_fields_deserializes_partial_payload() {
        let fields: UpdateTaskFields =
            serde_json::from_str(r#"{"title": "New title", "dueDate": "2026-02-10"}"#).unwrap();

        assert_eq!(fields.title.as_deref(), Some("New title"));
        assert!(fields.description.is_none());
        assert_eq!(fields.due_date, NaiveDate::from_ymd_opt(2026, 2, 10));
        assert!(fields.priority.is_none());
    }

    #[test]
    fn test_task_detail_serializes_both_due_dates() {
        let detail = TaskDetail {
            id: 42,
            title: "Ship it".to_string(),
            description: None,
            project_id: 1,
            project_name: "Launch".to_string(),
            status_id: 3,
            status_name: "Done".to_string(),
            position: 0,
            due_date: NaiveDate::from_ymd_opt(2026, 2, 1),
            project_due_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            priority: Some("high".to_string()),
            assignees: vec![],
            collaborators: vec![],
            comments: vec![],
            attachments: vec![],
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["dueDate"], "2026-02-01");
        assert_eq!(json["projectDueDate"], "2026-03-01");
        assert_eq!(json["statusId"], 3);
        assert!(json["assignees"].as_array().unwrap().is_empty());
    }
}
