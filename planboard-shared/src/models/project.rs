/// Project model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_members (
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// Creation is the one multi-statement write in the system and runs in a
/// transaction: the project row, its member rows, and its default status
/// columns either all commit or all roll back.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::status::DEFAULT_COLUMNS;
use super::user::UserSummary;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: i64,

    /// Project name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// When the project was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Description (may be empty)
    pub description: String,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Initial member user IDs (the creator included by the handler)
    pub team_ids: Vec<i64>,
}

impl Project {
    /// Creates a project with its members and default board columns
    ///
    /// Runs in a single transaction; any failing statement rolls the whole
    /// creation back.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, due_date)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, due_date, created_at
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.due_date)
        .fetch_one(&mut *tx)
        .await?;

        for user_id in &data.team_ids {
            sqlx::query(
                r#"
                INSERT INTO project_members (project_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(project.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        for (i, title) in DEFAULT_COLUMNS.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO statuses (project_id, title, position)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(project.id)
            .bind(title)
            .bind(i as i32 + 1)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(project)
    }

    /// Lists all projects
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, due_date, created_at
            FROM projects
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, due_date, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Sets or clears the project due date
    pub async fn update_due_date(
        pool: &PgPool,
        id: i64,
        due_date: Option<NaiveDate>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET due_date = $2 WHERE id = $1")
            .bind(id)
            .bind(due_date)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Lists a project's team members
    pub async fn members(pool: &PgPool, id: i64) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.avatar
            FROM users u
            JOIN project_members pm ON u.id = pm.user_id
            WHERE pm.project_id = $1
            ORDER BY u.name
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    /// Lists the projects a user belongs to
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.due_date, p.created_at
            FROM projects p
            JOIN project_members pm ON pm.project_id = p.id
            WHERE pm.user_id = $1
            ORDER BY p.name
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
    fn test_project_serializes_camel_case() {
        let project = Project {
            id: 3,
            name: "Launch".to_string(),
            description: "".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["dueDate"], "2026-03-01");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("due_date").is_none());
    }

    #[test]
    fn test_default_columns_are_ordered() {
        assert_eq!(DEFAULT_COLUMNS.len(), 3);
        assert_eq!(DEFAULT_COLUMNS[0], "To Do");
        assert_eq!(DEFAULT_COLUMNS[2], "Done");
    }
}
