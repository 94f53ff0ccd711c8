/// Board column model
///
/// Status columns are project-scoped: each project gets its own set,
/// created together with the project. Tasks reference exactly one column
/// of their own project.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Column titles seeded for every new project, in board order
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

/// A named status bucket tasks are grouped into
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StatusColumn {
    /// Unique column ID
    pub id: i64,

    /// Owning project
    pub project_id: i64,

    /// Column title, e.g. "To Do"
    pub title: String,

    /// Ordering position on the board
    pub position: i32,
}

impl StatusColumn {
    /// Lists a project's columns in board order
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, StatusColumn>(
            r#"
            SELECT id, project_id, title, position
            FROM statuses
            WHERE project_id = $1
            ORDER BY position
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
