/// Task comment model
///
/// Comments may be anonymous: the author column is nullable and a deleted
/// user leaves their comments behind with the author set to NULL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Author slice nested in a comment, absent for anonymous comments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Comment as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique comment ID
    pub id: i64,

    /// Comment body
    pub text: String,

    /// When the comment was written
    pub created_at: DateTime<Utc>,

    /// Author, or `None` for anonymous comments
    pub author: Option<CommentAuthor>,
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    text: String,
    created_at: DateTime<Utc>,
    author_id: Option<i64>,
    author_name: Option<String>,
    author_email: Option<String>,
    author_avatar: Option<String>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        let author = row.author_id.map(|id| CommentAuthor {
            id,
            name: row.author_name.unwrap_or_default(),
            email: row.author_email.unwrap_or_default(),
            avatar: row.author_avatar,
        });

        Comment {
            id: row.id,
            text: row.text,
            created_at: row.created_at,
            author,
        }
    }
}

impl Comment {
    /// Adds a comment, optionally attributed to a user
    pub async fn create(
        pool: &PgPool,
        task_id: i64,
        user_id: Option<i64>,
        text: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO task_comments (task_id, user_id, text)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(text)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists a task's comments, newest first
    pub async fn list_for_task(pool: &PgPool, task_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT
                c.id, c.text, c.created_at,
                u.id AS author_id, u.name AS author_name,
                u.email AS author_email, u.avatar AS author_avatar
            FROM task_comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.task_id = $1
            ORDER BY c.id DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}
