/// User model and database operations
///
/// Users are created out of band (there is no registration endpoint);
/// this system only reads them and mutates profile, avatar, and password.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password VARCHAR(255) NOT NULL,
///     avatar VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The `password` column holds an Argon2id PHC string, or a legacy
/// plaintext value that the login path upgrades in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User model representing an account row
///
/// The stored credential is never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Stored credential (hash or legacy plaintext)
    #[serde(skip_serializing)]
    pub password: String,

    /// Avatar URL, if one has been uploaded
    pub avatar: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Public slice of a user, used in team lists, assignee lists, and search
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Caller activity counts for `GET /api/me/summary`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserActivitySummary {
    /// Projects the user belongs to
    pub projects: i64,

    /// Tasks the user is assigned to
    pub tasks_assigned: i64,

    /// Comments the user has written
    pub comments_written: i64,
}

impl User {
    /// Finds a user by email, including the stored credential (login path)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, avatar, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, avatar, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Substring search over name and email
    pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<UserSummary>, sqlx::Error> {
        let pattern = format!("%{}%", query);

        sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, name, email, avatar
            FROM users
            WHERE name ILIKE $1 OR email ILIKE $1
            ORDER BY name
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await
    }

    /// Updates name and email, returning the fresh row
    pub async fn update_profile(
        pool: &PgPool,
        id: i64,
        name: &str,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3
            WHERE id = $1
            RETURNING id, name, email, password, avatar, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Persists a new avatar URL
    pub async fn update_avatar(pool: &PgPool, id: i64, url: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET avatar = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Replaces the stored credential
    ///
    /// Used both by the password-change endpoint and by the login path's
    /// transparent legacy upgrade. Callers hash before storing.
    pub async fn update_password(pool: &PgPool, id: i64, hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password = $2 WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Activity counts for the profile summary
    pub async fn activity_summary(
        pool: &PgPool,
        id: i64,
    ) -> Result<UserActivitySummary, sqlx::Error> {
        sqlx::query_as::<_, UserActivitySummary>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM project_members pm WHERE pm.user_id = $1) AS projects,
                (SELECT COUNT(*) FROM task_assignees ta WHERE ta.user_id = $1) AS tasks_assigned,
                (SELECT COUNT(*) FROM task_comments c WHERE c.user_id = $1) AS comments_written
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Strips the credential for response use
    pub fn into_summary(self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name,
            email: self.email,
            avatar: self.avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_not_serialized() {
        let user = User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "$argon2id$secret".to_string(),
            avatar: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_into_summary_drops_credential() {
        let user = User {
            id: 9,
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            password: "legacy".to_string(),
            avatar: Some("/uploads/1_g.png".to_string()),
            created_at: Utc::now(),
        };

        let summary = user.into_summary();
        assert_eq!(summary.id, 9);
        assert_eq!(summary.avatar.as_deref(), Some("/uploads/1_g.png"));

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("password").is_none());
    }
}
