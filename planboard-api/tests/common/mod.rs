/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation
/// - JWT token generation
/// - Request body helpers
///
/// Tests expect `DATABASE_URL` and `JWT_SECRET` to point at a disposable
/// test database.

use planboard_api::app::{build_router, AppState};
use planboard_api::config::Config;
use planboard_shared::auth::jwt::{create_token, Claims};
use planboard_shared::models::project::{CreateProject, Project};
use planboard_shared::models::user::User;
use sqlx::PgPool;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user and a built router
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../planboard-shared/migrations").run(&db).await?;

        // Create test user
        let marker = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password, avatar, created_at
            "#,
        )
        .bind("Test User")
        .bind(format!("test-{}@example.com", marker))
        .bind("legacy-password")
        .fetch_one(&db)
        .await?;

        // Generate JWT token
        let claims = Claims::new(user.id, user.email.clone(), chrono::Duration::hours(1));
        let jwt_token = create_token(&claims, &config.auth.jwt_secret)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Delete the user's projects (cascades to columns, tasks, links)
        sqlx::query(
            r#"
            DELETE FROM projects
            WHERE id IN (SELECT project_id FROM project_members WHERE user_id = $1)
            "#,
        )
        .bind(self.user.id)
        .execute(&self.db)
        .await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

/// Helper to create a test project owned by the context user
pub async fn create_test_project(ctx: &TestContext, name: &str) -> anyhow::Result<Project> {
    let project = Project::create(
        &ctx.db,
        CreateProject {
            name: name.to_string(),
            description: String::new(),
            due_date: None,
            team_ids: vec![ctx.user.id],
        },
    )
    .await?;

    Ok(project)
}

/// Helper to create a task directly in the store
pub async fn create_test_task(
    ctx: &TestContext,
    project_id: i64,
    status_id: i64,
    title: &str,
) -> anyhow::Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO tasks (project_id, status_id, title)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(project_id)
    .bind(status_id)
    .bind(title)
    .fetch_one(&ctx.db)
    .await?;

    Ok(id)
}

/// Builds a single-file multipart body for upload requests
pub fn multipart_body(boundary: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
