/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with
/// all routes and middleware. The auth gate lives here as a middleware
/// layer applied to every protected route.

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use planboard_shared::auth::{jwt, AuthUser};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Cookie carrying the access token when cookie mode is enabled
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. The
/// configuration is immutable after startup and shared behind an Arc.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}

/// Builds the complete Axum router
///
/// # Routes
///
/// ```text
/// /api
/// ├── POST /login                      # public
/// ├── GET  /health                     # public
/// ├── GET|POST /projects
/// ├── GET  /projects/:id               # board aggregation read
/// ├── PATCH /projects/:id/duedate
/// ├── GET|PATCH /tasks/:id
/// ├── PATCH /tasks/:id/move
/// ├── POST /tasks/:id/{assignees,collaborators}
/// ├── GET|POST /tasks/:id/{comments,attachments}
/// ├── GET|PATCH /me, POST /me/avatar, PATCH /me/password
/// ├── GET /me/{tasks,summary,projects}
/// ├── GET /users/:id
/// └── GET /users/search?q=
/// /uploads/*                           # static files, public
/// ```
///
/// Everything under `/api` except login and health runs behind the auth
/// gate. Middleware stack: trace logging, CORS, per-route authentication.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes, no auth
    let public_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/health", get(routes::health::health_check));

    // Everything else requires a valid token
    let protected_routes = Router::new()
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route("/projects/:id", get(routes::projects::get_board))
        .route(
            "/projects/:id/duedate",
            patch(routes::projects::update_due_date),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task).patch(routes::tasks::update_task),
        )
        .route("/tasks/:id/move", patch(routes::tasks::move_task))
        .route("/tasks/:id/assignees", post(routes::tasks::add_assignee))
        .route(
            "/tasks/:id/collaborators",
            post(routes::tasks::add_collaborator),
        )
        .route(
            "/tasks/:id/comments",
            get(routes::tasks::list_comments).post(routes::tasks::add_comment),
        )
        .route(
            "/tasks/:id/attachments",
            get(routes::tasks::list_attachments).post(routes::tasks::upload_attachment),
        )
        .route("/me", get(routes::me::get_me).patch(routes::me::patch_me))
        .route("/me/avatar", post(routes::me::upload_avatar))
        .route("/me/password", patch(routes::me::change_password))
        .route("/me/tasks", get(routes::me::my_tasks))
        .route("/me/summary", get(routes::me::my_summary))
        .route("/me/projects", get(routes::me::my_projects))
        .route("/users/search", get(routes::users::search_users))
        .route("/users/:id", get(routes::users::get_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// The auth gate
///
/// Extracts the bearer token (header first, cookie fallback when cookie
/// mode is on), validates it, and injects [`AuthUser`] into request
/// extensions for handlers. Every failure mode maps to 401.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let token = extract_token(req.headers(), state.config.auth.token_in_cookie)
        .ok_or_else(|| crate::error::ApiError::Unauthenticated("missing token".to_string()))?;

    let claims = jwt::validate_token(&token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthUser::from_claims(&claims));

    Ok(next.run(req).await)
}

/// Pulls the token out of the Authorization header or the cookie
fn extract_token(headers: &HeaderMap, allow_cookie: bool) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    if from_header.is_some() {
        return from_header;
    }

    if allow_cookie {
        return headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|cookies| cookie_value(cookies, ACCESS_TOKEN_COOKIE));
    }

    None
}

/// Parses `Bearer <token>` (scheme case-insensitive, as clients vary)
fn bearer_token(header: &str) -> Option<String> {
    let (scheme, rest) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Finds a named cookie in a Cookie header value
fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi").as_deref(), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc").as_deref(), Some("abc"));
        assert_eq!(bearer_token("Bearer   spaced  ").as_deref(), Some("spaced"));
        assert!(bearer_token("Basic abc").is_none());
        assert!(bearer_token("Bearer ").is_none());
        assert!(bearer_token("justatoken").is_none());
    }

    #[test]
    fn test_cookie_value_parsing() {
        let cookies = "theme=dark; access_token=tok123; lang=en";
        assert_eq!(cookie_value(cookies, "access_token").as_deref(), Some("tok123"));
        assert_eq!(cookie_value(cookies, "theme").as_deref(), Some("dark"));
        assert!(cookie_value(cookies, "missing").is_none());
        assert!(cookie_value("access_token=", "access_token").is_none());
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer headertok".parse().unwrap());
        headers.insert(header::COOKIE, "access_token=cookietok".parse().unwrap());

        assert_eq!(extract_token(&headers, true).as_deref(), Some("headertok"));
    }

    #[test]
    fn test_cookie_ignored_when_cookie_mode_off() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "access_token=cookietok".parse().unwrap());

        assert!(extract_token(&headers, false).is_none());
        assert_eq!(extract_token(&headers, true).as_deref(), Some("cookietok"));
    }
}
