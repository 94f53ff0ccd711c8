/// Database models for Planboard
///
/// This module contains all database models and their CRUD operations.
/// Each operation takes a `&PgPool` and issues its queries directly;
/// only project creation uses an explicit transaction.
///
/// # Models
///
/// - `user`: User accounts, profile updates, search, activity summary
/// - `project`: Projects and their membership
/// - `status`: Board columns (project-scoped, ordered by position)
/// - `task`: Tasks, field updates, moves, assignees/collaborators
/// - `comment`: Task comments with optional (nullable) authors
/// - `attachment`: Attachment metadata; binaries live on the filesystem
/// - `board`: The aggregated project board read

pub mod attachment;
pub mod board;
pub mod comment;
pub mod project;
pub mod status;
pub mod task;
pub mod user;
