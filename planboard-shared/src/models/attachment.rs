/// Attachment metadata model
///
/// Only metadata lives in the database; the binary itself is written to
/// the local upload directory and served statically under
/// [`UPLOADS_PREFIX`]. Stored filenames are timestamp-prefixed, not
/// content-addressed: uploading identical content twice stores it twice,
/// and there is no collision detection.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// URL prefix under which stored files are served
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Attachment as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Unique attachment ID
    pub id: i64,

    /// Original filename as uploaded
    pub file_name: String,

    /// Size in bytes
    pub size: i64,

    /// Public URL of the stored file
    pub url: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AttachmentRow {
    id: i64,
    file_name: String,
    stored_name: String,
    size: i64,
}

impl Attachment {
    /// Records an uploaded file, returning the new attachment ID
    ///
    /// The file must already have been written to the upload directory
    /// under `stored_name`.
    pub async fn create(
        pool: &PgPool,
        task_id: i64,
        file_name: &str,
        stored_name: &str,
        size: i64,
    ) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO attachments (task_id, file_name, stored_name, size)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(task_id)
        .bind(file_name)
        .bind(stored_name)
        .bind(size)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    /// Lists a task's attachments, newest first
    pub async fn list_for_task(pool: &PgPool, task_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AttachmentRow>(
            r#"
            SELECT id, file_name, stored_name, size
            FROM attachments
            WHERE task_id = $1
            ORDER BY id DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Attachment {
                id: r.id,
                file_name: r.file_name,
                url: public_url(&r.stored_name),
                size: r.size,
            })
            .collect())
    }
}

/// Builds the public URL for a stored filename
pub fn public_url(stored_name: &str) -> String {
    format!("{}/{}", UPLOADS_PREFIX, stored_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        assert_eq!(public_url("17123_report.pdf"), "/uploads/17123_report.pdf");
    }

    #[test]
    fn test_attachment_serializes_camel_case() {
        let att = Attachment {
            id: 5,
            file_name: "report.pdf".to_string(),
            size: 1024,
            url: public_url("17123_report.pdf"),
        };

        let json = serde_json::to_value(&att).unwrap();
        assert_eq!(json["fileName"], "report.pdf");
        assert_eq!(json["url"], "/uploads/17123_report.pdf");
    }
}
