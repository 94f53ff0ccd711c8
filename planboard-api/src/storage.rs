/// Upload directory file storage
///
/// Uploaded files are written to a local directory and served statically
/// under `/uploads`. The stored filename is a timestamp-prefixed sanitized
/// basename: `{unix_nanos}_{basename}`. Storage is NOT content-addressed,
/// so two uploads of identical content are stored twice, and no collision
/// detection runs.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

/// Result of writing an upload to disk
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Filename under the upload directory
    pub stored_name: String,

    /// Size in bytes
    pub size: i64,
}

/// Reduces an uploaded filename to a safe basename
///
/// Strips any path components (both separators), drops control characters,
/// and falls back to `file` when nothing usable remains.
pub fn sanitize_filename(name: &str) -> String {
    let basename = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();

    let trimmed = basename.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds the stored filename for an upload
pub fn stored_filename(original: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    format!("{}_{}", nanos, sanitize_filename(original))
}

/// Writes an upload into the upload directory
///
/// Creates the directory if missing and writes the bytes under a fresh
/// timestamp-prefixed name.
pub async fn save_upload(
    dir: &Path,
    original_name: &str,
    data: &[u8],
) -> std::io::Result<StoredUpload> {
    fs::create_dir_all(dir).await?;

    let stored_name = stored_filename(original_name);
    fs::write(dir.join(&stored_name), data).await?;

    Ok(StoredUpload {
        stored_name,
        size: data.len() as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("photo 1.png"), "photo 1.png");
    }

    #[test]
    fn test_sanitize_strips_paths() {
        assert_eq!(sanitize_filename("/etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("a/b/c.txt"), "c.txt");
    }

    #[test]
    fn test_sanitize_handles_empty_and_dot_names() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("   "), "file");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename("a/"), "file");
    }

    #[test]
    fn test_stored_filename_format() {
        let stored = stored_filename("report.pdf");

        let (prefix, rest) = stored.split_once('_').expect("should have prefix");
        assert!(prefix.parse::<u128>().is_ok());
        assert_eq!(rest, "report.pdf");
    }

    #[tokio::test]
    async fn test_save_upload_roundtrip() {
        let dir = std::env::temp_dir().join("planboard-storage-test");
        let data = b"attachment bytes";

        let stored = save_upload(&dir, "notes.txt", data).await.unwrap();
        assert_eq!(stored.size, data.len() as i64);
        assert!(stored.stored_name.ends_with("_notes.txt"));

        let read_back = tokio::fs::read(dir.join(&stored.stored_name)).await.unwrap();
        assert_eq!(read_back, data);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
