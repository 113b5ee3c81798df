/// Image upload persistence
///
/// Multipart file parts for workshop and home images land here. A part
/// is accepted only when its declared content type is `image/*` and its
/// payload is at most [`MAX_IMAGE_BYTES`]. Accepted files are written
/// under the configured upload root with a generated name, and records
/// store the server-relative `/uploads/...` path.
///
/// Generated names combine a millisecond timestamp with a random
/// suffix, so concurrent uploads of the same original filename never
/// collide and client-chosen names never reach the filesystem.

use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};

use crate::error::ApiError;

/// Maximum accepted image payload (5 MiB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Subdirectory for workshop images
pub const WORKSHOP_SUBDIR: &str = "talleres";

/// Subdirectory for homepage images
pub const HOME_SUBDIR: &str = "home";

/// Validates an image part before it is persisted
///
/// # Errors
///
/// Returns `BadRequest` for non-image content types and for payloads
/// over the size limit.
pub fn validate_image(content_type: Option<&str>, size: usize) -> Result<(), ApiError> {
    match content_type {
        Some(ct) if ct.starts_with("image/") => {}
        _ => {
            return Err(ApiError::BadRequest(
                "Only image uploads are accepted".to_string(),
            ))
        }
    }

    if size > MAX_IMAGE_BYTES {
        return Err(ApiError::BadRequest(
            "Image exceeds the 5 MiB size limit".to_string(),
        ));
    }

    Ok(())
}

/// Stores a validated image and returns its server-relative path
///
/// The file is written to `{upload_dir}/{subdir}/{generated}` and the
/// returned path is `/uploads/{subdir}/{generated}`, which is what the
/// record columns store.
///
/// # Errors
///
/// Returns `BadRequest` if validation fails, `InternalError` on
/// filesystem failures.
pub async fn save_image(
    upload_dir: &str,
    subdir: &str,
    content_type: Option<&str>,
    original_name: Option<&str>,
    data: &[u8],
) -> Result<String, ApiError> {
    validate_image(content_type, data.len())?;

    let file_name = generate_file_name(original_name, content_type);

    let dir: PathBuf = Path::new(upload_dir).join(subdir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to create upload dir: {}", e)))?;

    tokio::fs::write(dir.join(&file_name), data)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to store image: {}", e)))?;

    Ok(format!("/uploads/{}/{}", subdir, file_name))
}

/// Builds a collision-free stored file name
///
/// The client-supplied name contributes only its extension, and only
/// when that extension is plain ASCII alphanumeric. Otherwise the
/// extension falls back to the content type subtype.
fn generate_file_name(original_name: Option<&str>, content_type: Option<&str>) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);

    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase())
        .or_else(|| {
            content_type
                .and_then(|ct| ct.strip_prefix("image/"))
                .filter(|sub| !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric()))
                .map(|sub| sub.to_ascii_lowercase())
        });

    match extension {
        Some(ext) => format!("{}-{}.{}", timestamp, suffix, ext),
        None => format!("{}-{}", timestamp, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_image_content_type() {
        let err = validate_image(Some("application/pdf"), 100).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = validate_image(None, 100).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_rejects_oversize_image() {
        let err = validate_image(Some("image/png"), MAX_IMAGE_BYTES + 1).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_accepts_image_at_limit() {
        assert!(validate_image(Some("image/jpeg"), MAX_IMAGE_BYTES).is_ok());
    }

    #[test]
    fn test_file_name_keeps_safe_extension() {
        let name = generate_file_name(Some("portada.PNG"), Some("image/png"));
        assert!(name.ends_with(".png"));
        assert!(!name.contains("portada"));
    }

    #[test]
    fn test_file_name_ignores_unsafe_extension() {
        // Extension with a path separator never reaches the filesystem
        let name = generate_file_name(Some("evil.p/ng"), Some("image/jpeg"));
        assert!(name.ends_with(".jpeg"));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_file_name_falls_back_to_content_type() {
        let name = generate_file_name(Some("noextension"), Some("image/webp"));
        assert!(name.ends_with(".webp"));
    }

    #[test]
    fn test_file_names_do_not_collide() {
        let a = generate_file_name(Some("a.png"), None);
        let b = generate_file_name(Some("a.png"), None);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_save_image_writes_under_subdir() {
        let root = std::env::temp_dir().join(format!("talleres-uploads-{}", std::process::id()));
        let root_str = root.to_str().unwrap().to_string();

        let path = save_image(&root_str, WORKSHOP_SUBDIR, Some("image/png"), Some("t.png"), b"png")
            .await
            .unwrap();

        assert!(path.starts_with("/uploads/talleres/"));
        let stored = root.join(path.trim_start_matches("/uploads/"));
        assert_eq!(tokio::fs::read(&stored).await.unwrap(), b"png");

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn test_save_image_rejects_before_writing() {
        let root = std::env::temp_dir().join(format!("talleres-uploads-bad-{}", std::process::id()));
        let root_str = root.to_str().unwrap().to_string();

        let err = save_image(&root_str, HOME_SUBDIR, Some("text/plain"), Some("a.txt"), b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(!root.exists());
    }
}
