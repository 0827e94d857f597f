use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{HueError, Result};

/// Largest photo accepted for a review, before encoding.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// MIME type guessed from the file extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Wrap raw bytes as a `data:` URL.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Read a photo and return it as a base64 data URL ready to attach to a review.
pub async fn encode_image_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| HueError::ImageRead(format!("{}: {e}", path.display())))?;
    if bytes.is_empty() {
        return Err(HueError::ImageRead(format!("{} is empty", path.display())));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(HueError::ImageRead(format!(
            "{} is {} bytes, limit is {MAX_IMAGE_BYTES}",
            path.display(),
            bytes.len()
        )));
    }
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "encoded review photo");
    Ok(to_data_url(mime_for(path), &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("huequitas-img-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_mime_for_extensions() {
        assert_eq!(mime_for(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("a")), "application/octet-stream");
    }

    #[test]
    fn test_to_data_url() {
        assert_eq!(to_data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[tokio::test]
    async fn test_encode_image_file() {
        let path = temp_file("sancocho.jpg", &[0xFF, 0xD8, 0xFF, 0xE0]);
        let url = encode_image_file(&path).await.unwrap();
        assert_eq!(url, "data:image/jpeg;base64,/9j/4A==");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let err = encode_image_file("/nonexistent/photo.png").await.unwrap_err();
        assert!(matches!(err, HueError::ImageRead(_)));
    }

    #[tokio::test]
    async fn test_empty_file_is_read_error() {
        let path = temp_file("empty.png", b"");
        let err = encode_image_file(&path).await.unwrap_err();
        assert!(matches!(err, HueError::ImageRead(_)));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
