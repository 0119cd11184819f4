//! Filesystem-backed asset store.
//!
//! Uploads (logos, composites, banner art) are written under one upload
//! directory with generated names and served back from `/api/images/{name}`.
//! Reads refuse any path that could escape the upload root.

use std::path::{Component, Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use uuid::Uuid;

/// Errors from asset storage.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Filename contains path separators, parent components, or other
    /// traversal material.
    #[error("invalid asset name")]
    InvalidName,

    /// No stored asset under that name.
    #[error("asset not found")]
    NotFound,

    /// Not a decodable `data:` URI.
    #[error("invalid data uri")]
    InvalidDataUri,

    /// Unsupported or unrecognized image content type.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("asset io: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem asset store rooted at the configured upload directory.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Open (creating if needed) an asset store at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Io`] if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Store `bytes` under a fresh name with the given extension. Returns
    /// the public URL path clients use to fetch it back.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Io`] on write failure.
    pub async fn save(&self, bytes: &[u8], extension: &str) -> Result<String, AssetError> {
        if !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AssetError::InvalidName);
        }
        let name = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(self.root.join(&name), bytes).await?;
        Ok(format!("/api/images/{name}"))
    }

    /// Read a stored asset by its bare filename.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::InvalidName`] for traversal attempts,
    /// [`AssetError::NotFound`] for missing files.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AssetError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Map a client-supplied name to a path strictly inside the root.
    ///
    /// The name must be a single normal path component; separators, `..`,
    /// and absolute paths are rejected before touching the filesystem.
    fn resolve(&self, name: &str) -> Result<PathBuf, AssetError> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(AssetError::InvalidName);
        }
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == name => {}
            _ => return Err(AssetError::InvalidName),
        }
        Ok(self.root.join(name))
    }

    /// The MIME type implied by a stored asset's extension.
    #[must_use]
    pub fn content_type(name: &str) -> &'static str {
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

/// Decode a `data:image/...;base64,` URI into (extension, bytes).
///
/// # Errors
///
/// Returns [`AssetError::InvalidDataUri`] for anything that is not a
/// well-formed base64 image data URI, and [`AssetError::UnsupportedType`]
/// for non-image payloads.
pub fn decode_data_uri(uri: &str) -> Result<(&'static str, Vec<u8>), AssetError> {
    let rest = uri.strip_prefix("data:").ok_or(AssetError::InvalidDataUri)?;
    let (header, payload) = rest.split_once(";base64,").ok_or(AssetError::InvalidDataUri)?;
    let extension = match header {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        other => return Err(AssetError::UnsupportedType(other.to_owned())),
    };
    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| AssetError::InvalidDataUri)?;
    Ok((extension, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> AssetStore {
        let dir = std::env::temp_dir().join(format!("stitchpress-assets-{}", Uuid::new_v4()));
        AssetStore::new(dir).expect("create store")
    }

    #[tokio::test]
    async fn test_save_then_read_roundtrip() {
        let store = temp_store();
        let url = store.save(b"pixels", "png").await.expect("save");
        let name = url.rsplit('/').next().expect("name");
        assert!(url.starts_with("/api/images/"));
        assert!(name.ends_with(".png"));

        let bytes = store.read(name).await.expect("read");
        assert_eq!(bytes, b"pixels");
    }

    #[tokio::test]
    async fn test_traversal_names_rejected() {
        let store = temp_store();
        for name in [
            "../secret.txt",
            "..",
            "a/../b.png",
            "/etc/passwd",
            "dir\\file.png",
            "",
        ] {
            assert!(
                matches!(store.read(name).await, Err(AssetError::InvalidName)),
                "{name:?} must be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_asset_is_not_found() {
        let store = temp_store();
        assert!(matches!(
            store.read("nope.png").await,
            Err(AssetError::NotFound)
        ));
    }

    #[test]
    fn test_decode_data_uri() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(b"imagedata"));
        let (ext, bytes) = decode_data_uri(&uri).expect("decode");
        assert_eq!(ext, "png");
        assert_eq!(bytes, b"imagedata");
    }

    #[test]
    fn test_decode_rejects_non_image() {
        let uri = format!("data:text/html;base64,{}", STANDARD.encode(b"<html>"));
        assert!(matches!(
            decode_data_uri(&uri),
            Err(AssetError::UnsupportedType(_))
        ));
        assert!(matches!(
            decode_data_uri("not a uri"),
            Err(AssetError::InvalidDataUri)
        ));
    }

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(AssetStore::content_type("a.png"), "image/png");
        assert_eq!(AssetStore::content_type("a.jpeg"), "image/jpeg");
        assert_eq!(AssetStore::content_type("a.bin"), "application/octet-stream");
    }
}
