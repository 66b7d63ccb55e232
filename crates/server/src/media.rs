//! Storage of uploaded images.
//!
//! Uploads land in a flat directory under a random name and are then
//! re-encoded in place when the `image` crate can decode them. Re-encoding is
//! best effort: when it fails the original bytes are kept and the failure is
//! only logged.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, ImageReader, ImageResult};
use salvo::http::Mime;

use crate::AppResult;

/// URL prefix under which stored files are served.
pub const DEFAULT_URL_PREFIX: &str = "/api/uploads";
/// Quality used when re-encoding JPEG uploads.
pub const JPEG_QUALITY: u8 = 85;

/// Flat directory of uploaded images.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    /// Creates a store rooted at `root`, serving under [`DEFAULT_URL_PREFIX`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url_prefix: DEFAULT_URL_PREFIX.to_owned(),
        }
    }

    /// Sets the URL prefix returned by [`MediaStore::ingest`].
    #[must_use]
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into().trim_end_matches('/').to_owned();
        self
    }

    /// Upload directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the upload directory if missing.
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Stores the file at `source` and returns the URL it is served from.
    ///
    /// Rejects anything whose declared content type is not `image/*`.
    pub async fn ingest(
        &self,
        content_type: Option<&Mime>,
        original_name: Option<&str>,
        source: &Path,
    ) -> AppResult<String> {
        if !is_image(content_type) {
            let declared = content_type.map_or_else(|| "none".to_owned(), ToString::to_string);
            return Err(gazette_core::Error::UnsupportedMedia(format!(
                "expected an image, got content type {declared}"
            ))
            .into());
        }

        let filename = unique_filename(original_name);
        let dest = self.root.join(&filename);
        tokio::fs::copy(source, &dest).await?;
        tracing::info!(file = %filename, "upload stored");

        let target = dest.clone();
        match tokio::task::spawn_blocking(move || optimize(&target)).await {
            Ok(Ok(())) => tracing::debug!(file = %filename, "upload re-encoded"),
            Ok(Err(e)) => {
                tracing::error!(
                    file = %filename,
                    error = %e,
                    "re-encoding failed, upload kept as is"
                );
            }
            Err(e) => tracing::error!(file = %filename, error = %e, "re-encoding task failed"),
        }

        Ok(format!("{}/{}", self.url_prefix, filename))
    }

    /// Path of a stored file, or `None` if `filename` is not a plain file
    /// name inside the upload directory.
    pub async fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if !is_plain_name(filename) {
            return None;
        }
        let path = self.root.join(filename);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }
}

fn is_image(content_type: Option<&Mime>) -> bool {
    content_type.is_some_and(|mime| mime.type_().as_str() == "image")
}

fn is_plain_name(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains(['/', '\\'])
        && !filename.contains("..")
        && !filename.starts_with('.')
}

/// Random file name keeping the lower-cased extension of `original`.
fn unique_filename(original: Option<&str>) -> String {
    let id = uuid::Uuid::new_v4();
    let extension = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);
    match extension {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

/// Decodes the file and writes it back in the format named by its extension.
fn optimize(path: &Path) -> ImageResult<()> {
    let format = ImageFormat::from_path(path)?;
    let decoded = ImageReader::open(path)?.with_guessed_format()?.decode()?;

    let mut encoded = Cursor::new(Vec::new());
    if format == ImageFormat::Jpeg {
        JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY).encode_image(&decoded.to_rgb8())?;
    } else {
        decoded.write_to(&mut encoded, format)?;
    }

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, encoded.into_inner())?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;
    use crate::AppError;

    fn mime(s: &str) -> Mime {
        s.parse().unwrap()
    }

    fn encoded(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_unique_filename() {
        let name = unique_filename(Some("Photo.JPG"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), 36 + 4);
        assert_ne!(unique_filename(Some("a.png")), unique_filename(Some("a.png")));
        assert_eq!(unique_filename(Some("README")).len(), 36);
        assert_eq!(unique_filename(None).len(), 36);
    }

    #[test]
    fn test_plain_names() {
        assert!(is_plain_name("0b6f.png"));
        for name in ["", "../secret", "a/b.png", "a\\b.png", "..", ".env"] {
            assert!(!is_plain_name(name), "{name}");
        }
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Some(&mime("image/png"))));
        assert!(is_image(Some(&mime("image/svg+xml"))));
        assert!(!is_image(Some(&mime("text/plain"))));
        assert!(!is_image(Some(&mime("application/octet-stream"))));
        assert!(!is_image(None));
    }

    #[tokio::test]
    async fn test_ingest_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, b"hello").unwrap();
        let store = MediaStore::new(dir.path().join("uploads"));
        store.ensure_root().await.unwrap();

        let err = store
            .ingest(Some(&mime("text/plain")), Some("notes.txt"), &source)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Core(gazette_core::Error::UnsupportedMedia(_))
        ));
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_ingest_jpeg_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("upload");
        let rgba = RgbaImage::from_pixel(8, 8, Rgba([10, 120, 200, 128]));
        std::fs::write(
            &source,
            encoded(DynamicImage::ImageRgba8(rgba), ImageFormat::Png),
        )
        .unwrap();
        let store = MediaStore::new(dir.path().join("uploads"));
        store.ensure_root().await.unwrap();

        let url = store
            .ingest(Some(&mime("image/jpeg")), Some("photo.jpeg"), &source)
            .await
            .unwrap();
        let filename = url.strip_prefix("/api/uploads/").unwrap();
        assert!(filename.ends_with(".jpeg"));

        let path = store.resolve(filename).await.unwrap();
        let stored = image::open(&path).unwrap();
        assert_eq!(stored.color(), image::ColorType::Rgb8);
        assert_eq!((stored.width(), stored.height()), (8, 8));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_ingest_keeps_undecodable_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("upload");
        std::fs::write(&source, b"not really a png").unwrap();
        let store = MediaStore::new(dir.path()).url_prefix("/media/");

        let url = store
            .ingest(Some(&mime("image/png")), Some("broken.png"), &source)
            .await
            .unwrap();
        let filename = url.strip_prefix("/media/").unwrap();
        let path = store.resolve(filename).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"not really a png");
    }

    #[tokio::test]
    async fn test_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().join("uploads"));
        store.ensure_root().await.unwrap();
        std::fs::write(dir.path().join("secret"), b"x").unwrap();
        let pixel = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        std::fs::write(
            store.root().join("pic.png"),
            encoded(DynamicImage::ImageRgb8(pixel), ImageFormat::Png),
        )
        .unwrap();

        assert!(store.resolve("pic.png").await.is_some());
        assert!(store.resolve("missing.png").await.is_none());
        assert!(store.resolve("../secret").await.is_none());
    }
}
