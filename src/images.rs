//! Image delivery with size-bounded previews.
//!
//! Raw JPEG bytes are cached in memory per identifier, populated on the
//! first read and never evicted: the cache grows with the number of
//! distinct images on disk, trading unbounded memory for disk I/O. A
//! preview request for a file at or above the size threshold decodes the
//! image, shrinks both dimensions by `sqrt(threshold / size)` (byte size
//! scales roughly with pixel count) and re-encodes as JPEG. Best-effort
//! only: the re-encoded preview is not guaranteed to land under the
//! threshold.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ImageError;

/// Previews aim for at most this many bytes (1 MB).
pub const MAX_PREVIEW_SIZE: u64 = 1_000_000;

/// JPEG quality for re-encoded previews.
const PREVIEW_JPEG_QUALITY: u8 = 85;

/// Serves JPEG files from a directory, keyed by short identifier.
pub struct ImageService {
    images_dir: PathBuf,
    fid_pattern: Regex,
    cache: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl ImageService {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            fid_pattern: Regex::new(r"^[0-9A-Za-z_]+$").expect("hardcoded pattern is valid"),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the bytes for `fid`, optionally as a downscaled preview.
    pub async fn get(&self, fid: &str, is_preview: bool) -> Result<Arc<Vec<u8>>, ImageError> {
        if !self.fid_pattern.is_match(fid) {
            return Err(ImageError::InvalidIdentifier(fid.to_string()));
        }

        let raw = self.raw_bytes(fid).await?;
        if !is_preview || (raw.len() as u64) < MAX_PREVIEW_SIZE {
            return Ok(raw);
        }

        // Decode/resize/encode is CPU-bound; keep it off the async workers.
        let scaled = tokio::task::spawn_blocking(move || downscale(&raw))
            .await
            .map_err(|e| ImageError::Io(std::io::Error::other(e)))??;
        Ok(Arc::new(scaled))
    }

    /// Full-resolution bytes, from the cache or from disk on first request.
    ///
    /// Two concurrent misses for the same identifier may both read the
    /// file; the duplicate insert is idempotent.
    async fn raw_bytes(&self, fid: &str) -> Result<Arc<Vec<u8>>, ImageError> {
        if let Some(bytes) = self.cache.lock().await.get(fid) {
            return Ok(Arc::clone(bytes));
        }

        let path = self.images_dir.join(format!("{fid}.jpg"));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => Arc::new(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImageError::NotFound(fid.to_string()));
            }
            Err(e) => return Err(ImageError::Io(e)),
        };

        debug!(fid, size = bytes.len(), "Image loaded into cache");
        self.cache
            .lock()
            .await
            .insert(fid.to_string(), Arc::clone(&bytes));
        Ok(bytes)
    }
}

/// Downscale so the re-encoded JPEG approaches `MAX_PREVIEW_SIZE`.
fn downscale(raw: &[u8]) -> Result<Vec<u8>, ImageError> {
    let img = image::load_from_memory(raw)?;
    let rate = (MAX_PREVIEW_SIZE as f64 / raw.len() as f64).sqrt();
    let width = ((img.width() as f64 * rate) as u32).max(1);
    let height = ((img.height() as f64 * rate) as u32).max(1);

    // Aspect-preserving: neither dimension exceeds the scaled bound.
    let thumb = img.thumbnail(width, height);
    let mut out = Cursor::new(Vec::new());
    thumb.write_to(&mut out, image::ImageOutputFormat::Jpeg(PREVIEW_JPEG_QUALITY))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::{ImageOutputFormat, Rgb, RgbImage};
    use rand::Rng;
    use tempfile::TempDir;

    /// Encode an RGB image as JPEG bytes.
    fn jpeg_bytes(img: RgbImage, quality: u8) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageOutputFormat::Jpeg(quality))
            .unwrap();
        buf.into_inner()
    }

    /// Random noise compresses poorly, so this reliably exceeds the
    /// preview threshold at the given dimensions.
    fn noise_jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        let mut img = RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([rng.r#gen(), rng.r#gen(), rng.r#gen()]);
        }
        jpeg_bytes(img, 100)
    }

    fn write_image(dir: &TempDir, fid: &str, bytes: &[u8]) {
        std::fs::write(dir.path().join(format!("{fid}.jpg")), bytes).unwrap();
    }

    #[tokio::test]
    async fn rejects_invalid_identifiers() {
        let dir = TempDir::new().unwrap();
        let service = ImageService::new(dir.path());

        for bad in ["abc/123", "abc 123", "", "a.b", "../etc"] {
            let err = service.get(bad, false).await.unwrap_err();
            assert!(
                matches!(err, ImageError::InvalidIdentifier(_)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn accepts_word_identifiers() {
        let dir = TempDir::new().unwrap();
        let service = ImageService::new(dir.path());
        write_image(&dir, "abc_123", &jpeg_bytes(RgbImage::new(4, 4), 90));

        assert!(service.get("abc_123", false).await.is_ok());
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let service = ImageService::new(dir.path());

        let err = service.get("nothere", false).await.unwrap_err();
        assert!(matches!(err, ImageError::NotFound(_)));
    }

    #[tokio::test]
    async fn non_preview_returns_stored_bytes_unchanged() {
        let dir = TempDir::new().unwrap();
        let service = ImageService::new(dir.path());
        let original = noise_jpeg(800, 600);
        write_image(&dir, "image_1", &original);

        let served = service.get("image_1", false).await.unwrap();
        assert_eq!(*served, original);
    }

    #[tokio::test]
    async fn preview_below_threshold_returns_original() {
        let dir = TempDir::new().unwrap();
        let service = ImageService::new(dir.path());
        let original = jpeg_bytes(RgbImage::new(32, 32), 90);
        assert!((original.len() as u64) < MAX_PREVIEW_SIZE);
        write_image(&dir, "small", &original);

        let served = service.get("small", true).await.unwrap();
        assert_eq!(*served, original);
    }

    #[tokio::test]
    async fn preview_above_threshold_is_downscaled() {
        let dir = TempDir::new().unwrap();
        let service = ImageService::new(dir.path());
        let original = noise_jpeg(2000, 1500);
        assert!(
            (original.len() as u64) >= MAX_PREVIEW_SIZE,
            "fixture must exceed the threshold (got {} bytes)",
            original.len()
        );
        write_image(&dir, "big", &original);

        let served = service.get("big", true).await.unwrap();
        assert!(served.len() < original.len());

        let rate = (MAX_PREVIEW_SIZE as f64 / original.len() as f64).sqrt();
        let preview = image::load_from_memory(&served).unwrap();
        assert!(preview.width() <= (2000.0 * rate) as u32);
        assert!(preview.height() <= (1500.0 * rate) as u32);
    }

    #[tokio::test]
    async fn repeated_previews_are_identical() {
        let dir = TempDir::new().unwrap();
        let service = ImageService::new(dir.path());
        write_image(&dir, "big", &noise_jpeg(2000, 1500));

        let first = service.get("big", true).await.unwrap();
        let second = service.get("big", true).await.unwrap();
        assert_eq!(*first, *second);
    }

    #[tokio::test]
    async fn cache_survives_file_deletion() {
        let dir = TempDir::new().unwrap();
        let service = ImageService::new(dir.path());
        let original = jpeg_bytes(RgbImage::new(16, 16), 90);
        write_image(&dir, "cached", &original);

        let first = service.get("cached", false).await.unwrap();
        std::fs::remove_file(dir.path().join("cached.jpg")).unwrap();
        let second = service.get("cached", false).await.unwrap();
        assert_eq!(*first, *second);
    }
}
