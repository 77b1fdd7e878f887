//! Image loading, size checks and header sniffing shared by all backends.

use base64::Engine;
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{AnalysisError, BackendResult};
use crate::types::{ImageMetadata, ImageSource};

/// Image bytes plus locally sniffed metadata, ready to hand to a backend.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub bytes: Vec<u8>,
    pub metadata: ImageMetadata,
}

impl LoadedImage {
    /// Read the image (from disk for path sources) and sniff its header.
    ///
    /// Unreadable, empty or oversized inputs fail with [`AnalysisError::Input`].
    pub async fn load(source: ImageSource, limits: &LimitsConfig) -> BackendResult<Self> {
        let label = source.describe();
        let input_error = |message: String| AnalysisError::Input {
            image: label.clone(),
            message,
        };

        let (bytes, extension_format) = match source {
            ImageSource::Path(path) => {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| input_error(e.to_string()))?;
                (bytes, format_from_path(&path))
            }
            ImageSource::Bytes(bytes) => (bytes, None),
        };

        if bytes.is_empty() {
            return Err(input_error("image is empty".to_string()));
        }
        let max_bytes = limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if bytes.len() as u64 > max_bytes {
            return Err(input_error(format!(
                "{}MB exceeds the {}MB limit",
                bytes.len() as u64 / (1024 * 1024),
                limits.max_file_size_mb
            )));
        }

        Ok(Self::from_parts(bytes, extension_format))
    }

    /// Wrap in-memory bytes without size checks.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::from_parts(bytes, None)
    }

    fn from_parts(bytes: Vec<u8>, extension_format: Option<String>) -> Self {
        let metadata = sniff_metadata(&bytes, extension_format);
        Self { bytes, metadata }
    }

    /// MIME type matching the sniffed format, or `None` when the format has
    /// no image MIME type we know of.
    pub fn media_type(&self) -> Option<&'static str> {
        let mime = match self.metadata.format.as_str() {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tiff" => "image/tiff",
            "avif" => "image/avif",
            "ico" => "image/x-icon",
            "pnm" => "image/x-portable-anymap",
            _ => return None,
        };
        Some(mime)
    }

    /// Standard base64 encoding of the raw bytes.
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    ///
    /// Unknown formats are labelled `application/octet-stream`.
    pub fn data_url(&self) -> String {
        let mime = self.media_type().unwrap_or("application/octet-stream");
        format!("data:{mime};base64,{}", self.base64())
    }
}

/// Read format and dimensions from the image header.
///
/// The extension-derived format wins when present; otherwise the format is
/// sniffed from the content. Dimensions are 0 when the header is unreadable.
fn sniff_metadata(bytes: &[u8], extension_format: Option<String>) -> ImageMetadata {
    let (sniffed, dimensions) = match image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
    {
        Ok(reader) => {
            let format = reader.format();
            (format, reader.into_dimensions().ok())
        }
        Err(_) => (None, None),
    };

    let format = extension_format
        .or_else(|| sniffed.map(format_to_string))
        .unwrap_or_else(|| "unknown".to_string());
    let (width, height) = dimensions.unwrap_or((0, 0));

    ImageMetadata {
        width,
        height,
        format,
        size_bytes: bytes.len() as u64,
    }
}

fn format_from_path(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    Some(
        ImageFormat::from_extension(ext)
            .map(format_to_string)
            .filter(|f| f != "unknown")
            .unwrap_or_else(|| ext.to_ascii_lowercase()),
    )
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Pnm => "pnm".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_sniff_reads_png_header() {
        let image = LoadedImage::from_bytes(png_bytes(7, 5));
        assert_eq!(image.metadata.width, 7);
        assert_eq!(image.metadata.height, 5);
        assert_eq!(image.metadata.format, "png");
        assert_eq!(image.media_type(), Some("image/png"));
    }

    #[test]
    fn test_sniff_unreadable_bytes() {
        let image = LoadedImage::from_bytes(vec![0, 1, 2, 3, 4]);
        assert_eq!(image.metadata.width, 0);
        assert_eq!(image.metadata.format, "unknown");
        assert_eq!(image.metadata.size_bytes, 5);
        assert_eq!(image.media_type(), None);
        assert!(image
            .data_url()
            .starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_media_type_matches_format() {
        let bmp = {
            let img = image::RgbImage::new(2, 2);
            let mut out = Cursor::new(Vec::new());
            img.write_to(&mut out, ImageFormat::Bmp).unwrap();
            out.into_inner()
        };
        let image = LoadedImage::from_bytes(bmp);
        assert_eq!(image.metadata.format, "bmp");
        assert_eq!(image.media_type(), Some("image/bmp"));
        assert!(image.data_url().starts_with("data:image/bmp;base64,"));

        for (format, mime) in [("tiff", "image/tiff"), ("avif", "image/avif"), ("jpg", "image/jpeg")] {
            let mut image = LoadedImage::from_bytes(vec![1, 2, 3]);
            image.metadata.format = format.to_string();
            assert_eq!(image.media_type(), Some(mime));
        }
    }

    #[test]
    fn test_data_url() {
        let image = LoadedImage::from_bytes(png_bytes(1, 1));
        assert!(image.data_url().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_load_path_uses_extension_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.JPG");
        std::fs::write(&path, png_bytes(3, 2)).unwrap();

        let image = LoadedImage::load(ImageSource::Path(path.clone()), &LimitsConfig::default())
            .await
            .unwrap();
        assert_eq!(image.metadata.format, "jpeg");
        assert_eq!(image.metadata.width, 3);
        assert_eq!(
            image.metadata.size_bytes,
            std::fs::metadata(&path).unwrap().len()
        );
    }

    #[tokio::test]
    async fn test_load_unknown_extension_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.xyz");
        std::fs::write(&path, b"not an image").unwrap();

        let image = LoadedImage::load(ImageSource::Path(path), &LimitsConfig::default())
            .await
            .unwrap();
        assert_eq!(image.metadata.format, "xyz");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_input_error() {
        let err = LoadedImage::load(
            ImageSource::from("/nonexistent/path/ghost.jpg"),
            &LimitsConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Input { .. }));
        assert!(err.to_string().contains("ghost.jpg"));
    }

    #[tokio::test]
    async fn test_load_rejects_oversized_and_empty() {
        let limits = LimitsConfig {
            timeout_ms: 1000,
            max_file_size_mb: 1,
        };
        let err = LoadedImage::load(ImageSource::Bytes(vec![0u8; 1024 * 1024 + 1]), &limits)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("limit"));

        let err = LoadedImage::load(ImageSource::Bytes(Vec::new()), &limits)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_load_with_huge_size_limit() {
        let limits = LimitsConfig {
            timeout_ms: 1000,
            max_file_size_mb: u64::MAX,
        };
        let image = LoadedImage::load(ImageSource::Bytes(png_bytes(2, 2)), &limits)
            .await
            .unwrap();
        assert_eq!(image.metadata.format, "png");

        let limits = LimitsConfig {
            timeout_ms: 1000,
            max_file_size_mb: 1 << 50,
        };
        assert!(LoadedImage::load(ImageSource::Bytes(vec![7u8; 64]), &limits)
            .await
            .is_ok());
    }
}
