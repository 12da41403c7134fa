//! Utility functions for images, text emphasis and timestamps

use base64::{engine::general_purpose, Engine};
use chrono::NaiveDateTime;
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;

use crate::error::{FridgeError, Result};

/// Timestamp format used by the sensor history endpoint
pub const SENSOR_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Marker wrapping emphasized text in model answers
pub const EMPHASIS_MARKER: &str = "**";

/// Image helpers
pub struct ImageUtils;

impl ImageUtils {
    /// Read an image file and re-encode it as base64 PNG
    pub async fn encode_file_as_png_base64<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FridgeError::file_not_found(path.display().to_string()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FridgeError::io_from_error("Image read", e))?;

        Self::png_base64_from_bytes(&bytes)
    }

    /// Decode any supported image format and re-encode it as base64 PNG
    pub fn png_base64_from_bytes(bytes: &[u8]) -> Result<String> {
        let decoded = image::load_from_memory(bytes)?;

        let mut png = Vec::new();
        decoded.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(Self::encode_base64(&png))
    }

    pub fn encode_base64(data: &[u8]) -> String {
        general_purpose::STANDARD.encode(data)
    }
}

/// A run of text in a model answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Emphasized(&'a str),
}

/// Split `text` on `**` markers; odd runs are emphasized, empty runs dropped
pub fn split_emphasis(text: &str) -> Vec<Segment<'_>> {
    text.split(EMPHASIS_MARKER)
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(index, part)| {
            if index % 2 == 1 {
                Segment::Emphasized(part)
            } else {
                Segment::Plain(part)
            }
        })
        .collect()
}

/// Format a sensor timestamp as `HH:MM`; unparsable timestamps give an empty label
pub fn format_hour(timestamp: &str) -> String {
    NaiveDateTime::parse_from_str(timestamp.trim(), SENSOR_TIMESTAMP_FORMAT)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::test_helpers::*;

    mod unit {
        use super::*;

        #[test]
        fn test_split_emphasis() {
            let segments = split_emphasis("Prenez **deux oeufs** et une **pomme**.");
            assert_eq!(
                segments,
                vec![
                    Segment::Plain("Prenez "),
                    Segment::Emphasized("deux oeufs"),
                    Segment::Plain(" et une "),
                    Segment::Emphasized("pomme"),
                    Segment::Plain("."),
                ]
            );
        }

        #[test]
        fn test_split_emphasis_leading_marker() {
            let segments = split_emphasis("**Omelette** rapide");
            assert_eq!(
                segments,
                vec![Segment::Emphasized("Omelette"), Segment::Plain(" rapide")]
            );
        }

        #[test]
        fn test_split_emphasis_without_markers() {
            assert_eq!(split_emphasis("simple"), vec![Segment::Plain("simple")]);
            assert!(split_emphasis("").is_empty());
        }

        #[test]
        fn test_format_hour() {
            assert_eq!(format_hour("2024-11-02T08:05:00"), "08:05");
            assert_eq!(format_hour("2024-11-02 08:05:00"), "");
            assert_eq!(format_hour("garbage"), "");
        }

        #[test]
        fn test_encode_base64() {
            assert_eq!(ImageUtils::encode_base64(b"fridge"), "ZnJpZGdl");
            assert_eq!(ImageUtils::encode_base64(b""), "");
        }
    }

    mod images {
        use super::*;

        #[tokio::test]
        async fn test_encode_file_as_png_base64() {
            let dir = create_temp_dir();
            let path = create_test_image(&dir, "apple.jpg", ImageFormat::Jpeg);

            let encoded = ImageUtils::encode_file_as_png_base64(&path).await.unwrap();
            let decoded = general_purpose::STANDARD.decode(&encoded).unwrap();

            assert_eq!(image::guess_format(&decoded).unwrap(), ImageFormat::Png);
        }

        #[tokio::test]
        async fn test_encode_missing_file() {
            let err = ImageUtils::encode_file_as_png_base64("/nonexistent/photo.png")
                .await
                .unwrap_err();
            assert_eq!(err.code(), crate::error::ErrorCode::FileNotFound);
        }

        #[tokio::test]
        async fn test_encode_non_image_file() {
            let dir = create_temp_dir();
            let path = create_temp_file_with_content(&dir, "notes.png", b"not an image");

            let err = ImageUtils::encode_file_as_png_base64(&path).await.unwrap_err();
            assert_eq!(err.code(), crate::error::ErrorCode::ImageError);
        }
    }
}
