//! Test fixtures shared by the unit tests

#[cfg(test)]
pub mod test_helpers {
    use fridge_protocol::TemperatureData;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Create a temporary directory for testing
    pub fn create_temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    /// Create a temporary file with content
    pub fn create_temp_file_with_content(dir: &TempDir, filename: &str, content: &[u8]) -> PathBuf {
        let file_path = dir.path().join(filename);
        std::fs::write(&file_path, content).expect("Failed to write temp file");
        file_path
    }

    /// Write a small solid-color image in `format`
    pub fn create_test_image(dir: &TempDir, filename: &str, format: ImageFormat) -> PathBuf {
        let file_path = dir.path().join(filename);
        let image = RgbImage::from_pixel(4, 4, Rgb([200, 30, 30]));
        image
            .save_with_format(&file_path, format)
            .expect("Failed to write test image");
        file_path
    }

    /// One sample per hour starting at 08:00
    pub fn sample_history(temperatures: &[f64]) -> Vec<TemperatureData> {
        temperatures
            .iter()
            .enumerate()
            .map(|(i, &temperature)| TemperatureData {
                id: i as i64 + 1,
                temperature,
                humidity: 40 + i as i64,
                timestamp: format!("2024-11-02T{:02}:00:00", 8 + i),
            })
            .collect()
    }
}
