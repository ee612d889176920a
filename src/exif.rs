use crate::error::AppError;
use crate::metadata::ExifMetadata;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

#[async_trait]
pub trait ExifExtractor: Send + Sync {
    /// Confirms the extractor can run at all. An error here aborts the whole run.
    async fn preflight(&self) -> Result<(), AppError>;
    async fn extract(&self, image_path: &Path) -> Result<ExifMetadata, AppError>;
}

/// Reads camera metadata by shelling out to `exiftool -j`.
pub struct ExifTool {
    program: String,
}

impl ExifTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ExifExtractor for ExifTool {
    async fn preflight(&self) -> Result<(), AppError> {
        log::debug!("Probing {} for its version", self.program);
        let output = Command::new(&self.program)
            .arg("-ver")
            .output()
            .await
            .map_err(|e| {
                AppError::ToolMissing(format!(
                    "{} could not be started ({}). Please install exiftool, e.g. `brew install exiftool`.",
                    self.program, e
                ))
            })?;

        if !output.status.success() {
            return Err(AppError::ToolMissing(format!(
                "{} -ver exited with {}",
                self.program, output.status
            )));
        }

        log::info!(
            "Using {} version {}",
            self.program,
            String::from_utf8_lossy(&output.stdout).trim()
        );
        Ok(())
    }

    async fn extract(&self, image_path: &Path) -> Result<ExifMetadata, AppError> {
        log::debug!("Extracting EXIF data for image: {:?}", image_path);
        let output = Command::new(&self.program)
            .arg("-j")
            .arg(image_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(AppError::Exif(format!(
                "{} failed for {:?}: {}",
                self.program,
                image_path,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let metadata = parse_exiftool_output(&String::from_utf8_lossy(&output.stdout))?;
        log::trace!("Extracted metadata for {:?}: {:?}", image_path, metadata);
        Ok(metadata)
    }
}

/// Takes the first element of the JSON array printed by `exiftool -j`.
pub fn parse_exiftool_output(stdout: &str) -> Result<ExifMetadata, AppError> {
    let mut records: Vec<ExifMetadata> = serde_json::from_str(stdout)?;
    if records.is_empty() {
        return Err(AppError::Exif("exiftool returned no records".to_string()));
    }
    Ok(records.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"[{
  "SourceFile": "/abs/path/2R9A2805.jpg",
  "ExifToolVersion": 12.76,
  "FileName": "2R9A2805.jpg",
  "Model": "Canon EOS R6m2",
  "ExposureTime": "1/1000",
  "FNumber": 2.8,
  "ISO": 125,
  "DateTimeOriginal": "2024:03:17 15:06:16",
  "FocalLength": "200.0 mm",
  "LensModel": "RF70-200mm F2.8 L IS USM",
  "ImageSize": "6000x4000"
}]"#;

    #[test]
    fn parses_first_record() {
        let exif = parse_exiftool_output(OUTPUT).unwrap();
        assert_eq!(exif.file_name, "2R9A2805.jpg");
        assert_eq!(exif.source_file, "/abs/path/2R9A2805.jpg");
        assert_eq!(exif.model, "Canon EOS R6m2");
        assert_eq!(exif.lens_model, "RF70-200mm F2.8 L IS USM");
        assert_eq!(exif.f_number, Some(2.8));
        assert_eq!(exif.iso, Some(125));
        assert_eq!(exif.exposure_time, "1/1000");
        assert_eq!(exif.focal_length, "200.0 mm");
        assert_eq!(exif.date_time_original, "2024:03:17 15:06:16");
        assert_eq!(exif.image_size.as_deref(), Some("6000x4000"));
    }

    #[test]
    fn empty_array_is_an_error() {
        assert!(matches!(parse_exiftool_output("[]"), Err(AppError::Exif(_))));
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(
            parse_exiftool_output("Error: File not found"),
            Err(AppError::Json(_))
        ));
    }

    #[tokio::test]
    async fn missing_program_fails_preflight() {
        let tool = ExifTool::new("definitely-not-an-installed-exiftool");
        assert!(matches!(tool.preflight().await, Err(AppError::ToolMissing(_))));
    }
}
