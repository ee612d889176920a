use crate::config::AppConfig;
use crate::error::AppError;
use crate::exif::ExifExtractor;
use crate::merge::merge_meta_and_vision_data;
use crate::metadata::{ExifMetadata, ImageMetadataSuggestion, VisionAIResult};
use crate::vision::VisionDescriber;
use crate::walker;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub pending: usize,
    pub extraction_failures: usize,
    /// Images whose vision suggestions came back empty, usually because the call failed.
    pub degraded: usize,
    pub written: Vec<PathBuf>,
}

/// Discovers photos without sidecars, reads their EXIF data, asks the vision model for
/// suggestions and writes one `<id>.json` next to each photo.
///
/// Every stage finishes for all images before the next begins. Within a stage at most
/// `concurrency` images are in flight.
pub struct Pipeline {
    directory: PathBuf,
    concurrency: usize,
    extractor: Arc<dyn ExifExtractor>,
    describer: Arc<dyn VisionDescriber>,
}

impl Pipeline {
    pub fn new(
        directory: impl Into<PathBuf>,
        concurrency: usize,
        extractor: Arc<dyn ExifExtractor>,
        describer: Arc<dyn VisionDescriber>,
    ) -> Self {
        Self {
            directory: directory.into(),
            concurrency: concurrency.max(1),
            extractor,
            describer,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        extractor: Arc<dyn ExifExtractor>,
        describer: Arc<dyn VisionDescriber>,
    ) -> Self {
        Self::new(
            config.grid_directory.clone(),
            config.concurrency,
            extractor,
            describer,
        )
    }

    pub async fn pending_images(&self) -> Result<Vec<PathBuf>, AppError> {
        let directory = self.directory.clone();
        tokio::task::spawn_blocking(move || walker::find_pending_images(&directory)).await?
    }

    pub async fn run(&self) -> Result<RunSummary, AppError> {
        let pending = self.pending_images().await?;
        self.run_pending(pending).await
    }

    /// Runs every stage after discovery for an already discovered list of images.
    pub async fn run_pending(&self, pending: Vec<PathBuf>) -> Result<RunSummary, AppError> {
        let mut summary = RunSummary {
            pending: pending.len(),
            ..Default::default()
        };
        if pending.is_empty() {
            return Ok(summary);
        }

        self.extractor.preflight().await?;

        let extracted = self.extract_all(pending).await;
        summary.extraction_failures = summary.pending - extracted.len();

        let descriptions = self.describe_all(&extracted).await;
        summary.degraded = descriptions.iter().filter(|vision| vision.is_empty()).count();

        let records: Vec<(PathBuf, ImageMetadataSuggestion)> = extracted
            .iter()
            .zip(descriptions.iter())
            .map(|((path, exif), vision)| {
                let record = merge_meta_and_vision_data(exif, vision);
                (sidecar_path(path, &record.id), record)
            })
            .collect();

        summary.written = self.persist_all(records).await?;
        log::info!(
            "Wrote metadata for {} of {} images",
            summary.written.len(),
            summary.pending
        );
        Ok(summary)
    }

    async fn extract_all(&self, pending: Vec<PathBuf>) -> Vec<(PathBuf, ExifMetadata)> {
        log::info!("Extracting EXIF data for {} images", pending.len());
        let extractor = &self.extractor;
        let results: Vec<(PathBuf, Result<ExifMetadata, AppError>)> = stream::iter(pending)
            .map(|path| async move {
                let result = extractor.extract(&path).await;
                (path, result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(path, result)| match result {
                Ok(exif) => Some((path, exif)),
                Err(e) => {
                    log::warn!("Skipping {:?}, EXIF extraction failed: {}", path, e);
                    None
                }
            })
            .collect()
    }

    async fn describe_all(&self, extracted: &[(PathBuf, ExifMetadata)]) -> Vec<VisionAIResult> {
        log::info!("Requesting descriptions for {} images", extracted.len());
        let describer = self.describer.as_ref();
        stream::iter(extracted)
            .map(|(_, exif)| describe_or_default(describer, exif))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn persist_all(
        &self,
        records: Vec<(PathBuf, ImageMetadataSuggestion)>,
    ) -> Result<Vec<PathBuf>, AppError> {
        stream::iter(records)
            .map(|(path, record)| async move {
                write_sidecar(&path, &record).await?;
                Ok::<PathBuf, AppError>(path)
            })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}

/// Asks the describer for suggestions, substituting an empty result on any failure.
pub async fn describe_or_default(describer: &dyn VisionDescriber, exif: &ExifMetadata) -> VisionAIResult {
    match describer.describe(exif).await {
        Ok(result) => {
            log::debug!("Received suggestions for {}", exif.file_name);
            result
        }
        Err(e) => {
            log::warn!("Vision description failed for {}: {}", exif.file_name, e);
            VisionAIResult::default()
        }
    }
}

pub fn sidecar_path(image_path: &Path, id: &str) -> PathBuf {
    image_path.with_file_name(format!("{}.json", id))
}

pub async fn write_sidecar(path: &Path, record: &ImageMetadataSuggestion) -> Result<(), AppError> {
    let mut json = serde_json::to_string_pretty(record)?;
    json.push('\n');
    tokio::fs::write(path, json).await?;
    log::debug!("Metadata saved to: {:?}", path);
    Ok(())
}
