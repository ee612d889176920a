use anyhow::Result;
use clap::Parser;
use grid_vision::config::{AppConfig, ConfigOverrides};
use grid_vision::exif::ExifTool;
use grid_vision::vision::ChatVisionClient;
use grid_vision::Pipeline;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Suggest titles, alt text and tags for photos that have no metadata sidecar yet.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory containing the `.jpg` photos.
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Additional configuration file, applied after `config/`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of images processed at once per stage.
    #[arg(long)]
    concurrency: Option<usize>,

    #[arg(long)]
    log_level: Option<String>,

    /// Only list the images that would be processed.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::new(ConfigOverrides {
        config_file: args.config,
        grid_directory: args.directory,
        concurrency: args.concurrency,
        log_level: args.log_level,
    })?;

    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    info!("Starting grid_vision for {:?}", config.grid_directory);

    let pending = grid_vision::walker::find_pending_images(&config.grid_directory)?;
    if args.dry_run {
        for path in &pending {
            println!("{}", path.display());
        }
        return Ok(());
    }
    if pending.is_empty() {
        info!("Nothing to do, every image already has metadata");
        return Ok(());
    }

    let extractor = Arc::new(ExifTool::new(config.exiftool_path.clone()));
    let describer = Arc::new(ChatVisionClient::new(&config.vision)?);
    let pipeline = Pipeline::from_config(&config, extractor, describer);

    let summary = match pipeline.run_pending(pending).await {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("Run aborted: {}", e);
            return Err(e.into());
        }
    };

    if summary.extraction_failures > 0 {
        log::warn!(
            "{} images were skipped because their EXIF data could not be read",
            summary.extraction_failures
        );
    }
    if summary.degraded > 0 {
        log::warn!(
            "{} images have empty suggestions because the vision call failed",
            summary.degraded
        );
    }

    info!("Successfully processed {} images", summary.written.len());

    Ok(())
}
