use crate::error::AppError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the `.jpg` files in `directory` that have no `.json` sidecar with the same stem.
///
/// Only the top level of the directory is inspected. The result is sorted by path.
pub fn find_pending_images(directory: &Path) -> Result<Vec<PathBuf>, AppError> {
    log::info!("Checking for images to process in {:?}", directory);

    let mut images = Vec::new();
    let mut sidecars = HashSet::new();

    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            log::trace!("Skipping non-file entry: {:?}", entry.path());
            continue;
        }
        let path = entry.path();
        match path.extension().and_then(|s| s.to_str()) {
            Some("jpg") => {
                log::trace!("Discovered image: {:?}", path);
                images.push(path.to_path_buf());
            }
            Some("json") => {
                if let Some(stem) = path.file_stem() {
                    sidecars.insert(stem.to_os_string());
                }
            }
            _ => log::trace!("Skipping file with unsupported extension: {:?}", path),
        }
    }

    let mut pending: Vec<PathBuf> = images
        .into_iter()
        .filter(|image| {
            image
                .file_stem()
                .map(|stem| !sidecars.contains(stem))
                .unwrap_or(false)
        })
        .collect();
    pending.sort();

    log::info!(
        "Found {} {} without metadata",
        pending.len(),
        if pending.len() == 1 { "image" } else { "images" }
    );

    Ok(pending)
}
