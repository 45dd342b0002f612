// -- submodules
mod copy;

pub use copy::copy_dir_merge;

// -- external imports
use indicatif::{ProgressFinish, ProgressIterator};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::Result;
use crate::observe::{SIMILARITY_FILE, read_similarity};
use crate::progress_bar::progress_bar_style;

/// What a filtering pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSummary {
    /// Direct subdirectories visited
    pub scanned: usize,

    /// Subdirectories without a similarity record
    pub skipped: usize,

    /// Destination folders that received a copy
    pub copied: Vec<PathBuf>,
}

/// Copy every observation folder of `input_dir` whose recorded similarity is
/// `>= threshold` into `output_dir`, keeping the folder name.
///
/// Folders are visited one at a time in directory order. Folders without a
/// record are skipped; a record lacking `metric.similarity` counts as 0.
///
/// # Errors
///
/// Returns `AppError::Io` if the input directory cannot be listed, a record
/// cannot be read, or a copy fails. Folders copied before the failure stay.
pub fn filter_observations(
    input_dir: &Path,
    output_dir: &Path,
    threshold: f64,
) -> Result<AggregateSummary> {
    let start_time = Instant::now();
    fs::create_dir_all(output_dir)?;

    let folders = list_subdirectories(input_dir)?;
    tracing::info!("Scanning {} observation folders in {:?}", folders.len(), input_dir);
    tracing::info!("[Threshold]: {}", threshold);

    let mut summary = AggregateSummary::default();
    for (name, folder) in folders
        .into_iter()
        .progress_with_style(progress_bar_style())
        .with_message("Filtering observations")
        .with_finish(ProgressFinish::WithMessage("Finished".into()))
    {
        summary.scanned += 1;

        let similarity_file = folder.join(SIMILARITY_FILE);
        if !similarity_file.is_file() {
            tracing::debug!("No {} in {:?}, skipping", SIMILARITY_FILE, folder);
            summary.skipped += 1;
            continue;
        }

        let similarity = read_similarity(&similarity_file)?;
        if similarity >= threshold {
            let destination = output_dir.join(&name);
            let files = copy_dir_merge(&folder, &destination)?;
            tracing::debug!(
                "Kept {:?} (similarity {}), copied {} files",
                name,
                similarity,
                files
            );
            summary.copied.push(destination);
        } else {
            tracing::debug!("Filtered out {:?} (similarity {})", name, similarity);
        }
    }

    tracing::info!(
        "Kept {} of {} folders in {:.3?}",
        summary.copied.len(),
        summary.scanned,
        start_time.elapsed()
    );
    Ok(summary)
}

fn list_subdirectories(dir: &Path) -> Result<Vec<(OsString, PathBuf)>> {
    let mut folders = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            folders.push((entry.file_name(), path));
        }
    }
    Ok(folders)
}
