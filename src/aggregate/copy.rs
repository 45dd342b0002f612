use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::Result;

/// Recursively copy `source` into `destination`, creating it if needed.
///
/// Files already present in `destination` are overwritten when the source has
/// a file at the same relative path; everything else there is left alone.
/// Returns the number of files copied.
pub fn copy_dir_merge(source: &Path, destination: &Path) -> Result<usize> {
    fs::create_dir_all(destination)?;

    let mut copied_files = 0;
    for entry in WalkDir::new(source).min_depth(1).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied_files += 1;
        }
    }
    Ok(copied_files)
}
