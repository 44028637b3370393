use std::fs;
use std::io::{Error as IoError, ErrorKind};
use std::path::Path;
use tracing::info;

use crate::error::PortalError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub enum CleanupOutcome {
    /// Total exceeded the threshold; every regular file was removed.
    Purged { removed: usize, size_mb: f64 },
    WithinLimit { size_mb: f64 },
}

/// Enforce the media quota: when the regular files directly inside `folder`
/// sum to more than `max_size_mb`, delete all of them.
///
/// Subdirectories are neither counted nor touched.
pub fn enforce_quota(folder: &Path, max_size_mb: f64) -> Result<CleanupOutcome, PortalError> {
    if !folder.exists() {
        return Err(IoError::new(
            ErrorKind::NotFound,
            format!("folder {} does not exist", folder.display()),
        )
        .into());
    }
    if !folder.is_dir() {
        return Err(IoError::new(
            ErrorKind::NotADirectory,
            format!("{} is not a directory", folder.display()),
        )
        .into());
    }

    let mut files = Vec::new();
    let mut total_bytes: u64 = 0;
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        // follows symlinks; dangling links are not files
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        if meta.is_file() {
            total_bytes += meta.len();
            files.push(path);
        }
    }

    let size_mb = total_bytes as f64 / BYTES_PER_MB;
    if size_mb <= max_size_mb {
        info!("Size within bounds: {size_mb:.1} MB of {max_size_mb} MB");
        return Ok(CleanupOutcome::WithinLimit { size_mb });
    }

    for path in &files {
        fs::remove_file(path)?;
    }
    info!("Removed {} files. Size was: {size_mb:.1} MB", files.len());
    Ok(CleanupOutcome::Purged {
        removed: files.len(),
        size_mb,
    })
}
