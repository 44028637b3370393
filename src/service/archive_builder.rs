//! Builds the downloadable tar.gz bundle of remote station files.
//!
//! The flow is two-phase: [`plan`] resolves stations and file rows from the
//! database (async), then [`build_archive`] runs the blocking transfer and
//! packing on one remote session. Fetch failures for single files are logged
//! and skipped; nothing is retried.

use chrono::NaiveDate;
use flate2::{Compression, write::GzEncoder};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::remote::{FetchError, RemoteConnector, RemoteSession};
use crate::db::PortalStorage;
use crate::error::PortalError;

/// One remote file scheduled for download.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedFile {
    pub staname: String,
    pub date: NaiveDate,
    pub filename: String,
    pub remote_path: PathBuf,
}

impl PlannedFile {
    /// Name of the staged copy inside the request's staging directory.
    pub fn staging_name(&self) -> String {
        format!("{}_{}_{}", self.staname, self.date, self.filename)
    }

    /// `<STANAME_UPPER>/<YYYY-MM-DD>/<filename>`
    pub fn entry_path(&self) -> String {
        archive_entry_path(&self.staname, self.date, &self.filename)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveOutcome {
    pub archive_name: String,
    pub archive_path: PathBuf,
    pub file_count: usize,
}

pub fn archive_entry_path(staname: &str, date: NaiveDate, filename: &str) -> String {
    format!(
        "{}/{}/{}",
        staname.to_uppercase(),
        date.format("%Y-%m-%d"),
        filename
    )
}

/// `gnss_data_<start>_<end>_<6 hex>.tar.gz`
pub fn archive_file_name(start: NaiveDate, end: NaiveDate) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    format!("gnss_data_{start}_{end}_{}.tar.gz", &tag[..6])
}

/// Resolve requested station names into the list of files to fetch.
///
/// Names without a matching station are skipped silently.
pub async fn plan(
    storage: &PortalStorage,
    stations: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PlannedFile>, PortalError> {
    let mut planned = Vec::new();
    for name in stations {
        let matches = storage.stations_by_name(name).await?;
        if matches.is_empty() {
            info!(station = %name, "station not found; skipping");
            continue;
        }
        for station in matches {
            let files = storage.files_in_range(station.staid, start, end).await?;
            planned.extend(files.into_iter().map(|file| PlannedFile {
                remote_path: Path::new(&file.path).join(&file.filename),
                staname: file.staname.unwrap_or_else(|| station.staname.clone()),
                date: file.date,
                filename: file.filename,
            }));
        }
    }
    Ok(planned)
}

/// Fetch every planned file over one session and pack them into
/// `media_root/archive_name`. Blocking.
///
/// Returns `Ok(None)` (and leaves no archive behind) when nothing was fetched.
pub fn build_archive(
    connector: &dyn RemoteConnector,
    planned: &[PlannedFile],
    media_root: &Path,
    archive_name: &str,
) -> Result<Option<ArchiveOutcome>, PortalError> {
    let mut session = connector.connect()?;

    fs::create_dir_all(media_root)?;
    let archive_path = media_root.join(archive_name);
    let staging = tempfile::tempdir()?;

    let packed = pack(session.as_mut(), planned, staging.path(), &archive_path);
    session.close();

    let file_count = match packed {
        Ok(count) => count,
        Err(e) => {
            remove_partial(&archive_path);
            return Err(e);
        }
    };

    if file_count == 0 {
        remove_partial(&archive_path);
        info!(archive = %archive_name, "no files fetched; archive discarded");
        return Ok(None);
    }

    info!(archive = %archive_name, file_count, "archive ready");
    Ok(Some(ArchiveOutcome {
        archive_name: archive_name.to_string(),
        archive_path,
        file_count,
    }))
}

fn pack(
    session: &mut dyn RemoteSession,
    planned: &[PlannedFile],
    staging: &Path,
    archive_path: &Path,
) -> Result<usize, PortalError> {
    let file = File::create(archive_path)?;
    let mut tar = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    let mut file_count = 0usize;

    for item in planned {
        let local = staging.join(item.staging_name());
        info!(remote = %item.remote_path.display(), "fetching");

        match session.fetch(&item.remote_path, &local) {
            Ok(bytes) => {
                if !local.exists() {
                    warn!(local = %local.display(), "staged file missing after fetch");
                    continue;
                }
                let entry = item.entry_path();
                tar.append_path_with_name(&local, &entry)?;
                file_count += 1;
                info!(entry = %entry, bytes, "added to archive");
            }
            Err(FetchError::NotFound(path)) => {
                warn!(remote = %path.display(), "remote file not found");
            }
            Err(e) => {
                warn!(error = %e, "download failed");
            }
        }
    }

    tar.into_inner()?.finish()?;
    Ok(file_count)
}

fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "failed to remove archive");
    }
}
