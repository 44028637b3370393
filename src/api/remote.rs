use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

use crate::error::PortalError;

#[derive(Debug, ThisError)]
pub enum FetchError {
    #[error("remote file not found: {0}")]
    NotFound(PathBuf),

    #[error("transfer of {path} failed: {reason}")]
    Transfer { path: PathBuf, reason: String },
}

/// Opens sessions against the remote data host. One session serves one archive build.
pub trait RemoteConnector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn RemoteSession>, PortalError>;
}

/// A live file-transfer session. All calls block.
pub trait RemoteSession {
    /// Copy `remote` into the local file `local`, returning the byte count.
    fn fetch(&mut self, remote: &Path, local: &Path) -> Result<u64, FetchError>;

    fn close(&mut self);
}
