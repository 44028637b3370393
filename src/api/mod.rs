//! Clients for the remote data host.

pub mod remote;
pub mod sftp;

pub use remote::{FetchError, RemoteConnector, RemoteSession};
pub use sftp::SftpConnector;
