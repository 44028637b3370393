use ssh2::{ErrorCode, Session, Sftp};
use std::fs::File;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::remote::{FetchError, RemoteConnector, RemoteSession};
use crate::config::RemoteConfig;
use crate::error::PortalError;

// LIBSSH2_FX_NO_SUCH_FILE
const SFTP_NO_SUCH_FILE: i32 = 2;

/// Password-authenticated SSH/SFTP connector for the data host.
pub struct SftpConnector {
    host: String,
    port: u16,
    username: String,
    password: String,
    /// `None` disables both the connect and the IO timeout.
    timeout: Option<Duration>,
}

impl SftpConnector {
    pub fn new(cfg: &RemoteConfig) -> Self {
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            timeout: (cfg.timeout_secs > 0).then(|| Duration::from_secs(cfg.timeout_secs)),
        }
    }

    /// libssh2 takes milliseconds; 0 blocks forever.
    fn session_timeout_ms(&self) -> u32 {
        self.timeout
            .map_or(0, |t| t.as_millis().min(u32::MAX as u128) as u32)
    }
}

impl RemoteConnector for SftpConnector {
    fn connect(&self) -> Result<Box<dyn RemoteSession>, PortalError> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                PortalError::Internal(format!("cannot resolve {}:{}", self.host, self.port))
            })?;
        let tcp = match self.timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.set_timeout(self.session_timeout_ms());
        session.handshake()?;
        session.userauth_password(&self.username, &self.password)?;
        if !session.authenticated() {
            return Err(PortalError::Internal(format!(
                "SSH authentication as {} rejected by {}",
                self.username, self.host
            )));
        }
        let sftp = session.sftp()?;
        info!(host = %self.host, port = self.port, "SFTP session opened");
        Ok(Box::new(SftpSession {
            session,
            sftp: Some(sftp),
        }))
    }
}

struct SftpSession {
    session: Session,
    sftp: Option<Sftp>,
}

impl SftpSession {
    fn transfer_error(path: &Path, reason: impl ToString) -> FetchError {
        FetchError::Transfer {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl RemoteSession for SftpSession {
    fn fetch(&mut self, remote: &Path, local: &Path) -> Result<u64, FetchError> {
        let sftp = self
            .sftp
            .as_ref()
            .ok_or_else(|| Self::transfer_error(remote, "session already closed"))?;

        if let Err(e) = sftp.stat(remote) {
            return Err(match e.code() {
                ErrorCode::SFTP(SFTP_NO_SUCH_FILE) => FetchError::NotFound(PathBuf::from(remote)),
                _ => Self::transfer_error(remote, e),
            });
        }

        let mut src = sftp
            .open(remote)
            .map_err(|e| Self::transfer_error(remote, e))?;
        let mut dst = File::create(local).map_err(|e| Self::transfer_error(remote, e))?;
        io::copy(&mut src, &mut dst).map_err(|e| Self::transfer_error(remote, e))
    }

    fn close(&mut self) {
        // the SFTP channel must go before the session it runs on
        self.sftp.take();
        if let Err(e) = self.session.disconnect(None, "archive complete", None) {
            warn!(error = %e, "SSH disconnect failed");
        } else {
            debug!("SSH session closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_no_timeout() {
        let cfg = RemoteConfig {
            timeout_secs: 0,
            ..RemoteConfig::default()
        };
        let connector = SftpConnector::new(&cfg);
        assert_eq!(connector.timeout, None);
        assert_eq!(connector.session_timeout_ms(), 0);
    }

    #[test]
    fn timeout_applies_to_connect_and_session() {
        let cfg = RemoteConfig {
            timeout_secs: 30,
            ..RemoteConfig::default()
        };
        let connector = SftpConnector::new(&cfg);
        assert_eq!(connector.timeout, Some(Duration::from_secs(30)));
        assert_eq!(connector.session_timeout_ms(), 30_000);
    }
}
