use crate::core::FileSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use ssh2::{ErrorCode, Session};
use std::io;
use std::net::TcpStream;
use std::path::{Path, PathBuf};

// libssh2 SFTP status codes for a path that does not exist.
const LIBSSH2_FX_NO_SUCH_FILE: i32 = 2;
const LIBSSH2_FX_NO_SUCH_PATH: i32 = 10;

/// Password-authenticated SFTP download. One session per fetch; the
/// session and its TCP stream are dropped (closed) on every exit path.
#[derive(Debug, Clone)]
pub struct SftpSource {
    host: String,
    port: u16,
    user: String,
    password: String,
}

impl SftpSource {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
        }
    }

    fn connect(&self) -> Result<Session> {
        let address = format!("{}:{}", self.host, self.port);
        let tcp = TcpStream::connect(&address).map_err(|e| EtlError::ConnectionError {
            message: format!("cannot reach {}: {}", address, e),
        })?;

        let mut session = Session::new().map_err(|e| EtlError::ConnectionError {
            message: format!("session init failed: {}", e),
        })?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| EtlError::ConnectionError {
            message: format!("handshake with {} failed: {}", address, e),
        })?;
        session
            .userauth_password(&self.user, &self.password)
            .map_err(|e| EtlError::ConnectionError {
                message: format!("authentication failed for user '{}': {}", self.user, e),
            })?;

        tracing::info!("SFTP session established with {}", address);
        Ok(session)
    }

    /// Blocking download, run on the blocking pool by `fetch`.
    fn download(&self, remote_path: &str, local_path: &Path) -> Result<u64> {
        let session = self.connect()?;
        let sftp = session.sftp().map_err(|e| EtlError::ConnectionError {
            message: format!("cannot open SFTP channel: {}", e),
        })?;

        let mut remote_file = match sftp.open(Path::new(remote_path)) {
            Ok(file) => file,
            Err(e) if is_no_such_file(&e) => {
                return Err(EtlError::RemoteFileNotFound {
                    path: remote_path.to_string(),
                });
            }
            Err(e) => {
                return Err(EtlError::ConnectionError {
                    message: format!("cannot open remote file '{}': {}", remote_path, e),
                });
            }
        };

        let mut local_file = std::fs::File::create(local_path)?;
        let bytes = io::copy(&mut remote_file, &mut local_file).map_err(|e| {
            EtlError::ConnectionError {
                message: format!("transfer of '{}' failed: {}", remote_path, e),
            }
        })?;

        Ok(bytes)
        // session drops here, closing the connection
    }
}

#[async_trait]
impl FileSource for SftpSource {
    async fn fetch(&self, remote_path: &str, local_path: &str) -> Result<u64> {
        let source = self.clone();
        let remote = remote_path.to_string();
        let local = PathBuf::from(local_path);

        tokio::task::spawn_blocking(move || source.download(&remote, &local))
            .await
            .map_err(|e| EtlError::ConnectionError {
                message: format!("download task failed: {}", e),
            })?
    }
}

fn is_no_such_file(error: &ssh2::Error) -> bool {
    matches!(
        error.code(),
        ErrorCode::SFTP(LIBSSH2_FX_NO_SUCH_FILE) | ErrorCode::SFTP(LIBSSH2_FX_NO_SUCH_PATH)
    )
}
