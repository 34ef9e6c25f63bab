use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;

use crate::config::BackendSettings;
use crate::error::ProxyError;
use crate::logger::get_reporter;


const MODULE: &str = "BACKEND";
const READ_CHUNK: usize = 4096;


/// One-shot connection to the backend socket. It is never reused: the
/// request is written once and the response ends when the backend closes.
pub struct BackendConnection {
    stream: UnixStream,
}

impl BackendConnection {
    pub fn open(cfg: &BackendSettings) -> Result<BackendConnection, ProxyError> {
        let stream = UnixStream::connect(&cfg.socket_path)
            .map_err(|source| ProxyError::Connection { path: cfg.socket_path.clone(), source })
            .map_err(get_reporter(MODULE, "connect"))?;

        let timeout = cfg.timeout();
        stream.set_read_timeout(timeout)
            .and_then(|_| stream.set_write_timeout(timeout))
            .map_err(ProxyError::Backend)?;

        Ok(BackendConnection { stream })
    }

    pub fn send(&mut self, data: &[u8]) -> Result<(), ProxyError> {
        self.stream.write_all(data)
            .and_then(|_| self.stream.flush())
            .map_err(ProxyError::Backend)
            .map_err(get_reporter(MODULE, "send"))
    }

    /// Reads until end-of-stream, whatever the response headers announce.
    pub fn read_to_close(mut self) -> Result<Vec<u8>, ProxyError> {
        let mut response = Vec::with_capacity(READ_CHUNK);
        self.stream.read_to_end(&mut response)
            .map_err(ProxyError::Backend)
            .map_err(get_reporter(MODULE, "receive"))?;

        // both directions are done; errors here only mean the peer beat us to it
        self.stream.shutdown(Shutdown::Both).ok();
        Ok(response)
    }
}
