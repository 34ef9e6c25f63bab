use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use tiny_http::Server;

use crate::config::{BackendSettings, Settings};
use crate::context::Context;
use crate::error::StartupError;
use crate::handlers::handle_request;


const MODULE: &str = "SERVER";


/// Pre-flight check only: the socket may still vanish before a request arrives.
pub fn check_backend(cfg: &BackendSettings) -> Result<(), StartupError> {
    if cfg.socket_path.exists() {
        Ok(())
    } else {
        Err(StartupError::SocketNotFound(cfg.socket_path.clone()))
    }
}


pub struct ProxyServer {
    server: Arc<Server>,
    settings: Arc<Settings>,
}

/// Stops the accept loop from another thread (signal handler, tests).
#[derive(Clone)]
pub struct ShutdownHandle(Arc<Server>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.unblock();
    }
}

impl ProxyServer {
    pub fn bind(settings: Settings) -> Result<ProxyServer, StartupError> {
        let addr = settings.listen_address();
        let server = Server::http(&addr).map_err(|source| {
            error!("[{}] Could not start server at {}: {}", MODULE, addr, source);
            StartupError::Bind { addr: addr.clone(), source }
        })?;

        Ok(ProxyServer {
            server: Arc::new(server),
            settings: Arc::new(settings),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(self.server.clone())
    }

    /// Accepts until unblocked. Every request gets its own thread, so a slow
    /// backend call never holds up the others; requests still in flight at
    /// shutdown are not waited for.
    pub fn run(self) {
        info!(
            "[{}] Forwarding {} to {}",
            MODULE, self.settings.listen_address(), self.settings.backend.socket_path.display()
        );
        for r in self.server.incoming_requests() {
            let settings = self.settings.clone();
            let spawned = thread::Builder::new()
                .name("proxy-request".to_string())
                .spawn(move || handle_request(r, Context::new(settings)));
            if let Err(e) = spawned {
                error!("[{}] Could not spawn request thread: {}", MODULE, e);
            }
        }
        debug!("[{}] Accept loop finished", MODULE);
    }
}
