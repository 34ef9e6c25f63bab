#[macro_use] extern crate log;

pub mod api;
pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod logger;
pub mod request;
pub mod response;
pub mod server;
pub mod utils;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::config::{Overrides, Settings};
use crate::error::StartupError;
use crate::server::{check_backend, ProxyServer};


const MODULE: &str = "MAIN";

/// Exposes a Unix domain socket HTTP server on a regular TCP port
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
struct Args {
    /// TCP port to listen on [default: 3333]
    port: Option<u16>,

    /// Backend socket [default: /tmp/athena-<uid>-control.sock]
    socket_path: Option<PathBuf>,

    /// Path to the configurational file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    host: Option<String>,

    /// Backend read/write timeout in milliseconds, 0 waits forever
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// off, error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            socket_path: self.socket_path.clone(),
            timeout_ms: self.timeout_ms,
            log_level: self.log_level.clone(),
        }
    }
}


fn run(args: Args) -> Result<(), StartupError> {
    let cfg = Settings::load(args.config.as_deref(), &args.overrides())?;
    check_backend(&cfg.backend)?;
    logger::init_logger(&cfg.log)?;

    let socket = cfg.backend.socket_path.clone();
    let proxy = ProxyServer::bind(cfg)?;
    let port = proxy.local_addr().map(|a| a.port()).unwrap_or_default();

    info!("[{}] HTTP-to-Unix-socket proxy", MODULE);
    info!("[{}] Socket: {}", MODULE, socket.display());
    info!("[{}] HTTP port: {}", MODULE, port);
    if let Some(path) = &args.config {
        info!("[{}] Config loaded from {}", MODULE, path.display());
    }
    info!("[{}] Proxy server running on http://localhost:{}", MODULE, port);
    info!("[{}]   GET  http://localhost:{}/internal/get_url", MODULE, port);
    info!("[{}]   POST http://localhost:{}/internal/navigate", MODULE, port);
    info!("[{}] Press Ctrl+C to stop", MODULE);

    let handle = proxy.shutdown_handle();
    ctrlc::set_handler(move || {
        info!("[{}] Shutting down proxy server...", MODULE);
        handle.shutdown();
    })?;

    proxy.run();
    info!("[{}] Server stopped", MODULE);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("[{}] {}", MODULE, e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
