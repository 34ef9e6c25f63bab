//! Test doubles: a Unix socket backend that records what it receives, and a
//! proxy running on an ephemeral port.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::config::{Overrides, Settings};
use crate::server::{ProxyServer, ShutdownHandle};
use crate::utils::{find_blank_line, generate_hex_id};


pub fn temp_socket_path() -> PathBuf {
    std::env::temp_dir().join(format!("uds-proxy-{}.sock", generate_hex_id(12)))
}


type ReplyFn = dyn Fn(&[u8]) -> Vec<u8> + Send + Sync;

#[derive(Default)]
struct Recorded {
    connections: AtomicUsize,
    requests: Mutex<Vec<Vec<u8>>>,
}

/// Answers every connection with `reply(request)` and then closes it.
pub struct MockBackend {
    path: PathBuf,
    recorded: Arc<Recorded>,
}

impl MockBackend {
    pub fn start<F>(reply: F) -> MockBackend
    where
        F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
    {
        let path = temp_socket_path();
        let listener = UnixListener::bind(&path).unwrap();
        let recorded = Arc::new(Recorded::default());
        let reply: Arc<ReplyFn> = Arc::new(reply);

        let rec = recorded.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                rec.connections.fetch_add(1, Ordering::SeqCst);
                let rec = rec.clone();
                let reply = reply.clone();
                thread::spawn(move || serve(stream, &rec, reply.as_ref()));
            }
        });

        MockBackend { path, recorded }
    }

    pub fn fixed(response: &[u8]) -> MockBackend {
        let response = response.to_vec();
        MockBackend::start(move |_| response.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connections(&self) -> usize {
        self.recorded.connections.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.recorded.requests.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        std::fs::remove_file(&self.path).ok();
    }
}

fn serve(mut stream: UnixStream, rec: &Recorded, reply: &ReplyFn) {
    let request = read_request(&mut stream);
    rec.requests.lock().unwrap().push(request.clone());
    stream.write_all(&reply(&request)).ok();
    stream.shutdown(Shutdown::Both).ok();
}

/// Reads the head and then as many body bytes as `Content-Length` announces.
fn read_request(stream: &mut UnixStream) -> Vec<u8> {
    let mut data = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = find_blank_line(&data) {
            break pos + 4;
        }
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return data,
            Ok(n) => data.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&data[..head_end]).into_owned();
    let length = head.split("\r\n")
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < head_end + length {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => data.extend_from_slice(&chunk[..n]),
        }
    }
    data
}


/// A proxy listening on 127.0.0.1 with an OS-assigned port.
pub struct RunningProxy {
    pub addr: SocketAddr,
    handle: ShutdownHandle,
    thread: Option<JoinHandle<()>>,
}

impl RunningProxy {
    pub fn start(socket_path: &Path, timeout_ms: u64) -> RunningProxy {
        let overrides = Overrides {
            host: Some("127.0.0.1".to_string()),
            port: Some(0),
            socket_path: Some(socket_path.to_path_buf()),
            timeout_ms: Some(timeout_ms),
            ..Overrides::default()
        };
        let server = ProxyServer::bind(Settings::load(None, &overrides).unwrap()).unwrap();
        let addr = server.local_addr().unwrap();
        let handle = server.shutdown_handle();
        let thread = thread::spawn(move || server.run());

        RunningProxy { addr, handle, thread: Some(thread) }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stops the accept loop and waits for its thread.
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.handle.shutdown();
            thread.join().ok();
        }
    }
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        self.halt();
    }
}
