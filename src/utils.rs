use rand::Rng;
use std::path::PathBuf;


const ID_CHARSET: &[u8] = b"0123456789abcdef";

pub fn generate_hex_id(length: u32) -> String {
    let mut rng = rand::thread_rng();

    (0..length).map(
        |_| {
            let idx = rng.gen_range(0..ID_CHARSET.len());
            ID_CHARSET[idx] as char
        }
    ).collect()
}

pub fn current_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}

/// Control socket the browser opens for the current user.
pub fn default_socket_path() -> PathBuf {
    PathBuf::from(format!("/tmp/athena-{}-control.sock", current_uid()))
}

/// Position of the first `\r\n\r\n` in `data`.
pub fn find_blank_line(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}
