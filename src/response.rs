use crate::error::ProxyError;
use crate::utils::find_blank_line;


#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl BackendResponse {
    /// Parses everything the backend wrote before closing the connection.
    pub fn parse(raw: &[u8]) -> Result<BackendResponse, ProxyError> {
        let headers_end = find_blank_line(raw)
            .ok_or_else(|| ProxyError::protocol("Invalid HTTP response: no header terminator"))?;

        let head = String::from_utf8_lossy(&raw[..headers_end]);
        let mut lines = head.split("\r\n");
        let status = parse_status_line(lines.next().unwrap_or_default())?;

        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        Ok(BackendResponse {
            status,
            headers,
            body: raw[headers_end + 4..].to_vec(),
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The `Content-Length` the backend announced, if it announced a valid one.
    pub fn declared_length(&self) -> Option<usize> {
        self.header("Content-Length").and_then(|v| v.parse().ok())
    }
}

/// `<token> <code> [<reason>]`; the reason phrase may be missing or contain spaces.
fn parse_status_line(line: &str) -> Result<u16, ProxyError> {
    let invalid = || ProxyError::protocol(format!("Invalid status line: {:?}", line));

    let mut parts = line.splitn(3, ' ');
    parts.next().filter(|v| !v.is_empty()).ok_or_else(invalid)?;
    parts.next().and_then(|c| c.parse().ok()).ok_or_else(invalid)
}
