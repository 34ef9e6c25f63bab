//! Requests on both legs of the proxy.
//!
//! [`InboundRequest`] is what the HTTP client sent us, already read in full.
//! [`OutboundRequest`] is the minimal HTTP/1.1 request the backend receives:
//! the same method and target, a fixed `Host`, `Connection: close`, and only
//! the `Content-Length` and `Content-Type` of the inbound request.

pub const BACKEND_HOST: &str = "localhost";


#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl InboundRequest {
    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }
}


#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl OutboundRequest {
    pub fn from_inbound(r: &InboundRequest) -> OutboundRequest {
        OutboundRequest {
            method: r.method.clone(),
            path: r.path.clone(),
            content_type: r.content_type().map(str::to_string),
            body: r.body.clone(),
        }
    }

    pub fn request_line(&self) -> String {
        format!("{} {} HTTP/1.1", self.method, self.path)
    }

    /// Serializes the request; `Content-Length` is derived from the body so
    /// the two can never disagree.
    pub fn encode(&self) -> Vec<u8> {
        let mut head = format!("{}\r\nHost: {}\r\nConnection: close\r\n", self.request_line(), BACKEND_HOST);
        if !self.body.is_empty() {
            head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        if let Some(ct) = &self.content_type {
            head.push_str(&format!("Content-Type: {}\r\n", ct));
        }
        head.push_str("\r\n");

        let mut out = Vec::with_capacity(head.len() + self.body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}
