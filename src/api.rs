use serde_derive::{Deserialize, Serialize};


/// JSON body of every response the proxy produces itself instead of relaying.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> ErrorBody {
        ErrorBody { success: false, error: error.into() }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|e| {
            error!("[API] Failed to serialize error body: {}", e);
            br#"{"success":false}"#.to_vec()
        })
    }
}

pub fn proxy_error_body(message: impl std::fmt::Display) -> Vec<u8> {
    ErrorBody::new(format!("Proxy error: {}", message)).to_bytes()
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn proxy_error_shape() {
        let body: Value = serde_json::from_slice(&proxy_error_body("connection refused")).unwrap();
        assert_eq!(body["success"], Value::Bool(false));
        assert_eq!(body["error"], "Proxy error: connection refused");
    }

    #[test]
    fn message_is_escaped() {
        let raw = proxy_error_body("Invalid status line: \"\\x00\"");
        let body: ErrorBody = serde_json::from_slice(&raw).unwrap();
        assert!(!body.success);
        assert_eq!(body.error, "Proxy error: Invalid status line: \"\\x00\"");
    }
}
