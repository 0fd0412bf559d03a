use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// Status, headers and raw body of one HTTP response.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Envelope {
    pub fn new(status: u16, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `"404 Not Found"` style status line.
    pub fn status_line(&self) -> String {
        match StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
        {
            Some(reason) => format!("{} {}", self.status, reason),
            None => self.status.to_string(),
        }
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(|b| b.is_ascii_whitespace())
    }

    /// Decode the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line() {
        let env = Envelope::new(404, HeaderMap::new(), Bytes::new());
        assert_eq!(env.status_line(), "404 Not Found");
        assert!(!env.is_success());

        let env = Envelope::new(599, HeaderMap::new(), Bytes::new());
        assert_eq!(env.status_line(), "599");
    }

    #[test]
    fn test_body_helpers() {
        let env = Envelope::new(200, HeaderMap::new(), Bytes::from_static(b"{\"a\":1}"));
        assert!(env.is_success());
        assert!(!env.is_empty());
        assert_eq!(env.text(), "{\"a\":1}");
        let v: serde_json::Value = env.json().unwrap();
        assert_eq!(v["a"], 1);

        let empty = Envelope::new(204, HeaderMap::new(), Bytes::from_static(b"\n"));
        assert!(empty.is_empty());
    }
}
