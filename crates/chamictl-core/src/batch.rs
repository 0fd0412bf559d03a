//! Per-item results of multi-identifier operations.

use crate::error::HttpError;
use crate::http::Envelope;

/// Ordered outcome of one request per input item. Every item is attempted;
/// a failure does not stop the loop and nothing is rolled back.
#[derive(Debug, Default)]
pub struct BatchResult {
    items: Vec<(String, Result<Envelope, HttpError>)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            items: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, id: impl Into<String>, outcome: Result<Envelope, HttpError>) {
        let id = id.into();
        match outcome {
            Ok(ref env) => tracing::debug!(id = %id, status = env.status, "item succeeded"),
            Err(ref e) => tracing::debug!(id = %id, error = %e, "item failed"),
        }
        self.items.push((id, outcome));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Result<Envelope, HttpError>)> {
        self.items.iter()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|(_, r)| r.is_err())
    }

    /// Failed items in input order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &HttpError)> {
        self.items.iter().filter_map(|(id, r)| match r {
            Err(e) => Some((id.as_str(), e)),
            Ok(_) => None,
        })
    }

    /// Successful envelopes in input order.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &Envelope)> {
        self.items.iter().filter_map(|(id, r)| match r {
            Ok(env) => Some((id.as_str(), env)),
            Err(_) => None,
        })
    }
}

impl IntoIterator for BatchResult {
    type Item = (String, Result<Envelope, HttpError>);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqwest::header::HeaderMap;

    fn env(status: u16) -> Envelope {
        Envelope::new(status, HeaderMap::new(), Bytes::new())
    }

    #[test]
    fn test_counts_and_order() {
        let mut batch = BatchResult::new();
        batch.push("A", Ok(env(200)));
        batch.push(
            "B",
            Err(HttpError::Unsuccessful {
                url: "http://x/B".to_string(),
                envelope: env(404),
            }),
        );
        batch.push("C", Ok(env(204)));

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.failed(), 1);
        assert!(batch.has_failures());

        let failed: Vec<&str> = batch.failures().map(|(id, _)| id).collect();
        assert_eq!(failed, vec!["B"]);
        let ok: Vec<&str> = batch.successes().map(|(id, _)| id).collect();
        assert_eq!(ok, vec!["A", "C"]);
    }

    #[test]
    fn test_empty() {
        let batch = BatchResult::new();
        assert!(batch.is_empty());
        assert!(!batch.has_failures());
    }
}
