use std::path::PathBuf;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Certificate, Client, Method};
use url::Url;

use super::Envelope;
use crate::error::HttpError;

/// TLS options shared by every request of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Extra trusted root certificate (PEM).
    pub ca_cert: Option<PathBuf>,
    /// Skip certificate verification.
    pub insecure: bool,
}

/// Build the underlying reqwest client.
pub async fn build_client(opts: &ClientOptions) -> Result<Client, HttpError> {
    let mut builder = Client::builder();

    if let Some(ref path) = opts.ca_cert {
        let pem = tokio::fs::read(path).await.map_err(|e| HttpError::CaCert {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let cert = Certificate::from_pem(&pem).map_err(|e| HttpError::CaCert {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "adding trusted CA certificate");
        builder = builder.add_root_certificate(cert);
    }

    if opts.insecure {
        tracing::warn!("TLS certificate verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| HttpError::Client(e.to_string()))
}

/// A single request relative to a service base URI.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a path segment. It is percent-encoded, so `/`, `?` and `#`
    /// inside an identifier stay part of that segment.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: impl Into<Bytes>) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// HTTP dispatcher bound to one service base URI and an optional bearer
/// token. Sends exactly one request per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_uri: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(client: Client, base_uri: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            base_uri: base_uri.into(),
            token,
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Full request URL: base URI, relative path, encoded segments and query.
    pub fn build_url(
        &self,
        path: &str,
        segments: &[String],
        query: &[(String, String)],
    ) -> Result<Url, HttpError> {
        let raw = format!("{}{}", self.base_uri.trim_end_matches('/'), path);
        let mut url = Url::parse(&raw).map_err(|e| HttpError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| HttpError::InvalidUrl {
                    url: raw.clone(),
                    reason: "cannot append path segments".to_string(),
                })?
                .pop_if_empty()
                .extend(segments);
        }

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// Send a request. Non-2xx responses are returned as
    /// [`HttpError::Unsuccessful`] carrying the full envelope.
    pub async fn send(&self, req: Request) -> Result<Envelope, HttpError> {
        let url = self.build_url(&req.path, &req.segments, &req.query)?;
        let url_str = url.to_string();

        tracing::debug!(method = %req.method, url = %url_str, "sending request");

        let mut builder = self.client.request(req.method, url).headers(req.headers);
        if let Some(ref token) = self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = req.body {
            tracing::trace!(body = %String::from_utf8_lossy(&body), "request body");
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|source| HttpError::Transport {
            url: url_str.clone(),
            source,
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| HttpError::Transport {
                url: url_str.clone(),
                source,
            })?;

        let envelope = Envelope::new(status, headers, body);
        tracing::debug!(status = %envelope.status_line(), url = %url_str, "received response");

        if !envelope.is_success() {
            return Err(HttpError::Unsuccessful {
                url: url_str,
                envelope,
            });
        }

        Ok(envelope)
    }
}
