//! Boot script service client.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::json_body;
use crate::error::{CoreError, HttpError, Result};
use crate::http::{Envelope, HttpClient, Request};

pub const PATH_BOOT_PARAMS: &str = "/bootparameters";
pub const PATH_BOOT_SCRIPT: &str = "/bootscript";
pub const PATH_HOSTS: &str = "/hosts";
pub const PATH_HISTORY: &str = "/endpoint-history";
pub const PATH_DUMPSTATE: &str = "/dumpstate";

const MAC_PATTERN: &str = r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$";

fn mac_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MAC_PATTERN).unwrap())
}

/// Boot parameters for a set of nodes, identified by xname, MAC or NID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootParams {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub macs: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nids: Vec<i32>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub params: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kernel: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub initrd: String,

    #[serde(rename = "cloud-init", default, skip_serializing_if = "Option::is_none")]
    pub cloud_init: Option<serde_json::Value>,
}

impl BootParams {
    /// Validate MAC addresses and normalize them to lower case with colons.
    pub fn check_macs(&mut self) -> Result<()> {
        for mac in self.macs.iter_mut() {
            if !mac_regex().is_match(mac) {
                return Err(CoreError::InvalidInput(format!("invalid MAC address: {}", mac)));
            }
            *mac = mac.to_ascii_lowercase().replace('-', ":");
        }
        Ok(())
    }

    /// True when no node identifier is set.
    pub fn has_no_target(&self) -> bool {
        self.hosts.is_empty() && self.macs.is_empty() && self.nids.is_empty()
    }
}

/// Node selector for single-node queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeQuery {
    pub xname: Option<String>,
    pub mac: Option<String>,
    pub nid: Option<i32>,
}

impl NodeQuery {
    fn apply(&self, mut req: Request) -> Request {
        if let Some(ref x) = self.xname {
            req = req.query("name", x);
        }
        if let Some(ref m) = self.mac {
            req = req.query("mac", m);
        }
        if let Some(n) = self.nid {
            req = req.query("nid", n.to_string());
        }
        req
    }
}

/// Which status endpoint to query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BssStatus {
    #[default]
    Service,
    All,
    Storage,
    Smd,
    Version,
}

impl BssStatus {
    pub fn path(&self) -> &'static str {
        match self {
            BssStatus::Service => "/service/status",
            BssStatus::All => "/service/status/all",
            BssStatus::Storage => "/service/storage/status",
            BssStatus::Smd => "/service/hsm",
            BssStatus::Version => "/service/version",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BssClient {
    http: HttpClient,
}

impl BssClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_boot_params(&self, query: &NodeQuery) -> std::result::Result<Envelope, HttpError> {
        self.http.send(query.apply(Request::get(PATH_BOOT_PARAMS))).await
    }

    pub async fn add_boot_params(&self, bp: &BootParams) -> Result<Envelope> {
        let req = Request::post(PATH_BOOT_PARAMS).json(json_body(bp)?);
        Ok(self.http.send(req).await?)
    }

    pub async fn set_boot_params(&self, bp: &BootParams) -> Result<Envelope> {
        let req = Request::put(PATH_BOOT_PARAMS).json(json_body(bp)?);
        Ok(self.http.send(req).await?)
    }

    pub async fn update_boot_params(&self, bp: &BootParams) -> Result<Envelope> {
        let req = Request::patch(PATH_BOOT_PARAMS).json(json_body(bp)?);
        Ok(self.http.send(req).await?)
    }

    pub async fn delete_boot_params(&self, bp: &BootParams) -> Result<Envelope> {
        let req = Request::delete(PATH_BOOT_PARAMS).json(json_body(bp)?);
        Ok(self.http.send(req).await?)
    }

    pub async fn get_boot_script(&self, query: &NodeQuery) -> std::result::Result<Envelope, HttpError> {
        self.http.send(query.apply(Request::get(PATH_BOOT_SCRIPT))).await
    }

    pub async fn get_status(&self, which: BssStatus) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::get(which.path())).await
    }

    pub async fn get_hosts(&self, query: &NodeQuery) -> std::result::Result<Envelope, HttpError> {
        self.http.send(query.apply(Request::get(PATH_HOSTS))).await
    }

    pub async fn get_endpoint_history(
        &self,
        xname: Option<&str>,
        endpoint: Option<&str>,
    ) -> std::result::Result<Envelope, HttpError> {
        let mut req = Request::get(PATH_HISTORY);
        if let Some(x) = xname {
            req = req.query("name", x);
        }
        if let Some(e) = endpoint {
            req = req.query("endpoint", e);
        }
        self.http.send(req).await
    }

    pub async fn get_dumpstate(&self) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::get(PATH_DUMPSTATE)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{build_client, ClientOptions};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn bss(server: &MockServer, token: Option<&str>) -> BssClient {
        let client = build_client(&ClientOptions::default()).await.unwrap();
        BssClient::new(HttpClient::new(
            client,
            server.uri(),
            token.map(str::to_string),
        ))
    }

    #[test]
    fn test_check_macs() {
        let mut bp = BootParams {
            macs: vec!["DE-AD-BE-EF-00-01".to_string(), "de:ad:be:ef:00:02".to_string()],
            ..Default::default()
        };
        bp.check_macs().unwrap();
        assert_eq!(bp.macs, vec!["de:ad:be:ef:00:01", "de:ad:be:ef:00:02"]);

        let mut bad = BootParams {
            macs: vec!["de:ad:be:ef:00".to_string()],
            ..Default::default()
        };
        assert!(matches!(bad.check_macs(), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_boot_params_serialization_skips_empty() {
        let bp = BootParams {
            hosts: vec!["x1000c0s0b0n0".to_string()],
            kernel: "http://s3/kernel".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&bp).unwrap(),
            serde_json::json!({ "hosts": ["x1000c0s0b0n0"], "kernel": "http://s3/kernel" })
        );
        assert!(!bp.has_no_target());
        assert!(BootParams::default().has_no_target());
    }

    #[tokio::test]
    async fn test_get_boot_params_by_xname() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bootparameters"))
            .and(query_param("name", "x1"))
            .and(header("authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let query = NodeQuery {
            xname: Some("x1".to_string()),
            ..Default::default()
        };
        let env = bss(&server, Some("t")).await.get_boot_params(&query).await.unwrap();
        assert_eq!(env.text(), "[]");
    }

    #[tokio::test]
    async fn test_add_boot_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bootparameters"))
            .and(body_json(serde_json::json!({ "macs": ["de:ad:be:ef:00:01"], "params": "quiet" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let bp = BootParams {
            macs: vec!["de:ad:be:ef:00:01".to_string()],
            params: "quiet".to_string(),
            ..Default::default()
        };
        bss(&server, None).await.add_boot_params(&bp).await.unwrap();
    }

    #[tokio::test]
    async fn test_status_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/storage/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"storage":"connected"}"#))
            .mount(&server)
            .await;

        let env = bss(&server, None)
            .await
            .get_status(BssStatus::Storage)
            .await
            .unwrap();
        assert!(env.text().contains("connected"));
    }

    #[tokio::test]
    async fn test_boot_script_error_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bootscript"))
            .respond_with(ResponseTemplate::new(404).set_body_string("unknown node"))
            .mount(&server)
            .await;

        let err = bss(&server, None)
            .await
            .get_boot_script(&NodeQuery {
                nid: Some(7),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.envelope().unwrap().text(), "unknown node");
    }
}
