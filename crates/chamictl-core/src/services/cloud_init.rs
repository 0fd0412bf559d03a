//! Cloud-init metadata service client and group template rendering.

use std::fmt;

use serde_json::Value;

use super::{for_each_id, json_body, post_each};
use crate::batch::BatchResult;
use crate::error::{CoreError, HttpError, Result};
use crate::http::{Envelope, HttpClient, Request};

pub const PATH_GROUPS: &str = "/cloud-init/admin/groups";
pub const PATH_IMPERSONATION: &str = "/cloud-init/admin/impersonation";
pub const PATH_VERSION: &str = "/cloud-init/version";
pub const PATH_API: &str = "/cloud-init/openapi.json";

/// First line marking a cloud-config as a Jinja template.
const JINJA_HEADER: &str = "## template: jinja";

/// Open or secure config endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigEndpoint {
    #[default]
    Open,
    Secure,
}

impl ConfigEndpoint {
    pub fn from_secure(secure: bool) -> Self {
        if secure {
            ConfigEndpoint::Secure
        } else {
            ConfigEndpoint::Open
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ConfigEndpoint::Open => "/cloud-init",
            ConfigEndpoint::Secure => "/cloud-init-secure",
        }
    }
}

/// Per-node data served to cloud-init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeData {
    MetaData,
    UserData,
    VendorData,
}

impl NodeData {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeData::MetaData => "meta-data",
            NodeData::UserData => "user-data",
            NodeData::VendorData => "vendor-data",
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn named(items: &[Value]) -> Result<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(CoreError::InvalidInput(format!(
                "item {} has no name, which is required to set it",
                i
            ))),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct CloudInitClient {
    http: HttpClient,
}

impl CloudInitClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_configs(
        &self,
        endpoint: ConfigEndpoint,
        id: Option<&str>,
    ) -> std::result::Result<Envelope, HttpError> {
        let mut req = Request::get(endpoint.path());
        if let Some(id) = id {
            req = req.segment(id);
        }
        self.http.send(req).await
    }

    pub async fn add_configs(&self, endpoint: ConfigEndpoint, items: &[Value]) -> Result<BatchResult> {
        post_each(&self.http, Request::post(endpoint.path()), items, "name").await
    }

    /// Replace configs by name. Every item must carry a `name`.
    pub async fn set_configs(&self, endpoint: ConfigEndpoint, items: &[Value]) -> Result<BatchResult> {
        self.put_each(endpoint.path(), items).await
    }

    pub async fn delete_configs(&self, endpoint: ConfigEndpoint, ids: &[String]) -> BatchResult {
        for_each_id(&self.http, ids, |id| Request::delete(endpoint.path()).segment(id)).await
    }

    pub async fn get_groups(&self, name: Option<&str>) -> std::result::Result<Envelope, HttpError> {
        let mut req = Request::get(PATH_GROUPS);
        if let Some(name) = name {
            req = req.segment(name);
        }
        self.http.send(req).await
    }

    pub async fn add_groups(&self, items: &[Value]) -> Result<BatchResult> {
        post_each(&self.http, Request::post(PATH_GROUPS), items, "name").await
    }

    pub async fn set_groups(&self, items: &[Value]) -> Result<BatchResult> {
        self.put_each(PATH_GROUPS, items).await
    }

    pub async fn delete_groups(&self, names: &[String]) -> BatchResult {
        for_each_id(&self.http, names, |name| Request::delete(PATH_GROUPS).segment(name)).await
    }

    /// Fetch `kind` for each node, one request each.
    pub async fn get_node_data(&self, kind: NodeData, ids: &[String]) -> BatchResult {
        for_each_id(&self.http, ids, |id| {
            Request::get(PATH_IMPERSONATION).segment(id).segment(kind.as_str())
        })
        .await
    }

    /// The cloud-config `group` would serve to `node`, unrendered.
    pub async fn get_group_template(
        &self,
        group: &str,
        node: &str,
    ) -> std::result::Result<Envelope, HttpError> {
        let req = Request::get(PATH_IMPERSONATION)
            .segment(node)
            .segment(format!("{}.yaml", group));
        self.http.send(req).await
    }

    /// Render `group`'s cloud-config for `node`.
    ///
    /// Returns `None` when the group has no config to render.
    pub async fn render_group(&self, group: &str, node: &str) -> Result<Option<String>> {
        let template = self.get_group_template(group, node).await?;
        if template.is_empty() {
            return Ok(None);
        }

        let meta_data = self
            .http
            .send(
                Request::get(PATH_IMPERSONATION)
                    .segment(node)
                    .segment(NodeData::MetaData.as_str()),
            )
            .await?;

        render_template(&template.text(), &meta_data.body).map(Some)
    }

    pub async fn get_version(&self) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::get(PATH_VERSION)).await
    }

    pub async fn get_api(&self) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::get(PATH_API)).await
    }

    async fn put_each(&self, base: &str, items: &[Value]) -> Result<BatchResult> {
        let names = named(items)?;
        let bodies = items.iter().map(json_body).collect::<Result<Vec<_>>>()?;

        let mut results = BatchResult::with_capacity(items.len());
        for (name, body) in names.into_iter().zip(bodies) {
            let req = Request::put(base).segment(name.as_str()).json(body);
            let outcome = self.http.send(req).await;
            results.push(name, outcome);
        }
        Ok(results)
    }
}

/// Render a Jinja cloud-config with the node's YAML meta-data available as
/// `ds.meta_data`, dropping the leading template marker line.
pub fn render_template(template: &str, meta_data: &[u8]) -> Result<String> {
    let meta: Value = if meta_data.iter().all(|b| b.is_ascii_whitespace()) {
        Value::Object(Default::default())
    } else {
        crate::codec::decode(meta_data, crate::codec::DataFormat::Yaml)?
    };
    let ctx = serde_json::json!({ "ds": { "meta_data": meta } });

    let env = minijinja::Environment::new();
    let rendered = env.render_str(template, ctx)?;

    Ok(strip_jinja_header(&rendered).to_string())
}

fn strip_jinja_header(text: &str) -> &str {
    let (first, rest) = match text.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (text, ""),
    };

    if first.trim_end_matches('\r') == JINJA_HEADER {
        rest
    } else {
        text
    }
}
