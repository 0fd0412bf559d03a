//! State manager / inventory database client.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{for_each_id, json_body, post_each};
use crate::batch::BatchResult;
use crate::error::{HttpError, Result};
use crate::http::{Envelope, HttpClient, Request};

/// SMD object collections that share get / delete-by-id / delete-all
/// semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Components,
    ComponentEndpoints,
    RedfishEndpoints,
    EthernetInterfaces,
    Groups,
}

impl Collection {
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Components => "/State/Components",
            Collection::ComponentEndpoints => "/Inventory/ComponentEndpoints",
            Collection::RedfishEndpoints => "/Inventory/RedfishEndpoints",
            Collection::EthernetInterfaces => "/Inventory/EthernetInterfaces",
            Collection::Groups => "/groups",
        }
    }

    /// Field naming an item's identifier in payloads.
    pub fn id_key(&self) -> &'static str {
        match self {
            Collection::Groups => "label",
            _ => "ID",
        }
    }

    /// Human-readable name used in log messages and prompts.
    pub fn noun(&self) -> &'static str {
        match self {
            Collection::Components => "components",
            Collection::ComponentEndpoints => "component endpoints",
            Collection::RedfishEndpoints => "redfish endpoints",
            Collection::EthernetInterfaces => "ethernet interfaces",
            Collection::Groups => "groups",
        }
    }

    fn item(&self, method: Method, id: &str) -> Request {
        Request::new(method, self.path()).segment(id)
    }
}

/// Minimal component record accepted by `POST /State/Components`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "Enabled", default)]
    pub enabled: bool,
    #[serde(rename = "Role", default)]
    pub role: String,
    #[serde(rename = "Arch", default)]
    pub arch: String,
    #[serde(rename = "NID", default)]
    pub nid: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSlice {
    #[serde(rename = "Components")]
    pub components: Vec<Component>,
}

/// Component lookup: all, by xname or by node ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentQuery {
    All,
    Xname(String),
    Nid(i64),
}

#[derive(Debug, Clone)]
pub struct SmdClient {
    http: HttpClient,
}

impl SmdClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// `/service/ready`, or `/service/values` with `all`.
    pub async fn get_status(&self, all: bool) -> std::result::Result<Envelope, HttpError> {
        let path = if all { "/service/values" } else { "/service/ready" };
        self.http.send(Request::get(path)).await
    }

    pub async fn get_components(&self, query: &ComponentQuery) -> std::result::Result<Envelope, HttpError> {
        let components = Collection::Components;
        let req = match query {
            ComponentQuery::All => Request::get(components.path()),
            ComponentQuery::Xname(x) => components.item(Method::GET, x),
            ComponentQuery::Nid(n) => Request::get(format!("{}/ByNID/{}", components.path(), n)),
        };
        self.http.send(req).await
    }

    /// Add components in a single bulk request.
    pub async fn post_components(&self, components: &ComponentSlice) -> Result<Envelope> {
        let req = Request::post(Collection::Components.path()).json(json_body(components)?);
        Ok(self.http.send(req).await?)
    }

    /// Get a whole collection, or one item of it.
    pub async fn get(
        &self,
        collection: Collection,
        id: Option<&str>,
    ) -> std::result::Result<Envelope, HttpError> {
        let req = match id {
            Some(id) => collection.item(Method::GET, id),
            None => Request::get(collection.path()),
        };
        self.http.send(req).await
    }

    /// Add items one request at a time.
    pub async fn add_each(&self, collection: Collection, items: &[Value]) -> Result<BatchResult> {
        post_each(&self.http, Request::post(collection.path()), items, collection.id_key()).await
    }

    /// Delete every item of a collection with one request.
    pub async fn delete_all(&self, collection: Collection) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::delete(collection.path())).await
    }

    /// Delete items by id, one request each.
    pub async fn delete_each(&self, collection: Collection, ids: &[String]) -> BatchResult {
        for_each_id(&self.http, ids, |id| collection.item(Method::DELETE, id)).await
    }

    pub async fn get_group_members(&self, label: &str) -> std::result::Result<Envelope, HttpError> {
        self.http.send(members(Method::GET, label)).await
    }

    /// Add members to a group, one request each.
    pub async fn add_group_members(&self, label: &str, ids: &[String]) -> Result<BatchResult> {
        let items: Vec<Value> = ids.iter().map(|id| serde_json::json!({ "id": id })).collect();
        post_each(&self.http, members(Method::POST, label), &items, "id").await
    }

    /// Remove members from a group, one request each.
    pub async fn delete_group_members(&self, label: &str, ids: &[String]) -> BatchResult {
        for_each_id(&self.http, ids, |id| members(Method::DELETE, label).segment(id)).await
    }
}

fn members(method: Method, label: &str) -> Request {
    Request::new(method, Collection::Groups.path())
        .segment(label)
        .segment("members")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{build_client, ClientOptions};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn smd(server: &MockServer) -> SmdClient {
        let client = build_client(&ClientOptions::default()).await.unwrap();
        SmdClient::new(HttpClient::new(client, server.uri(), Some("t".to_string())))
    }

    #[tokio::test]
    async fn test_batch_delete_continues_after_failure() {
        let server = MockServer::start().await;
        for (id, status) in [("A", 200), ("B", 404), ("C", 200)] {
            Mock::given(method("DELETE"))
                .and(path(format!("/State/Components/{}", id)))
                .respond_with(ResponseTemplate::new(status))
                .expect(1)
                .mount(&server)
                .await;
        }

        let ids: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let batch = smd(&server)
            .await
            .delete_each(Collection::Components, &ids)
            .await;

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.failed(), 1);
        let order: Vec<&str> = batch.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        let failed: Vec<&str> = batch.failures().map(|(id, _)| id).collect();
        assert_eq!(failed, vec!["B"]);
    }

    #[tokio::test]
    async fn test_ids_cannot_inject_query_or_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(|req: &wiremock::Request| {
                if req.url.query().is_none() {
                    ResponseTemplate::new(200).set_body_string(req.url.path().to_string())
                } else {
                    ResponseTemplate::new(400)
                }
            })
            .mount(&server)
            .await;

        let client = smd(&server).await;
        let ids = vec!["x1?force=true".to_string()];
        let batch = client.delete_each(Collection::Components, &ids).await;
        let (_, outcome) = batch.iter().next().unwrap();
        assert_eq!(
            outcome.as_ref().unwrap().text(),
            "/State/Components/x1%3Fforce=true"
        );

        let ids = vec!["n1/../../x".to_string()];
        let batch = client.delete_group_members("compute", &ids).await;
        let (_, outcome) = batch.iter().next().unwrap();
        assert_eq!(
            outcome.as_ref().unwrap().text(),
            "/groups/compute/members/n1%2F..%2F..%2Fx"
        );
    }

    #[tokio::test]
    async fn test_post_components_wraps_slice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/State/Components"))
            .and(body_json(json!({
                "Components": [{
                    "ID": "x1000c0s0b0n0",
                    "State": "Ready",
                    "Enabled": true,
                    "Role": "Compute",
                    "Arch": "X86",
                    "NID": 1
                }]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let slice = ComponentSlice {
            components: vec![Component {
                id: "x1000c0s0b0n0".to_string(),
                state: "Ready".to_string(),
                enabled: true,
                role: "Compute".to_string(),
                arch: "X86".to_string(),
                nid: 1,
            }],
        };
        smd(&server).await.post_components(&slice).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_component_by_nid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/State/Components/ByNID/12"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ID":"x1"}"#))
            .mount(&server)
            .await;

        let env = smd(&server)
            .await
            .get_components(&ComponentQuery::Nid(12))
            .await
            .unwrap();
        assert_eq!(env.json::<Value>().unwrap()["ID"], "x1");
    }

    #[tokio::test]
    async fn test_add_groups_each_labelled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/groups"))
            .and(body_json(json!({ "label": "compute" })))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/groups"))
            .and(body_json(json!({ "label": "io" })))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let items = vec![json!({ "label": "compute" }), json!({ "label": "io" })];
        let batch = smd(&server)
            .await
            .add_each(Collection::Groups, &items)
            .await
            .unwrap();
        let failed: Vec<&str> = batch.failures().map(|(id, _)| id).collect();
        assert_eq!(failed, vec!["io"]);
    }

    #[tokio::test]
    async fn test_group_members() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/groups/compute/members"))
            .and(body_json(json!({ "id": "x1" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/groups/compute/members/x1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = smd(&server).await;
        let ids = vec!["x1".to_string()];
        assert!(!client.add_group_members("compute", &ids).await.unwrap().has_failures());
        assert!(!client.delete_group_members("compute", &ids).await.has_failures());
    }
}
