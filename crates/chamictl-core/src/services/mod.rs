//! Thin clients for each backend service.
//!
//! Each client wraps an [`HttpClient`](crate::http::HttpClient) already bound
//! to the service's resolved base URI and token. Operations map one-to-one to
//! backend endpoints; multi-item operations return a
//! [`BatchResult`](crate::batch::BatchResult).

pub mod bss;
pub mod cloud_init;
pub mod pcs;
pub mod smd;

pub use bss::BssClient;
pub use cloud_init::CloudInitClient;
pub use pcs::PcsClient;
pub use smd::SmdClient;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::batch::BatchResult;
use crate::codec;
use crate::error::{CoreError, Result};
use crate::http::{HttpClient, Request};

/// Serialize a request body as JSON.
pub(crate) fn json_body<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    let text = codec::encode(value, codec::DataFormat::Json)?;
    Ok(Bytes::from(text))
}

/// Pull the string field `key` out of each payload item, e.g. the `ID` of
/// SMD objects read from a payload file for deletion.
pub fn ids_from_payload(items: &[Value], key: &str) -> Result<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    CoreError::InvalidInput(format!("payload item {} has no string field {:?}", i, key))
                })
        })
        .collect()
}

/// Send one request per id, in order, collecting every outcome.
pub(crate) async fn for_each_id<F>(http: &HttpClient, ids: &[String], mut request: F) -> BatchResult
where
    F: FnMut(&str) -> Request,
{
    let mut results = BatchResult::with_capacity(ids.len());
    for id in ids {
        let outcome = http.send(request(id)).await;
        results.push(id.clone(), outcome);
    }
    results
}

/// Send `target` once per item with the item as its JSON body, labelling
/// results with the item's `label_key` field (or its index when absent).
pub(crate) async fn post_each(
    http: &HttpClient,
    target: Request,
    items: &[Value],
    label_key: &str,
) -> Result<BatchResult> {
    let bodies = items
        .iter()
        .map(json_body)
        .collect::<Result<Vec<_>>>()?;

    let mut results = BatchResult::with_capacity(items.len());
    for (i, (item, body)) in items.iter().zip(bodies).enumerate() {
        let label = item
            .get(label_key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", i));
        let outcome = http.send(target.clone().json(body)).await;
        results.push(label, outcome);
    }
    Ok(results)
}
