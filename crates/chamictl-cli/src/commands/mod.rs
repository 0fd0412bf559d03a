//! Command implementations.

pub mod bss;
pub mod cloud_init;
pub mod config;
pub mod pcs;
pub mod smd;

pub use bss::run_bss;
pub use cloud_init::run_cloud_init;
pub use config::run_config;
pub use pcs::run_pcs;
pub use smd::run_smd;

use chamictl_core::batch::BatchResult;
use chamictl_core::codec::DataFormat;
use chamictl_core::payload;
use chamictl_core::services::ids_from_payload;
use serde_json::Value;

use crate::error::{CliError, Result};
use crate::output::{self, format_batch_results};

/// Load a payload holding one item or a list of items.
pub(crate) async fn load_items(data: &str, format: DataFormat) -> Result<Vec<Value>> {
    match payload::load::<Value>(data, format).await? {
        Value::Array(items) => Ok(items),
        Value::Null => Err(CliError::InvalidArgument("payload is empty".to_string())),
        item => Ok(vec![item]),
    }
}

/// Identifiers to act on: given on the command line, or the `key` field of
/// each payload item.
pub(crate) async fn target_ids(
    ids: &[String],
    data: Option<&str>,
    format: DataFormat,
    key: &str,
) -> Result<Vec<String>> {
    let ids = match data {
        Some(data) => ids_from_payload(&load_items(data, format).await?, key)?,
        None => ids.to_vec(),
    };
    if ids.is_empty() {
        return Err(CliError::InvalidArgument("nothing to delete".to_string()));
    }
    Ok(ids)
}

/// Report a finished batch. Any failed item is logged, a results table is
/// written to stderr and the command fails.
pub(crate) fn finish_batch(batch: &BatchResult, action: &str) -> Result<()> {
    if !batch.has_failures() {
        tracing::info!("{}: {} item(s) succeeded", action, batch.len());
        return Ok(());
    }

    for (id, err) in batch.failures() {
        if err.is_unsuccessful() {
            tracing::error!(id, error = %err, "{} yielded unsuccessful HTTP response", action);
        } else {
            tracing::error!(id, error = %err, "{} failed", action);
        }
    }
    tracing::warn!("{} completed with errors", action);
    eprintln!("{}", format_batch_results(batch));

    Err(CliError::PartialFailure {
        succeeded: batch.succeeded(),
        failed: batch.failed(),
    })
}

/// Print every successful body in order, then report the batch.
pub(crate) fn print_batch(batch: &BatchResult, action: &str, format: DataFormat) -> Result<()> {
    for (_, env) in batch.successes() {
        output::print_body(env, format)?;
    }
    finish_batch(batch, action)
}
