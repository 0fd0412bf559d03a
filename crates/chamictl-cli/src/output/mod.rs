//! Output formatting for CLI results.

pub mod table;

pub use table::format_batch_results;

use chamictl_core::codec::{self, DataFormat};
use chamictl_core::http::Envelope;
use serde::Serialize;

use crate::error::Result;

/// Response body reformatted for display, or `None` for an empty body.
pub fn render_body(envelope: &Envelope, format: DataFormat) -> Result<Option<String>> {
    Ok(codec::format_body(&envelope.body, format)?)
}

/// Print a response body to stdout.
pub fn print_body(envelope: &Envelope, format: DataFormat) -> Result<()> {
    if let Some(text) = render_body(envelope, format)? {
        println!("{}", text);
    }
    Ok(())
}

/// Print any serializable value to stdout.
pub fn print_value<T: Serialize + ?Sized>(value: &T, format: DataFormat) -> Result<()> {
    println!("{}", codec::encode(value, format)?);
    Ok(())
}
