//! HTTP dispatch against a resolved service base URI.

mod client;
mod envelope;

pub use client::{build_client, ClientOptions, HttpClient, Request};
pub use envelope::Envelope;
