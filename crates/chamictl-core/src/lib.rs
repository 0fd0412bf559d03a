//! Core library for chamictl.
//!
//! Configuration, base URI and token resolution, HTTP dispatch, payload
//! encoding and the per-service clients used by the `chamictl` binary.

pub mod batch;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod payload;
pub mod service;
pub mod services;
pub mod token;
pub mod uri;

pub use batch::BatchResult;
pub use codec::DataFormat;
pub use config::{ClusterConfig, Config};
pub use error::{CoreError, Result};
pub use http::{Envelope, HttpClient};
pub use service::Service;
