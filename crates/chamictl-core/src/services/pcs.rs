//! Power control service client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::json_body;
use crate::error::{CoreError, HttpError, Result};
use crate::http::{Envelope, HttpClient, Request};

pub const PATH_READINESS: &str = "/readiness";
pub const PATH_LIVENESS: &str = "/liveness";
pub const PATH_HEALTH: &str = "/health";
pub const PATH_TRANSITIONS: &str = "/transitions";

/// Power transition operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    On,
    Off,
    SoftOff,
    SoftRestart,
    HardRestart,
    Reinit,
    ForceOff,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::On,
        Operation::Off,
        Operation::SoftOff,
        Operation::SoftRestart,
        Operation::HardRestart,
        Operation::Reinit,
        Operation::ForceOff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::On => "on",
            Operation::Off => "off",
            Operation::SoftOff => "soft-off",
            Operation::SoftRestart => "soft-restart",
            Operation::HardRestart => "hard-restart",
            Operation::Reinit => "reinit",
            Operation::ForceOff => "force-off",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput(format!("invalid operation: {}", s)))
    }
}

#[derive(Debug, Serialize)]
struct Location<'a> {
    xname: &'a str,
}

#[derive(Debug, Serialize)]
struct TransitionRequest<'a> {
    operation: Operation,
    location: Vec<Location<'a>>,
}

/// Which parts of the service state to report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSelection {
    pub all: bool,
    pub storage: bool,
    pub smd: bool,
    pub vault: bool,
}

impl StatusSelection {
    fn wants_health(&self) -> bool {
        self.all || self.storage || self.smd || self.vault
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Health {
    #[serde(default)]
    kv_store: String,
    #[serde(default)]
    state_manager: String,
    #[serde(default)]
    vault: String,
}

/// Reported service state. Fields left empty are omitted from output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PcsStatus {
    #[serde(rename = "pcs", skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub storage: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub smd: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vault: String,
}

#[derive(Debug, Clone)]
pub struct PcsClient {
    http: HttpClient,
}

impl PcsClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_readiness(&self) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::get(PATH_READINESS)).await
    }

    pub async fn get_liveness(&self) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::get(PATH_LIVENESS)).await
    }

    pub async fn get_health(&self) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::get(PATH_HEALTH)).await
    }

    /// `ready` if the readiness endpoint answers 204, else `live` if the
    /// liveness endpoint does.
    pub async fn service_state(&self) -> Result<String> {
        if self.get_readiness().await?.status == 204 {
            return Ok("ready".to_string());
        }
        if self.get_liveness().await?.status == 204 {
            return Ok("live".to_string());
        }
        Err(CoreError::Other("unable to get PCS state".to_string()))
    }

    /// Collect the selected status fields. Without a selection only the
    /// overall service state is reported; `all` adds every health field.
    pub async fn status(&self, sel: StatusSelection) -> Result<PcsStatus> {
        let mut out = PcsStatus::default();

        if sel.wants_health() {
            let health: Health = self
                .get_health()
                .await?
                .json()
                .map_err(crate::error::CodecError::from)?;

            if sel.all || sel.storage {
                out.storage = health.kv_store;
            }
            if sel.all || sel.smd {
                out.smd = health.state_manager;
            }
            if sel.all || sel.vault {
                out.vault = health.vault;
            }
        }

        if sel.all || !sel.wants_health() {
            out.status = self.service_state().await?;
        }

        Ok(out)
    }

    pub async fn create_transition(
        &self,
        operation: Operation,
        xnames: &[String],
    ) -> Result<TransitionCreated> {
        let body = TransitionRequest {
            operation,
            location: xnames.iter().map(|x| Location { xname: x }).collect(),
        };
        let req = Request::post(PATH_TRANSITIONS).json(json_body(&body)?);
        let created = self
            .http
            .send(req)
            .await?
            .json()
            .map_err(crate::error::CodecError::from)?;
        Ok(created)
    }

    pub async fn list_transitions(&self) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::get(PATH_TRANSITIONS)).await
    }

    pub async fn get_transition(&self, id: &str) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::get(PATH_TRANSITIONS).segment(id)).await
    }

    pub async fn abort_transition(&self, id: &str) -> std::result::Result<Envelope, HttpError> {
        self.http.send(Request::delete(PATH_TRANSITIONS).segment(id)).await
    }
}

/// Summary of a newly created transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCreated {
    #[serde(rename = "TransitionID", alias = "transitionID")]
    pub transition_id: String,
    #[serde(rename = "Operation", alias = "operation")]
    pub operation: String,
}
