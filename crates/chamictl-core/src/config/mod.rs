//! Cluster configuration model.
//!
//! A [`Config`] is built once at startup (see [`file`]) and then only read.
//! Clusters carry a cluster-wide URI, optional per-service URIs and whether
//! requests to them need an access token.

pub mod file;

pub use file::{ConfigPaths, ConfigStore};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::ConfigError;
use crate::service::Service;

/// Log levels accepted in `log.level`.
pub const LOG_LEVELS: [&str; 5] = ["error", "warning", "info", "debug", "trace"];

/// Log formats accepted in `log.format`.
pub const LOG_FORMATS: [&str; 3] = ["basic", "rfc3339", "json"];

/// Whole-program configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default, skip_serializing_if = "LogConfig::is_empty")]
    pub log: LogConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cluster: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clusters: Vec<ClusterEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LogConfig {
    fn is_empty(&self) -> bool {
        self.level.is_none() && self.format.is_none()
    }
}

/// A named cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterEntry {
    pub name: String,

    #[serde(default)]
    pub cluster: ClusterConfig,
}

/// Connection details for one cluster.
///
/// Every field is optional so that layers (system file, user file, command
/// line) can be merged without clearing values set by a lower layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterConfig {
    /// Cluster-wide base URI, without any service base path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_auth: Option<bool>,

    #[serde(default, skip_serializing_if = "ServiceUri::is_empty")]
    pub bss: ServiceUri,

    #[serde(default, skip_serializing_if = "ServiceUri::is_empty")]
    pub smd: ServiceUri,

    #[serde(default, skip_serializing_if = "ServiceUri::is_empty")]
    pub cloud_init: ServiceUri,

    #[serde(default, skip_serializing_if = "ServiceUri::is_empty")]
    pub pcs: ServiceUri,
}

/// Per-service URI override. Absolute URIs replace the cluster URI entirely;
/// a path is joined onto the cluster URI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceUri {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl ServiceUri {
    fn is_empty(&self) -> bool {
        self.uri.is_none()
    }
}

fn pick<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
    over.clone().or_else(|| base.clone())
}

impl ClusterConfig {
    /// Authentication is on unless a layer explicitly turned it off.
    pub fn auth_enabled(&self) -> bool {
        self.enable_auth.unwrap_or(true)
    }

    pub fn service_uri(&self, service: Service) -> Option<&str> {
        match service {
            Service::Bss => self.bss.uri.as_deref(),
            Service::Smd => self.smd.uri.as_deref(),
            Service::CloudInit => self.cloud_init.uri.as_deref(),
            Service::Pcs => self.pcs.uri.as_deref(),
        }
    }

    pub fn set_service_uri(&mut self, service: Service, uri: Option<String>) {
        let slot = match service {
            Service::Bss => &mut self.bss,
            Service::Smd => &mut self.smd,
            Service::CloudInit => &mut self.cloud_init,
            Service::Pcs => &mut self.pcs,
        };
        slot.uri = uri;
    }

    /// Overlay `over` on top of `self`. Fields unset in `over` keep their
    /// current value.
    pub fn merge(&self, over: &ClusterConfig) -> ClusterConfig {
        ClusterConfig {
            uri: pick(&self.uri, &over.uri),
            enable_auth: pick(&self.enable_auth, &over.enable_auth),
            bss: ServiceUri {
                uri: pick(&self.bss.uri, &over.bss.uri),
            },
            smd: ServiceUri {
                uri: pick(&self.smd.uri, &over.smd.uri),
            },
            cloud_init: ServiceUri {
                uri: pick(&self.cloud_init.uri, &over.cloud_init.uri),
            },
            pcs: ServiceUri {
                uri: pick(&self.pcs.uri, &over.pcs.uri),
            },
        }
    }
}

impl Config {
    /// Look up a cluster by name.
    pub fn cluster(&self, name: &str) -> Option<&ClusterEntry> {
        self.clusters.iter().find(|c| c.name == name)
    }

    /// Overlay `over` on top of `self`, key by key. Clusters are matched by
    /// name; a cluster present in both is merged field by field, new clusters
    /// are appended in order.
    pub fn merge(mut self, over: Config) -> Config {
        self.log.level = pick(&self.log.level, &over.log.level);
        self.log.format = pick(&self.log.format, &over.log.format);
        self.default_cluster = pick(&self.default_cluster, &over.default_cluster);

        for entry in over.clusters {
            match self.clusters.iter_mut().find(|c| c.name == entry.name) {
                Some(existing) => existing.cluster = existing.cluster.merge(&entry.cluster),
                None => self.clusters.push(entry),
            }
        }

        self
    }

    /// Check the invariants a loaded configuration must hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_unique_clusters()?;

        if let Some(ref name) = self.default_cluster {
            if self.cluster(name).is_none() {
                return Err(ConfigError::DanglingDefault(name.clone()));
            }
        }

        Ok(())
    }

    /// Fail on the first cluster name that appears twice.
    pub fn check_unique_clusters(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.clusters.iter().enumerate() {
            if self.clusters[..i].iter().any(|c| c.name == entry.name) {
                return Err(ConfigError::DuplicateCluster(entry.name.clone()));
            }
        }
        Ok(())
    }

    /// Create the named cluster or merge `update` into it.
    pub fn upsert_cluster(&mut self, name: &str, update: &ClusterConfig) {
        match self.clusters.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.cluster = existing.cluster.merge(update),
            None => self.clusters.push(ClusterEntry {
                name: name.to_string(),
                cluster: update.clone(),
            }),
        }
    }

    /// Remove the named cluster, clearing `default-cluster` if it pointed at
    /// it.
    pub fn remove_cluster(&mut self, name: &str) -> Result<ClusterEntry, ConfigError> {
        let idx = self
            .clusters
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownCluster(name.to_string()))?;

        if self.default_cluster.as_deref() == Some(name) {
            self.default_cluster = None;
        }

        Ok(self.clusters.remove(idx))
    }

    /// Value at a dotted key (`log.level`, `clusters.0.name`). An empty key
    /// returns the whole configuration.
    pub fn get_key(&self, key: &str) -> Result<Value, ConfigError> {
        let mut value = serde_yaml::to_value(self)?;
        if key.is_empty() {
            return Ok(value);
        }

        for part in key.split('.') {
            value = match value {
                Value::Mapping(mut map) => map
                    .remove(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?,
                Value::Sequence(mut seq) => {
                    let idx: usize = part
                        .parse()
                        .map_err(|_| ConfigError::UnknownKey(key.to_string()))?;
                    if idx >= seq.len() {
                        return Err(ConfigError::UnknownKey(key.to_string()));
                    }
                    seq.swap_remove(idx)
                }
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            };
        }

        Ok(value)
    }

    /// Set or clear one of the scalar keys (`log.level`, `log.format`,
    /// `default-cluster`).
    pub fn set_key(&mut self, key: &str, value: Option<&str>) -> Result<(), ConfigError> {
        let invalid = |v: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            value: v.to_string(),
        };

        match key {
            "log.level" => {
                if let Some(v) = value {
                    if !LOG_LEVELS.contains(&v) {
                        return Err(invalid(v));
                    }
                }
                self.log.level = value.map(str::to_string);
            }
            "log.format" => {
                if let Some(v) = value {
                    if !LOG_FORMATS.contains(&v) {
                        return Err(invalid(v));
                    }
                }
                self.log.format = value.map(str::to_string);
            }
            "default-cluster" => {
                if let Some(v) = value {
                    if self.cluster(v).is_none() {
                        return Err(ConfigError::UnknownCluster(v.to_string()));
                    }
                }
                self.default_cluster = value.map(str::to_string);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        Ok(())
    }
}
