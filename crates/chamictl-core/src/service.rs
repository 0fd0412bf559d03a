//! The fixed set of backend services chamictl talks to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A backend service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    /// Boot script service
    Bss,
    /// State manager / inventory database
    Smd,
    /// Cloud-init metadata service
    CloudInit,
    /// Power control service
    Pcs,
}

impl Service {
    pub const ALL: [Service; 4] = [Service::Bss, Service::Smd, Service::CloudInit, Service::Pcs];

    /// Name used in config keys, flags and log messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Bss => "bss",
            Service::Smd => "smd",
            Service::CloudInit => "cloud-init",
            Service::Pcs => "pcs",
        }
    }

    /// Path prefix appended to a cluster-wide URI to reach the service.
    ///
    /// cloud-init has no common prefix (its open and secure endpoints live at
    /// the root), so the root is used and the endpoints become relative paths.
    pub fn base_path(&self) -> &'static str {
        match self {
            Service::Bss => "/boot/v1",
            Service::Smd => "/hsm/v2",
            Service::CloudInit => "/",
            Service::Pcs => "/",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|svc| svc.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown service: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_names() {
        assert_eq!("bss".parse::<Service>().unwrap(), Service::Bss);
        assert_eq!("Cloud-Init".parse::<Service>().unwrap(), Service::CloudInit);
        assert!("hsm".parse::<Service>().is_err());
    }

    #[test]
    fn test_base_paths() {
        assert_eq!(Service::Bss.base_path(), "/boot/v1");
        assert_eq!(Service::Smd.base_path(), "/hsm/v2");
        assert_eq!(Service::CloudInit.base_path(), "/");
    }
}
