//! Base URI resolution.
//!
//! Layers, lowest to highest: the default cluster, the cluster named on the
//! command line, then the URI flags. Each layer is merged over the previous
//! one without clearing fields it leaves unset.

use url::Url;

use crate::config::{ClusterConfig, Config};
use crate::error::ResolveError;
use crate::service::Service;

/// URI-related command line overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriOverrides {
    /// `--cluster`
    pub cluster: Option<String>,
    /// `--cluster-uri`
    pub cluster_uri: Option<String>,
    /// Service-specific `--uri`
    pub service_uri: Option<String>,
}

/// Resolve the base URI used for every request to `service`.
pub fn resolve_base_uri(
    config: &Config,
    service: Service,
    overrides: &UriOverrides,
) -> Result<String, ResolveError> {
    let mut effective = ClusterConfig::default();

    if let Some(ref name) = config.default_cluster {
        let entry = config
            .cluster(name)
            .ok_or_else(|| ResolveError::UnknownCluster(name.clone()))?;
        effective = entry.cluster.clone();
    }

    if let Some(ref name) = overrides.cluster {
        let entry = config
            .cluster(name)
            .ok_or_else(|| ResolveError::UnknownCluster(name.clone()))?;
        effective = entry.cluster.clone();
    }

    let mut flags = ClusterConfig {
        uri: overrides.cluster_uri.clone(),
        ..Default::default()
    };
    flags.set_service_uri(service, overrides.service_uri.clone());

    let effective = effective.merge(&flags);
    tracing::debug!(%service, cluster_uri = ?effective.uri, service_uri = ?effective.service_uri(service), "resolving base URI");

    service_base_uri(&effective, service)
}

/// Final base URI for `service` from an already merged cluster config.
pub fn service_base_uri(cluster: &ClusterConfig, service: Service) -> Result<String, ResolveError> {
    if let Some(svc_uri) = cluster.service_uri(service) {
        if is_absolute(svc_uri) {
            return validate_absolute(svc_uri).map_err(|reason| ResolveError::InvalidServiceUri {
                service,
                uri: svc_uri.to_string(),
                reason,
            });
        }

        if !svc_uri.starts_with('/') {
            return Err(ResolveError::InvalidServiceUri {
                service,
                uri: svc_uri.to_string(),
                reason: "must be an absolute URI or a path starting with '/'".to_string(),
            });
        }

        let base = cluster
            .uri
            .as_deref()
            .ok_or(ResolveError::MissingUri { service })?;
        return join_uri(base, svc_uri);
    }

    match cluster.uri.as_deref() {
        Some(base) => join_uri(base, service.base_path()),
        None => Err(ResolveError::MissingUri { service }),
    }
}

/// Join a path onto a cluster-wide URI. The result has no trailing slash.
pub fn join_uri(base: &str, path: &str) -> Result<String, ResolveError> {
    let base = validate_absolute(base).map_err(|reason| ResolveError::InvalidClusterUri {
        uri: base.to_string(),
        reason,
    })?;

    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return Ok(base);
    }

    if path.starts_with('/') {
        Ok(format!("{}{}", base, path))
    } else {
        Ok(format!("{}/{}", base, path))
    }
}

fn is_absolute(uri: &str) -> bool {
    uri.contains("://")
}

fn validate_absolute(uri: &str) -> Result<String, String> {
    let parsed = Url::parse(uri).map_err(|e| e.to_string())?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme {:?}", other)),
    }

    if parsed.host_str().is_none() {
        return Err("missing host".to_string());
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err("must not contain a query or fragment".to_string());
    }

    Ok(uri.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClusterEntry, ServiceUri};

    fn config() -> Config {
        Config {
            default_cluster: Some("prod".to_string()),
            clusters: vec![
                ClusterEntry {
                    name: "prod".to_string(),
                    cluster: ClusterConfig {
                        uri: Some("https://prod.example.com".to_string()),
                        bss: ServiceUri {
                            uri: Some("http://bss.local".to_string()),
                        },
                        smd: ServiceUri {
                            uri: Some("/smd-proxy".to_string()),
                        },
                        ..Default::default()
                    },
                },
                ClusterEntry {
                    name: "dev".to_string(),
                    cluster: ClusterConfig {
                        uri: Some("https://dev.example.com/".to_string()),
                        ..Default::default()
                    },
                },
            ],
            ..Default::default()
        }
    }

    fn resolve(service: Service, overrides: UriOverrides) -> Result<String, ResolveError> {
        resolve_base_uri(&config(), service, &overrides)
    }

    #[test]
    fn test_absolute_service_uri_used_verbatim() {
        assert_eq!(
            resolve(Service::Bss, UriOverrides::default()).unwrap(),
            "http://bss.local"
        );
    }

    #[test]
    fn test_relative_service_uri_joined_onto_cluster() {
        assert_eq!(
            resolve(Service::Smd, UriOverrides::default()).unwrap(),
            "https://prod.example.com/smd-proxy"
        );
    }

    #[test]
    fn test_cluster_uri_with_base_path() {
        assert_eq!(
            resolve(Service::Pcs, UriOverrides::default()).unwrap(),
            "https://prod.example.com"
        );

        let dev = UriOverrides {
            cluster: Some("dev".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve(Service::Bss, dev.clone()).unwrap(),
            "https://dev.example.com/boot/v1"
        );
        assert_eq!(
            resolve(Service::Smd, dev).unwrap(),
            "https://dev.example.com/hsm/v2"
        );
    }

    #[test]
    fn test_cluster_flag_beats_default_cluster() {
        let overrides = UriOverrides {
            cluster: Some("dev".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve(Service::CloudInit, overrides).unwrap(),
            "https://dev.example.com"
        );
    }

    #[test]
    fn test_flags_override_config() {
        let overrides = UriOverrides {
            cluster_uri: Some("https://flag.example.com".to_string()),
            ..Default::default()
        };
        // config bss.uri still wins over a cluster-wide flag
        assert_eq!(
            resolve(Service::Bss, overrides.clone()).unwrap(),
            "http://bss.local"
        );
        assert_eq!(
            resolve(Service::Pcs, overrides.clone()).unwrap(),
            "https://flag.example.com"
        );

        let overrides = UriOverrides {
            service_uri: Some("https://bss.flag".to_string()),
            ..overrides
        };
        assert_eq!(
            resolve(Service::Bss, overrides).unwrap(),
            "https://bss.flag"
        );
    }

    #[test]
    fn test_unknown_cluster() {
        let overrides = UriOverrides {
            cluster: Some("ghost".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve(Service::Bss, overrides).unwrap_err(),
            ResolveError::UnknownCluster("ghost".to_string())
        );
    }

    #[test]
    fn test_missing_uri() {
        let err = resolve_base_uri(&Config::default(), Service::Smd, &UriOverrides::default())
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingUri {
                service: Service::Smd
            }
        );

        let relative_only = UriOverrides {
            service_uri: Some("/hsm/v2".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_base_uri(&Config::default(), Service::Smd, &relative_only),
            Err(ResolveError::MissingUri { .. })
        ));
    }

    #[test]
    fn test_invalid_uris() {
        let bad_cluster = UriOverrides {
            cluster_uri: Some("ftp://host".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_base_uri(&Config::default(), Service::Pcs, &bad_cluster),
            Err(ResolveError::InvalidClusterUri { .. })
        ));

        let bad_service = UriOverrides {
            service_uri: Some("smd.local".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_base_uri(&Config::default(), Service::Smd, &bad_service),
            Err(ResolveError::InvalidServiceUri { .. })
        ));
    }

    #[test]
    fn test_join_uri() {
        assert_eq!(join_uri("http://a/", "/").unwrap(), "http://a");
        assert_eq!(join_uri("http://a/x", "/y/").unwrap(), "http://a/x/y");
        assert_eq!(join_uri("http://a", "y").unwrap(), "http://a/y");
    }
}
