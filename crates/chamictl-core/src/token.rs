//! Access token resolution and checking.
//!
//! Tokens come from `--token` or from a per-cluster environment variable
//! `<NAME>_ACCESS_TOKEN`. They are bearer JWTs; only the time claims are
//! checked here, signatures are the backend's business.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::Config;
use crate::error::TokenError;

/// Tokens expiring within this window pass with a warning.
pub const EXPIRY_WARNING_MINUTES: i64 = 15;

/// Token-related command line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenFlags {
    /// `--token`
    pub token: Option<String>,
    /// `--no-token`
    pub no_token: bool,
}

/// Environment variable holding the access token for `cluster`.
///
/// ```
/// assert_eq!(chamictl_core::token::env_var_name("my-lab 2"), "MY_LAB_2_ACCESS_TOKEN");
/// ```
pub fn env_var_name(cluster: &str) -> String {
    let name: String = cluster
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    format!("{}_ACCESS_TOKEN", name)
}

/// Resolve the token for a request, reading the process environment.
pub fn resolve_token(
    config: &Config,
    flags: &TokenFlags,
    cluster_override: Option<&str>,
) -> Result<Option<String>, TokenError> {
    resolve_token_with(config, flags, cluster_override, |var| {
        std::env::var(var).ok()
    })
}

/// Resolve the token for a request with an explicit environment lookup.
///
/// Returns `None` when no token should be sent: `--no-token`, or a cluster
/// with authentication disabled.
pub fn resolve_token_with<F>(
    config: &Config,
    flags: &TokenFlags,
    cluster_override: Option<&str>,
    lookup: F,
) -> Result<Option<String>, TokenError>
where
    F: Fn(&str) -> Option<String>,
{
    if flags.no_token {
        tracing::debug!("--no-token passed, not sending a token");
        return Ok(None);
    }

    if let Some(ref token) = flags.token {
        return Ok(Some(token.clone()));
    }

    let name = cluster_override
        .or(config.default_cluster.as_deref())
        .ok_or(TokenError::NoCluster)?;

    let entry = config
        .cluster(name)
        .ok_or_else(|| TokenError::UnknownCluster(name.to_string()))?;

    if !entry.cluster.auth_enabled() {
        tracing::debug!(cluster = name, "auth disabled for cluster, not sending a token");
        return Ok(None);
    }

    let var = env_var_name(name);
    tracing::debug!(cluster = name, var = %var, "reading token from environment");

    lookup(&var)
        .filter(|t| !t.is_empty())
        .map(Some)
        .ok_or(TokenError::MissingToken {
            var,
            cluster: name.to_string(),
        })
}

#[derive(Debug, Default, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    iat: Option<i64>,
}

/// Outcome of a token check that passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    ExpiringSoon { remaining: Duration },
}

/// Structure and `nbf` are checked by jsonwebtoken. `exp` must be present but
/// is compared here so the error can say when the token expired.
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.leeway = 0;
    validation.validate_exp = false;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);
    validation
}

/// Check a token's time claims, logging a warning when it is about to
/// expire. Tokens without an expiration time are rejected.
pub fn check_token(token: &str) -> Result<TokenStatus, TokenError> {
    let data = decode::<Claims>(token.trim(), &DecodingKey::from_secret(&[]), &validation())
        .map_err(|e| match e.kind() {
            ErrorKind::MissingRequiredClaim(claim) if claim == "exp" => TokenError::NoExpiry,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed(e.to_string()),
        })?;
    let claims = data.claims;
    let now = Utc::now();

    let exp = timestamp(claims.exp.ok_or(TokenError::NoExpiry)?)?;
    if exp < now {
        return Err(TokenError::Expired {
            ago: format_duration(now - exp),
            at: exp.to_rfc3339(),
        });
    }

    if let Some(iat) = claims.iat {
        let iat = timestamp(iat)?;
        if iat > now {
            return Err(TokenError::IssuedInFuture(iat.to_rfc3339()));
        }
    }

    let remaining = exp - now;
    if remaining <= Duration::minutes(EXPIRY_WARNING_MINUTES) {
        tracing::warn!("token expires soon (in {})", format_duration(remaining));
        Ok(TokenStatus::ExpiringSoon { remaining })
    } else {
        Ok(TokenStatus::Valid)
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| TokenError::Malformed(format!("timestamp out of range: {}", secs)))
}

fn format_duration(d: Duration) -> String {
    let total = d.num_seconds().max(0);
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    match (h, m) {
        (0, 0) => format!("{}s", s),
        (0, _) => format!("{}m{}s", m, s),
        _ => format!("{}h{}m{}s", h, m, s),
    }
}
