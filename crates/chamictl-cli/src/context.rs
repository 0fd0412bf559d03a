//! Per-invocation state shared by every command.

use chamictl_core::codec::DataFormat;
use chamictl_core::config::Config;
use chamictl_core::http::{build_client, ClientOptions, HttpClient};
use chamictl_core::service::Service;
use chamictl_core::token::{self, TokenFlags};
use chamictl_core::uri::{resolve_base_uri, UriOverrides};

use crate::cli::ConnArgs;
use crate::error::Result;
use crate::prompt::{AssumeYes, Confirm, TerminalConfirm};

/// Whether an endpoint needs a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Required,
    Anonymous,
}

/// Loaded configuration plus the global flags, built once in `main` and
/// passed by reference.
pub struct Context {
    pub config: Config,
    pub conn: ConnArgs,
    pub format: Option<DataFormat>,
    interactive: Box<dyn Confirm>,
}

impl Context {
    pub fn new(config: Config, conn: ConnArgs, format: Option<DataFormat>) -> Self {
        Self {
            config,
            conn,
            format,
            interactive: Box::new(TerminalConfirm),
        }
    }

    /// Replace the interactive prompt.
    pub fn with_confirm(mut self, confirm: Box<dyn Confirm>) -> Self {
        self.interactive = confirm;
        self
    }

    /// `--format-output`, defaulting to JSON.
    pub fn output_format(&self) -> DataFormat {
        self.format.unwrap_or_default()
    }

    /// The prompt to use; `force` skips asking.
    pub fn confirmer(&self, force: bool) -> &dyn Confirm {
        if force {
            &AssumeYes
        } else {
            self.interactive.as_ref()
        }
    }

    /// Resolve the base URI and token for `service` and build a client.
    pub async fn client(
        &self,
        service: Service,
        service_uri: Option<&str>,
        auth: Auth,
    ) -> Result<HttpClient> {
        let overrides = UriOverrides {
            cluster: self.conn.cluster.clone(),
            cluster_uri: self.conn.cluster_uri.clone(),
            service_uri: service_uri.map(str::to_string),
        };
        let base_uri = resolve_base_uri(&self.config, service, &overrides)?;
        tracing::debug!(%service, base_uri = %base_uri, "resolved base URI");

        let token = match auth {
            Auth::Required => self.token()?,
            Auth::Anonymous => None,
        };

        let opts = ClientOptions {
            ca_cert: self.conn.cacert.clone(),
            insecure: self.conn.insecure,
        };
        let client = build_client(&opts).await?;

        Ok(HttpClient::new(client, base_uri, token))
    }

    fn token(&self) -> Result<Option<String>> {
        let flags = TokenFlags {
            token: self.conn.token.clone(),
            no_token: self.conn.no_token,
        };
        let token = token::resolve_token(&self.config, &flags, self.conn.cluster.as_deref())?;
        if let Some(ref t) = token {
            token::check_token(t)?;
        }
        Ok(token)
    }
}
