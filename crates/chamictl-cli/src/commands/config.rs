//! Configuration file inspection and editing.

use std::path::{Path, PathBuf};

use chamictl_core::codec::DataFormat;
use chamictl_core::config::file::{
    create_if_not_exists, default_user_config_path, read_config_file, write_config_file,
    SYSTEM_CONFIG_PATH,
};
use chamictl_core::config::{ClusterConfig, Config};
use chamictl_core::service::Service;

use crate::cli::{ConfigArgs, ConfigClusterCommands, ConfigClusterSetArgs, ConfigCommands};
use crate::context::Context;
use crate::error::{CliError, Result};
use crate::output;
use crate::prompt::{self, AssumeYes, Confirm};

/// Run config command
pub async fn run_config(args: ConfigArgs, explicit: Option<&Path>, ctx: &Context) -> Result<()> {
    let confirm: &dyn Confirm = if args.no_confirm {
        &AssumeYes
    } else {
        ctx.confirmer(false)
    };

    match args.command {
        ConfigCommands::Show(show) => {
            let config = match scope_path(args.system, args.user)? {
                Some(path) => read_config_file(&path).await?,
                None => ctx.config.clone(),
            };
            let value = config.get_key(show.key.as_deref().unwrap_or(""))?;
            output::print_value(&value, ctx.format.unwrap_or(DataFormat::Yaml))
        }
        ConfigCommands::Cluster(cluster) => {
            let path = target_path(explicit, args.system)?;
            match cluster.command {
                ConfigClusterCommands::Set(set) => {
                    edit(&path, confirm, |config| {
                        apply_cluster_set(config, &set);
                        Ok(())
                    })
                    .await
                }
                ConfigClusterCommands::Delete(del) => {
                    edit(&path, confirm, |config| {
                        config.remove_cluster(&del.name)?;
                        Ok(())
                    })
                    .await
                }
            }
        }
        ConfigCommands::Set(set) => {
            let path = target_path(explicit, args.system)?;
            edit(&path, confirm, |config| {
                Ok(config.set_key(&set.key, Some(&set.value))?)
            })
            .await
        }
        ConfigCommands::Unset(unset) => {
            let path = target_path(explicit, args.system)?;
            edit(&path, confirm, |config| Ok(config.set_key(&unset.key, None)?)).await
        }
    }
}

fn user_path() -> Result<PathBuf> {
    default_user_config_path()
        .ok_or_else(|| CliError::Other("unable to determine user config directory".to_string()))
}

/// File shown by `config show`; `None` means the loaded configuration.
fn scope_path(system: bool, user: bool) -> Result<Option<PathBuf>> {
    if system {
        Ok(Some(PathBuf::from(SYSTEM_CONFIG_PATH)))
    } else if user {
        user_path().map(Some)
    } else {
        Ok(None)
    }
}

/// File modified by editing commands: `--config`, else the system file with
/// `--system`, else the user file.
fn target_path(explicit: Option<&Path>, system: bool) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None if system => Ok(PathBuf::from(SYSTEM_CONFIG_PATH)),
        None => user_path(),
    }
}

fn apply_cluster_set(config: &mut Config, args: &ConfigClusterSetArgs) {
    let mut update = ClusterConfig {
        uri: args.uri.clone(),
        enable_auth: args.enable_auth,
        ..Default::default()
    };
    for (service, uri) in [
        (Service::Bss, &args.bss_uri),
        (Service::Smd, &args.smd_uri),
        (Service::CloudInit, &args.cloud_init_uri),
        (Service::Pcs, &args.pcs_uri),
    ] {
        if uri.is_some() {
            update.set_service_uri(service, uri.clone());
        }
    }

    config.upsert_cluster(&args.name, &update);
    if args.default {
        config.default_cluster = Some(args.name.clone());
    }
}

/// Read `path`, apply `mutate`, validate and write it back. A missing file is
/// created once `confirm` agrees.
async fn edit<F>(path: &Path, confirm: &dyn Confirm, mutate: F) -> Result<()>
where
    F: FnOnce(&mut Config) -> Result<()>,
{
    if !path.exists() {
        prompt::require(
            confirm,
            &format!("{} does not exist. Create it?", path.display()),
        )?;
        create_if_not_exists(path).await?;
    }

    let mut config = read_config_file(path).await?;
    mutate(&mut config)?;
    config.validate()?;
    write_config_file(path, &config).await?;

    tracing::info!(path = %path.display(), "config updated");
    Ok(())
}
