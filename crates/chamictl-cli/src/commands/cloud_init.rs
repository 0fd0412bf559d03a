//! Cloud-init metadata service commands.

use chamictl_core::codec::DataFormat;
use chamictl_core::service::Service;
use chamictl_core::services::cloud_init::{ConfigEndpoint, NodeData};
use chamictl_core::services::CloudInitClient;

use super::{load_items, print_batch, target_ids};
use crate::cli::{
    CiConfigCommands, CiDeleteArgs, CiGroupCommands, CiNodeCommands, CiStatusArgs,
    CloudInitArgs, CloudInitCommands, NodeDataKind,
};
use crate::context::{Auth, Context};
use crate::error::{CliError, Result};
use crate::output;
use crate::prompt;

/// Run cloud-init command
pub async fn run_cloud_init(args: CloudInitArgs, ctx: &Context) -> Result<()> {
    let ci = CloudInitClient::new(
        ctx.client(Service::CloudInit, args.uri.as_deref(), auth_for(&args.command))
            .await?,
    );
    let format = ctx.output_format();

    match args.command {
        CloudInitCommands::Config(c) => {
            let endpoint = ConfigEndpoint::from_secure(c.secure);
            match c.command {
                CiConfigCommands::Get(id) => {
                    output::print_body(&ci.get_configs(endpoint, id.id.as_deref()).await?, format)
                }
                CiConfigCommands::Add(p) => {
                    let items = load_items(&p.data, p.format_input).await?;
                    let batch = ci.add_configs(endpoint, &items).await?;
                    print_batch(&batch, "add cloud-init configs", format)
                }
                CiConfigCommands::Set(p) => {
                    let items = load_items(&p.data, p.format_input).await?;
                    let batch = ci.set_configs(endpoint, &items).await?;
                    print_batch(&batch, "set cloud-init configs", format)
                }
                CiConfigCommands::Delete(del) => {
                    let ids = confirm_delete(&del, "cloud-init configs", ctx).await?;
                    let batch = ci.delete_configs(endpoint, &ids).await;
                    print_batch(&batch, "delete cloud-init configs", format)
                }
            }
        }
        CloudInitCommands::Group(g) => match g.command {
            CiGroupCommands::Get(id) => output::print_body(&ci.get_groups(id.id.as_deref()).await?, format),
            CiGroupCommands::Add(p) => {
                let items = load_items(&p.data, p.format_input).await?;
                let batch = ci.add_groups(&items).await?;
                print_batch(&batch, "add cloud-init groups", format)
            }
            CiGroupCommands::Set(p) => {
                let items = load_items(&p.data, p.format_input).await?;
                let batch = ci.set_groups(&items).await?;
                print_batch(&batch, "set cloud-init groups", format)
            }
            CiGroupCommands::Delete(del) => {
                let names = confirm_delete(&del, "cloud-init groups", ctx).await?;
                let batch = ci.delete_groups(&names).await;
                print_batch(&batch, "delete cloud-init groups", format)
            }
            CiGroupCommands::Render(r) => match ci.render_group(&r.group, &r.node).await? {
                Some(text) => {
                    println!("{}", text);
                    Ok(())
                }
                None => {
                    tracing::warn!(group = %r.group, node = %r.node, "group has no config to render");
                    Ok(())
                }
            },
        },
        CloudInitCommands::Node(n) => match n.command {
            CiNodeCommands::Get(get) => {
                let batch = ci.get_node_data(node_data(get.kind), &get.ids).await;
                print_batch(&batch, &format!("get {}", node_data(get.kind)), format)
            }
        },
        CloudInitCommands::Status(s) => status(&ci, &s, format).await,
    }
}

/// Status and reads from the open config endpoint go without a token.
fn auth_for(command: &CloudInitCommands) -> Auth {
    match command {
        CloudInitCommands::Status(_) => Auth::Anonymous,
        CloudInitCommands::Config(c) if !c.secure && matches!(c.command, CiConfigCommands::Get(_)) => {
            Auth::Anonymous
        }
        _ => Auth::Required,
    }
}

fn node_data(kind: NodeDataKind) -> NodeData {
    match kind {
        NodeDataKind::MetaData => NodeData::MetaData,
        NodeDataKind::UserData => NodeData::UserData,
        NodeDataKind::VendorData => NodeData::VendorData,
    }
}

async fn confirm_delete(args: &CiDeleteArgs, noun: &str, ctx: &Context) -> Result<Vec<String>> {
    let ids = target_ids(&args.ids, args.data.as_deref(), args.format_input, "name").await?;
    prompt::require(
        ctx.confirmer(args.force),
        &format!("Really delete {} {}?", noun, ids.join(", ")),
    )?;
    Ok(ids)
}

/// `--version` and `--api` print those documents. Otherwise query the version
/// endpoint and report whether the service is up.
async fn status(ci: &CloudInitClient, args: &CiStatusArgs, format: DataFormat) -> Result<()> {
    if args.version {
        output::print_body(&ci.get_version().await?, format)?;
    }
    if args.api {
        output::print_body(&ci.get_api().await?, format)?;
    }
    if args.version || args.api {
        return Ok(());
    }

    let say = |msg: &str| {
        if !args.quiet {
            println!("{}", msg);
        }
    };

    match ci.get_version().await {
        Ok(_) => {
            say("cloud-init is running");
            Ok(())
        }
        Err(e) if e.is_unsuccessful() => {
            tracing::debug!(error = %e, "cloud-init status check");
            say("cloud-init is running, but not normally");
            Err(CliError::Unhealthy)
        }
        Err(e) => {
            tracing::debug!(error = %e, "cloud-init status check");
            say("cloud-init is not running");
            Err(CliError::Unhealthy)
        }
    }
}
