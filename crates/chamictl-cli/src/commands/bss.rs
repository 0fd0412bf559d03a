//! Boot script service commands.

use chamictl_core::payload;
use chamictl_core::service::Service;
use chamictl_core::services::bss::{BootParams, BssStatus, NodeQuery};
use chamictl_core::services::BssClient;

use crate::cli::{
    BootParamsCommands, BootParamsFields, BootScriptCommands, BssArgs, BssCommands,
    BssHostsCommands, BssStatusArgs, NodeArgs, PayloadArgs,
};
use crate::context::{Auth, Context};
use crate::error::{CliError, Result};
use crate::output;
use crate::prompt;

/// Run bss command
pub async fn run_bss(args: BssArgs, ctx: &Context) -> Result<()> {
    let uri = args.uri.as_deref();
    let format = ctx.output_format();

    let auth = match args.command {
        BssCommands::BootParams(_) => Auth::Required,
        _ => Auth::Anonymous,
    };
    let bss = BssClient::new(ctx.client(Service::Bss, uri, auth).await?);

    let envelope = match args.command {
        BssCommands::BootParams(bp) => match bp.command {
            BootParamsCommands::Get(node) => bss.get_boot_params(&node_query(node)).await?,
            BootParamsCommands::Add(w) => {
                bss.add_boot_params(&boot_params(w.fields, w.payload).await?).await?
            }
            BootParamsCommands::Set(w) => {
                bss.set_boot_params(&boot_params(w.fields, w.payload).await?).await?
            }
            BootParamsCommands::Update(w) => {
                bss.update_boot_params(&boot_params(w.fields, w.payload).await?).await?
            }
            BootParamsCommands::Delete(d) => {
                let params = boot_params(d.fields, d.payload).await?;
                prompt::require(
                    ctx.confirmer(d.force),
                    "Really delete boot parameters for the given nodes?",
                )?;
                bss.delete_boot_params(&params).await?
            }
        },
        BssCommands::BootScript(bs) => match bs.command {
            BootScriptCommands::Get(node) => {
                if node.xname.is_none() && node.mac.is_none() && node.nid.is_none() {
                    return Err(CliError::InvalidArgument(
                        "one of --xname, --mac or --nid is required".to_string(),
                    ));
                }
                bss.get_boot_script(&node_query(node)).await?
            }
        },
        BssCommands::Status(s) => bss.get_status(status_of(&s)).await?,
        BssCommands::Hosts(h) => match h.command {
            BssHostsCommands::Get(node) => bss.get_hosts(&node_query(node)).await?,
        },
        BssCommands::History(h) => {
            bss.get_endpoint_history(h.xname.as_deref(), h.endpoint.as_deref())
                .await?
        }
        BssCommands::Dumpstate => bss.get_dumpstate().await?,
    };

    output::print_body(&envelope, format)
}

fn node_query(node: NodeArgs) -> NodeQuery {
    NodeQuery {
        xname: node.xname,
        mac: node.mac,
        nid: node.nid,
    }
}

fn status_of(args: &BssStatusArgs) -> BssStatus {
    if args.all {
        BssStatus::All
    } else if args.storage {
        BssStatus::Storage
    } else if args.smd {
        BssStatus::Smd
    } else if args.version {
        BssStatus::Version
    } else {
        BssStatus::Service
    }
}

fn fields_set(fields: &BootParamsFields) -> bool {
    !fields.xnames.is_empty()
        || !fields.macs.is_empty()
        || !fields.nids.is_empty()
        || fields.kernel.is_some()
        || fields.initrd.is_some()
        || fields.params.is_some()
}

/// Boot parameters from `--data`, or from the individual flags.
async fn boot_params(fields: BootParamsFields, payload: PayloadArgs) -> Result<BootParams> {
    let mut params = match payload.data {
        Some(ref data) => {
            if fields_set(&fields) {
                return Err(CliError::InvalidArgument(
                    "--data cannot be combined with boot parameter flags".to_string(),
                ));
            }
            payload::load::<BootParams>(data, payload.format_input).await?
        }
        None => BootParams {
            hosts: fields.xnames,
            macs: fields.macs,
            nids: fields.nids,
            params: fields.params.unwrap_or_default(),
            kernel: fields.kernel.unwrap_or_default(),
            initrd: fields.initrd.unwrap_or_default(),
            cloud_init: None,
        },
    };

    params.check_macs()?;
    if params.has_no_target() {
        return Err(CliError::InvalidArgument(
            "at least one xname, MAC address or NID is required".to_string(),
        ));
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chamictl_core::codec::DataFormat;

    #[tokio::test]
    async fn test_boot_params_from_flags() {
        let fields = BootParamsFields {
            macs: vec!["AA-BB-CC-DD-EE-FF".to_string()],
            kernel: Some("http://s3/kernel".to_string()),
            ..Default::default()
        };
        let bp = boot_params(fields, PayloadArgs::default()).await.unwrap();
        assert_eq!(bp.macs, vec!["aa:bb:cc:dd:ee:ff"]);
        assert_eq!(bp.kernel, "http://s3/kernel");
    }

    #[tokio::test]
    async fn test_boot_params_from_payload() {
        let payload = PayloadArgs {
            data: Some("hosts: [x1000c0s0b0n0]\nparams: console=ttyS0\n".to_string()),
            format_input: DataFormat::Yaml,
        };
        let bp = boot_params(BootParamsFields::default(), payload).await.unwrap();
        assert_eq!(bp.hosts, vec!["x1000c0s0b0n0"]);
        assert_eq!(bp.params, "console=ttyS0");
    }

    #[tokio::test]
    async fn test_boot_params_rejected() {
        // no target
        let fields = BootParamsFields {
            kernel: Some("k".to_string()),
            ..Default::default()
        };
        assert!(boot_params(fields, PayloadArgs::default()).await.is_err());

        // bad MAC
        let fields = BootParamsFields {
            macs: vec!["not-a-mac".to_string()],
            ..Default::default()
        };
        assert!(boot_params(fields, PayloadArgs::default()).await.is_err());

        // payload plus flags
        let fields = BootParamsFields {
            xnames: vec!["x1".to_string()],
            ..Default::default()
        };
        let payload = PayloadArgs {
            data: Some(r#"{"hosts":["x1"]}"#.to_string()),
            format_input: DataFormat::Json,
        };
        assert!(boot_params(fields, payload).await.is_err());
    }

    #[test]
    fn test_status_of() {
        let args = BssStatusArgs {
            all: false,
            storage: true,
            smd: false,
            version: false,
        };
        assert_eq!(status_of(&args), BssStatus::Storage);
    }
}
