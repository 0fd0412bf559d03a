//! State manager / inventory database commands.

use chamictl_core::codec::DataFormat;
use chamictl_core::payload;
use chamictl_core::service::Service;
use chamictl_core::services::smd::{Collection, Component, ComponentQuery, ComponentSlice};
use chamictl_core::services::SmdClient;
use serde_json::Value;

use super::{finish_batch, load_items, print_batch, target_ids};
use crate::cli::{
    CollectionCommands, ComponentAddArgs, ComponentCommands, DeleteArgs, GroupCommands,
    GroupMemberCommands, SmdArgs, SmdCommands,
};
use crate::context::{Auth, Context};
use crate::error::{CliError, CodecError, Result};
use crate::output;
use crate::prompt;

/// Run smd command
pub async fn run_smd(args: SmdArgs, ctx: &Context) -> Result<()> {
    let auth = match args.command {
        SmdCommands::Status(_) => Auth::Anonymous,
        _ => Auth::Required,
    };
    let smd = SmdClient::new(ctx.client(Service::Smd, args.uri.as_deref(), auth).await?);
    let format = ctx.output_format();

    match args.command {
        SmdCommands::Status(s) => output::print_body(&smd.get_status(s.all).await?, format),
        SmdCommands::Component(c) => match c.command {
            ComponentCommands::Get(get) => {
                let query = match (get.xname, get.nid) {
                    (Some(x), _) => ComponentQuery::Xname(x),
                    (None, Some(n)) => ComponentQuery::Nid(n),
                    (None, None) => ComponentQuery::All,
                };
                output::print_body(&smd.get_components(&query).await?, format)
            }
            ComponentCommands::Add(add) => {
                let components = components(add).await?;
                tracing::debug!(count = components.components.len(), "adding components");
                output::print_body(&smd.post_components(&components).await?, format)
            }
            ComponentCommands::Delete(del) => {
                delete(&smd, Collection::Components, del, ctx).await
            }
        },
        SmdCommands::Compep(c) => collection(&smd, Collection::ComponentEndpoints, c.command, ctx).await,
        SmdCommands::Rfe(c) => collection(&smd, Collection::RedfishEndpoints, c.command, ctx).await,
        SmdCommands::Iface(c) => collection(&smd, Collection::EthernetInterfaces, c.command, ctx).await,
        SmdCommands::Group(g) => match g.command {
            GroupCommands::Get(id) => {
                output::print_body(&smd.get(Collection::Groups, id.id.as_deref()).await?, format)
            }
            GroupCommands::Add(p) => add(&smd, Collection::Groups, &p.data, p.format_input, format).await,
            GroupCommands::Delete(del) => delete(&smd, Collection::Groups, del, ctx).await,
            GroupCommands::Member(m) => match m.command {
                GroupMemberCommands::Get(get) => {
                    output::print_body(&smd.get_group_members(&get.label).await?, format)
                }
                GroupMemberCommands::Add(edit) => {
                    let batch = smd.add_group_members(&edit.label, &edit.ids).await?;
                    finish_batch(&batch, "add group members")
                }
                GroupMemberCommands::Delete(edit) => {
                    prompt::require(
                        ctx.confirmer(edit.force),
                        &format!(
                            "Really remove {} from group {}?",
                            edit.ids.join(", "),
                            edit.label
                        ),
                    )?;
                    let batch = smd.delete_group_members(&edit.label, &edit.ids).await;
                    finish_batch(&batch, "delete group members")
                }
            },
        },
    }
}

async fn collection(
    smd: &SmdClient,
    coll: Collection,
    command: CollectionCommands,
    ctx: &Context,
) -> Result<()> {
    let format = ctx.output_format();
    match command {
        CollectionCommands::Get(id) => output::print_body(&smd.get(coll, id.id.as_deref()).await?, format),
        CollectionCommands::Add(p) => add(smd, coll, &p.data, p.format_input, format).await,
        CollectionCommands::Delete(del) => delete(smd, coll, del, ctx).await,
    }
}

async fn add(
    smd: &SmdClient,
    coll: Collection,
    data: &str,
    format_input: DataFormat,
    format: DataFormat,
) -> Result<()> {
    let items = load_items(data, format_input).await?;
    let batch = smd.add_each(coll, &items).await?;
    print_batch(&batch, &format!("add {}", coll.noun()), format)
}

async fn delete(smd: &SmdClient, coll: Collection, args: DeleteArgs, ctx: &Context) -> Result<()> {
    let confirm = ctx.confirmer(args.force);

    if args.all {
        prompt::require(confirm, &format!("Really delete ALL {}?", coll.noun()))?;
        let envelope = smd.delete_all(coll).await?;
        return output::print_body(&envelope, ctx.output_format());
    }

    let ids = target_ids(&args.ids, args.data.as_deref(), args.format_input, coll.id_key()).await?;
    prompt::require(
        confirm,
        &format!("Really delete {} {}?", coll.noun(), ids.join(", ")),
    )?;

    let batch = smd.delete_each(coll, &ids).await;
    print_batch(&batch, &format!("delete {}", coll.noun()), ctx.output_format())
}

/// Components to add, from flags or from a payload holding either a
/// `{"Components": [...]}` document, a list, or a single component.
async fn components(args: ComponentAddArgs) -> Result<ComponentSlice> {
    if let Some(ref data) = args.data {
        let value: Value = payload::load(data, args.format_input).await?;
        return component_slice(value);
    }

    let (id, nid) = match (args.xname, args.nid) {
        (Some(x), Some(n)) => (x, n),
        _ => {
            return Err(CliError::InvalidArgument(
                "xname and nid are required without --data".to_string(),
            ))
        }
    };

    Ok(ComponentSlice {
        components: vec![Component {
            id,
            state: args.state,
            enabled: args.enabled,
            role: args.role,
            arch: args.arch,
            nid,
        }],
    })
}

fn component_slice(value: Value) -> Result<ComponentSlice> {
    let slice = match value {
        Value::Array(_) => ComponentSlice {
            components: serde_json::from_value(value).map_err(CodecError::from)?,
        },
        v if v.get("Components").is_some() => {
            serde_json::from_value(v).map_err(CodecError::from)?
        }
        v => ComponentSlice {
            components: vec![serde_json::from_value(v).map_err(CodecError::from)?],
        },
    };
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_component_from_flags() {
        let args = ComponentAddArgs {
            xname: Some("x1000c0s0b0n0".to_string()),
            nid: Some(1),
            state: "Ready".to_string(),
            enabled: true,
            role: "Compute".to_string(),
            arch: "X86".to_string(),
            data: None,
            format_input: DataFormat::Json,
        };
        let slice = components(args).await.unwrap();
        assert_eq!(slice.components.len(), 1);
        assert_eq!(slice.components[0].id, "x1000c0s0b0n0");
        assert_eq!(slice.components[0].nid, 1);
    }

    #[test]
    fn test_component_slice_shapes() {
        let doc = json!({ "Components": [{ "ID": "x1", "NID": 1 }, { "ID": "x2", "NID": 2 }] });
        assert_eq!(component_slice(doc).unwrap().components.len(), 2);

        let list = json!([{ "ID": "x1", "NID": 1 }]);
        assert_eq!(component_slice(list).unwrap().components[0].id, "x1");

        let one = json!({ "ID": "x3", "State": "Off" });
        let slice = component_slice(one).unwrap();
        assert_eq!(slice.components[0].state, "Off");

        assert!(component_slice(json!({ "NID": 1 })).is_err());
    }
}
