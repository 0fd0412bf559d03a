//! Power control service commands.

use chamictl_core::service::Service;
use chamictl_core::services::pcs::{Operation, StatusSelection};
use chamictl_core::services::PcsClient;

use crate::cli::{PcsArgs, PcsCommands, PcsStatusArgs, TransitionCommands};
use crate::context::{Auth, Context};
use crate::error::Result;
use crate::output;
use crate::prompt;

/// Run pcs command
pub async fn run_pcs(args: PcsArgs, ctx: &Context) -> Result<()> {
    let auth = match args.command {
        PcsCommands::Status(_) => Auth::Anonymous,
        PcsCommands::Transition(_) => Auth::Required,
    };
    let pcs = PcsClient::new(ctx.client(Service::Pcs, args.uri.as_deref(), auth).await?);
    let format = ctx.output_format();

    match args.command {
        PcsCommands::Status(s) => {
            let status = pcs.status(selection(&s)).await?;
            output::print_value(&status, format)
        }
        PcsCommands::Transition(t) => match t.command {
            TransitionCommands::Start(start) => {
                let operation: Operation = start.operation.parse()?;
                tracing::info!(%operation, xnames = ?start.xnames, "starting transition");
                let created = pcs.create_transition(operation, &start.xnames).await?;
                output::print_value(&created, format)
            }
            TransitionCommands::List => output::print_body(&pcs.list_transitions().await?, format),
            TransitionCommands::Show(show) => {
                output::print_body(&pcs.get_transition(&show.id).await?, format)
            }
            TransitionCommands::Abort(abort) => {
                prompt::require(
                    ctx.confirmer(abort.force),
                    &format!("Really abort transition {}?", abort.id),
                )?;
                output::print_body(&pcs.abort_transition(&abort.id).await?, format)
            }
        },
    }
}

fn selection(args: &PcsStatusArgs) -> StatusSelection {
    StatusSelection {
        all: args.all,
        storage: args.storage,
        smd: args.smd,
        vault: args.vault,
    }
}
