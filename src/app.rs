use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;

use crate::{
    backend,
    cli::{Cli, Command},
    domain,
    infra::{self, clipboard::SystemClipboard},
    protocol, ui,
    usecases::{
        self, bootstrap, context::AppContext, room::share_link, shell::DefaultShellOrchestrator,
    },
};

pub fn run(cli: Cli) -> Result<()> {
    let options = cli.launch_options();

    match cli.command_or_default() {
        Command::Run => {
            let context = bootstrap::bootstrap(&options)?;
            tracing::debug!(
                ui = ui::module_name(),
                domain = domain::module_name(),
                backend = backend::module_name(),
                protocol = protocol::module_name(),
                usecases = usecases::module_name(),
                infra = infra::module_name(),
                "module boundaries loaded"
            );
            run_shell(&context)?;
        }
        Command::Share => {
            let context = bootstrap::build_context(&options)?;
            println!("{}", share_line(&context)?);
        }
    }

    Ok(())
}

fn run_shell(context: &AppContext) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(run_session(context))
}

async fn run_session(context: &AppContext) -> Result<()> {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let session = bootstrap::compose_session(context, events_tx.clone())?;
    let mut orchestrator = DefaultShellOrchestrator::new(session, SystemClipboard::default());

    ui::shell::start(context, events_tx, &mut events_rx, &mut orchestrator).await
}

fn share_line(context: &AppContext) -> Result<String> {
    match context.chat_id.as_ref() {
        Some(chat_id) => Ok(share_link(chat_id)),
        None => bail!("no room to share: pass --room or set [session].default_room"),
    }
}
