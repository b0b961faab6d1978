use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use ratatui::{TerminalOptions, Viewport};
use tracing::info;

use realmgate_cli::commands::{launch, Command};
use realmgate_cli::{run as cli_run, App, Context, LaunchWizard};
use realmgate_runner::logging::init_logging;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enables debug mode
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Directory holding servers, accounts and coordinates
    #[arg(long, env = "REALMGATE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Also write logs to <data dir>/logs/cli.log
    #[arg(long)]
    log_file: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut ctx = Context::open(cli.data_dir)?;

    let level = match cli.debug {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let log_dir = cli.log_file.then(|| ctx.layout.log_dir());
    let _guard = init_logging("cli", log_dir.as_deref(), level)?;

    info!("Using data directory {}", ctx.layout.data_dir.display());

    if let Some(command) = cli.command {
        return command.run(&mut ctx);
    }

    // Run the launch wizard if no command was given
    let catalog = ctx.catalog()?;
    let wizard = LaunchWizard::new(
        ctx.layout.clone(),
        catalog,
        &ctx.config.last_server,
        &ctx.config.last_expansion,
    )
    .map_err(|e| anyhow!("{}", e))?;

    let mut terminal = ratatui::init_with_options(TerminalOptions {
        viewport: Viewport::Inline(16),
    });

    let mut app = App::new(wizard);
    let app_result = cli_run(&mut app, &mut terminal);
    ratatui::restore();
    app_result.map_err(|e| anyhow!("{}", e))?;

    // Extract selected expansion and account from completed wizard
    let (resolved, account) = app
        .launch_wizard
        .selection()
        .ok_or_else(|| anyhow!("Wizard finished without a selection"))?;

    launch::launch(&mut ctx, &resolved, &account, false)
}
