use anyhow::{anyhow, bail, Result};
use chrono::Local;
use clap::Args;
use realmgate_client::config::{Account, LoginCoordinates, ResolvedExpansion};
use realmgate_runner::{
    LoggingSink, LoginEvent, LoginOutcome, LoginSequencer, RecordingDriver, StatusSink,
};
use tracing::info;

use crate::commands::Target;
use crate::context::Context;

#[derive(Args, Debug, Clone, Default)]
pub struct LaunchArgs {
    #[command(flatten)]
    pub target: Target,

    /// Account to log in with, by alias or username
    #[arg(short, long)]
    pub account: Option<String>,

    /// Start the game but only record the login input instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

/// Prints status lines to stdout and operator notices to stderr
struct TerminalSink;

impl StatusSink for TerminalSink {
    fn report(&self, event: &LoginEvent) {
        LoggingSink.report(event);
        println!("[{}] {}", Local::now().format("%H:%M:%S"), event);
        if let Some(notice) = event.operator_notice() {
            eprintln!("{}", notice);
        }
    }
}

pub fn run(ctx: &mut Context, args: LaunchArgs) -> Result<()> {
    let catalog = ctx.catalog()?;
    let resolved = ctx.resolve(
        &catalog,
        args.target.server.as_deref(),
        args.target.expansion.as_deref(),
    )?;

    let store = ctx.accounts(&resolved);
    let account = match args.account.as_deref() {
        Some(name) => store
            .find_by_display_name(name)
            .or_else(|| store.find_by_username(name))
            .ok_or_else(|| {
                anyhow!(
                    "Account '{}' not found. Available accounts: {}",
                    name,
                    store.display_names().join(", ")
                )
            })?,
        None => match store.accounts() {
            [only] => only,
            [] => bail!(
                "No accounts for {} - {}. Add one with `realmgate accounts add`.",
                resolved.server,
                resolved.name
            ),
            _ => bail!(
                "Please select an account with --account. Available accounts: {}",
                store.display_names().join(", ")
            ),
        },
    }
    .clone();

    launch(ctx, &resolved, &account, args.dry_run)
}

/// Launch the game for an already chosen expansion and account and wait for
/// the login sequence to finish
pub fn launch(
    ctx: &mut Context,
    resolved: &ResolvedExpansion,
    account: &Account,
    dry_run: bool,
) -> Result<()> {
    if !resolved.expansion.executable_exists() {
        bail!(
            "Game executable not found for {} - {}. Set it with `realmgate expansions set-path`.",
            resolved.server,
            resolved.name
        );
    }

    ctx.remember(resolved)?;
    let coords = LoginCoordinates::load_or_default(&ctx.coords_path(resolved));

    let recorder = RecordingDriver::new();
    let mut sequencer = LoginSequencer::new(ctx.config.automation.clone(), TerminalSink);
    if dry_run {
        sequencer = sequencer.with_driver_factory(recorder.factory());
    }

    info!(
        "Launching {} - {} as {}",
        resolved.server,
        resolved.name,
        account.display_name()
    );
    let handle = sequencer.launch(&resolved.expansion.path, account, &coords)?;

    let outcome = handle.join();
    if dry_run {
        println!("Dry run: {} input actions recorded.", recorder.actions().len());
    }

    match outcome {
        LoginOutcome::LoggedIn { .. } => Ok(()),
        LoginOutcome::Exhausted { attempts } => bail!(
            "Failed to log in automatically after {} attempts. The game is still running.",
            attempts
        ),
        LoginOutcome::Cancelled => bail!("Login cancelled"),
        LoginOutcome::Failed { message } => Err(anyhow!(message)),
    }
}
