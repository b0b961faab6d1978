use clap::{Args, Subcommand};

use crate::context::Context;

pub mod accounts;
pub mod coords;
pub mod detect;
pub mod expansions;
pub mod launch;
pub mod servers;

/// Server and expansion a command works on. Both default to the last ones
/// used for a launch.
#[derive(Args, Debug, Clone, Default)]
pub struct Target {
    /// Server name
    #[arg(short, long)]
    pub server: Option<String>,

    /// Expansion name; may be left out when the server has only one
    #[arg(short, long)]
    pub expansion: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage servers
    Servers {
        #[command(subcommand)]
        action: servers::ServersAction,
    },
    /// Manage the expansions of a server
    Expansions {
        #[command(subcommand)]
        action: expansions::ExpansionsAction,
    },
    /// Manage the accounts of an expansion
    Accounts {
        #[command(flatten)]
        target: Target,
        #[command(subcommand)]
        action: accounts::AccountsAction,
    },
    /// Record and check the login field coordinates of an expansion
    Coords {
        #[command(flatten)]
        target: Target,
        #[command(subcommand)]
        action: coords::CoordsAction,
    },
    /// Register servers and expansions for account files in the data directory
    Detect(detect::DetectArgs),
    /// Start the game and log in
    Launch(launch::LaunchArgs),
}

impl Command {
    pub fn run(self, ctx: &mut Context) -> anyhow::Result<()> {
        match self {
            Command::Servers { action } => servers::run(ctx, action),
            Command::Expansions { action } => expansions::run(ctx, action),
            Command::Accounts { target, action } => accounts::run(ctx, &target, action),
            Command::Coords { target, action } => coords::run(ctx, &target, action),
            Command::Detect(args) => detect::run(ctx, args),
            Command::Launch(args) => launch::run(ctx, args),
        }
    }
}
