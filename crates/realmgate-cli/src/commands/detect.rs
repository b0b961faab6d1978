use anyhow::Result;
use clap::Args;
use realmgate_client::config::{detect_existing_accounts, ServerCatalog};

use crate::context::Context;

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Point expansions at the account files found on disk when they differ
    #[arg(long)]
    pub prefer_found: bool,
}

pub fn run(ctx: &mut Context, args: DetectArgs) -> Result<()> {
    let path = ctx.layout.servers_file();
    let mut catalog = ServerCatalog::init(&path)?;
    let report = detect_existing_accounts(&ctx.layout.data_dir, &mut catalog)?;

    for (server, expansion) in &report.added {
        println!("Added {} - {}", server, expansion);
    }

    let mut switched = 0;
    for conflict in &report.conflicts {
        if args.prefer_found {
            conflict.apply(&mut catalog);
            switched += 1;
            println!(
                "{} - {} now uses {}",
                conflict.server, conflict.expansion, conflict.found
            );
        } else {
            println!(
                "{} - {} uses {}, found {} (pass --prefer-found to switch)",
                conflict.server, conflict.expansion, conflict.current, conflict.found
            );
        }
    }

    if report.added.is_empty() && report.conflicts.is_empty() {
        println!("No new account files found.");
    }
    if report.changed() || switched > 0 {
        ctx.save_catalog(&catalog)?;
    }
    Ok(())
}
