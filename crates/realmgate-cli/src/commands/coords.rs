use anyhow::Result;
use clap::Subcommand;
use realmgate_client::config::LoginCoordinates;
use realmgate_runner::{CaptureTool, FieldId};

use crate::commands::Target;
use crate::context::Context;

#[derive(Subcommand, Debug)]
pub enum CoordsAction {
    Show,
    /// Record the position of the login field under the mouse pointer
    Capture { field: FieldId },
    /// Move the pointer over the recorded fields without clicking
    Test,
    /// Go back to the default positions
    Reset,
}

pub fn run(ctx: &mut Context, target: &Target, action: CoordsAction) -> Result<()> {
    let catalog = ctx.catalog()?;
    let resolved = ctx.resolve(
        &catalog,
        target.server.as_deref(),
        target.expansion.as_deref(),
    )?;
    let path = ctx.coords_path(&resolved);
    let mut coords = LoginCoordinates::load_or_default(&path);
    let tool = CaptureTool::new(ctx.config.automation.clone());

    match action {
        CoordsAction::Show => {
            println!("{} - {} ({})", resolved.server, resolved.name, path.display());
            for field in FieldId::ALL {
                println!("  {}: {}", field.description(), coords.get(field));
            }
        }
        CoordsAction::Capture { field } => {
            println!(
                "Move the mouse over the {} of the game's login screen. Capturing in {} seconds...",
                field.description(),
                tool.capture_delay().as_secs_f32()
            );
            let point = tool.capture_into(&mut coords, field)?;
            tool.save(&coords, &path)?;
            println!("{} captured at {}", field.description(), point);
        }
        CoordsAction::Test => {
            println!("Moving the mouse over the recorded fields...");
            tool.test(&coords)?;
            println!("Done.");
        }
        CoordsAction::Reset => {
            let coords = LoginCoordinates::default();
            tool.save(&coords, &path)?;
            println!("Login coordinates reset to defaults.");
        }
    }

    Ok(())
}
