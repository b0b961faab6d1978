pub mod app;
pub mod commands;
pub mod context;
pub mod draw;
pub mod wizards;

pub use app::App;
pub use context::Context;
pub use draw::Draw;
pub use wizards::{LaunchWizard, WizardStage};

use ratatui::prelude::Backend;
use ratatui::Terminal;
use std::error::Error;

pub fn run(app: &mut App, terminal: &mut Terminal<impl Backend>) -> Result<(), Box<dyn Error>> {
    app.run(terminal)
}
