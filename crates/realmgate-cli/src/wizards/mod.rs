pub mod launch;

pub use launch::{LaunchWizard, WizardStage};
