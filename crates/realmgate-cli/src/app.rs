use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::prelude::Backend;
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::time::Duration;

use super::draw::Draw;
use super::wizards::{LaunchWizard, WizardStage};

pub struct App {
    pub launch_wizard: LaunchWizard,
}

impl App {
    pub fn new(launch_wizard: LaunchWizard) -> Self {
        Self { launch_wizard }
    }

    pub fn draw(&self, frame: &mut Frame) {
        self.launch_wizard.draw(frame);
    }

    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> Result<(), Box<dyn Error>> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            let wizard = &mut self.launch_wizard;

            // Auto-advance from Welcome stage
            if wizard.stage == WizardStage::Welcome {
                std::thread::sleep(Duration::from_millis(500));
                wizard.advance();
                continue;
            }

            if wizard.stage == WizardStage::Complete {
                break;
            }

            if event::poll(Duration::from_millis(100))? {
                let Event::Key(key) = event::read()? else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Up => wizard.up(),
                    KeyCode::Down => wizard.down(),
                    KeyCode::Enter => wizard.advance(),
                    KeyCode::Esc => return Err("Selection cancelled".into()),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Err("Selection cancelled".into());
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
