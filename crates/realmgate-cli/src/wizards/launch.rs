use ratatui::Frame;
use std::error::Error;

use realmgate_client::config::{
    Account, AccountStore, DataLayout, ResolvedExpansion, ServerCatalog,
};

use crate::draw::Draw;

#[derive(Debug, Clone, PartialEq)]
pub enum WizardStage {
    Welcome,
    SelectingServer,
    SelectingExpansion,
    SelectingAccount,
    Confirming,
    Complete,
}

#[derive(Clone)]
pub struct LaunchWizard {
    pub layout: DataLayout,
    pub catalog: ServerCatalog,
    pub stage: WizardStage,
    pub selected_server_idx: usize,
    pub selected_expansion_idx: usize,
    pub selected_account_idx: usize,
    pub server_list: Vec<String>,
    pub expansion_list: Vec<String>,
    pub account_list: Vec<Account>,
    /// Shown under the current question, e.g. why the wizard cannot go on
    pub notice: Option<String>,
    last_expansion: Option<String>,
}

fn select(idx: &mut usize, len: usize, up: bool) {
    if up {
        *idx = idx.saturating_sub(1);
    } else if *idx + 1 < len {
        *idx += 1;
    }
}

impl LaunchWizard {
    /// Start with the last used server (and its expansion) pre-selected
    pub fn new(
        layout: DataLayout,
        catalog: ServerCatalog,
        last_server: &str,
        last_expansion: &str,
    ) -> Result<Self, Box<dyn Error>> {
        // Guard: require at least one server
        if catalog.is_empty() {
            return Err("No servers configured. Add one with `realmgate servers add`.".into());
        }

        let server_list: Vec<String> = catalog.servers().map(|(name, _)| name.clone()).collect();
        let remembered = server_list.iter().position(|name| name == last_server);
        let selected_server_idx = remembered.unwrap_or(0);
        // The remembered expansion belongs to the remembered server only
        let last_expansion = (remembered.is_some() && !last_expansion.is_empty())
            .then(|| last_expansion.to_string());

        Ok(Self {
            layout,
            catalog,
            stage: WizardStage::Welcome,
            selected_server_idx,
            selected_expansion_idx: 0,
            selected_account_idx: 0,
            server_list,
            expansion_list: Vec::new(),
            account_list: Vec::new(),
            notice: None,
            last_expansion,
        })
    }

    pub fn selected_server(&self) -> &str {
        &self.server_list[self.selected_server_idx]
    }

    pub fn up(&mut self) {
        self.move_selection(true);
    }

    pub fn down(&mut self) {
        self.move_selection(false);
    }

    fn move_selection(&mut self, up: bool) {
        match self.stage {
            WizardStage::SelectingServer => {
                select(&mut self.selected_server_idx, self.server_list.len(), up)
            }
            WizardStage::SelectingExpansion => select(
                &mut self.selected_expansion_idx,
                self.expansion_list.len(),
                up,
            ),
            WizardStage::SelectingAccount => {
                select(&mut self.selected_account_idx, self.account_list.len(), up)
            }
            _ => {}
        }
    }

    /// Confirm the current stage and move on to the next one
    pub fn advance(&mut self) {
        self.notice = None;
        match self.stage {
            WizardStage::Welcome => self.stage = WizardStage::SelectingServer,
            WizardStage::SelectingServer => self.enter_expansions(),
            WizardStage::SelectingExpansion => self.enter_accounts(),
            WizardStage::SelectingAccount => self.stage = WizardStage::Confirming,
            WizardStage::Confirming => self.stage = WizardStage::Complete,
            WizardStage::Complete => {}
        }
    }

    fn enter_expansions(&mut self) {
        let server = self.selected_server().to_string();
        self.expansion_list = self
            .catalog
            .server(&server)
            .map(|s| s.expansions.keys().cloned().collect())
            .unwrap_or_default();

        if self.expansion_list.is_empty() {
            self.notice = Some(format!(
                "Server {} has no configured expansions. Please add one.",
                server
            ));
            return;
        }

        self.selected_expansion_idx = self
            .last_expansion
            .take()
            .and_then(|last| self.expansion_list.iter().position(|name| *name == last))
            .unwrap_or(0);
        self.stage = WizardStage::SelectingExpansion;
    }

    fn enter_accounts(&mut self) {
        let Some(resolved) = self.resolved() else {
            return;
        };
        let path = self.layout.resolve_file(&resolved.expansion.accounts_file);
        self.account_list = AccountStore::load_or_empty(path)
            .accounts()
            .to_vec();

        if self.account_list.is_empty() {
            self.notice = Some(format!(
                "No accounts for {} - {}. Add one with `realmgate accounts add`.",
                resolved.server, resolved.name
            ));
            return;
        }
        self.selected_account_idx = 0;
        self.stage = WizardStage::SelectingAccount;
    }

    /// The expansion currently highlighted
    pub fn resolved(&self) -> Option<ResolvedExpansion> {
        let server = self.server_list.get(self.selected_server_idx)?;
        let name = self.expansion_list.get(self.selected_expansion_idx)?;
        self.catalog.resolve(server, Some(name)).ok()
    }

    /// The final choice, once the wizard is complete
    pub fn selection(&self) -> Option<(ResolvedExpansion, Account)> {
        if self.stage != WizardStage::Complete {
            return None;
        }
        let account = self.account_list.get(self.selected_account_idx)?.clone();
        Some((self.resolved()?, account))
    }
}

impl Draw for LaunchWizard {
    fn draw(&self, frame: &mut Frame) {
        use ratatui::style::{Color, Style};
        use ratatui::text::{Line, Span, Text};
        use ratatui::widgets::Paragraph;

        fn choices(lines: &mut Vec<Line>, items: impl Iterator<Item = String>, selected: usize) {
            for (idx, item) in items.enumerate() {
                let marker = if idx == selected { "●" } else { "○" };
                lines.push(Line::from(format!("  {} {}", marker, item)));
            }
        }

        let mut lines = Vec::new();

        lines.push(Line::from("Welcome to realmgate!"));
        lines.push(Line::from(Span::styled(
            format!("Data: {}", self.layout.data_dir.display()),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));

        if self.stage == WizardStage::Welcome {
            // Nothing picked yet
        } else if self.stage == WizardStage::SelectingServer {
            lines.push(Line::from("? Pick a server"));
            choices(
                &mut lines,
                self.server_list.iter().cloned(),
                self.selected_server_idx,
            );
        } else {
            lines.push(Line::from("* Pick a server"));
            lines.push(Line::from(format!("  {}", self.selected_server())));

            if self.stage == WizardStage::SelectingExpansion {
                lines.push(Line::from("? Pick an expansion"));
                choices(
                    &mut lines,
                    self.expansion_list.iter().cloned(),
                    self.selected_expansion_idx,
                );
            } else {
                lines.push(Line::from("* Pick an expansion"));
                if let Some(name) = self.expansion_list.get(self.selected_expansion_idx) {
                    lines.push(Line::from(format!("  {}", name)));
                }

                if self.stage == WizardStage::SelectingAccount {
                    lines.push(Line::from("? Pick an account"));
                    choices(
                        &mut lines,
                        self.account_list.iter().map(|a| a.to_string()),
                        self.selected_account_idx,
                    );
                } else {
                    lines.push(Line::from("* Pick an account"));
                    if let Some(account) = self.account_list.get(self.selected_account_idx) {
                        lines.push(Line::from(format!("  {}", account)));
                    }
                    if self.stage == WizardStage::Confirming {
                        lines.push(Line::from(""));
                        lines.push(Line::from("? Ready to log in? <enter>"));
                    }
                }
            }
        }

        if let Some(notice) = &self.notice {
            lines.push(Line::from(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Yellow),
            )));
        }

        frame.render_widget(Paragraph::new(Text::from(lines)), frame.area());
    }
}
