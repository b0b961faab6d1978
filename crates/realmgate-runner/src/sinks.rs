use realmgate_events::{LoginEvent, Severity, StatusSink};
use tracing::{error, info, warn};

/// Writes every status event to the log
pub struct LoggingSink;

impl StatusSink for LoggingSink {
    fn report(&self, event: &LoginEvent) {
        match event.severity() {
            Severity::Info => info!(target: "status", "{}", event),
            Severity::Warning => warn!(target: "status", "{}", event),
            Severity::Error => error!(target: "status", "{}", event),
        }
    }
}
