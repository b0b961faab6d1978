//! Status event types shared by the login sequencer and its callers
//!
//! The runner produces these events from its background thread and the CLI
//! consumes them, so they live in their own crate to keep the two apart.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Login Fields
// ============================================================================

/// One of the two input fields on the login screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldId {
    Username,
    Password,
}

impl FieldId {
    /// Both fields, in the order the sequencer fills them
    pub const ALL: [FieldId; 2] = [FieldId::Username, FieldId::Password];

    /// Prefix used for the persisted `<field>_x` / `<field>_y` keys
    pub fn key(&self) -> &'static str {
        match self {
            FieldId::Username => "username",
            FieldId::Password => "password",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FieldId::Username => "Username Field",
            FieldId::Password => "Password Field",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for FieldId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "username" | "user" => Ok(FieldId::Username),
            "password" | "pass" => Ok(FieldId::Password),
            other => Err(format!(
                "Unknown field '{}'. Expected 'username' or 'password'",
                other
            )),
        }
    }
}

// ============================================================================
// Login Events
// ============================================================================

/// How loudly an event should be surfaced to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Progress and outcome of one login sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    /// The game client process is being started
    Launching,
    /// Warm-up period after the process was started
    WaitingForLoginScreen,
    /// A new attempt is starting (1-based)
    Attempt { attempt: u32, max: u32 },
    /// Both fields were filled and the form was submitted
    LoggedIn { username: String },
    /// Every attempt failed
    Exhausted { attempts: u32 },
    /// The caller asked the sequence to stop
    Cancelled,
    /// Failure outside the retry loop, e.g. the process could not be spawned
    Error { message: String },
    /// The spawned process was killed on request
    ProcessTerminated,
}

impl LoginEvent {
    pub fn severity(&self) -> Severity {
        match self {
            LoginEvent::Exhausted { .. } => Severity::Warning,
            LoginEvent::Error { .. } => Severity::Error,
            _ => Severity::Info,
        }
    }

    /// Whether this event ends the sequence
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoginEvent::LoggedIn { .. }
                | LoginEvent::Exhausted { .. }
                | LoginEvent::Cancelled
                | LoginEvent::Error { .. }
        )
    }

    /// Longer text for events the operator must acknowledge
    pub fn operator_notice(&self) -> Option<String> {
        match self {
            LoginEvent::Exhausted { .. } => Some(
                "Automated login failed. You may need to configure login screen coordinates."
                    .to_string(),
            ),
            LoginEvent::Error { message } => {
                Some(format!("An error occurred during login: {}", message))
            }
            _ => None,
        }
    }
}

impl fmt::Display for LoginEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginEvent::Launching => write!(f, "Launching game client..."),
            LoginEvent::WaitingForLoginScreen => write!(f, "Waiting for login screen..."),
            LoginEvent::Attempt { attempt, max } => {
                write!(f, "Attempting to log in... ({}/{})", attempt, max)
            }
            LoginEvent::LoggedIn { username } => write!(f, "Logged in as {}", username),
            LoginEvent::Exhausted { .. } => write!(f, "Failed to log in automatically."),
            LoginEvent::Cancelled => write!(f, "Login cancelled"),
            LoginEvent::Error { message } => write!(f, "ERROR: {}", message),
            LoginEvent::ProcessTerminated => write!(f, "Game process terminated"),
        }
    }
}

// ============================================================================
// Sink Trait
// ============================================================================

/// Receiver for status events
///
/// Called synchronously from the sequencer's background thread. Implementations
/// that feed a UI must hand the event over to the UI thread themselves.
pub trait StatusSink: Send + Sync + 'static {
    fn report(&self, event: &LoginEvent);
}

impl<F> StatusSink for F
where
    F: Fn(&LoginEvent) + Send + Sync + 'static,
{
    fn report(&self, event: &LoginEvent) {
        self(event)
    }
}
