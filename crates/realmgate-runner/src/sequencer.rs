use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use realmgate_client::config::{Account, AutomationConfig, LoginCoordinates};
use realmgate_events::{FieldId, LoginEvent, StatusSink};
use tracing::{debug, error, info, warn};

use crate::cancel::CancelToken;
use crate::input::{enigo_factory, DriverFactory, InputError};
use crate::lease::InputLease;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Game executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),
    #[error("Failed to start login worker: {0}")]
    Worker(#[source] io::Error),
}

/// How a login sequence ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials were typed and submitted on this attempt
    LoggedIn { attempts: u32 },
    Exhausted { attempts: u32 },
    Cancelled,
    /// The sequence was abandoned outside the retry loop
    Failed { message: String },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::LoggedIn { .. })
    }
}

/// Launches the game client and replays the recorded login input.
///
/// Each [`LoginSequencer::launch`] spawns one process and one background
/// thread. Progress is reported to the sink from that thread.
pub struct LoginSequencer {
    config: AutomationConfig,
    sink: Arc<dyn StatusSink>,
    driver_factory: DriverFactory,
}

impl LoginSequencer {
    pub fn new(config: AutomationConfig, sink: impl StatusSink) -> Self {
        Self {
            config,
            sink: Arc::new(sink),
            driver_factory: enigo_factory(),
        }
    }

    pub fn with_driver_factory(mut self, factory: DriverFactory) -> Self {
        self.driver_factory = factory;
        self
    }

    /// Start a login sequence for `account` against the client at `executable`.
    ///
    /// A missing executable fails here, before any background work starts and
    /// without reporting anything to the sink.
    pub fn launch(
        &self,
        executable: &Path,
        account: &Account,
        coords: &LoginCoordinates,
    ) -> Result<LoginHandle, LaunchError> {
        if !executable.is_file() {
            warn!(target: "sequencer", "Executable not found: {}", executable.display());
            return Err(LaunchError::ExecutableNotFound(executable.to_path_buf()));
        }

        let cancel = CancelToken::new();
        let child = Arc::new(Mutex::new(None));
        let job = Job {
            config: self.config.clone(),
            sink: self.sink.clone(),
            driver_factory: self.driver_factory.clone(),
            executable: executable.to_path_buf(),
            username: account.username.clone(),
            password: account.password.clone(),
            coords: *coords,
            cancel: cancel.clone(),
            child: child.clone(),
        };

        let worker = thread::Builder::new()
            .name("login-sequencer".to_string())
            .spawn(move || job.run())
            .map_err(LaunchError::Worker)?;

        info!(
            target: "sequencer",
            "Login sequence started for {} ({})",
            account.username,
            executable.display()
        );

        Ok(LoginHandle {
            cancel,
            child,
            sink: self.sink.clone(),
            worker,
        })
    }
}

/// Handle to a running login sequence
pub struct LoginHandle {
    cancel: CancelToken,
    child: Arc<Mutex<Option<Child>>>,
    sink: Arc<dyn StatusSink>,
    worker: JoinHandle<LoginOutcome>,
}

impl LoginHandle {
    /// Ask the sequence to stop before its next attempt
    pub fn cancel(&self) {
        debug!(target: "sequencer", "Cancellation requested");
        self.cancel.cancel();
    }

    /// Kill the game process, if one was started.
    ///
    /// Best effort: failures are logged and otherwise ignored. The retry loop
    /// keeps running; use [`LoginHandle::cancel`] to stop it.
    pub fn terminate(&self) -> bool {
        let mut slot = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(mut child) = slot.take() else {
            return false;
        };

        match child.kill() {
            Ok(()) => {
                let _ = child.wait();
                info!(target: "sequencer", "Game process {} terminated", child.id());
                self.sink.report(&LoginEvent::ProcessTerminated);
                true
            }
            Err(e) => {
                debug!(target: "sequencer", "Could not terminate game process: {}", e);
                false
            }
        }
    }

    pub fn process_id(&self) -> Option<u32> {
        self.child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Child::id)
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the sequence to reach its terminal outcome
    pub fn join(self) -> LoginOutcome {
        match self.worker.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(target: "sequencer", "Login worker panicked");
                LoginOutcome::Failed {
                    message: "login worker panicked".to_string(),
                }
            }
        }
    }
}

/// Everything the background thread owns for one sequence
struct Job {
    config: AutomationConfig,
    sink: Arc<dyn StatusSink>,
    driver_factory: DriverFactory,
    executable: PathBuf,
    username: String,
    password: String,
    coords: LoginCoordinates,
    cancel: CancelToken,
    child: Arc<Mutex<Option<Child>>>,
}

impl Job {
    fn run(self) -> LoginOutcome {
        self.sink.report(&LoginEvent::Launching);

        match Command::new(&self.executable).spawn() {
            Ok(child) => {
                info!(target: "sequencer", "Started game process {}", child.id());
                *self.child.lock().unwrap_or_else(PoisonError::into_inner) = Some(child);
            }
            Err(e) => {
                let message = format!("Failed to start {}: {}", self.executable.display(), e);
                error!(target: "sequencer", "{}", message);
                self.sink.report(&LoginEvent::Error {
                    message: message.clone(),
                });
                return LoginOutcome::Failed { message };
            }
        }

        self.sink.report(&LoginEvent::WaitingForLoginScreen);
        if self.cancel.sleep(self.config.warm_up()) {
            return self.cancelled();
        }

        let max = self.config.max_attempts;
        for attempt in 1..=max {
            if self.cancel.is_cancelled() || self.cancel.sleep(self.config.attempt_pause()) {
                return self.cancelled();
            }

            self.sink.report(&LoginEvent::Attempt { attempt, max });

            match self.attempt() {
                Ok(()) => {
                    info!(
                        target: "sequencer",
                        "Submitted credentials for {} on attempt {}/{}", self.username, attempt, max
                    );
                    self.sink.report(&LoginEvent::LoggedIn {
                        username: self.username.clone(),
                    });
                    return LoginOutcome::LoggedIn { attempts: attempt };
                }
                Err(e) => {
                    warn!(target: "sequencer", "Login attempt {}/{} failed: {}", attempt, max, e);
                    if self.cancel.sleep(self.config.retry_backoff()) {
                        return self.cancelled();
                    }
                }
            }
        }

        warn!(target: "sequencer", "Giving up after {} attempts", max);
        self.sink.report(&LoginEvent::Exhausted { attempts: max });
        LoginOutcome::Exhausted { attempts: max }
    }

    fn cancelled(&self) -> LoginOutcome {
        info!(target: "sequencer", "Login sequence cancelled");
        self.sink.report(&LoginEvent::Cancelled);
        LoginOutcome::Cancelled
    }

    /// One pass of clear, type and confirm. A panicking driver counts as a
    /// failed attempt.
    fn attempt(&self) -> Result<(), InputError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.fill_and_submit())).unwrap_or_else(|_| {
            Err(InputError::Inject("input driver panicked".to_string()))
        })
    }

    fn fill_and_submit(&self) -> Result<(), InputError> {
        let _lease = InputLease::acquire();
        let mut driver = (self.driver_factory)()?;
        let config = &self.config;

        for field in FieldId::ALL {
            let point = self.coords.get(field);
            for _ in 0..config.clear_repetitions {
                driver.click_at(point)?;
                pause(config.click_settle());
                driver.select_all()?;
                pause(config.key_settle());
                driver.delete()?;
                pause(config.key_settle());
            }

            for c in self.value(field).chars() {
                driver.type_char(c)?;
                pause(config.char_delay());
            }
            pause(config.field_settle());
        }

        driver.confirm()
    }

    fn value(&self, field: FieldId) -> &str {
        match field {
            FieldId::Username => &self.username,
            FieldId::Password => &self.password,
        }
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{InputAction, RecordingDriver};
    use realmgate_client::config::Point;

    fn coords() -> LoginCoordinates {
        LoginCoordinates {
            username: Point::new(10, 20),
            password: Point::new(30, 40),
        }
    }

    fn job(recorder: &RecordingDriver, username: &str, password: &str) -> Job {
        Job {
            config: AutomationConfig::immediate(),
            sink: Arc::new(|_: &LoginEvent| {}),
            driver_factory: recorder.factory(),
            executable: PathBuf::from("unused"),
            username: username.to_string(),
            password: password.to_string(),
            coords: coords(),
            cancel: CancelToken::new(),
            child: Arc::new(Mutex::new(None)),
        }
    }

    #[test]
    fn test_single_pass_order() {
        let recorder = RecordingDriver::new();
        let mut job = job(&recorder, "ab", "c");
        job.config.clear_repetitions = 1;

        job.fill_and_submit().unwrap();

        assert_eq!(
            recorder.actions(),
            vec![
                InputAction::MoveTo(Point::new(10, 20)),
                InputAction::Click,
                InputAction::SelectAll,
                InputAction::Delete,
                InputAction::Type('a'),
                InputAction::Type('b'),
                InputAction::MoveTo(Point::new(30, 40)),
                InputAction::Click,
                InputAction::SelectAll,
                InputAction::Delete,
                InputAction::Type('c'),
                InputAction::Confirm,
            ]
        );
    }

    #[test]
    fn test_clear_repeats_per_field() {
        let recorder = RecordingDriver::new();
        let job = job(&recorder, "u", "p");

        job.fill_and_submit().unwrap();

        let clicks = recorder
            .actions()
            .iter()
            .filter(|a| **a == InputAction::Click)
            .count();
        assert_eq!(clicks, 2 * job.config.clear_repetitions as usize);
    }

    #[test]
    fn test_driver_connect_failure_is_an_attempt_failure() {
        let recorder = RecordingDriver::new().fail_connects(1);
        let job = job(&recorder, "u", "p");

        assert!(matches!(job.attempt(), Err(InputError::Connect(_))));
        assert!(recorder.actions().is_empty());
        assert!(job.attempt().is_ok());
    }

    #[test]
    fn test_missing_executable_is_rejected_synchronously() {
        let sequencer = LoginSequencer::new(AutomationConfig::immediate(), |_: &LoginEvent| {
            panic!("no event expected");
        })
        .with_driver_factory(RecordingDriver::new().factory());

        let result = sequencer.launch(
            Path::new("/no/such/file"),
            &Account::new("alice", "secret"),
            &coords(),
        );
        assert!(matches!(result, Err(LaunchError::ExecutableNotFound(_))));
    }
}
