use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use realmgate_client::config::Point;

use crate::input::{DriverFactory, InputDriver, InputError};

/// One successfully injected input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    MoveTo(Point),
    Click,
    SelectAll,
    Delete,
    Type(char),
    Confirm,
}

/// Driver that records input instead of injecting it.
///
/// Used for dry runs and in tests. Clones share the same log, so a factory can
/// hand out fresh drivers while the caller keeps one to inspect.
#[derive(Clone)]
pub struct RecordingDriver {
    log: Arc<Mutex<Vec<InputAction>>>,
    pointer: Arc<Mutex<Point>>,
    failing_clicks: Arc<AtomicU32>,
    failing_confirms: Arc<AtomicU32>,
    failing_connects: Arc<AtomicU32>,
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Consume one pending failure, if any are left
fn take(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            pointer: Arc::new(Mutex::new(Point::new(0, 0))),
            failing_clicks: Arc::new(AtomicU32::new(0)),
            failing_confirms: Arc::new(AtomicU32::new(0)),
            failing_connects: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Make the next `n` clicks fail
    pub fn fail_clicks(self, n: u32) -> Self {
        self.failing_clicks.store(n, Ordering::SeqCst);
        self
    }

    /// Make the next `n` confirm key presses fail
    pub fn fail_confirms(self, n: u32) -> Self {
        self.failing_confirms.store(n, Ordering::SeqCst);
        self
    }

    /// Make the next `n` driver creations through [`RecordingDriver::factory`] fail
    pub fn fail_connects(self, n: u32) -> Self {
        self.failing_connects.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_pointer(self, point: Point) -> Self {
        *self.pointer.lock().unwrap_or_else(PoisonError::into_inner) = point;
        self
    }

    pub fn factory(&self) -> DriverFactory {
        let driver = self.clone();
        Arc::new(move || {
            if take(&driver.failing_connects) {
                return Err(InputError::Connect("recording driver unavailable".to_string()));
            }
            Ok(Box::new(driver.clone()) as Box<dyn InputDriver>)
        })
    }

    pub fn actions(&self) -> Vec<InputAction> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, action: InputAction) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action);
    }
}

impl InputDriver for RecordingDriver {
    fn move_to(&mut self, point: Point) -> Result<(), InputError> {
        *self.pointer.lock().unwrap_or_else(PoisonError::into_inner) = point;
        self.record(InputAction::MoveTo(point));
        Ok(())
    }

    fn click(&mut self) -> Result<(), InputError> {
        if take(&self.failing_clicks) {
            return Err(InputError::Inject("click rejected".to_string()));
        }
        self.record(InputAction::Click);
        Ok(())
    }

    fn select_all(&mut self) -> Result<(), InputError> {
        self.record(InputAction::SelectAll);
        Ok(())
    }

    fn delete(&mut self) -> Result<(), InputError> {
        self.record(InputAction::Delete);
        Ok(())
    }

    fn type_char(&mut self, c: char) -> Result<(), InputError> {
        self.record(InputAction::Type(c));
        Ok(())
    }

    fn confirm(&mut self) -> Result<(), InputError> {
        if take(&self.failing_confirms) {
            return Err(InputError::Inject("confirm rejected".to_string()));
        }
        self.record(InputAction::Confirm);
        Ok(())
    }

    fn pointer_position(&mut self) -> Result<Point, InputError> {
        Ok(*self.pointer.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_consumed_in_order() {
        let mut driver = RecordingDriver::new().fail_clicks(2);
        assert!(driver.click().is_err());
        assert!(driver.click().is_err());
        assert!(driver.click().is_ok());
        assert_eq!(driver.actions(), vec![InputAction::Click]);
    }

    #[test]
    fn test_factory_shares_log() {
        let recorder = RecordingDriver::new().fail_connects(1);
        let factory = recorder.factory();
        assert!(factory().is_err());

        let mut driver = factory().unwrap();
        driver.click_at(Point::new(5, 6)).unwrap();
        assert_eq!(
            recorder.actions(),
            vec![InputAction::MoveTo(Point::new(5, 6)), InputAction::Click]
        );
        assert_eq!(driver.pointer_position().unwrap(), Point::new(5, 6));
    }
}
