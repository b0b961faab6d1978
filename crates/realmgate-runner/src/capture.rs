use std::path::Path;
use std::thread;
use std::time::Duration;

use realmgate_client::config::{AutomationConfig, LoginCoordinates, Point};
use realmgate_client::StoreError;
use realmgate_events::FieldId;
use tracing::{debug, error, info};

use crate::input::{enigo_factory, DriverFactory, InputDriver, InputError};
use crate::lease::InputLease;

/// Number of intermediate pointer positions when animating a test move
const TEST_MOVE_STEPS: i32 = 20;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Whatever operator-facing windows have to get out of the way while the
/// pointer is being positioned
pub trait OperatorWindows: Send + Sync {
    fn hide(&self) {}
    fn restore(&self) {}
}

/// For terminal front ends, which have nothing to hide
pub struct NoWindows;

impl OperatorWindows for NoWindows {}

/// Restores the windows when dropped, so every exit path brings them back
struct Hidden<'a>(&'a dyn OperatorWindows);

impl<'a> Hidden<'a> {
    fn new(windows: &'a dyn OperatorWindows) -> Self {
        windows.hide();
        Self(windows)
    }
}

impl Drop for Hidden<'_> {
    fn drop(&mut self) {
        self.0.restore();
    }
}

/// Records and checks the screen positions of the login fields
pub struct CaptureTool {
    config: AutomationConfig,
    driver_factory: DriverFactory,
    windows: Box<dyn OperatorWindows>,
}

impl CaptureTool {
    pub fn new(config: AutomationConfig) -> Self {
        Self {
            config,
            driver_factory: enigo_factory(),
            windows: Box::new(NoWindows),
        }
    }

    pub fn with_driver_factory(mut self, factory: DriverFactory) -> Self {
        self.driver_factory = factory;
        self
    }

    pub fn with_windows(mut self, windows: impl OperatorWindows + 'static) -> Self {
        self.windows = Box::new(windows);
        self
    }

    pub fn capture_delay(&self) -> Duration {
        self.config.capture_delay()
    }

    /// Give the operator time to put the pointer on `field`, then sample it
    pub fn capture(&self, field: FieldId) -> Result<Point, CaptureError> {
        let _hidden = Hidden::new(self.windows.as_ref());
        thread::sleep(self.config.capture_delay());

        let mut driver = (self.driver_factory)()?;
        let point = driver.pointer_position()?;
        info!(target: "capture", "Captured {} at {}", field.description(), point);
        Ok(point)
    }

    /// Capture `field` and store it in `coords`
    pub fn capture_into(
        &self,
        coords: &mut LoginCoordinates,
        field: FieldId,
    ) -> Result<Point, CaptureError> {
        let point = self.capture(field)?;
        coords.set(field, point);
        Ok(point)
    }

    /// Glide the pointer over each recorded field. Never clicks or types.
    pub fn test(&self, coords: &LoginCoordinates) -> Result<(), CaptureError> {
        let _lease = InputLease::acquire();
        let mut driver = (self.driver_factory)()?;

        for field in FieldId::ALL {
            let target = coords.get(field);
            debug!(target: "capture", "Moving to {} at {}", field.description(), target);
            glide(driver.as_mut(), target, self.config.test_move())?;
            thread::sleep(self.config.test_pause());
        }
        Ok(())
    }

    pub fn save(&self, coords: &LoginCoordinates, path: &Path) -> Result<(), CaptureError> {
        coords.save(path).map_err(|e| {
            error!(target: "capture", "Failed to save coordinates: {}", e);
            CaptureError::from(e)
        })
    }
}

fn glide(driver: &mut dyn InputDriver, target: Point, duration: Duration) -> Result<(), InputError> {
    if duration.is_zero() {
        return driver.move_to(target);
    }

    let start = driver.pointer_position()?;
    let step_delay = duration / TEST_MOVE_STEPS as u32;
    for step in 1..=TEST_MOVE_STEPS {
        driver.move_to(Point::new(
            interpolate(start.x, target.x, step),
            interpolate(start.y, target.y, step),
        ))?;
        thread::sleep(step_delay);
    }
    Ok(())
}

/// Position `step` of [`TEST_MOVE_STEPS`] on the way from `from` to `to`
fn interpolate(from: i32, to: i32, step: i32) -> i32 {
    let (start, end) = (i64::from(from), i64::from(to));
    let value = start + (end - start) * i64::from(step) / i64::from(TEST_MOVE_STEPS);
    // Always lies between the two endpoints
    i32::try_from(value).unwrap_or(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{InputAction, RecordingDriver};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Default, Clone)]
    struct CountingWindows {
        hidden: Arc<AtomicU32>,
        restored: Arc<AtomicU32>,
    }

    impl OperatorWindows for CountingWindows {
        fn hide(&self) {
            self.hidden.fetch_add(1, Ordering::SeqCst);
        }

        fn restore(&self) {
            self.restored.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_windows_restored_when_capture_fails() {
        let windows = CountingWindows::default();
        let recorder = RecordingDriver::new().fail_connects(1);
        let tool = CaptureTool::new(AutomationConfig::immediate())
            .with_driver_factory(recorder.factory())
            .with_windows(windows.clone());

        assert!(tool.capture(FieldId::Username).is_err());
        assert_eq!(windows.hidden.load(Ordering::SeqCst), 1);
        assert_eq!(windows.restored.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_glide_ends_on_target() {
        let mut recorder = RecordingDriver::new().with_pointer(Point::new(0, 0));
        glide(&mut recorder, Point::new(200, 100), Duration::from_millis(20)).unwrap();

        let actions = recorder.actions();
        assert_eq!(actions.len(), TEST_MOVE_STEPS as usize);
        assert_eq!(actions[0], InputAction::MoveTo(Point::new(10, 5)));
        assert_eq!(
            actions.last(),
            Some(&InputAction::MoveTo(Point::new(200, 100)))
        );
    }

    #[test]
    fn test_glide_across_the_whole_coordinate_range() {
        let mut recorder = RecordingDriver::new().with_pointer(Point::new(i32::MIN, i32::MAX));
        glide(
            &mut recorder,
            Point::new(i32::MAX, i32::MIN),
            Duration::from_millis(20),
        )
        .unwrap();

        let actions = recorder.actions();
        assert_eq!(actions.len(), TEST_MOVE_STEPS as usize);
        assert_eq!(
            actions.last(),
            Some(&InputAction::MoveTo(Point::new(i32::MAX, i32::MIN)))
        );
    }
}
