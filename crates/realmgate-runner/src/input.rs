use std::sync::Arc;

use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use realmgate_client::config::Point;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to initialize input simulation: {0}")]
    Connect(String),
    #[error("Input simulation failed: {0}")]
    Inject(String),
}

/// Synthetic pointer and keyboard input.
///
/// Everything acts on whatever window currently has focus; there is no way to
/// target a specific window.
pub trait InputDriver {
    fn move_to(&mut self, point: Point) -> Result<(), InputError>;

    /// Left click at the current pointer position
    fn click(&mut self) -> Result<(), InputError>;

    fn select_all(&mut self) -> Result<(), InputError>;

    fn delete(&mut self) -> Result<(), InputError>;

    fn type_char(&mut self, c: char) -> Result<(), InputError>;

    /// Press Enter
    fn confirm(&mut self) -> Result<(), InputError>;

    fn pointer_position(&mut self) -> Result<Point, InputError>;

    fn click_at(&mut self, point: Point) -> Result<(), InputError> {
        self.move_to(point)?;
        self.click()
    }
}

/// Creates a driver on the thread that is going to use it
pub type DriverFactory = Arc<dyn Fn() -> Result<Box<dyn InputDriver>, InputError> + Send + Sync>;

pub fn enigo_factory() -> DriverFactory {
    Arc::new(|| EnigoDriver::new().map(|driver| Box::new(driver) as Box<dyn InputDriver>))
}

#[cfg(target_os = "macos")]
const SELECT_ALL_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
const SELECT_ALL_MODIFIER: Key = Key::Control;

/// [`InputDriver`] backed by the platform input APIs through enigo
pub struct EnigoDriver {
    enigo: Enigo,
}

impl EnigoDriver {
    pub fn new() -> Result<Self, InputError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| InputError::Connect(e.to_string()))?;
        Ok(Self { enigo })
    }
}

fn inject(result: Result<(), enigo::InputError>) -> Result<(), InputError> {
    result.map_err(|e| InputError::Inject(e.to_string()))
}

impl InputDriver for EnigoDriver {
    fn move_to(&mut self, point: Point) -> Result<(), InputError> {
        inject(self.enigo.move_mouse(point.x, point.y, Coordinate::Abs))
    }

    fn click(&mut self) -> Result<(), InputError> {
        inject(self.enigo.button(Button::Left, Direction::Click))
    }

    fn select_all(&mut self) -> Result<(), InputError> {
        inject(self.enigo.key(SELECT_ALL_MODIFIER, Direction::Press))?;
        let typed = inject(self.enigo.key(Key::Unicode('a'), Direction::Click));
        // Always let go of the modifier, even if the letter failed
        let released = inject(self.enigo.key(SELECT_ALL_MODIFIER, Direction::Release));
        typed.and(released)
    }

    fn delete(&mut self) -> Result<(), InputError> {
        inject(self.enigo.key(Key::Delete, Direction::Click))
    }

    fn type_char(&mut self, c: char) -> Result<(), InputError> {
        let mut buf = [0u8; 4];
        inject(self.enigo.text(c.encode_utf8(&mut buf)))
    }

    fn confirm(&mut self) -> Result<(), InputError> {
        inject(self.enigo.key(Key::Return, Direction::Click))
    }

    fn pointer_position(&mut self) -> Result<Point, InputError> {
        let (x, y) = self
            .enigo
            .location()
            .map_err(|e| InputError::Inject(e.to_string()))?;
        Ok(Point::new(x, y))
    }
}
