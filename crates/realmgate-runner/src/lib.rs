mod cancel;
pub mod capture;
pub mod input;
mod lease;
pub mod logging;
mod recording;
mod sequencer;
mod sinks;

pub use cancel::CancelToken;
pub use capture::{CaptureError, CaptureTool, NoWindows, OperatorWindows};
pub use input::{enigo_factory, DriverFactory, EnigoDriver, InputDriver, InputError};
pub use lease::InputLease;
pub use recording::{InputAction, RecordingDriver};
pub use sequencer::{LaunchError, LoginHandle, LoginOutcome, LoginSequencer};
pub use sinks::LoggingSink;

pub use realmgate_events::{FieldId, LoginEvent, Severity, StatusSink};
