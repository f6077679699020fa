pub mod capture;
pub mod common;
pub mod config;
pub mod error;
pub mod input;
pub mod locator;
pub mod observation;
pub mod ocr;
pub mod runner;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use common::{ACTION_SPACE, Action, OBSERVATION_SPACE, ScreenRegion};
pub use config::Configuration;
pub use error::{AppError, CaptureError, InputError, OcrError, TemplateError};

pub use observation::{FrameStack, Observation};
pub use session::{Environment, GameSession, SessionState, StepResult};
