pub mod actuator;
#[cfg(feature = "desktop")]
pub mod enigo_input;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

pub use actuator::InputActuator;
#[cfg(feature = "desktop")]
pub use enigo_input::EnigoInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Space,
    Up,
    Down,
}

/// Raw keyboard and mouse events in screen coordinates.
pub trait InputBackend {
    fn key_down(&mut self, key: Key) -> Result<(), InputError>;
    fn key_up(&mut self, key: Key) -> Result<(), InputError>;
    fn click(&mut self, x: u32, y: u32) -> Result<(), InputError>;
}
