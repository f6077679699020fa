use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};

use crate::error::InputError;
use crate::input::{InputBackend, Key};

pub struct EnigoInput {
    enigo: Enigo,
}

impl EnigoInput {
    pub fn new() -> Result<Self, InputError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| InputError::Connect(e.to_string()))?;
        Ok(Self { enigo })
    }

    fn map_key(key: Key) -> enigo::Key {
        match key {
            Key::Space => enigo::Key::Space,
            Key::Up => enigo::Key::UpArrow,
            Key::Down => enigo::Key::DownArrow,
        }
    }

    fn send_key(&mut self, key: Key, direction: Direction) -> Result<(), InputError> {
        self.enigo
            .key(Self::map_key(key), direction)
            .map_err(|e| InputError::Key(e.to_string()))
    }
}

impl InputBackend for EnigoInput {
    fn key_down(&mut self, key: Key) -> Result<(), InputError> {
        self.send_key(key, Direction::Press)
    }

    fn key_up(&mut self, key: Key) -> Result<(), InputError> {
        self.send_key(key, Direction::Release)
    }

    fn click(&mut self, x: u32, y: u32) -> Result<(), InputError> {
        let x = i32::try_from(x).map_err(|e| InputError::Mouse(e.to_string()))?;
        let y = i32::try_from(y).map_err(|e| InputError::Mouse(e.to_string()))?;
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| InputError::Mouse(e.to_string()))?;
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| InputError::Mouse(e.to_string()))
    }
}
