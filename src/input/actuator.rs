use std::sync::Arc;
use std::time::Duration;

use crate::common::Clock;
use crate::input::{InputBackend, Key};

/// Fire-and-forget input. Failures are logged and dropped; whether an input
/// registered only shows up in later observations.
pub struct InputActuator {
    backend: Box<dyn InputBackend>,
    clock: Arc<dyn Clock>,
}

impl InputActuator {
    pub fn new(backend: Box<dyn InputBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Key down immediately followed by key up.
    pub fn press(&mut self, key: Key) {
        self.key_down(key);
        self.key_up(key);
        tracing::debug!("Pressed {:?}", key);
    }

    /// Key down, blocking wait, key up. The release is sent even when the
    /// press failed so a key never stays stuck.
    pub fn hold(&mut self, key: Key, duration: Duration) {
        self.key_down(key);
        self.clock.sleep(duration);
        self.key_up(key);
        tracing::debug!("Held {:?} for {:?}", key, duration);
    }

    pub fn click(&mut self, x: u32, y: u32) {
        if let Err(e) = self.backend.click(x, y) {
            tracing::warn!("Click at ({}, {}) was not delivered: {}", x, y, e);
        }
    }

    fn key_down(&mut self, key: Key) {
        if let Err(e) = self.backend.key_down(key) {
            tracing::warn!("Key down {:?} was not delivered: {}", key, e);
        }
    }

    fn key_up(&mut self, key: Key) {
        if let Err(e) = self.backend.key_up(key) {
            tracing::warn!("Key up {:?} was not delivered: {}", key, e);
        }
    }
}
