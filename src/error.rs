use std::time::Duration;

use thiserror::Error;

use crate::locator::TemplateId;
use crate::session::SessionState;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Could not find template '{template}' on screen within {timeout:?}")]
    TemplateNotFound {
        template: TemplateId,
        timeout: Duration,
    },
    #[error("Cannot {operation} while the session is {from:?}")]
    InvalidTransition {
        from: SessionState,
        operation: &'static str,
    },
    #[error("Action index {0} is outside the action space")]
    InvalidAction(usize),
    #[error("Derived {name} region lies outside the screen: {detail}")]
    RegionOutOfBounds { name: &'static str, detail: String },
    #[error("Session component not set: {0}")]
    MissingComponent(&'static str),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Template Error: {0}")]
    Template(#[from] TemplateError),
    #[error("Capture Error: {0}")]
    Capture(#[from] CaptureError),
    #[error("Input Error: {0}")]
    Input(#[from] InputError),
    #[error("OCR Error: {0}")]
    Ocr(#[from] OcrError),
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template image '{path}' could not be loaded: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Template '{0}' has no contrast and cannot be matched")]
    Flat(String),
    #[error("Template '{template}' ({width}x{height}) does not fit in the search area {area}")]
    TooLarge {
        template: String,
        width: u32,
        height: u32,
        area: String,
    },
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No monitor available for capture")]
    NoMonitor,
    #[error("Region {region} is outside the captured screen {screen}")]
    OutOfBounds { region: String, screen: String },
    #[error("Capture of {0} returned fewer pixels than requested")]
    Empty(String),
    #[error("Capture backend failed: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to connect to the input backend: {0}")]
    Connect(String),
    #[error("Failed to send key event: {0}")]
    Key(String),
    #[error("Failed to send mouse event: {0}")]
    Mouse(String),
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Recognizer '{0}' is not available")]
    Unavailable(String),
    #[error("Recognizer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("Failed to talk to the recognizer: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode image for recognition: {0}")]
    Encode(#[from] image::ImageError),
}
