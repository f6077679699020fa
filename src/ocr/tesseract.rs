use std::io::{Cursor, ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use image::{GrayImage, ImageFormat};

use crate::config::OcrSettings;
use crate::error::OcrError;
use crate::ocr::TextRecognizer;

/// Drives the `tesseract` command-line tool, digits only.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    program: PathBuf,
    page_segmentation_mode: u8,
}

impl TesseractRecognizer {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            program: settings.program.clone(),
            page_segmentation_mode: settings.page_segmentation_mode,
        }
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    fn arguments(&self) -> Vec<String> {
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "--psm".to_string(),
            self.page_segmentation_mode.to_string(),
            "-c".to_string(),
            "tessedit_char_whitelist=0123456789".to_string(),
        ]
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize_line(&self, image: &GrayImage) -> Result<String, OcrError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut child = Command::new(&self.program)
            .args(self.arguments())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    OcrError::Unavailable(self.program.display().to_string())
                }
                _ => OcrError::Io(e),
            })?;

        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };
        // Reap the child even when it stopped reading early.
        let output = child.wait_with_output()?;
        written?;
        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
