use crate::capture::ScreenCapture;
use crate::common::ScreenRegion;
use crate::ocr::TextRecognizer;

/// Keeps only ASCII digits and parses them. `None` when nothing numeric is
/// left or the number does not fit.
pub fn parse_digits(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Best-effort score extraction from the on-screen counter.
pub struct ScoreReader {
    recognizer: Box<dyn TextRecognizer>,
}

impl ScoreReader {
    pub fn new(recognizer: Box<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    /// The score currently shown, or `None` when capture or recognition
    /// produced nothing usable.
    pub fn try_read(&self, capture: &mut dyn ScreenCapture, region: &ScreenRegion) -> Option<u64> {
        let frame = match capture.grab(region) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("Score capture failed: {}", e);
                return None;
            }
        };
        let text = match self.recognizer.recognize_line(&frame.to_gray()) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("Score recognition failed: {}", e);
                return None;
            }
        };
        let score = parse_digits(&text);
        if score.is_none() {
            tracing::trace!("Unreadable score text {:?}", text.trim());
        }
        score
    }

    /// Never fails: any problem yields `previous` unchanged.
    pub fn read_score(
        &self,
        capture: &mut dyn ScreenCapture,
        region: &ScreenRegion,
        previous: u64,
    ) -> u64 {
        self.try_read(capture, region).unwrap_or(previous)
    }
}
