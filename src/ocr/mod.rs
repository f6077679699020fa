pub mod score_reader;
pub mod tesseract;

use image::GrayImage;

use crate::error::OcrError;

pub use score_reader::{ScoreReader, parse_digits};
pub use tesseract::TesseractRecognizer;

/// Recognizes a single line of text in a grayscale image.
pub trait TextRecognizer {
    fn recognize_line(&self, image: &GrayImage) -> Result<String, OcrError>;
}
