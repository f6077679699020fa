use image::{DynamicImage, GrayImage};

use crate::common::imaging::area_resize;
use crate::config::EncoderSettings;

/// Square single-channel pixel grid, shape `(side, side, 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pixels: GrayImage,
}

impl Observation {
    pub fn zeros(side: u32) -> Self {
        Self {
            pixels: GrayImage::new(side, side),
        }
    }

    pub fn side(&self) -> u32 {
        self.pixels.width()
    }

    pub fn shape(&self) -> [usize; 3] {
        [
            self.pixels.height() as usize,
            self.pixels.width() as usize,
            1,
        ]
    }

    /// Row-major bytes; with one channel this is also the HWC layout.
    pub fn as_slice(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn image(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.pixels.into_raw()
    }
}

/// Grayscale, Canny edges, area resize. Edges keep obstacle silhouettes and
/// drop the theme colours and background texture.
#[derive(Debug, Clone)]
pub struct ObservationEncoder {
    canny_low: f32,
    canny_high: f32,
    side: u32,
}

impl ObservationEncoder {
    pub fn new(settings: &EncoderSettings) -> Self {
        Self {
            canny_low: settings.canny_low,
            canny_high: settings.canny_high,
            side: settings.side,
        }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn encode(&self, image: &DynamicImage) -> Observation {
        let gray = image.to_luma8();
        let edges = imageproc::edges::canny(&gray, self.canny_low, self.canny_high);
        Observation {
            pixels: area_resize(&edges, self.side, self.side),
        }
    }
}

impl Default for ObservationEncoder {
    fn default() -> Self {
        Self::new(&EncoderSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn play_area_with_obstacle(color: Rgba<u8>, background: Rgba<u8>) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_fn(840, 200, |x, y| {
            if (400..440).contains(&x) && (120..180).contains(&y) {
                color
            } else {
                background
            }
        }))
    }

    #[test]
    fn output_has_fixed_shape() {
        let encoder = ObservationEncoder::default();
        let observation =
            encoder.encode(&play_area_with_obstacle(Rgba([0, 0, 0, 255]), Rgba([255; 4])));
        assert_eq!(observation.shape(), [84, 84, 1]);
        assert_eq!(observation.as_slice().len(), 84 * 84);
    }

    #[test]
    fn encoding_is_deterministic() {
        let encoder = ObservationEncoder::default();
        let image = play_area_with_obstacle(Rgba([30, 30, 30, 255]), Rgba([240, 240, 240, 255]));
        assert_eq!(encoder.encode(&image), encoder.encode(&image.clone()));
    }

    #[test]
    fn flat_frame_has_no_edges() {
        let encoder = ObservationEncoder::default();
        let image = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(840, 200, Rgba([200; 4])));
        assert!(encoder.encode(&image).as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn obstacle_outline_survives() {
        let encoder = ObservationEncoder::default();
        let observation =
            encoder.encode(&play_area_with_obstacle(Rgba([0, 0, 0, 255]), Rgba([255; 4])));
        let lit = observation.as_slice().iter().filter(|&&v| v > 0).count();
        assert!(lit > 0);

        // Nothing away from the obstacle outline.
        let corner = observation.image().get_pixel(5, 5)[0];
        assert_eq!(corner, 0);
    }
}
