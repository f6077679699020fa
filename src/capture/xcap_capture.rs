use image::DynamicImage;
use image::imageops::FilterType;
use uuid::Uuid;
use xcap::Monitor;

use crate::capture::ScreenCapture;
use crate::common::{Frame, ScreenRegion};
use crate::error::CaptureError;

/// Captures from one monitor and crops to the requested region.
pub struct XcapCapture {
    session_id: Uuid,
    monitor: Monitor,
}

impl XcapCapture {
    pub fn primary(session_id: Uuid) -> Result<Self, CaptureError> {
        let monitors = Monitor::all().map_err(|e| CaptureError::Backend(e.to_string()))?;
        let monitor = monitors
            .into_iter()
            .find(|m| m.is_primary())
            .ok_or(CaptureError::NoMonitor)?;
        tracing::info!(
            "Capturing monitor '{}' ({}x{}, scale {})",
            monitor.name(),
            monitor.width(),
            monitor.height(),
            monitor.scale_factor()
        );
        Ok(Self {
            session_id,
            monitor,
        })
    }
}

impl ScreenCapture for XcapCapture {
    fn grab(&mut self, region: &ScreenRegion) -> Result<Frame, CaptureError> {
        let screen = self.screen_bounds()?;
        if !screen.contains(region) {
            return Err(CaptureError::OutOfBounds {
                region: region.to_string(),
                screen: screen.to_string(),
            });
        }

        let full = self
            .monitor
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;
        // The capture is in physical pixels; regions and input are logical.
        let pixels = region.to_pixels(&screen, full.width(), full.height());
        let mut cropped =
            image::imageops::crop_imm(&full, pixels.left, pixels.top, pixels.width, pixels.height)
                .to_image();
        if (cropped.width(), cropped.height()) != (region.width, region.height) {
            cropped = image::imageops::resize(
                &cropped,
                region.width,
                region.height,
                FilterType::Triangle,
            );
        }

        let frame = Frame::captured(self.session_id, *region, DynamicImage::ImageRgba8(cropped));
        if !frame.matches_region() {
            return Err(CaptureError::Empty(region.to_string()));
        }
        Ok(frame)
    }

    fn screen_bounds(&self) -> Result<ScreenRegion, CaptureError> {
        ScreenRegion::from_signed(
            i64::from(self.monitor.x()),
            i64::from(self.monitor.y()),
            self.monitor.width(),
            self.monitor.height(),
        )
        .ok_or_else(|| {
            CaptureError::Backend("monitor has a negative origin or no area".to_string())
        })
    }
}
