#[cfg(feature = "desktop")]
pub mod xcap_capture;

use crate::common::{Frame, ScreenRegion};
use crate::error::CaptureError;

#[cfg(feature = "desktop")]
pub use xcap_capture::XcapCapture;

/// Synchronous screen grabber. Each call returns the single most recent
/// frame of `region`; nothing is buffered between calls.
pub trait ScreenCapture {
    fn grab(&mut self, region: &ScreenRegion) -> Result<Frame, CaptureError>;

    /// The whole capturable screen, used when a search has no sub-region.
    fn screen_bounds(&self) -> Result<ScreenRegion, CaptureError>;

    fn grab_screen(&mut self) -> Result<Frame, CaptureError> {
        let screen = self.screen_bounds()?;
        self.grab(&screen)
    }
}
