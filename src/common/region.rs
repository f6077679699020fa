use serde::{Deserialize, Serialize};
use std::fmt;

/// Rectangle in screen pixel coordinates. Capture and input share this space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRegion {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds a region from signed coordinates, rejecting anything that
    /// would start left of or above the screen origin or has no area.
    pub fn from_signed(left: i64, top: i64, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let left = u32::try_from(left).ok()?;
        let top = u32::try_from(top).ok()?;
        Some(Self::new(left, top, width, height))
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Absolute screen point at an offset from the top-left corner.
    pub fn point(&self, dx: u32, dy: u32) -> (u32, u32) {
        (self.left + dx, self.top + dy)
    }

    pub fn center(&self) -> (u32, u32) {
        self.point(self.width / 2, self.height / 2)
    }

    /// Where `self` lands in a `pixel_width` x `pixel_height` capture of
    /// `screen`. On a scaled display the capture has more pixels than the
    /// screen has logical units.
    pub fn to_pixels(
        &self,
        screen: &ScreenRegion,
        pixel_width: u32,
        pixel_height: u32,
    ) -> ScreenRegion {
        let sx = f64::from(pixel_width) / f64::from(screen.width.max(1));
        let sy = f64::from(pixel_height) / f64::from(screen.height.max(1));
        let left = ((f64::from(self.left.saturating_sub(screen.left)) * sx).floor() as u32)
            .min(pixel_width.saturating_sub(1));
        let top = ((f64::from(self.top.saturating_sub(screen.top)) * sy).floor() as u32)
            .min(pixel_height.saturating_sub(1));
        let width = ((f64::from(self.width) * sx).round() as u32)
            .min(pixel_width.saturating_sub(left))
            .max(1);
        let height = ((f64::from(self.height) * sy).round() as u32)
            .min(pixel_height.saturating_sub(top))
            .max(1);
        ScreenRegion::new(left, top, width, height)
    }

    pub fn contains(&self, other: &ScreenRegion) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl fmt::Display for ScreenRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.left, self.top
        )
    }
}
