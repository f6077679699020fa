use chrono::{DateTime, Utc};
use image::{DynamicImage, GrayImage};
use std::sync::Arc;
use uuid::Uuid;

use crate::common::ScreenRegion;

/// One captured screen rectangle. Only the most recent frame is ever kept.
#[derive(Clone)]
pub struct Frame {
    session_id: Uuid,
    region: ScreenRegion,
    image: Arc<DynamicImage>,
    captured_at: DateTime<Utc>,
    frame_id: Uuid,
}

impl Frame {
    pub fn new(
        session_id: Uuid,
        region: ScreenRegion,
        image: DynamicImage,
        captured_at: DateTime<Utc>,
        frame_id: Uuid,
    ) -> Self {
        Self {
            session_id,
            region,
            image: Arc::new(image),
            captured_at,
            frame_id,
        }
    }

    /// Stamps a freshly grabbed image with the current time and a new id.
    pub fn captured(session_id: Uuid, region: ScreenRegion, image: DynamicImage) -> Self {
        Self::new(session_id, region, image, Utc::now(), Uuid::new_v4())
    }

    pub fn get_session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn get_frame_id(&self) -> Uuid {
        self.frame_id
    }

    pub fn region(&self) -> ScreenRegion {
        self.region
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn to_gray(&self) -> GrayImage {
        self.image.to_luma8()
    }

    /// A backend must hand back exactly the pixels of the requested region.
    pub fn matches_region(&self) -> bool {
        self.image.width() == self.region.width && self.image.height() == self.region.height
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("frame_id", &self.frame_id)
            .field("region", &self.region)
            .field("captured_at", &self.captured_at)
            .finish()
    }
}
