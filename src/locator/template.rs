use std::fmt;
use std::path::Path;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::common::ScreenRegion;
use crate::config::TemplatePaths;
use crate::error::TemplateError;
use crate::locator::correlation::has_contrast;

/// The reference images the session knows how to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateId {
    /// Start button shown before the first run.
    Play,
    /// Restart button shown once the game is over; doubles as the terminal
    /// indicator and as the anchor for every derived region.
    Replay,
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateId::Play => write!(f, "play"),
            TemplateId::Replay => write!(f, "replay"),
        }
    }
}

/// Both reference images, decoded to grayscale once at startup.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    play: GrayImage,
    replay: GrayImage,
}

impl TemplateSet {
    /// A missing or undecodable image is a startup failure.
    pub fn load(paths: &TemplatePaths) -> Result<Self, TemplateError> {
        let play = Self::load_one(&paths.play)?;
        let replay = Self::load_one(&paths.replay)?;
        Self::from_images(play, replay)
    }

    pub fn from_images(play: GrayImage, replay: GrayImage) -> Result<Self, TemplateError> {
        for (id, image) in [(TemplateId::Play, &play), (TemplateId::Replay, &replay)] {
            if !has_contrast(image) {
                return Err(TemplateError::Flat(id.to_string()));
            }
        }
        Ok(Self { play, replay })
    }

    pub fn get(&self, id: TemplateId) -> &GrayImage {
        match id {
            TemplateId::Play => &self.play,
            TemplateId::Replay => &self.replay,
        }
    }

    /// Both templates must fit inside `area` to ever be found there.
    pub fn check_fits(&self, area: &ScreenRegion) -> Result<(), TemplateError> {
        for id in [TemplateId::Play, TemplateId::Replay] {
            let image = self.get(id);
            if image.width() > area.width || image.height() > area.height {
                return Err(TemplateError::TooLarge {
                    template: id.to_string(),
                    width: image.width(),
                    height: image.height(),
                    area: area.to_string(),
                });
            }
        }
        Ok(())
    }

    fn load_one(path: &Path) -> Result<GrayImage, TemplateError> {
        let image = image::open(path).map_err(|source| TemplateError::Load {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(
            "Loaded template {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(image.to_luma8())
    }
}
