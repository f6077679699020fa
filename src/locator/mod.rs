pub mod correlation;
pub mod template;

use std::sync::Arc;
use std::time::Duration;

use crate::capture::ScreenCapture;
use crate::common::{Clock, ScreenRegion};
use crate::config::LocatorSettings;

pub use template::{TemplateId, TemplateSet};

/// A template found on screen: its bounding box in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    pub template: TemplateId,
    pub region: ScreenRegion,
    pub score: f32,
}

/// Looks for reference images on screen. Reading the screen is its only
/// side effect.
pub struct TemplateLocator {
    templates: TemplateSet,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    pyramid_scale: u32,
}

impl TemplateLocator {
    pub fn new(templates: TemplateSet, clock: Arc<dyn Clock>, settings: &LocatorSettings) -> Self {
        Self {
            templates,
            clock,
            poll_interval: settings.poll_interval(),
            pyramid_scale: settings.pyramid_scale,
        }
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// One sample of the screen (or `within`). A capture failure counts as
    /// "no match this tick".
    pub fn find_once(
        &self,
        capture: &mut dyn ScreenCapture,
        template: TemplateId,
        within: Option<&ScreenRegion>,
        confidence: f32,
    ) -> Option<TemplateMatch> {
        let grabbed = match within {
            Some(region) => capture.grab(region),
            None => capture.grab_screen(),
        };
        let frame = match grabbed {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("No {} match this tick, capture failed: {}", template, e);
                return None;
            }
        };

        let needle = self.templates.get(template);
        let haystack = frame.to_gray();
        let best = correlation::best_match_coarse_to_fine(
            &haystack,
            needle,
            self.pyramid_scale,
            confidence,
        )?;
        if best.score < confidence {
            tracing::trace!(
                "Best {} candidate scored {:.3} (< {:.2})",
                template,
                best.score,
                confidence
            );
            return None;
        }

        let origin = frame.region();
        Some(TemplateMatch {
            template,
            region: ScreenRegion::new(
                origin.left + best.x,
                origin.top + best.y,
                needle.width(),
                needle.height(),
            ),
            score: best.score,
        })
    }

    /// Polls every `poll_interval` until a match at or above `confidence`
    /// appears or `timeout` has elapsed.
    pub fn locate(
        &self,
        capture: &mut dyn ScreenCapture,
        template: TemplateId,
        within: Option<&ScreenRegion>,
        confidence: f32,
        timeout: Duration,
    ) -> Option<TemplateMatch> {
        let started = self.clock.now();
        let mut attempts = 0u32;
        while self.clock.now().duration_since(started) < timeout {
            attempts += 1;
            if let Some(found) = self.find_once(capture, template, within, confidence) {
                tracing::info!(
                    "Found {} at {} (score {:.3}, attempt {})",
                    template,
                    found.region,
                    found.score,
                    attempts
                );
                return Some(found);
            }
            self.clock.sleep(self.poll_interval);
        }
        tracing::debug!(
            "Gave up looking for {} after {} attempts over {:?}",
            template,
            attempts,
            timeout
        );
        None
    }
}
