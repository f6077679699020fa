use serde::{Deserialize, Serialize};

use crate::common::ScreenRegion;
use crate::error::AppError;

/// A rectangle placed at a signed offset from an origin's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOffset {
    pub dx: i64,
    pub dy: i64,
    pub width: u32,
    pub height: u32,
}

impl RegionOffset {
    pub fn apply(&self, origin: &ScreenRegion) -> Option<ScreenRegion> {
        ScreenRegion::from_signed(
            i64::from(origin.left) + self.dx,
            i64::from(origin.top) + self.dy,
            self.width,
            self.height,
        )
    }
}

/// Where the play area and score counter sit relative to the game-over
/// anchor. Calibrated for one page layout; another skin or resolution only
/// needs a different instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionLayout {
    /// Relative to the anchor.
    pub game: RegionOffset,
    /// Relative to the play area.
    pub score: RegionOffset,
}

impl Default for RegionLayout {
    fn default() -> Self {
        Self {
            game: RegionOffset {
                dx: -378,
                dy: -89,
                width: 840,
                height: 200,
            },
            score: RegionOffset {
                dx: 600,
                dy: 0,
                width: 235,
                height: 50,
            },
        }
    }
}

/// The three regions a session watches, fixed until the next locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionRegions {
    pub game: ScreenRegion,
    pub terminal: ScreenRegion,
    pub score: ScreenRegion,
}

impl RegionLayout {
    pub fn validate(&self) -> Result<(), String> {
        for (name, offset) in [("layout.game", &self.game), ("layout.score", &self.score)] {
            if offset.width == 0 || offset.height == 0 {
                return Err(format!("{name} must have a non-zero width and height"));
            }
        }
        Ok(())
    }

    /// All regions hang off the one anchor; the terminal region is the
    /// anchor's own box.
    pub fn derive(&self, anchor: &ScreenRegion) -> Result<SessionRegions, AppError> {
        let game = self
            .game
            .apply(anchor)
            .ok_or_else(|| AppError::RegionOutOfBounds {
                name: "game",
                detail: format!("anchor {} offset by {:?}", anchor, self.game),
            })?;
        let score = self
            .score
            .apply(&game)
            .ok_or_else(|| AppError::RegionOutOfBounds {
                name: "score",
                detail: format!("game area {} offset by {:?}", game, self.score),
            })?;
        Ok(SessionRegions {
            game,
            terminal: *anchor,
            score,
        })
    }
}

impl SessionRegions {
    pub fn check_within(&self, screen: &ScreenRegion) -> Result<(), AppError> {
        for (name, region) in [
            ("game", &self.game),
            ("terminal", &self.terminal),
            ("score", &self.score),
        ] {
            if !screen.contains(region) {
                return Err(AppError::RegionOutOfBounds {
                    name,
                    detail: format!("{} exceeds screen {}", region, screen),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_calibrated_offsets() {
        let anchor = ScreenRegion::new(400, 100, 36, 32);
        let regions = RegionLayout::default().derive(&anchor).unwrap();

        assert_eq!(regions.game, ScreenRegion::new(22, 11, 840, 200));
        assert_eq!(regions.terminal, anchor);
        assert_eq!(regions.score, ScreenRegion::new(622, 11, 235, 50));
    }

    #[test]
    fn anchor_too_close_to_origin_is_rejected() {
        let anchor = ScreenRegion::new(100, 100, 36, 32);
        let err = RegionLayout::default().derive(&anchor).unwrap_err();
        assert!(matches!(err, AppError::RegionOutOfBounds { name: "game", .. }));
    }

    #[test]
    fn alternate_layout_needs_no_code_change() {
        let layout = RegionLayout {
            game: RegionOffset {
                dx: -10,
                dy: -10,
                width: 100,
                height: 50,
            },
            score: RegionOffset {
                dx: 80,
                dy: 5,
                width: 20,
                height: 10,
            },
        };
        let regions = layout.derive(&ScreenRegion::new(50, 40, 8, 8)).unwrap();
        assert_eq!(regions.game, ScreenRegion::new(40, 30, 100, 50));
        assert_eq!(regions.score, ScreenRegion::new(120, 35, 20, 10));
    }

    #[test]
    fn regions_must_fit_on_screen() {
        let regions = RegionLayout::default()
            .derive(&ScreenRegion::new(400, 100, 36, 32))
            .unwrap();
        assert!(regions.check_within(&ScreenRegion::new(0, 0, 1000, 400)).is_ok());
        assert!(matches!(
            regions.check_within(&ScreenRegion::new(0, 0, 800, 400)),
            Err(AppError::RegionOutOfBounds { name: "game", .. })
        ));
    }
}
