use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::common::OBSERVATION_SPACE;
use crate::error::AppError;
use crate::input::Key;
use crate::session::RegionLayout;

pub const ENV_PREFIX: &str = "DINOBOT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub game_url: String,
    pub templates: TemplatePaths,
    pub layout: RegionLayout,
    pub locator: LocatorSettings,
    pub timing: TimingSettings,
    pub rewards: RewardSettings,
    pub keys: KeyBindings,
    pub encoder: EncoderSettings,
    pub ocr: OcrSettings,
    pub runner: RunnerSettings,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            game_url: "https://www.crazygames.com/game/chrome-dino".to_string(),
            templates: TemplatePaths::default(),
            layout: RegionLayout::default(),
            locator: LocatorSettings::default(),
            timing: TimingSettings::default(),
            rewards: RewardSettings::default(),
            keys: KeyBindings::default(),
            encoder: EncoderSettings::default(),
            ocr: OcrSettings::default(),
            runner: RunnerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatePaths {
    pub play: PathBuf,
    pub replay: PathBuf,
}

impl Default for TemplatePaths {
    fn default() -> Self {
        Self {
            play: PathBuf::from("play_button.png"),
            replay: PathBuf::from("replay_button.png"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorSettings {
    /// Minimum similarity for the startup anchors.
    pub confidence: f32,
    /// Minimum similarity for the per-step game-over check.
    pub terminal_confidence: f32,
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Downscale factor for the coarse pass of a full-screen search.
    pub pyramid_scale: u32,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            confidence: 0.8,
            terminal_confidence: 0.9,
            timeout_ms: 30_000,
            poll_interval_ms: 1_000,
            pyramid_scale: 4,
        }
    }
}

impl LocatorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Wait after clicking "play" before the start key.
    pub launch_settle_ms: u64,
    /// Wait after the start key before looking for the game-over anchor.
    pub start_settle_ms: u64,
    pub duck_hold_ms: u64,
    /// Click point inside the play area that gives the game focus.
    pub game_focus: ClickOffset,
    /// Click point inside the game-over indicator that restarts the game.
    pub terminal_focus: ClickOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickOffset {
    pub dx: u32,
    pub dy: u32,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            launch_settle_ms: 4_000,
            start_settle_ms: 2_000,
            duck_hold_ms: 100,
            game_focus: ClickOffset { dx: 50, dy: 50 },
            terminal_focus: ClickOffset { dx: 10, dy: 10 },
        }
    }
}

impl TimingSettings {
    pub fn launch_settle(&self) -> Duration {
        Duration::from_millis(self.launch_settle_ms)
    }

    pub fn start_settle(&self) -> Duration {
        Duration::from_millis(self.start_settle_ms)
    }

    pub fn duck_hold(&self) -> Duration {
        Duration::from_millis(self.duck_hold_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardSettings {
    pub survival_bonus: f64,
    pub action_cost: f64,
    pub death_penalty: f64,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            survival_bonus: 0.01,
            action_cost: 0.02,
            death_penalty: -10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Starts a fresh run, both at launch and on restart.
    pub start: Key,
    pub jump: Key,
    pub duck: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            start: Key::Space,
            jump: Key::Up,
            duck: Key::Down,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub canny_low: f32,
    pub canny_high: f32,
    pub side: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            canny_low: 100.0,
            canny_high: 200.0,
            side: 84,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub program: PathBuf,
    pub page_segmentation_mode: u8,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
            // Single text line.
            page_segmentation_mode: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    pub episodes: u32,
    pub step_interval_ms: u64,
    pub frame_stack: usize,
    pub seed: u64,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            episodes: 10,
            step_interval_ms: 20,
            frame_stack: 4,
            seed: 0,
        }
    }
}

impl RunnerSettings {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

impl Configuration {
    /// Defaults, then the optional file, then `DINOBOT__SECTION__KEY`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Configuration::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let configuration: Configuration = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        configuration.validate().map_err(AppError::InvalidConfig)?;
        Ok(configuration)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("locator.confidence", self.locator.confidence),
            ("locator.terminal_confidence", self.locator.terminal_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be between 0.0 and 1.0"));
            }
        }

        if self.locator.timeout_ms == 0 {
            return Err("locator.timeout_ms must be greater than 0".to_string());
        }

        if self.locator.poll_interval_ms == 0 {
            return Err("locator.poll_interval_ms must be greater than 0".to_string());
        }

        if self.locator.pyramid_scale == 0 {
            return Err("locator.pyramid_scale must be at least 1".to_string());
        }

        self.layout.validate()?;

        if self.encoder.canny_low > self.encoder.canny_high {
            return Err("encoder.canny_low must not exceed encoder.canny_high".to_string());
        }

        let side = OBSERVATION_SPACE.shape[0];
        if self.encoder.side as usize != side {
            return Err(format!(
                "encoder.side must be {side} to match the observation space"
            ));
        }

        if self.runner.frame_stack == 0 {
            return Err("runner.frame_stack must be greater than 0".to_string());
        }

        Ok(())
    }
}
