use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::capture::ScreenCapture;
use crate::common::{Action, Clock, Frame, ScreenRegion, SystemClock};
use crate::config::Configuration;
use crate::error::AppError;
use crate::input::{InputActuator, InputBackend};
use crate::locator::{TemplateId, TemplateLocator, TemplateMatch, TemplateSet};
use crate::observation::{Observation, ObservationEncoder};
use crate::ocr::{ScoreReader, TesseractRecognizer, TextRecognizer};
use crate::session::environment::{Environment, Info, StepResult};
use crate::session::reward::{RewardCalculator, ScoreBaseline};
use crate::session::layout::SessionRegions;
use crate::session::state::{SessionState, Transition};

/// One game on screen, driven through screen captures and synthetic input.
/// Owns its capture and input handles; they are released when the session
/// is closed or dropped.
pub struct GameSession {
    id: Uuid,
    state: SessionState,
    configuration: Configuration,
    capture: Box<dyn ScreenCapture>,
    actuator: InputActuator,
    locator: TemplateLocator,
    score_reader: ScoreReader,
    encoder: ObservationEncoder,
    rewards: RewardCalculator,
    clock: Arc<dyn Clock>,
    regions: Option<SessionRegions>,
    baseline: ScoreBaseline,
    episode_steps: u64,
    last_frame: Option<Frame>,
    last_observation: Option<Observation>,
}

impl GameSession {
    pub fn builder(configuration: Configuration) -> GameSessionBuilder {
        GameSessionBuilder::new(configuration)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn regions(&self) -> Option<SessionRegions> {
        self.regions
    }

    pub fn baseline_score(&self) -> u64 {
        self.baseline.value()
    }

    pub fn episode_steps(&self) -> u64 {
        self.episode_steps
    }

    /// Most recent raw play-area capture, if any.
    pub fn render(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Finds the game on screen, starts it once and derives the play, score
    /// and game-over regions from the game-over anchor. Not finding either
    /// anchor within the timeout is fatal.
    pub fn locate(&mut self) -> Result<SessionRegions, AppError> {
        tracing::info!("Session {} locating the game", self.id);
        match self.capture.screen_bounds() {
            Ok(screen) => self.locator.templates().check_fits(&screen)?,
            Err(e) => tracing::warn!("Could not read the screen size: {}", e),
        }

        let play = self.find_anchor(TemplateId::Play)?;
        let (x, y) = play.region.center();
        self.actuator.click(x, y);
        self.clock.sleep(self.configuration.timing.launch_settle());
        self.actuator.press(self.configuration.keys.start);
        self.clock.sleep(self.configuration.timing.start_settle());

        let anchor = self.find_anchor(TemplateId::Replay)?;
        let regions = self.configuration.layout.derive(&anchor.region)?;
        match self.capture.screen_bounds() {
            Ok(screen) => regions.check_within(&screen)?,
            Err(e) => tracing::warn!("Could not check regions against the screen: {}", e),
        }

        self.state = self.state.after(Transition::Located)?;
        self.regions = Some(regions);
        self.baseline.reset();
        tracing::info!("Game region calculated: {}", regions.game);
        tracing::info!("Score region calculated: {}", regions.score);
        tracing::info!("Game-over region calculated: {}", regions.terminal);
        Ok(regions)
    }

    /// Restarts the game from the game-over screen. Does not re-locate.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, Info), AppError> {
        let next = self.state.after(Transition::Reset)?;
        let regions = self.require_regions()?;
        self.baseline.reset();
        self.episode_steps = 0;
        if let Some(seed) = seed {
            tracing::debug!("Seed {} has no influence on the hosted game", seed);
        }

        let focus = self.configuration.timing.terminal_focus;
        let (x, y) = regions.terminal.point(focus.dx, focus.dy);
        self.actuator.click(x, y);
        self.actuator.press(self.configuration.keys.start);
        self.state = next;

        let observation = self.observe(&regions.game);
        tracing::info!("Session {} reset, new episode started", self.id);
        Ok((observation, self.info(Transition::Reset, None)))
    }

    pub fn step(&mut self, action: Action) -> Result<StepResult, AppError> {
        if !self.state.can_step() {
            return Err(AppError::InvalidTransition {
                from: self.state,
                operation: "step",
            });
        }
        let regions = self.require_regions()?;
        self.episode_steps += 1;

        if self.state == SessionState::Terminated || self.terminal_visible(&regions) {
            let observation = self.observe(&regions.game);
            return self.finish(
                Transition::AlreadyOver,
                observation,
                self.rewards.death_penalty(),
                None,
            );
        }

        let focus = self.configuration.timing.game_focus;
        let (x, y) = regions.game.point(focus.dx, focus.dy);
        self.actuator.click(x, y);

        let mut reward = self.rewards.action_reward(action);
        match action {
            Action::Noop => {}
            Action::Jump => self.actuator.press(self.configuration.keys.jump),
            Action::Duck => self
                .actuator
                .hold(self.configuration.keys.duck, self.configuration.timing.duck_hold()),
        }

        let observation = self.observe(&regions.game);
        let score = self.score_reader.read_score(
            self.capture.as_mut(),
            &regions.score,
            self.baseline.value(),
        );
        if let Some(gain) = self.baseline.advance(score) {
            reward += self.rewards.score_gain(gain);
            tracing::debug!("Score rose by {} to {}", gain, score);
        }

        if self.terminal_visible(&regions) {
            // Death dominates: the step's other reward components are dropped.
            let focus = self.configuration.timing.terminal_focus;
            let (x, y) = regions.terminal.point(focus.dx, focus.dy);
            self.actuator.click(x, y);
            return self.finish(
                Transition::BecameOver,
                observation,
                self.rewards.death_penalty(),
                Some(score),
            );
        }

        self.finish(Transition::Continued, observation, reward, Some(score))
    }

    /// Same as [`GameSession::step`] with the action given by its index.
    pub fn step_discrete(&mut self, index: usize) -> Result<StepResult, AppError> {
        self.step(Action::try_from(index)?)
    }

    /// Releases the capture and input handles.
    pub fn close(self) {
        tracing::info!(
            "Session {} closed in state {:?} after {} steps",
            self.id,
            self.state,
            self.episode_steps
        );
    }

    fn find_anchor(&mut self, template: TemplateId) -> Result<TemplateMatch, AppError> {
        let settings = &self.configuration.locator;
        let timeout = settings.timeout();
        self.locator
            .locate(
                self.capture.as_mut(),
                template,
                None,
                settings.confidence,
                timeout,
            )
            .ok_or(AppError::TemplateNotFound { template, timeout })
    }

    fn require_regions(&self) -> Result<SessionRegions, AppError> {
        self.regions.ok_or(AppError::InvalidTransition {
            from: self.state,
            operation: "use regions",
        })
    }

    fn terminal_visible(&mut self, regions: &SessionRegions) -> bool {
        self.locator
            .find_once(
                self.capture.as_mut(),
                TemplateId::Replay,
                Some(&regions.terminal),
                self.configuration.locator.terminal_confidence,
            )
            .is_some()
    }

    /// A failed capture repeats the previous observation (blank before the
    /// first one) instead of failing the step.
    fn observe(&mut self, game: &ScreenRegion) -> Observation {
        match self.capture.grab(game) {
            Ok(frame) => {
                let observation = self.encoder.encode(frame.image());
                self.last_frame = Some(frame);
                self.last_observation = Some(observation.clone());
                observation
            }
            Err(e) => {
                tracing::warn!("Observation capture failed, reusing last frame: {}", e);
                self.last_observation
                    .clone()
                    .unwrap_or_else(|| Observation::zeros(self.encoder.side()))
            }
        }
    }

    fn finish(
        &mut self,
        transition: Transition,
        observation: Observation,
        reward: f64,
        score: Option<u64>,
    ) -> Result<StepResult, AppError> {
        self.state = self.state.after(transition)?;
        let terminated = self.state == SessionState::Terminated;
        if transition == Transition::BecameOver {
            tracing::info!(
                "Session {} game over after {} steps, score {}",
                self.id,
                self.episode_steps,
                self.baseline.value()
            );
        } else {
            tracing::debug!(
                "Step {} ({}): reward {:.2}",
                self.episode_steps,
                transition.name(),
                reward
            );
        }
        Ok(StepResult {
            observation,
            reward,
            terminated,
            truncated: false,
            info: self.info(transition, score),
        })
    }

    fn info(&self, transition: Transition, score: Option<u64>) -> Info {
        let mut info = Info::new();
        info.insert("transition".to_string(), json!(transition.name()));
        info.insert("score".to_string(), json!(score));
        info.insert("baseline_score".to_string(), json!(self.baseline.value()));
        info.insert("episode_steps".to_string(), json!(self.episode_steps));
        info
    }
}

impl Environment for GameSession {
    type Observation = Observation;
    type Action = Action;

    fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, Info), AppError> {
        GameSession::reset(self, seed)
    }

    fn step(&mut self, action: Action) -> Result<StepResult, AppError> {
        GameSession::step(self, action)
    }
}

pub struct GameSessionBuilder {
    configuration: Configuration,
    id: Uuid,
    capture: Option<Box<dyn ScreenCapture>>,
    input: Option<Box<dyn InputBackend>>,
    recognizer: Option<Box<dyn TextRecognizer>>,
    templates: Option<TemplateSet>,
    clock: Arc<dyn Clock>,
}

impl GameSessionBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            id: Uuid::new_v4(),
            capture: None,
            input: None,
            recognizer: None,
            templates: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn capture(mut self, capture: Box<dyn ScreenCapture>) -> Self {
        self.capture = Some(capture);
        self
    }

    pub fn input(mut self, input: Box<dyn InputBackend>) -> Self {
        self.input = Some(input);
        self
    }

    // Defaults to tesseract as configured.
    pub fn recognizer(mut self, recognizer: Box<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    // Defaults to loading the configured template paths.
    pub fn templates(mut self, templates: TemplateSet) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<GameSession, AppError> {
        let configuration = self.configuration;
        configuration.validate().map_err(AppError::InvalidConfig)?;

        let capture = self.capture.ok_or(AppError::MissingComponent("screen capture"))?;
        let input = self.input.ok_or(AppError::MissingComponent("input backend"))?;
        let templates = match self.templates {
            Some(templates) => templates,
            None => TemplateSet::load(&configuration.templates)?,
        };
        let recognizer = self
            .recognizer
            .unwrap_or_else(|| Box::new(TesseractRecognizer::new(&configuration.ocr)));

        Ok(GameSession {
            id: self.id,
            state: SessionState::Unlocated,
            capture,
            actuator: InputActuator::new(input, self.clock.clone()),
            locator: TemplateLocator::new(templates, self.clock.clone(), &configuration.locator),
            score_reader: ScoreReader::new(recognizer),
            encoder: ObservationEncoder::new(&configuration.encoder),
            rewards: RewardCalculator::new(configuration.rewards.clone()),
            clock: self.clock,
            regions: None,
            baseline: ScoreBaseline::default(),
            episode_steps: 0,
            last_frame: None,
            last_observation: None,
            configuration,
        })
    }
}
