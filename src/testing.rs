//! Scripted stand-ins for the screen, keyboard, recognizer and clock.

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use tracing::Level;
use tracing::subscriber::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use uuid::Uuid;

use crate::capture::ScreenCapture;
use crate::common::{Clock, Frame, ScreenRegion};
use crate::error::{CaptureError, InputError, OcrError};
use crate::input::{InputBackend, Key};
use crate::locator::TemplateSet;
use crate::ocr::TextRecognizer;

/// 32x32 board of 8px black and white cells. Used as the "play" button.
pub fn checker_template() -> GrayImage {
    GrayImage::from_fn(32, 32, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// 32x32 dark upper-right triangle on white. Used as the "replay" button.
pub fn triangle_template() -> GrayImage {
    GrayImage::from_fn(32, 32, |x, y| if x > y { Luma([0]) } else { Luma([255]) })
}

pub fn test_templates() -> TemplateSet {
    TemplateSet::from_images(checker_template(), triangle_template())
        .expect("test templates have contrast")
}

pub fn paste(canvas: &mut GrayImage, image: &GrayImage, x: u32, y: u32) {
    image::imageops::replace(canvas, image, i64::from(x), i64::from(y));
}

pub struct ManualClock {
    base: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
    }
}

struct ScreenState {
    session_id: Uuid,
    width: u32,
    height: u32,
    play_at: Option<(u32, u32)>,
    replay_at: Option<(u32, u32)>,
    replay_visible: bool,
    reveal_countdown: Option<usize>,
    failing: BTreeSet<usize>,
    grabs: usize,
}

/// A white screen with the two buttons painted wherever a test puts them.
#[derive(Clone)]
pub struct VirtualScreen {
    state: Rc<RefCell<ScreenState>>,
}

impl VirtualScreen {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(ScreenState {
                session_id: Uuid::new_v4(),
                width,
                height,
                play_at: None,
                replay_at: None,
                replay_visible: false,
                reveal_countdown: None,
                failing: BTreeSet::new(),
                grabs: 0,
            })),
        }
    }

    pub fn capture(&self) -> FakeCapture {
        FakeCapture {
            screen: self.clone(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.state.borrow().session_id
    }

    pub fn show_play_at(&self, x: u32, y: u32) {
        self.state.borrow_mut().play_at = Some((x, y));
    }

    pub fn hide_play(&self) {
        self.state.borrow_mut().play_at = None;
    }

    pub fn show_replay_at(&self, x: u32, y: u32) {
        let mut state = self.state.borrow_mut();
        state.replay_at = Some((x, y));
        state.replay_visible = true;
        state.reveal_countdown = None;
    }

    pub fn hide_replay(&self) {
        let mut state = self.state.borrow_mut();
        state.replay_visible = false;
        state.reveal_countdown = None;
    }

    /// The replay button stays hidden for the next `grabs` captures and
    /// shows up in the one after.
    pub fn reveal_replay_after_grabs(&self, grabs: usize) {
        let mut state = self.state.borrow_mut();
        state.replay_visible = false;
        state.reveal_countdown = Some(grabs);
    }

    pub fn fail_next_grabs(&self, count: usize) {
        let mut state = self.state.borrow_mut();
        let next = state.grabs + 1;
        state.failing.extend(next..next + count);
    }

    /// Lets `skip` captures through, then fails one.
    pub fn fail_grab_after(&self, skip: usize) {
        let mut state = self.state.borrow_mut();
        let target = state.grabs + skip + 1;
        state.failing.insert(target);
    }

    pub fn grab_count(&self) -> usize {
        self.state.borrow().grabs
    }

    fn render(state: &ScreenState) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(state.width, state.height, Rgba([255; 4]));
        let mut draw = |template: GrayImage, (x, y): (u32, u32)| {
            let rgba = DynamicImage::ImageLuma8(template).to_rgba8();
            image::imageops::replace(&mut canvas, &rgba, i64::from(x), i64::from(y));
        };
        if let Some(at) = state.play_at {
            draw(checker_template(), at);
        }
        if let (Some(at), true) = (state.replay_at, state.replay_visible) {
            draw(triangle_template(), at);
        }
        canvas
    }

    fn grab(&self, region: &ScreenRegion) -> Result<Frame, CaptureError> {
        let mut state = self.state.borrow_mut();
        state.grabs += 1;
        match state.reveal_countdown {
            Some(0) => {
                state.replay_visible = true;
                state.reveal_countdown = None;
            }
            Some(n) => state.reveal_countdown = Some(n - 1),
            None => {}
        }
        let grab = state.grabs;
        if state.failing.remove(&grab) {
            return Err(CaptureError::Backend("scripted failure".to_string()));
        }

        let screen = ScreenRegion::new(0, 0, state.width, state.height);
        if !screen.contains(region) {
            return Err(CaptureError::OutOfBounds {
                region: region.to_string(),
                screen: screen.to_string(),
            });
        }
        let canvas = Self::render(&state);
        let cropped =
            image::imageops::crop_imm(&canvas, region.left, region.top, region.width, region.height)
                .to_image();
        Ok(Frame::captured(
            state.session_id,
            *region,
            DynamicImage::ImageRgba8(cropped),
        ))
    }
}

pub struct FakeCapture {
    screen: VirtualScreen,
}

impl ScreenCapture for FakeCapture {
    fn grab(&mut self, region: &ScreenRegion) -> Result<Frame, CaptureError> {
        self.screen.grab(region)
    }

    fn screen_bounds(&self) -> Result<ScreenRegion, CaptureError> {
        let state = self.screen.state.borrow();
        Ok(ScreenRegion::new(0, 0, state.width, state.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    KeyDown(Key),
    KeyUp(Key),
    Click(u32, u32),
}

#[derive(Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<Event>>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn key_events(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, Event::Click(..)))
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

pub struct FakeInput {
    log: EventLog,
    failing: bool,
}

impl FakeInput {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            failing: false,
        }
    }

    /// Rejects every event without recording it.
    pub fn failing(log: EventLog) -> Self {
        Self { log, failing: true }
    }

    fn record(&self, event: Event) -> Result<(), InputError> {
        if self.failing {
            return Err(InputError::Key("scripted failure".to_string()));
        }
        self.log.push(event);
        Ok(())
    }
}

impl InputBackend for FakeInput {
    fn key_down(&mut self, key: Key) -> Result<(), InputError> {
        self.record(Event::KeyDown(key))
    }

    fn key_up(&mut self, key: Key) -> Result<(), InputError> {
        self.record(Event::KeyUp(key))
    }

    fn click(&mut self, x: u32, y: u32) -> Result<(), InputError> {
        self.record(Event::Click(x, y))
    }
}

/// Hands out queued results, then empty text once the queue runs dry.
#[derive(Clone, Default)]
pub struct ScriptedRecognizer {
    outputs: Rc<RefCell<VecDeque<Result<String, OcrError>>>>,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, output: Result<String, OcrError>) {
        self.outputs.borrow_mut().push_back(output);
    }

    pub fn remaining(&self) -> usize {
        self.outputs.borrow().len()
    }
}

impl TextRecognizer for ScriptedRecognizer {
    fn recognize_line(&self, _image: &GrayImage) -> Result<String, OcrError> {
        self.outputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

/// Records the level of every event emitted while it is installed.
#[derive(Clone, Default)]
pub struct LevelRecorder {
    levels: Arc<Mutex<Vec<Level>>>,
}

impl LevelRecorder {
    /// Warnings and errors seen so far.
    pub fn problems(&self) -> usize {
        self.levels
            .lock()
            .unwrap()
            .iter()
            .filter(|&&level| level == Level::WARN || level == Level::ERROR)
            .count()
    }
}

impl<S: Subscriber> Layer<S> for LevelRecorder {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.levels.lock().unwrap().push(*event.metadata().level());
    }
}
