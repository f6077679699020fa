use std::path::PathBuf;
use std::process::{Command, ExitCode};
use std::sync::Arc;

use dinobot_rust::capture::XcapCapture;
use dinobot_rust::common::SystemClock;
use dinobot_rust::input::EnigoInput;
use dinobot_rust::runner::{EpisodeRunner, RandomPolicy};
use dinobot_rust::{AppError, Configuration, FrameStack, GameSession};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("DINOBOT_CONFIG").map(PathBuf::from))
}

fn launch_browser(url: &str) {
    let mut command = if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    } else if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(url);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    };
    match command.spawn() {
        Ok(_) => tracing::info!("Opened {}", url),
        Err(e) => tracing::warn!("Could not open a browser at {}: {}", url, e),
    }
}

fn run(configuration: Configuration) -> Result<(), AppError> {
    launch_browser(&configuration.game_url);

    let builder = GameSession::builder(configuration.clone());
    let id = builder.session_id();
    let mut session = builder
        .capture(Box::new(XcapCapture::primary(id)?))
        .input(Box::new(EnigoInput::new()?))
        .build()?;
    session.locate()?;

    let settings = &configuration.runner;
    let mut policy = RandomPolicy::seeded(settings.seed);
    let mut runner = EpisodeRunner::new(
        FrameStack::new(settings.frame_stack, configuration.encoder.side),
        settings.step_interval(),
        Arc::new(SystemClock),
    );

    for episode in 1..=settings.episodes {
        let summary = runner.run(&mut session, &mut policy, Some(settings.seed))?;
        tracing::info!(
            "Episode {}: survived {} frames, score {}, return {:.2}",
            episode,
            summary.steps,
            session.baseline_score(),
            summary.total_reward
        );
    }

    session.close();
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let configuration = match Configuration::load(config_path().as_deref()) {
        Ok(configuration) => configuration,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match run(configuration) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
