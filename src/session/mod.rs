pub mod environment;
pub mod game_session;
pub mod layout;
pub mod reward;
pub mod state;

pub use environment::{Environment, Info, StepResult};
pub use game_session::{GameSession, GameSessionBuilder};
pub use layout::{RegionLayout, RegionOffset, SessionRegions};
pub use reward::{RewardCalculator, ScoreBaseline};
pub use state::{SessionState, Transition};
