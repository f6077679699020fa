pub mod clock;
pub mod frame;
pub mod game_action;
pub mod imaging;
pub mod region;

pub use clock::{Clock, SystemClock};
pub use frame::Frame;
pub use game_action::{ACTION_SPACE, Action, DiscreteSpace, OBSERVATION_SPACE, PixelBoxSpace};
pub use region::ScreenRegion;
