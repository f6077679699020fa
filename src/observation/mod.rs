pub mod encoder;
pub mod frame_stack;

pub use encoder::{Observation, ObservationEncoder};
pub use frame_stack::{FrameStack, StackedObservation};
