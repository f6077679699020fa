use indexmap::IndexMap;

use crate::error::AppError;
use crate::observation::Observation;

/// Auxiliary per-call details, in insertion order.
pub type Info = IndexMap<String, serde_json::Value>;

#[derive(Debug, Clone)]
pub struct StepResult<O = Observation> {
    pub observation: O,
    pub reward: f64,
    pub terminated: bool,
    /// No time limit is imposed here; a wrapper that needs one adds it.
    pub truncated: bool,
    pub info: Info,
}

/// Episodic decision-process contract consumed by an agent.
pub trait Environment {
    type Observation;
    type Action;

    fn reset(&mut self, seed: Option<u64>) -> Result<(Self::Observation, Info), AppError>;

    fn step(&mut self, action: Self::Action) -> Result<StepResult<Self::Observation>, AppError>;
}
