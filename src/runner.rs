use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{Action, Clock};
use crate::error::AppError;
use crate::observation::{FrameStack, Observation, StackedObservation};
use crate::session::Environment;

/// Picks the next action from the most recent stacked frames.
pub trait Policy {
    fn act(&mut self, observation: &StackedObservation) -> Action;
}

/// Uniform stand-in for a trained agent. It is handed the same stacked input
/// a model would get and ignores it.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &StackedObservation) -> Action {
        Action::ALL[self.rng.random_range(0..Action::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub steps: u64,
    pub total_reward: f64,
}

/// Plays whole episodes, feeding the policy a frame stack and pacing steps.
pub struct EpisodeRunner {
    stack: FrameStack,
    step_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl EpisodeRunner {
    pub fn new(stack: FrameStack, step_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            stack,
            step_interval,
            clock,
        }
    }

    pub fn run<E, P>(
        &mut self,
        env: &mut E,
        policy: &mut P,
        seed: Option<u64>,
    ) -> Result<EpisodeSummary, AppError>
    where
        E: Environment<Observation = Observation, Action = Action>,
        P: Policy,
    {
        let (observation, _) = env.reset(seed)?;
        let mut stacked = self.stack.reset(observation);
        let mut summary = EpisodeSummary {
            steps: 0,
            total_reward: 0.0,
        };
        loop {
            let action = policy.act(&stacked);
            let result = env.step(action)?;
            summary.steps += 1;
            summary.total_reward += result.reward;
            stacked = self.stack.push(result.observation);
            if result.terminated || result.truncated {
                return Ok(summary);
            }
            self.clock.sleep(self.step_interval);
        }
    }
}
