use crate::common::Action;
use crate::config::RewardSettings;

/// Highest score accepted in the current episode. Only grows until reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBaseline {
    value: u64,
}

impl ScoreBaseline {
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Raises the baseline to `score` and returns the gain. Readings at or
    /// below the baseline are ignored.
    pub fn advance(&mut self, score: u64) -> Option<u64> {
        if score > self.value {
            let gain = score - self.value;
            self.value = score;
            Some(gain)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct RewardCalculator {
    settings: RewardSettings,
}

impl RewardCalculator {
    pub fn new(settings: RewardSettings) -> Self {
        Self { settings }
    }

    /// Survival bonus minus the cost of pressing anything.
    pub fn action_reward(&self, action: Action) -> f64 {
        let mut reward = self.settings.survival_bonus;
        if action != Action::Noop {
            reward -= self.settings.action_cost;
        }
        reward
    }

    pub fn score_gain(&self, gain: u64) -> f64 {
        gain as f64
    }

    /// Replaces whatever the step earned.
    pub fn death_penalty(&self) -> f64 {
        self.settings.death_penalty
    }
}

impl Default for RewardCalculator {
    fn default() -> Self {
        Self::new(RewardSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_only_moves_up() {
        let mut baseline = ScoreBaseline::default();
        assert_eq!(baseline.advance(10), Some(10));
        assert_eq!(baseline.advance(15), Some(5));
        assert_eq!(baseline.advance(15), None);
        assert_eq!(baseline.advance(3), None);
        assert_eq!(baseline.value(), 15);

        baseline.reset();
        assert_eq!(baseline.value(), 0);
    }

    #[test]
    fn input_costs_more_than_waiting() {
        let calculator = RewardCalculator::default();
        assert!((calculator.action_reward(Action::Noop) - 0.01).abs() < 1e-12);
        assert!((calculator.action_reward(Action::Jump) + 0.01).abs() < 1e-12);
        assert_eq!(
            calculator.action_reward(Action::Jump),
            calculator.action_reward(Action::Duck)
        );
        assert_eq!(calculator.death_penalty(), -10.0);
    }
}
