use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Noop = 0,
    Jump = 1,
    Duck = 2,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Noop, Action::Jump, Action::Duck];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Action {
    type Error = AppError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Action::ALL
            .get(value)
            .copied()
            .ok_or(AppError::InvalidAction(value))
    }
}

/// Discrete action space: indices `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscreteSpace {
    pub n: usize,
}

impl DiscreteSpace {
    pub fn contains(&self, index: usize) -> bool {
        index < self.n
    }
}

/// Box of 8-bit pixels with a fixed height x width x channels shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBoxSpace {
    pub low: u8,
    pub high: u8,
    pub shape: [usize; 3],
}

impl PixelBoxSpace {
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub const ACTION_SPACE: DiscreteSpace = DiscreteSpace { n: Action::ALL.len() };

pub const OBSERVATION_SPACE: PixelBoxSpace = PixelBoxSpace {
    low: 0,
    high: 255,
    shape: [84, 84, 1],
};
