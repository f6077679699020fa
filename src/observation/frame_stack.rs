use std::collections::VecDeque;

use crate::observation::Observation;

/// The `depth` most recent observations interleaved as `(side, side, depth)`,
/// oldest channel first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackedObservation {
    side: u32,
    depth: usize,
    data: Vec<u8>,
}

impl StackedObservation {
    pub fn shape(&self) -> [usize; 3] {
        [self.side as usize, self.side as usize, self.depth]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn channel(&self, index: usize) -> Vec<u8> {
        self.data
            .iter()
            .skip(index)
            .step_by(self.depth)
            .copied()
            .collect()
    }
}

/// Rolling window over encoded frames so a policy can see motion.
#[derive(Debug, Clone)]
pub struct FrameStack {
    depth: usize,
    side: u32,
    frames: VecDeque<Observation>,
}

impl FrameStack {
    pub fn new(depth: usize, side: u32) -> Self {
        let mut stack = Self {
            depth,
            side,
            frames: VecDeque::with_capacity(depth),
        };
        stack.clear();
        stack
    }

    fn clear(&mut self) {
        self.frames.clear();
        self.frames
            .extend((0..self.depth).map(|_| Observation::zeros(self.side)));
    }

    /// Zero history with `first` as the newest frame.
    pub fn reset(&mut self, first: Observation) -> StackedObservation {
        self.clear();
        self.push(first)
    }

    pub fn push(&mut self, observation: Observation) -> StackedObservation {
        if self.frames.len() == self.depth {
            self.frames.pop_front();
        }
        self.frames.push_back(observation);
        self.stacked()
    }

    pub fn stacked(&self) -> StackedObservation {
        let pixels = (self.side * self.side) as usize;
        let mut data = vec![0u8; pixels * self.depth];
        for (channel, frame) in self.frames.iter().enumerate() {
            for (i, &value) in frame.as_slice().iter().enumerate().take(pixels) {
                data[i * self.depth + channel] = value;
            }
        }
        StackedObservation {
            side: self.side,
            depth: self.depth,
            data,
        }
    }
}
