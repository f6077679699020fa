use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// No anchors found yet; nothing can be captured.
    Unlocated,
    /// Regions derived, waiting for the first reset.
    Ready,
    Playing,
    /// Game over was reported. Only `reset` leaves this state.
    Terminated,
}

/// Named edges of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Located,
    Reset,
    /// The step ran and the game is still going.
    Continued,
    /// The game-over indicator was already showing; no input was sent.
    AlreadyOver,
    /// The game-over indicator appeared after this step's input.
    BecameOver,
}

impl Transition {
    pub fn operation(self) -> &'static str {
        match self {
            Transition::Located => "locate",
            Transition::Reset => "reset",
            Transition::Continued | Transition::AlreadyOver | Transition::BecameOver => "step",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Transition::Located => "located",
            Transition::Reset => "reset",
            Transition::Continued => "continued",
            Transition::AlreadyOver => "already_over",
            Transition::BecameOver => "became_over",
        }
    }
}

impl SessionState {
    /// Target state of `transition`, or an error when the edge does not exist.
    pub fn after(self, transition: Transition) -> Result<SessionState, AppError> {
        use SessionState::*;
        use Transition::*;

        match (self, transition) {
            (_, Located) => Ok(Ready),
            (Ready | Playing | Terminated, Reset) => Ok(Playing),
            (Playing, Continued) => Ok(Playing),
            (Playing | Terminated, AlreadyOver) => Ok(Terminated),
            (Playing, BecameOver) => Ok(Terminated),
            (from, transition) => Err(AppError::InvalidTransition {
                from,
                operation: transition.operation(),
            }),
        }
    }

    pub fn can_step(self) -> bool {
        matches!(self, SessionState::Playing | SessionState::Terminated)
    }
}
