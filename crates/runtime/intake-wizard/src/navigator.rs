//! Navigation decisions as a pure transition table.
//!
//! `decide` never touches wizard state. It reads a snapshot and says what
//! should happen; the wizard carries the decision out.

use crate::animator::Direction;
use std::fmt;

/// Lifecycle of the final submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminal {
    #[default]
    None,
    Submitting,
    Success,
    Failed,
}

/// Snapshot of where the wizard stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub active_step: usize,
    pub total: usize,
    pub transitioning: bool,
    pub terminal: Terminal,
}

impl NavigationState {
    pub fn is_last_step(&self) -> bool {
        self.active_step == self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Advance,
    Retreat,
    JumpTo(usize),
}

/// Why a request was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("a transition is running")]
    Transitioning,
    #[error("already on the first step")]
    AtFirstStep,
    #[error("step is out of range")]
    OutOfRange,
    #[error("step is already active")]
    AlreadyActive,
    #[error("a submission is in flight")]
    SubmissionInFlight,
    #[error("the flow is completed")]
    Completed,
    #[error("the active step is not valid")]
    Invalid,
    #[error("the answers could not be turned into a payload")]
    Unbuildable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Reject(Rejection),
    /// Persist the active step, then move forward to `to`
    SaveAndMove { from: usize, to: usize },
    /// Move without validating or saving
    Move {
        from: usize,
        to: usize,
        direction: Direction,
    },
    /// Persist the last step and submit
    SaveAndSubmit,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject(reason) => write!(f, "rejected: {}", reason),
            Self::SaveAndMove { from, to } => write!(f, "save {} and move to {}", from, to),
            Self::Move { from, to, .. } => write!(f, "move {} -> {}", from, to),
            Self::SaveAndSubmit => write!(f, "save and submit"),
        }
    }
}

/// Decide what `request` does in `state`.
///
/// `step_valid` runs the validator on the active step. It is only called for
/// an `Advance` that passed every lock, so its side effects (invalid marks,
/// cues) happen exactly when validation is meaningful.
pub fn decide(
    state: &NavigationState,
    request: Request,
    step_valid: impl FnOnce() -> bool,
) -> Decision {
    match state.terminal {
        Terminal::Submitting => return Decision::Reject(Rejection::SubmissionInFlight),
        Terminal::Success => return Decision::Reject(Rejection::Completed),
        Terminal::None | Terminal::Failed => {}
    }
    if state.transitioning {
        return Decision::Reject(Rejection::Transitioning);
    }

    let from = state.active_step;
    match request {
        Request::Advance => {
            if !step_valid() {
                Decision::Reject(Rejection::Invalid)
            } else if state.is_last_step() {
                Decision::SaveAndSubmit
            } else {
                Decision::SaveAndMove { from, to: from + 1 }
            }
        }
        Request::Retreat => {
            if from <= 1 {
                Decision::Reject(Rejection::AtFirstStep)
            } else {
                Decision::Move {
                    from,
                    to: from - 1,
                    direction: Direction::Backward,
                }
            }
        }
        Request::JumpTo(to) => {
            if to < 1 || to > state.total {
                Decision::Reject(Rejection::OutOfRange)
            } else if to == from {
                Decision::Reject(Rejection::AlreadyActive)
            } else {
                Decision::Move {
                    from,
                    to,
                    direction: Direction::between(from, to),
                }
            }
        }
    }
}
