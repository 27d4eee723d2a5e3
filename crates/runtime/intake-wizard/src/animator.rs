//! Two-phase transition between scenes.
//!
//! ```text
//! Idle ──begin()──► Exiting ──300ms──► (swap) Entering ──100ms──► Idle
//! ```
//!
//! The animator only tracks phases and schedules their ends on the timeline.
//! What "swap" and "settle" mean is decided by the wizard when the
//! continuations fire.

use crate::timeline::{TimerId, Timeline};
use crate::timing;
use crate::wizard::Continuation;
use std::time::Duration;

/// What the stage shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// A registry step, 1-based
    Step(usize),
    /// The completion view shown after a successful submission
    Completion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Direction of travel from step `from` to step `to`.
    pub fn between(from: usize, to: usize) -> Self {
        if to >= from {
            Self::Forward
        } else {
            Self::Backward
        }
    }

    /// Motion of the outgoing scene.
    pub fn exit_motion(self) -> Motion {
        match self {
            Self::Forward => Motion::Up,
            Self::Backward => Motion::Down,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Exiting {
        from: Scene,
        to: Scene,
        direction: Direction,
        started: Duration,
        timer: TimerId,
    },
    Entering {
        scene: Scene,
        direction: Direction,
        started: Duration,
        timer: TimerId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a transition is already running")]
pub struct Busy;

#[derive(Debug, Clone)]
pub struct TransitionAnimator {
    phase: Phase,
}

impl Default for TransitionAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionAnimator {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Start the exit phase of `from`. Rejected unless idle.
    pub(crate) fn begin(
        &mut self,
        from: Scene,
        to: Scene,
        direction: Direction,
        timeline: &mut Timeline<Continuation>,
    ) -> Result<(), Busy> {
        if !self.is_idle() {
            return Err(Busy);
        }
        let timer = timeline.schedule(timing::EXIT, Continuation::ExitElapsed);
        self.phase = Phase::Exiting {
            from,
            to,
            direction,
            started: timeline.now(),
            timer,
        };
        tracing::debug!(?from, ?to, ?direction, "transition started");
        Ok(())
    }

    /// The exit phase ended: returns the scene to swap in and starts entering it.
    pub(crate) fn exit_elapsed(
        &mut self,
        fired: TimerId,
        timeline: &mut Timeline<Continuation>,
    ) -> Option<Scene> {
        let Phase::Exiting { to, direction, timer, .. } = self.phase else {
            return None;
        };
        if timer != fired {
            return None;
        }
        let timer = timeline.schedule(timing::SETTLE, Continuation::EnterSettled);
        self.phase = Phase::Entering {
            scene: to,
            direction,
            started: timeline.now(),
            timer,
        };
        Some(to)
    }

    /// The enter phase ended: returns the scene that is now at rest.
    pub(crate) fn settled(&mut self, fired: TimerId) -> Option<Scene> {
        let Phase::Entering { scene, timer, .. } = self.phase else {
            return None;
        };
        if timer != fired {
            return None;
        }
        self.phase = Phase::Idle;
        Some(scene)
    }

    /// Fraction of the running phase that has elapsed, in `0.0..=1.0`.
    pub fn progress(&self, now: Duration) -> f32 {
        let (started, length) = match self.phase {
            Phase::Idle => return 1.0,
            Phase::Exiting { started, .. } => (started, timing::EXIT),
            Phase::Entering { started, .. } => (started, timing::SETTLE),
        };
        let elapsed = now.saturating_sub(started).as_secs_f32();
        (elapsed / length.as_secs_f32()).clamp(0.0, 1.0)
    }
}
