//! # Intake Wizard
//!
//! Headless runtime for the one-question-at-a-time intake flow.
//!
//! ```text
//!  Interaction ──► Wizard::handle ──► decide() ──► TransitionAnimator ──► Timeline
//!                        │                                                   │
//!                        ▼                                                   ▼
//!                 InputSurface / AnswerRecord                      advance_to(now)
//!                        │
//!                        ▼
//!                  Command outbox ──► host (HTTP submit, attachment resolve)
//! ```
//!
//! The wizard owns all state and never blocks. Time only moves when the host
//! calls [`Wizard::advance_to`], which makes every animation and delay
//! reproducible in tests.

pub mod animator;
pub mod interaction;
pub mod navigator;
pub mod presentation;
pub mod timeline;
pub mod wizard;

pub use animator::{Direction, Motion, Phase, Scene, TransitionAnimator};
pub use interaction::{Interaction, Key, Modifiers};
pub use navigator::{decide, Decision, NavigationState, Rejection, Request, Terminal};
pub use presentation::{
    Cue, CueKind, CueTarget, Focus, NavControls, NavLabel, Notice, Presentation,
};
pub use timeline::{Timeline, TimerId};
pub use wizard::{Command, SubmissionOutcome, Wizard};

/// Fixed durations of the choreography
pub mod timing {
    use std::time::Duration;

    /// Outgoing step slides away
    pub const EXIT: Duration = Duration::from_millis(300);
    /// Incoming step settles before focus moves and the lock is released
    pub const SETTLE: Duration = Duration::from_millis(100);
    /// Delay between a single-choice selection and the automatic advance
    pub const AUTO_ADVANCE: Duration = Duration::from_millis(400);
    pub const ATTENTION_CUE: Duration = Duration::from_millis(400);
    pub const PRESSED_CUE: Duration = Duration::from_millis(200);
    /// How long an invalid choice group stays marked
    pub const GROUP_ERROR: Duration = Duration::from_millis(1000);
}
