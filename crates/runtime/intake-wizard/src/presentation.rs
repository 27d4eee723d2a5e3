//! Visual state derived from navigation: controls, progress, focus, cues and
//! invalid marks. Renderers read it; only the wizard writes it.

use intake_core::Target;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::time::Duration;

/// Caption of the forward control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavLabel {
    Continue,
    Finish,
    Sending,
    Retry,
}

impl NavLabel {
    pub fn text(self) -> &'static str {
        match self {
            Self::Continue => "OK",
            Self::Finish => "Finish",
            Self::Sending => "Sending...",
            Self::Retry => "Retry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavControls {
    pub forward_label: NavLabel,
    pub forward_enabled: bool,
    pub back_enabled: bool,
    pub visible: bool,
}

impl Default for NavControls {
    fn default() -> Self {
        Self {
            forward_label: NavLabel::Continue,
            forward_enabled: true,
            back_enabled: false,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    None,
    Field(String),
    Forward,
}

impl Focus {
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    /// Shake on a failed validation
    Attention,
    /// Flash on a choice activated from the keyboard
    Pressed,
}

impl CueKind {
    pub fn duration(self) -> Duration {
        match self {
            Self::Attention => crate::timing::ATTENTION_CUE,
            Self::Pressed => crate::timing::PRESSED_CUE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueTarget {
    Field(String),
    Group(String),
    Choice { field: String, value: String },
}

impl From<Target> for CueTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::Field(name) => Self::Field(name),
            Target::Group(name) => Self::Group(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub target: CueTarget,
    pub kind: CueKind,
    pub started: Duration,
}

impl Cue {
    pub fn ends(&self) -> Duration {
        self.started + self.kind.duration()
    }

    pub fn is_active(&self, now: Duration) -> bool {
        now < self.ends()
    }

    /// Elapsed fraction of the cue, in `0.0..=1.0`.
    pub fn progress(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.started).as_secs_f32();
        (elapsed / self.kind.duration().as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// A modal message that swallows input until dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Presentation {
    pub nav: NavControls,
    /// Share of the flow completed, `0.0..=1.0`
    pub progress: f32,
    pub completion_visible: bool,
    pub focus: Focus,
    pub notice: Option<Notice>,
    cues: Vec<Cue>,
    invalid_fields: BTreeSet<String>,
    invalid_groups: BTreeMap<String, Duration>,
}

impl Presentation {
    /// Start a cue, restarting it if the same one is already running.
    pub(crate) fn trigger(&mut self, target: CueTarget, kind: CueKind, now: Duration) {
        self.cues.retain(|cue| !(cue.target == target && cue.kind == kind));
        self.cues.push(Cue {
            target,
            kind,
            started: now,
        });
    }

    pub fn cue(&self, target: &CueTarget, kind: CueKind, now: Duration) -> Option<&Cue> {
        self.cues
            .iter()
            .find(|cue| &cue.target == target && cue.kind == kind && cue.is_active(now))
    }

    pub fn active_cues(&self, now: Duration) -> impl Iterator<Item = &Cue> {
        self.cues.iter().filter(move |cue| cue.is_active(now))
    }

    pub(crate) fn mark_field_invalid(&mut self, field: &str) {
        self.invalid_fields.insert(field.to_string());
    }

    pub(crate) fn clear_field_invalid(&mut self, field: &str) {
        self.invalid_fields.remove(field);
    }

    pub fn is_field_invalid(&self, field: &str) -> bool {
        self.invalid_fields.contains(field)
    }

    pub(crate) fn mark_group_invalid(&mut self, group: &str, until: Duration) {
        self.invalid_groups.insert(group.to_string(), until);
    }

    pub(crate) fn clear_group_invalid(&mut self, group: &str) {
        self.invalid_groups.remove(group);
    }

    pub fn is_group_invalid(&self, group: &str, now: Duration) -> bool {
        self.invalid_groups.get(group).is_some_and(|until| now < *until)
    }

    /// Drop expired cues and group marks.
    pub(crate) fn prune(&mut self, now: Duration) {
        self.cues.retain(|cue| cue.is_active(now));
        self.invalid_groups.retain(|_, until| now < *until);
    }
}
