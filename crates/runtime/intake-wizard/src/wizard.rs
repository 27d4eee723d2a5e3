//! The wizard container: navigation state, answers, choreography and the
//! command outbox, mutated only through its operations.

use crate::animator::{Direction, Phase, Scene, TransitionAnimator};
use crate::navigator::{self, Decision, NavigationState, Rejection, Request, Terminal};
use crate::presentation::{CueKind, CueTarget, Focus, NavControls, NavLabel, Notice, Presentation};
use crate::timeline::{TimerId, Timeline};
use crate::timing;
use intake_core::{
    build_payload, clear_attachment_url, record_attachment_url, record_file, save_step, validate,
    AnswerRecord, FieldKind, FileRef, InputSurface, Registry, ShortcutKey, Step,
    SubmissionPayload, Target,
};
use std::sync::Arc;
use std::time::Duration;

/// Scheduled continuations on the wizard's timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Continuation {
    ExitElapsed,
    EnterSettled,
    AutoAdvance { step: usize },
}

/// Work the host must carry out on the wizard's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// POST the payload; report back with [`Wizard::submission_finished`]
    Submit {
        attempt: u32,
        payload: SubmissionPayload,
    },
    /// Obtain a durable URL for a selected file; report back with
    /// [`Wizard::attachment_resolved`] or [`Wizard::attachment_failed`]
    ResolveAttachment { field: String, file: FileRef },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    Rejected { reason: String },
}

pub struct Wizard {
    registry: Arc<Registry>,
    active_step: usize,
    terminal: Terminal,
    inputs: InputSurface,
    answers: AnswerRecord,
    animator: TransitionAnimator,
    timeline: Timeline<Continuation>,
    view: Presentation,
    auto_advance: Option<TimerId>,
    attempts: u32,
    outbox: Vec<Command>,
}

impl Wizard {
    pub fn new(registry: Arc<Registry>) -> Self {
        let inputs = InputSurface::for_registry(&registry);
        let mut wizard = Self {
            registry,
            active_step: 1,
            terminal: Terminal::None,
            inputs,
            answers: AnswerRecord::new(),
            animator: TransitionAnimator::new(),
            timeline: Timeline::new(),
            view: Presentation::default(),
            auto_advance: None,
            attempts: 0,
            outbox: Vec::new(),
        };
        wizard.focus_first_field();
        wizard.refresh_nav();
        tracing::info!(steps = wizard.registry.len(), "wizard ready");
        wizard
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn active_step(&self) -> usize {
        self.active_step
    }

    pub fn active(&self) -> Option<&Step> {
        self.registry.step(self.active_step)
    }

    pub fn terminal(&self) -> Terminal {
        self.terminal
    }

    pub fn is_transitioning(&self) -> bool {
        !self.animator.is_idle()
    }

    pub fn state(&self) -> NavigationState {
        NavigationState {
            active_step: self.active_step,
            total: self.registry.len(),
            transitioning: self.is_transitioning(),
            terminal: self.terminal,
        }
    }

    pub fn inputs(&self) -> &InputSurface {
        &self.inputs
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    pub fn view(&self) -> &Presentation {
        &self.view
    }

    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    /// The scene currently on stage. During an exit phase this is still the
    /// outgoing step.
    pub fn scene(&self) -> Scene {
        if self.view.completion_visible {
            Scene::Completion
        } else {
            Scene::Step(self.active_step)
        }
    }

    pub fn phase(&self) -> Phase {
        self.animator.phase()
    }

    pub fn transition_progress(&self) -> f32 {
        self.animator.progress(self.timeline.now())
    }

    pub fn has_pending_auto_advance(&self) -> bool {
        self.auto_advance.is_some()
    }

    /// Number of submissions attempted so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.outbox)
    }

    // ---- navigation ----

    /// Validate and save the active step, then move forward or submit.
    pub fn advance(&mut self) -> Result<(), Rejection> {
        self.navigate(Request::Advance)
    }

    /// Move back one step without validating.
    pub fn retreat(&mut self) -> Result<(), Rejection> {
        self.navigate(Request::Retreat)
    }

    /// Move directly to `step` without validating or saving.
    pub fn jump_to(&mut self, step: usize) -> Result<(), Rejection> {
        self.navigate(Request::JumpTo(step))
    }

    fn navigate(&mut self, request: Request) -> Result<(), Rejection> {
        let state = self.state();
        let decision = navigator::decide(&state, request, || self.validate_active());
        tracing::debug!(?request, step = state.active_step, %decision, "navigation decided");

        match decision {
            Decision::Reject(reason) => Err(reason),
            Decision::SaveAndMove { from, to } => {
                self.save_active();
                self.start_transition(Scene::Step(from), Scene::Step(to), Direction::Forward);
                Ok(())
            }
            Decision::Move {
                from,
                to,
                direction,
            } => {
                self.start_transition(Scene::Step(from), Scene::Step(to), direction);
                Ok(())
            }
            Decision::SaveAndSubmit => {
                self.save_active();
                self.submit()
            }
        }
    }

    fn validate_active(&mut self) -> bool {
        let registry = Arc::clone(&self.registry);
        let Some(step) = registry.step(self.active_step) else {
            return false;
        };
        let report = validate(step, &self.inputs);
        let now = self.timeline.now();
        for failure in &report.failures {
            match &failure.target {
                Target::Field(name) => self.view.mark_field_invalid(name),
                Target::Group(name) => self.view.mark_group_invalid(name, now + timing::GROUP_ERROR),
            }
            self.view
                .trigger(failure.target.clone().into(), CueKind::Attention, now);
        }
        if !report.is_valid() {
            tracing::debug!(step = report.step, failures = ?report.failures, "step is invalid");
        }
        report.is_valid()
    }

    fn save_active(&mut self) {
        if let Some(step) = self.registry.step(self.active_step) {
            save_step(step, &self.inputs, &mut self.answers);
        }
    }

    fn start_transition(&mut self, from: Scene, to: Scene, direction: Direction) {
        self.cancel_auto_advance();
        match self.animator.begin(from, to, direction, &mut self.timeline) {
            Ok(()) => self.view.focus = Focus::None,
            Err(busy) => tracing::warn!(?from, ?to, "{}", busy),
        }
    }

    fn submit(&mut self) -> Result<(), Rejection> {
        match build_payload(&self.registry, &self.inputs, &mut self.answers) {
            Ok(payload) => {
                self.cancel_auto_advance();
                self.attempts += 1;
                self.terminal = Terminal::Submitting;
                self.refresh_nav();
                tracing::info!(attempt = self.attempts, "submitting answers");
                self.outbox.push(Command::Submit {
                    attempt: self.attempts,
                    payload,
                });
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "answers could not be turned into a payload");
                self.view.notice = Some(Notice {
                    title: "Cannot submit".into(),
                    message: err.to_string(),
                });
                Err(Rejection::Unbuildable)
            }
        }
    }

    /// Report the outcome of the in-flight submission.
    pub fn submission_finished(&mut self, outcome: SubmissionOutcome) {
        if self.terminal != Terminal::Submitting {
            tracing::warn!(?outcome, "submission result without a submission in flight");
            return;
        }
        match outcome {
            SubmissionOutcome::Accepted => {
                tracing::info!(attempt = self.attempts, "submission accepted");
                self.terminal = Terminal::Success;
                self.refresh_nav();
                self.start_transition(
                    Scene::Step(self.active_step),
                    Scene::Completion,
                    Direction::Forward,
                );
            }
            SubmissionOutcome::Rejected { reason } => {
                tracing::warn!(attempt = self.attempts, %reason, "submission failed");
                self.terminal = Terminal::Failed;
                self.refresh_nav();
                self.view.notice = Some(Notice {
                    title: "Submission failed".into(),
                    message: format!(
                        "Your answers could not be sent. Please try again.\n\n{}",
                        reason
                    ),
                });
            }
        }
    }

    /// A durable URL was obtained for `file`.
    pub fn attachment_resolved(&mut self, field: &str, file: &FileRef, url: impl Into<String>) {
        if self.inputs.file(field) != Some(file) {
            tracing::debug!(field, file = %file.name, "stale attachment ignored");
            return;
        }
        let url = url.into();
        tracing::info!(field, file = %file.name, %url, "attachment resolved");
        record_attachment_url(&mut self.answers, url);
    }

    pub fn attachment_failed(&mut self, field: &str, file: &FileRef, reason: impl Into<String>) {
        if self.inputs.file(field) != Some(file) {
            tracing::debug!(field, file = %file.name, "stale attachment failure ignored");
            return;
        }
        let reason = reason.into();
        tracing::warn!(field, file = %file.name, %reason, "attachment failed");
        clear_attachment_url(&mut self.answers);
        self.view.notice = Some(Notice {
            title: "Upload failed".into(),
            message: format!("{} could not be attached: {}", file.name, reason),
        });
    }

    /// Close the notice, if any. Returns whether one was open.
    pub fn dismiss_notice(&mut self) -> bool {
        self.view.notice.take().is_some()
    }

    // ---- time ----

    /// Run every continuation due at or before `now`.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some((id, continuation)) = self.timeline.pop_due(now) {
            tracing::debug!(?continuation, at = ?self.timeline.now(), "timer fired");
            self.fire(id, continuation);
        }
        self.timeline.set_now(now);
        self.view.prune(now);
    }

    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.timeline.now() + delta);
    }

    /// Deadline of the next scheduled continuation, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timeline.next_deadline()
    }

    fn fire(&mut self, id: TimerId, continuation: Continuation) {
        match continuation {
            Continuation::ExitElapsed => {
                if let Some(scene) = self.animator.exit_elapsed(id, &mut self.timeline) {
                    self.swap_in(scene);
                }
            }
            Continuation::EnterSettled => {
                if let Some(scene) = self.animator.settled(id) {
                    if let Scene::Step(_) = scene {
                        self.focus_first_field();
                    }
                    tracing::debug!(?scene, "transition settled");
                }
            }
            Continuation::AutoAdvance { step } => {
                if self.auto_advance == Some(id) {
                    self.auto_advance = None;
                }
                if step != self.active_step {
                    tracing::debug!(step, active = self.active_step, "auto-advance dropped");
                    return;
                }
                if let Err(reason) = self.advance() {
                    tracing::debug!(step, %reason, "auto-advance rejected");
                }
            }
        }
    }

    fn swap_in(&mut self, scene: Scene) {
        match scene {
            Scene::Step(index) => {
                self.active_step = index;
                if self.terminal == Terminal::Failed {
                    self.terminal = Terminal::None;
                }
                self.refresh_nav();
                tracing::info!(step = index, total = self.registry.len(), "step activated");
            }
            Scene::Completion => {
                self.view.completion_visible = true;
                self.refresh_nav();
                tracing::info!("completion view shown");
            }
        }
    }

    fn refresh_nav(&mut self) {
        let total = self.registry.len();
        let (forward_label, forward_enabled) = match self.terminal {
            Terminal::None if self.active_step == total => (NavLabel::Finish, true),
            Terminal::None => (NavLabel::Continue, true),
            Terminal::Submitting | Terminal::Success => (NavLabel::Sending, false),
            Terminal::Failed => (NavLabel::Retry, true),
        };
        let open = matches!(self.terminal, Terminal::None | Terminal::Failed);
        self.view.nav = NavControls {
            forward_label,
            forward_enabled,
            back_enabled: open && self.active_step > 1,
            visible: !self.view.completion_visible,
        };
        self.view.progress = if self.view.completion_visible {
            1.0
        } else {
            self.active_step as f32 / total.max(1) as f32
        };
    }

    fn schedule_auto_advance(&mut self) {
        self.cancel_auto_advance();
        let step = self.active_step;
        let id = self
            .timeline
            .schedule(timing::AUTO_ADVANCE, Continuation::AutoAdvance { step });
        self.auto_advance = Some(id);
    }

    fn cancel_auto_advance(&mut self) {
        if let Some(id) = self.auto_advance.take() {
            self.timeline.cancel(id);
        }
    }

    // ---- input ----

    /// Whether the active step takes edits and choice input right now.
    pub fn accepts_input(&self) -> bool {
        self.animator.is_idle() && matches!(self.terminal, Terminal::None | Terminal::Failed)
    }

    /// Select (single choice) or flip (multi choice) an option of the active step.
    ///
    /// `pressed` plays the keyboard cue. Single-choice selections schedule a
    /// delayed `advance()`.
    pub fn activate_choice(&mut self, field: &str, value: &str, pressed: bool) -> bool {
        if !self.accepts_input() {
            tracing::debug!(field, value, "choice ignored");
            return false;
        }
        let registry = Arc::clone(&self.registry);
        let Some(spec) = registry.step(self.active_step).and_then(|s| s.field(field)) else {
            return false;
        };
        if spec.choice(value).is_none() {
            return false;
        }
        let changed = match spec.kind {
            FieldKind::SingleChoice => self.inputs.select(field, value),
            FieldKind::MultiChoice => self.inputs.toggle(field, value).is_some(),
            _ => false,
        };
        if !changed {
            return false;
        }

        self.view.clear_group_invalid(field);
        if pressed {
            let target = CueTarget::Choice {
                field: field.to_string(),
                value: value.to_string(),
            };
            self.view.trigger(target, CueKind::Pressed, self.timeline.now());
        }
        if spec.kind == FieldKind::SingleChoice {
            self.schedule_auto_advance();
        }
        tracing::debug!(field, value, pressed, "choice activated");
        true
    }

    /// Activate the active step's choice tagged with `key`.
    pub fn press_shortcut(&mut self, key: ShortcutKey) -> bool {
        let registry = Arc::clone(&self.registry);
        let Some((field, choice)) = registry
            .step(self.active_step)
            .and_then(|s| s.choice_for_key(key))
        else {
            return false;
        };
        self.activate_choice(&field.name, &choice.value, true)
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(field) = self.view.focus.field().map(str::to_owned) else {
            return false;
        };
        let Some(text) = self.inputs.text_mut(&field) else {
            return false;
        };
        edit(text);
        self.view.clear_field_invalid(&field);
        true
    }

    pub fn insert_char(&mut self, c: char) -> bool {
        self.edit_focused(|text| text.push(c))
    }

    pub fn insert_str(&mut self, s: &str) -> bool {
        self.edit_focused(|text| text.push_str(s))
    }

    pub fn delete_char(&mut self) -> bool {
        self.edit_focused(|text| {
            text.pop();
        })
    }

    /// Whether the focused field takes Enter as a newline
    pub fn focus_is_multiline(&self) -> bool {
        self.view
            .focus
            .field()
            .and_then(|name| self.active().and_then(|s| s.field(name)))
            .is_some_and(|f| f.kind.is_multiline())
    }

    fn focus_first_field(&mut self) {
        self.view.focus = match self.active().and_then(|s| s.first_text_field()) {
            Some(field) => Focus::Field(field.name.clone()),
            None => Focus::None,
        };
    }

    /// Focus a text field of the active step.
    pub fn focus_field(&mut self, field: &str) -> bool {
        if !self.animator.is_idle() {
            return false;
        }
        let is_text = self
            .active()
            .and_then(|s| s.field(field))
            .is_some_and(|f| f.kind.is_text_like());
        if is_text {
            self.view.focus = Focus::Field(field.to_string());
        }
        is_text
    }

    /// Move focus around the ring of the step's text fields and the forward control.
    pub fn cycle_focus(&mut self, backwards: bool) {
        if !self.animator.is_idle() || self.view.completion_visible {
            return;
        }
        let mut ring: Vec<Focus> = self
            .active()
            .map(|s| s.text_fields().map(|f| Focus::Field(f.name.clone())).collect())
            .unwrap_or_default();
        ring.push(Focus::Forward);

        let len = ring.len();
        let next = match ring.iter().position(|f| *f == self.view.focus) {
            Some(i) if backwards => (i + len - 1) % len,
            Some(i) => (i + 1) % len,
            None if backwards => len - 1,
            None => 0,
        };
        self.view.focus = ring.swap_remove(next);
    }

    /// Attach `file` to the active step's upload field.
    pub fn select_file(&mut self, file: FileRef) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(field) = self
            .active()
            .and_then(|s| s.file_field())
            .map(|f| f.name.clone())
        else {
            tracing::debug!(file = %file.name, "no upload field on this step");
            return false;
        };

        if self.inputs.file(&field) != Some(&file) && clear_attachment_url(&mut self.answers) {
            tracing::debug!(%field, "previous attachment url dropped");
        }
        self.inputs.set_file(&field, file.clone());
        record_file(&mut self.answers, &field, file.clone());
        self.view.clear_group_invalid(&field);
        tracing::info!(%field, file = %file.name, "file selected");
        self.outbox.push(Command::ResolveAttachment { field, file });
        true
    }
}

impl std::fmt::Debug for Wizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wizard")
            .field("active_step", &self.active_step)
            .field("terminal", &self.terminal)
            .field("phase", &self.animator.phase())
            .field("now", &self.timeline.now())
            .finish_non_exhaustive()
    }
}
