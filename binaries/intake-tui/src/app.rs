//! Application state for the intake TUI
//!
//! Owns the headless [`Wizard`] and bridges it to the terminal: crossterm
//! events become [`Interaction`]s, wall-clock time drives the wizard's
//! timeline, and outbound commands go to the [`SubmissionWorker`].

use crate::layout::{self, Hit};
use crate::theme::Theme;
use crate::worker::{SubmissionWorker, WorkerResponse};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use intake_config::IntakeConfig;
use intake_core::FileRef;
use intake_wizard::{Command, Interaction, Key, Modifiers, SubmissionOutcome, Wizard};
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::time::Instant;
use url::Url;

pub struct App {
    pub wizard: Wizard,
    pub theme: Theme,
    pub show_help: bool,
    /// Path being typed into the file picker, when it is open
    pub picker: Option<String>,
    pub dry_run: bool,
    pub endpoint: String,

    pub terminal_width: u16,
    pub terminal_height: u16,

    worker: SubmissionWorker,
    started: Instant,
}

impl App {
    pub fn new(config: &IntakeConfig, worker: SubmissionWorker, dry_run: bool) -> Self {
        Self {
            wizard: Wizard::new(config.registry.clone()),
            theme: Theme::default(),
            show_help: false,
            picker: None,
            dry_run,
            endpoint: config.endpoint.to_string(),
            terminal_width: 80,
            terminal_height: 24,
            worker,
            started: Instant::now(),
        }
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.terminal_width, self.terminal_height)
    }

    /// Called on every tick
    pub fn on_tick(&mut self) {
        self.sync_clock();
        self.poll_worker();
        self.dispatch_commands();
    }

    /// Handle a key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return true,
            KeyCode::F(1) => {
                self.show_help = !self.show_help;
                return false;
            }
            KeyCode::F(2) => {
                self.theme = self.theme.next();
                return false;
            }
            _ => {}
        }

        // Help overlay consumes the key
        if self.show_help {
            self.show_help = false;
            return false;
        }

        self.sync_clock();

        if self.picker.is_some() {
            self.handle_picker_key(key);
        } else if self.wants_picker(&key) {
            self.picker = Some(String::new());
        } else if let Some(interaction) = to_interaction(&key) {
            self.wizard.handle(interaction);
        }

        self.dispatch_commands();
        false
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if self.show_help {
            self.show_help = false;
            return;
        }
        if self.picker.is_some() {
            return;
        }

        self.sync_clock();
        if self.wizard.view().notice.is_some() {
            self.wizard.handle(Interaction::DismissNotice);
            return;
        }

        match layout::hit_test(self.area(), &self.wizard, mouse.column, mouse.row) {
            Some(Hit::Choice { field, value }) => {
                self.wizard.handle(Interaction::ChoiceClicked { field, value })
            }
            Some(Hit::Field(field)) => self.wizard.handle(Interaction::FieldClicked(field)),
            Some(Hit::Upload) => {
                if self.upload_available() {
                    self.picker = Some(String::new());
                }
            }
            Some(Hit::Back) => self.wizard.handle(Interaction::BackClicked),
            Some(Hit::Forward) => self.wizard.handle(Interaction::ForwardClicked),
            None => {}
        }
        self.dispatch_commands();
    }

    /// Bracketed paste. Terminals deliver a file dropped on the window this way.
    pub fn handle_paste(&mut self, text: String) {
        self.sync_clock();

        if let Some(path) = self.picker.as_mut() {
            path.push_str(text.trim());
            return;
        }
        if self.show_help || self.wizard.view().notice.is_some() {
            return;
        }

        if self.wizard.view().focus.field().is_some() {
            if self.wizard.focus_is_multiline() {
                self.wizard.insert_str(&text);
            } else {
                self.wizard.insert_str(&text.replace(['\r', '\n'], " "));
            }
        } else if self.upload_available() {
            match parse_dropped_path(&text) {
                Some(path) => self
                    .wizard
                    .handle(Interaction::FileSelected(FileRef::from_path(path))),
                None => tracing::debug!("ignoring empty paste"),
            }
        }
        self.dispatch_commands();
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.terminal_width = width;
        self.terminal_height = height;
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Some(path) = self.picker.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.picker = None,
            KeyCode::Enter => {
                let typed = std::mem::take(path);
                self.picker = None;
                if let Some(path) = parse_dropped_path(&typed) {
                    self.wizard
                        .handle(Interaction::FileSelected(FileRef::from_path(path)));
                }
            }
            KeyCode::Backspace => {
                path.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => path.push(c),
            _ => {}
        }
    }

    /// `U` or Ctrl-O on a step with an upload field, with no text field focused.
    fn wants_picker(&self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let requested = match key.code {
            KeyCode::Char('o') => ctrl,
            KeyCode::Char('u') | KeyCode::Char('U') => {
                !ctrl && !key.modifiers.contains(KeyModifiers::ALT)
            }
            _ => false,
        };
        requested
            && self.upload_available()
            && self.wizard.view().notice.is_none()
            && self.wizard.view().focus.field().is_none()
    }

    fn upload_available(&self) -> bool {
        self.wizard.accepts_input()
            && self
                .wizard
                .active()
                .and_then(|step| step.file_field())
                .is_some()
    }

    fn sync_clock(&mut self) {
        self.wizard.advance_to(self.started.elapsed());
    }

    fn poll_worker(&mut self) {
        while let Some(response) = self.worker.try_recv() {
            match response {
                WorkerResponse::Submitted { attempt, outcome } => {
                    if attempt != self.wizard.attempts() {
                        tracing::warn!(attempt, current = self.wizard.attempts(), "stale submission result");
                        continue;
                    }
                    let outcome = match outcome {
                        Ok(()) => SubmissionOutcome::Accepted,
                        Err(reason) => SubmissionOutcome::Rejected { reason },
                    };
                    self.wizard.submission_finished(outcome);
                }
                WorkerResponse::Resolved {
                    field,
                    file,
                    outcome,
                } => match outcome {
                    Ok(url) => self.wizard.attachment_resolved(&field, &file, url),
                    Err(reason) => self.wizard.attachment_failed(&field, &file, reason),
                },
            }
        }
    }

    fn dispatch_commands(&mut self) {
        for command in self.wizard.take_commands() {
            let Err(err) = self.worker.send(command) else {
                continue;
            };
            tracing::error!(error = %err, "submission worker unavailable");
            match err.into_inner() {
                Command::Submit { .. } => self.wizard.submission_finished(SubmissionOutcome::Rejected {
                    reason: "the submission worker is unavailable".to_string(),
                }),
                Command::ResolveAttachment { field, file } => {
                    self.wizard
                        .attachment_failed(&field, &file, "the submission worker is unavailable")
                }
            }
        }
    }
}

fn to_interaction(key: &KeyEvent) -> Option<Interaction> {
    let mapped = match key.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    };
    Some(Interaction::Key {
        key: mapped,
        modifiers: Modifiers {
            ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
            alt: key.modifiers.contains(KeyModifiers::ALT),
            shift: key.modifiers.contains(KeyModifiers::SHIFT),
        },
    })
}

/// Turn a dropped or typed path into a filesystem path.
///
/// Terminals quote or escape paths with spaces and some send percent-encoded
/// `file://` URLs.
fn parse_dropped_path(text: &str) -> Option<PathBuf> {
    let text = text.trim();
    let text = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .or_else(|| text.strip_prefix('"').and_then(|t| t.strip_suffix('"')))
        .unwrap_or(text);
    if text.starts_with("file://") {
        return Url::parse(text).ok()?.to_file_path().ok();
    }
    let text = text.replace("\\ ", " ");

    if text.is_empty() {
        None
    } else {
        Some(PathBuf::from(text))
    }
}
