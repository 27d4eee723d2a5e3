//! Translation of raw user input into wizard operations.
//!
//! Front ends convert their native events (terminal keys, mouse hits, pasted
//! paths) into [`Interaction`]s and hand them to [`Wizard::handle`].

use crate::wizard::Wizard;
use intake_core::{FileRef, ShortcutKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Key { key: Key, modifiers: Modifiers },
    ChoiceClicked { field: String, value: String },
    FieldClicked(String),
    ForwardClicked,
    BackClicked,
    /// A file dropped on, or picked from, the upload affordance
    FileSelected(FileRef),
    DismissNotice,
}

impl Interaction {
    pub fn key(key: Key) -> Self {
        Self::Key {
            key,
            modifiers: Modifiers::default(),
        }
    }
}

impl From<Key> for Interaction {
    fn from(key: Key) -> Self {
        Self::key(key)
    }
}

impl Wizard {
    /// Apply one user interaction.
    ///
    /// An open notice swallows everything; any key or an explicit dismissal
    /// closes it.
    pub fn handle(&mut self, interaction: Interaction) {
        if self.view().notice.is_some() {
            if matches!(interaction, Interaction::Key { .. } | Interaction::DismissNotice) {
                self.dismiss_notice();
            }
            return;
        }

        match interaction {
            Interaction::Key { key, modifiers } => self.handle_key(key, modifiers),
            Interaction::ChoiceClicked { field, value } => {
                self.activate_choice(&field, &value, false);
            }
            Interaction::FieldClicked(field) => {
                self.focus_field(&field);
            }
            Interaction::ForwardClicked => {
                if let Err(reason) = self.advance() {
                    tracing::trace!(%reason, "forward click rejected");
                }
            }
            Interaction::BackClicked => {
                if let Err(reason) = self.retreat() {
                    tracing::trace!(%reason, "back click rejected");
                }
            }
            Interaction::FileSelected(file) => {
                self.select_file(file);
            }
            Interaction::DismissNotice => {}
        }
    }

    fn handle_key(&mut self, key: Key, modifiers: Modifiers) {
        match key {
            Key::Enter if self.focus_is_multiline() => {
                self.insert_char('\n');
            }
            Key::Enter => {
                if let Err(reason) = self.advance() {
                    tracing::trace!(%reason, "enter rejected");
                }
            }
            Key::Escape => {
                if let Err(reason) = self.retreat() {
                    tracing::trace!(%reason, "escape rejected");
                }
            }
            Key::Tab => self.cycle_focus(false),
            Key::BackTab => self.cycle_focus(true),
            Key::Backspace => {
                self.delete_char();
            }
            Key::Char(_) if modifiers.ctrl || modifiers.alt => {}
            Key::Char(c) => {
                if self.view().focus.field().is_some() {
                    self.insert_char(c);
                } else if let Some(shortcut) = ShortcutKey::from_char(c) {
                    self.press_shortcut(shortcut);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{CueKind, CueTarget, Focus};
    use crate::timing;
    use intake_core::{Choice, FieldKind, FieldSpec, Registry, Step, StepRule};
    use std::sync::Arc;

    fn spec(name: &str, kind: FieldKind, options: &[(char, &str)]) -> FieldSpec {
        FieldSpec {
            name: name.into(),
            kind,
            label: name.into(),
            placeholder: None,
            required: kind == FieldKind::SingleChoice,
            choices: options
                .iter()
                .map(|(key, value)| Choice {
                    key: ShortcutKey::from_char(*key).unwrap(),
                    value: value.to_string(),
                    label: String::new(),
                })
                .collect(),
        }
    }

    fn wizard() -> Wizard {
        let registry = Registry::new(vec![
            Step::new("Bio", vec![spec("bio", FieldKind::LongText, &[])]),
            Step::new(
                "Domains",
                vec![spec("domains", FieldKind::MultiChoice, &[('A', "tech"), ('B', "finance")])],
            )
            .with_rule(StepRule::AtLeastOne {
                field: "domains".into(),
            }),
            Step::new(
                "Contract",
                vec![spec("contractType", FieldKind::SingleChoice, &[('A', "cdi"), ('B', "cdd")])],
            ),
            Step::new("CV", vec![spec("cvFile", FieldKind::File, &[])]),
        ])
        .unwrap();
        Wizard::new(Arc::new(registry))
    }

    fn goto(wizard: &mut Wizard, step: usize) {
        wizard.jump_to(step).unwrap();
        wizard.advance_by(timing::EXIT + timing::SETTLE);
    }

    fn type_str(wizard: &mut Wizard, s: &str) {
        for c in s.chars() {
            wizard.handle(Key::Char(c).into());
        }
    }

    #[test]
    fn test_enter_in_long_text_inserts_newline() {
        let mut wizard = wizard();
        type_str(&mut wizard, "line one");
        wizard.handle(Key::Enter.into());
        type_str(&mut wizard, "line two");
        assert_eq!(wizard.inputs().text("bio"), "line one\nline two");
        assert_eq!(wizard.active_step(), 1);

        // Out of the text field, Enter advances
        wizard.handle(Key::Tab.into());
        assert_eq!(wizard.view().focus, Focus::Forward);
        wizard.handle(Key::Enter.into());
        assert!(wizard.is_transitioning());
    }

    #[test]
    fn test_letters_in_text_field_are_not_shortcuts() {
        let mut wizard = wizard();
        type_str(&mut wizard, "AB");
        assert_eq!(wizard.inputs().text("bio"), "AB");
        wizard.handle(Key::Backspace.into());
        assert_eq!(wizard.inputs().text("bio"), "A");
    }

    #[test]
    fn test_shortcut_toggles_multi_choice_without_advancing() {
        let mut wizard = wizard();
        goto(&mut wizard, 2);

        wizard.handle(Key::Char('b').into());
        assert!(wizard.inputs().is_chosen("domains", "finance"));
        let pressed = CueTarget::Choice {
            field: "domains".into(),
            value: "finance".into(),
        };
        assert!(wizard.view().cue(&pressed, CueKind::Pressed, wizard.now()).is_some());

        wizard.handle(Key::Char('B').into());
        assert!(!wizard.inputs().is_chosen("domains", "finance"));
        wizard.advance_by(timing::AUTO_ADVANCE * 2);
        assert_eq!(wizard.active_step(), 2);
        assert!(!wizard.has_pending_auto_advance());
    }

    #[test]
    fn test_modified_letters_are_ignored() {
        let mut wizard = wizard();
        goto(&mut wizard, 3);
        wizard.handle(Interaction::Key {
            key: Key::Char('a'),
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        });
        assert_eq!(wizard.inputs().selected("contractType"), None);
        assert!(!wizard.has_pending_auto_advance());
    }

    #[test]
    fn test_click_has_no_pressed_cue() {
        let mut wizard = wizard();
        goto(&mut wizard, 3);
        wizard.handle(Interaction::ChoiceClicked {
            field: "contractType".into(),
            value: "cdd".into(),
        });
        assert_eq!(wizard.inputs().selected("contractType"), Some("cdd"));
        assert_eq!(wizard.view().active_cues(wizard.now()).count(), 0);
        assert!(wizard.has_pending_auto_advance());
    }

    #[test]
    fn test_rejected_navigation_leaves_step_alone() {
        let mut wizard = wizard();
        wizard.handle(Key::Escape.into());
        wizard.handle(Interaction::BackClicked);
        assert_eq!(wizard.active_step(), 1);
        assert!(!wizard.is_transitioning());

        wizard.handle(Interaction::ForwardClicked);
        assert!(wizard.is_transitioning());
        // Locked while the transition runs
        wizard.handle(Interaction::ForwardClicked);
        wizard.handle(Key::Enter.into());
        wizard.advance_by(timing::EXIT + timing::SETTLE);
        assert_eq!(wizard.active_step(), 2);
    }

    #[test]
    fn test_escape_retreats() {
        let mut wizard = wizard();
        goto(&mut wizard, 3);
        wizard.handle(Key::Escape.into());
        wizard.advance_by(timing::EXIT);
        assert_eq!(wizard.active_step(), 2);
    }

    #[test]
    fn test_file_selection_emits_resolve_command() {
        let mut wizard = wizard();
        goto(&mut wizard, 4);
        let file = FileRef::from_path("/home/jane/cv.pdf");
        wizard.handle(Interaction::FileSelected(file.clone()));

        assert_eq!(wizard.inputs().file("cvFile"), Some(&file));
        assert_eq!(
            wizard.take_commands(),
            vec![crate::Command::ResolveAttachment {
                field: "cvFile".into(),
                file: file.clone(),
            }]
        );

        wizard.attachment_resolved("cvFile", &file, "file:///home/jane/cv.pdf");
        assert_eq!(wizard.answers().text("cvUrl"), Some("file:///home/jane/cv.pdf"));
    }

    #[test]
    fn test_stale_attachment_is_ignored() {
        let mut wizard = wizard();
        goto(&mut wizard, 4);
        let first = FileRef::from_path("/tmp/old.pdf");
        let second = FileRef::from_path("/tmp/new.pdf");
        wizard.handle(Interaction::FileSelected(first.clone()));
        wizard.handle(Interaction::FileSelected(second));

        wizard.attachment_resolved("cvFile", &first, "file:///tmp/old.pdf");
        assert_eq!(wizard.answers().text("cvUrl"), None);
        wizard.attachment_failed("cvFile", &first, "gone");
        assert!(wizard.view().notice.is_none());
    }

    #[test]
    fn test_replaced_file_drops_previous_url() {
        let mut wizard = wizard();
        goto(&mut wizard, 4);
        let first = FileRef::from_path("/tmp/old.pdf");
        let second = FileRef::from_path("/tmp/new.pdf");

        wizard.handle(Interaction::FileSelected(first.clone()));
        wizard.attachment_resolved("cvFile", &first, "file:///tmp/old.pdf");
        assert_eq!(wizard.answers().text("cvUrl"), Some("file:///tmp/old.pdf"));

        // Pending resolution of the new file leaves no URL behind
        wizard.handle(Interaction::FileSelected(second.clone()));
        assert_eq!(wizard.inputs().file("cvFile"), Some(&second));
        assert_eq!(wizard.answers().text("cvUrl"), None);

        wizard.attachment_failed("cvFile", &second, "gone");
        assert_eq!(wizard.answers().text("cvUrl"), None);
        assert!(wizard.view().notice.is_some());
    }

    #[test]
    fn test_failed_attachment_clears_its_url() {
        let mut wizard = wizard();
        goto(&mut wizard, 4);
        let file = FileRef::from_path("/tmp/cv.pdf");
        wizard.handle(Interaction::FileSelected(file.clone()));
        wizard.attachment_resolved("cvFile", &file, "file:///tmp/cv.pdf");

        // Reselecting the same file keeps its URL until resolution says otherwise
        wizard.handle(Interaction::FileSelected(file.clone()));
        assert_eq!(wizard.answers().text("cvUrl"), Some("file:///tmp/cv.pdf"));

        wizard.attachment_failed("cvFile", &file, "permission denied");
        assert_eq!(wizard.answers().text("cvUrl"), None);
    }

    #[test]
    fn test_notice_swallows_input_until_dismissed() {
        let mut wizard = wizard();
        goto(&mut wizard, 4);
        let file = FileRef::from_path("/tmp/cv.pdf");
        wizard.handle(Interaction::FileSelected(file.clone()));
        wizard.attachment_failed("cvFile", &file, "permission denied");
        assert!(wizard.view().notice.is_some());

        // The first key only closes the notice
        wizard.handle(Key::Escape.into());
        assert!(wizard.view().notice.is_none());
        assert!(!wizard.is_transitioning());

        wizard.handle(Key::Escape.into());
        assert!(wizard.is_transitioning());
    }
}
