//! Live input state.
//!
//! The input surface is the authoritative record of what the user currently has
//! typed, selected or attached. The interaction layer writes to it on every
//! event and the presentation renders from it; validation and aggregation read
//! it. Nothing is recovered from the rendering surface.

use crate::field::FieldKind;
use crate::step::Registry;
use crate::value::FileRef;
use std::collections::{BTreeMap, BTreeSet};

/// Raw value of one field, shaped by its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Text(String),
    Single(Option<String>),
    Multi(BTreeSet<String>),
    File(Option<FileRef>),
}

impl RawInput {
    fn empty_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::SingleChoice => Self::Single(None),
            FieldKind::MultiChoice => Self::Multi(BTreeSet::new()),
            FieldKind::File => Self::File(None),
            _ => Self::Text(String::new()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSurface {
    inputs: BTreeMap<String, RawInput>,
}

impl InputSurface {
    /// Empty inputs for every field in the registry.
    pub fn for_registry(registry: &Registry) -> Self {
        let inputs = registry
            .fields()
            .map(|f| (f.name.clone(), RawInput::empty_for(f.kind)))
            .collect();
        Self { inputs }
    }

    pub fn get(&self, field: &str) -> Option<&RawInput> {
        self.inputs.get(field)
    }

    /// Current text of a text-like field, empty when unknown.
    pub fn text(&self, field: &str) -> &str {
        match self.inputs.get(field) {
            Some(RawInput::Text(s)) => s,
            _ => "",
        }
    }

    pub fn text_mut(&mut self, field: &str) -> Option<&mut String> {
        match self.inputs.get_mut(field) {
            Some(RawInput::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Replace a text field's value. Returns false for non-text fields.
    pub fn set_text(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.text_mut(field) {
            Some(s) => {
                *s = value.into();
                true
            }
            None => false,
        }
    }

    pub fn selected(&self, field: &str) -> Option<&str> {
        match self.inputs.get(field) {
            Some(RawInput::Single(v)) => v.as_deref(),
            _ => None,
        }
    }

    /// Select an option of a single-choice field, replacing any previous one.
    pub fn select(&mut self, field: &str, value: &str) -> bool {
        match self.inputs.get_mut(field) {
            Some(RawInput::Single(v)) => {
                *v = Some(value.to_string());
                true
            }
            _ => false,
        }
    }

    /// Flip an option of a multi-choice field. Returns the new checked state,
    /// or `None` for non-multi fields.
    pub fn toggle(&mut self, field: &str, value: &str) -> Option<bool> {
        match self.inputs.get_mut(field) {
            Some(RawInput::Multi(set)) => {
                if set.remove(value) {
                    Some(false)
                } else {
                    set.insert(value.to_string());
                    Some(true)
                }
            }
            _ => None,
        }
    }

    pub fn checked(&self, field: &str) -> Option<&BTreeSet<String>> {
        match self.inputs.get(field) {
            Some(RawInput::Multi(set)) => Some(set),
            _ => None,
        }
    }

    /// Whether an option is selected, for either kind of choice field.
    pub fn is_chosen(&self, field: &str, value: &str) -> bool {
        match self.inputs.get(field) {
            Some(RawInput::Single(v)) => v.as_deref() == Some(value),
            Some(RawInput::Multi(set)) => set.contains(value),
            _ => false,
        }
    }

    pub fn set_file(&mut self, field: &str, file: FileRef) -> bool {
        match self.inputs.get_mut(field) {
            Some(RawInput::File(slot)) => {
                *slot = Some(file);
                true
            }
            _ => false,
        }
    }

    pub fn file(&self, field: &str) -> Option<&FileRef> {
        match self.inputs.get(field) {
            Some(RawInput::File(f)) => f.as_ref(),
            _ => None,
        }
    }
}
