//! Steps and the question registry.
//!
//! The registry is the ordered, immutable list of steps for a session. Step
//! indices are 1-based and assigned from position when the registry is built.

use crate::field::{Choice, FieldKind, FieldSpec, ShortcutKey};
use crate::payload::fields;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Declarative per-step validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepRule {
    /// The named multi-choice field must have at least one option checked
    AtLeastOne { field: String },
}

/// One addressable unit of the wizard sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(skip)]
    index: usize,
    #[serde(default)]
    pub title: String,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub rule: Option<StepRule>,
}

impl Step {
    pub fn new(title: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            index: 0,
            title: title.into(),
            fields,
            rule: None,
        }
    }

    pub fn with_rule(mut self, rule: StepRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// 1-based position in the registry.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn text_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.kind.is_text_like())
    }

    /// The input that receives focus when the step becomes active.
    pub fn first_text_field(&self) -> Option<&FieldSpec> {
        self.text_fields().next()
    }

    pub fn file_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.kind == FieldKind::File)
    }

    pub fn has_choices(&self) -> bool {
        self.fields.iter().any(|f| f.kind.is_choice())
    }

    /// Resolve a shortcut key to the choice carrying it.
    pub fn choice_for_key(&self, key: ShortcutKey) -> Option<(&FieldSpec, &Choice)> {
        self.fields
            .iter()
            .filter(|f| f.kind.is_choice())
            .find_map(|f| f.choice_by_key(key).map(|c| (f, c)))
    }

    /// Whether the step-level rule demands a selection in `field`.
    pub fn requires_selection(&self, field: &str) -> bool {
        matches!(&self.rule, Some(StepRule::AtLeastOne { field: f }) if f == field)
    }

    fn check(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::EmptyStep(self.index));
        }

        let mut keys = HashSet::new();
        for field in &self.fields {
            let invalid = |reason: &str| Error::InvalidField {
                step: self.index,
                field: field.name.clone(),
                reason: reason.to_string(),
            };

            if field.kind.is_choice() {
                if field.choices.is_empty() {
                    return Err(invalid("has no choices"));
                }
                let mut values = HashSet::new();
                for choice in &field.choices {
                    if !values.insert(choice.value.as_str()) {
                        return Err(invalid("repeats a choice value"));
                    }
                    if !keys.insert(choice.key) {
                        return Err(Error::DuplicateShortcut {
                            step: self.index,
                            key: choice.key,
                        });
                    }
                }
            } else if !field.choices.is_empty() {
                return Err(invalid("declares choices but is not a choice field"));
            }

            if field.kind == FieldKind::MultiChoice && field.required {
                return Err(invalid(
                    "is a multi-choice field; use the at_least_one step rule instead of required",
                ));
            }
        }

        if let Some(StepRule::AtLeastOne { field }) = &self.rule {
            match self.field(field) {
                Some(spec) if spec.kind == FieldKind::MultiChoice => {}
                _ => {
                    return Err(Error::InvalidRule {
                        step: self.index,
                        field: field.clone(),
                    })
                }
            }
        }

        Ok(())
    }
}

/// Ordered list of steps, fixed for the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    steps: Vec<Step>,
}

impl Registry {
    /// Build a registry, assigning 1-based indices and validating every step.
    pub fn new(mut steps: Vec<Step>) -> Result<Self> {
        if steps.is_empty() {
            return Err(Error::EmptyRegistry);
        }

        let mut names = HashSet::new();
        for (position, step) in steps.iter_mut().enumerate() {
            step.index = position + 1;
            step.check()?;
            for field in &step.fields {
                if field.name == fields::CV_URL {
                    return Err(Error::ReservedField(field.name.clone()));
                }
                if !names.insert(field.name.clone()) {
                    return Err(Error::DuplicateField(field.name.clone()));
                }
            }
        }

        Ok(Self { steps })
    }

    /// Total step count N.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at a 1-based index.
    pub fn step(&self, index: usize) -> Option<&Step> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.steps.iter().flat_map(|s| s.fields.iter())
    }

    /// Locate a field and the step owning it.
    pub fn field(&self, name: &str) -> Option<(&Step, &FieldSpec)> {
        self.steps
            .iter()
            .find_map(|s| s.field(name).map(|f| (s, f)))
    }
}
