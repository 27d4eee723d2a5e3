//! Per-step validation against live input state.

use crate::field::FieldKind;
use crate::input::InputSurface;
use crate::step::Step;
use lazy_static::lazy_static;
use regex::Regex;

/// Where a failure should be shown
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    /// A text-like input
    Field(String),
    /// The enclosing group of a choice field
    Group(String),
}

impl Target {
    pub fn field_name(&self) -> &str {
        match self {
            Self::Field(name) | Self::Group(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Missing,
    InvalidEmail,
    InvalidNumber,
    NoneSelected,
    EmptySelection,
    NoFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub target: Target,
    pub reason: FailureReason,
}

/// Outcome of validating one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub step: usize,
    pub failures: Vec<Failure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Validate the live values of every field owned by `step`.
pub fn validate(step: &Step, inputs: &InputSurface) -> ValidationReport {
    let mut failures = Vec::new();
    let mut fail = |target: Target, reason: FailureReason| failures.push(Failure { target, reason });

    for field in &step.fields {
        let name = field.name.as_str();
        match field.kind {
            kind if kind.is_text_like() => {
                let raw = inputs.text(name);
                if raw.trim().is_empty() {
                    if field.required {
                        fail(Target::Field(name.into()), FailureReason::Missing);
                    }
                    continue;
                }
                if kind == FieldKind::Email && !is_valid_email(raw) {
                    fail(Target::Field(name.into()), FailureReason::InvalidEmail);
                }
                if kind == FieldKind::Number && raw.trim().parse::<i32>().is_err() {
                    fail(Target::Field(name.into()), FailureReason::InvalidNumber);
                }
            }
            FieldKind::SingleChoice => {
                if field.required && inputs.selected(name).is_none() {
                    fail(Target::Group(name.into()), FailureReason::NoneSelected);
                }
            }
            FieldKind::MultiChoice => {
                let empty = inputs.checked(name).map_or(true, |set| set.is_empty());
                if step.requires_selection(name) && empty {
                    fail(Target::Group(name.into()), FailureReason::EmptySelection);
                }
            }
            FieldKind::File => {
                if field.required && inputs.file(name).is_none() {
                    fail(Target::Group(name.into()), FailureReason::NoFile);
                }
            }
            _ => {}
        }
    }

    ValidationReport {
        step: step.index(),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::tests::{choice_field, text};
    use crate::step::{Registry, Step, StepRule};
    use crate::value::FileRef;

    fn registry() -> Registry {
        Registry::new(vec![
            Step::new("Email", vec![text("email", FieldKind::Email, true)]),
            Step::new("Phone", vec![text("phone", FieldKind::Tel, false)]),
            Step::new(
                "Graduation",
                vec![text("expectedGraduation", FieldKind::Number, true)],
            ),
            Step::new(
                "Contract",
                vec![choice_field(
                    "contractType",
                    FieldKind::SingleChoice,
                    &[('A', "cdi"), ('B', "cdd")],
                )],
            ),
            Step::new(
                "Domains",
                vec![choice_field(
                    "domains",
                    FieldKind::MultiChoice,
                    &[('A', "tech"), ('B', "finance")],
                )],
            )
            .with_rule(StepRule::AtLeastOne {
                field: "domains".into(),
            }),
            Step::new("CV", vec![text("cvFile", FieldKind::File, true)]),
        ])
        .unwrap()
    }

    fn check(registry: &Registry, index: usize, inputs: &InputSurface) -> ValidationReport {
        validate(registry.step(index).unwrap(), inputs)
    }

    #[test]
    fn test_required_text_must_be_non_blank() {
        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);

        inputs.set_text("email", "   ");
        let report = check(&registry, 1, &inputs);
        assert!(!report.is_valid());
        assert_eq!(report.failures[0].target, Target::Field("email".into()));
        assert_eq!(report.failures[0].reason, FailureReason::Missing);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("j.doe+x@mail.example.fr"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@.com"));

        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);
        inputs.set_text("email", "not-an-email");
        let report = check(&registry, 1, &inputs);
        assert_eq!(report.failures[0].reason, FailureReason::InvalidEmail);

        inputs.set_text("email", "jane@example.com");
        assert!(check(&registry, 1, &inputs).is_valid());
    }

    #[test]
    fn test_optional_text_may_be_empty() {
        let registry = registry();
        let inputs = InputSurface::for_registry(&registry);
        assert!(check(&registry, 2, &inputs).is_valid());
    }

    #[test]
    fn test_number_must_parse() {
        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);

        inputs.set_text("expectedGraduation", "next year");
        let report = check(&registry, 3, &inputs);
        assert_eq!(report.failures[0].reason, FailureReason::InvalidNumber);

        inputs.set_text("expectedGraduation", " 2026 ");
        assert!(check(&registry, 3, &inputs).is_valid());
    }

    #[test]
    fn test_single_choice_needs_selection() {
        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);

        let report = check(&registry, 4, &inputs);
        assert_eq!(report.failures[0].target, Target::Group("contractType".into()));
        assert_eq!(report.failures[0].reason, FailureReason::NoneSelected);

        inputs.select("contractType", "cdd");
        assert!(check(&registry, 4, &inputs).is_valid());
    }

    #[test]
    fn test_at_least_one_rule() {
        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);

        let report = check(&registry, 5, &inputs);
        assert_eq!(report.failures[0].target, Target::Group("domains".into()));
        assert_eq!(report.failures[0].reason, FailureReason::EmptySelection);

        inputs.toggle("domains", "tech");
        assert!(check(&registry, 5, &inputs).is_valid());

        inputs.toggle("domains", "tech");
        assert!(!check(&registry, 5, &inputs).is_valid());
    }

    #[test]
    fn test_required_file() {
        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);

        assert_eq!(check(&registry, 6, &inputs).failures[0].reason, FailureReason::NoFile);
        inputs.set_file("cvFile", FileRef::from_path("/tmp/cv.pdf"));
        assert!(check(&registry, 6, &inputs).is_valid());
    }

    #[test]
    fn test_report_names_step() {
        let registry = registry();
        let inputs = InputSurface::for_registry(&registry);
        assert_eq!(check(&registry, 4, &inputs).step, 4);
    }
}
