//! Merging live inputs into the answer record.
//!
//! Merge rules per field kind:
//! - single choice: overwrite when an option is selected
//! - multi choice: recompute the full set of checked options, every time
//! - text-like: overwrite only when the raw value is non-empty
//! - file: overwrite when a file is attached

use crate::field::FieldKind;
use crate::input::InputSurface;
use crate::payload::{fields, SubmissionPayload};
use crate::step::{Registry, Step};
use crate::value::{AnswerRecord, FieldValue, FileRef};
use crate::Result;

/// Persist the live values of every field owned by `step`.
pub fn save_step(step: &Step, inputs: &InputSurface, record: &mut AnswerRecord) {
    for field in &step.fields {
        let name = field.name.as_str();
        match field.kind {
            FieldKind::SingleChoice => {
                if let Some(value) = inputs.selected(name) {
                    record.insert(name, FieldValue::Text(value.to_string()));
                }
            }
            FieldKind::MultiChoice => {
                let set = inputs.checked(name).cloned().unwrap_or_default();
                record.insert(name, FieldValue::MultiChoice(set));
            }
            FieldKind::File => {
                if let Some(file) = inputs.file(name) {
                    record.insert(name, FieldValue::File(file.clone()));
                }
            }
            _ => {
                let raw = inputs.text(name);
                if !raw.is_empty() {
                    record.insert(name, FieldValue::Text(raw.to_string()));
                }
            }
        }
    }
    tracing::trace!(step = step.index(), fields = record.len(), "step saved");
}

/// Record a selected file immediately, ahead of the owning step's save.
pub fn record_file(record: &mut AnswerRecord, field: &str, file: FileRef) {
    record.insert(field, FieldValue::File(file));
}

/// Record the durable URL obtained for the uploaded file.
pub fn record_attachment_url(record: &mut AnswerRecord, url: impl Into<String>) {
    record.insert(fields::CV_URL, FieldValue::Text(url.into()));
}

/// Drop the attachment URL once it no longer belongs to the selected file.
pub fn clear_attachment_url(record: &mut AnswerRecord) -> bool {
    record.remove(fields::CV_URL).is_some()
}

/// Re-sync every step's live state into the record, then project it.
pub fn build_payload(
    registry: &Registry,
    inputs: &InputSurface,
    record: &mut AnswerRecord,
) -> Result<SubmissionPayload> {
    for step in registry.steps() {
        save_step(step, inputs, record);
    }
    SubmissionPayload::from_record(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::tests::{choice_field, text};
    use crate::step::StepRule;
    use crate::Error;

    fn registry() -> Registry {
        Registry::new(vec![
            Step::new("Email", vec![text(fields::EMAIL, FieldKind::Email, true)]),
            Step::new("Phone", vec![text(fields::PHONE, FieldKind::Tel, false)]),
            Step::new(
                "Graduation",
                vec![text(fields::EXPECTED_GRADUATION, FieldKind::Number, true)],
            ),
            Step::new(
                "Contract",
                vec![choice_field(
                    fields::CONTRACT_TYPE,
                    FieldKind::SingleChoice,
                    &[('A', "cdi"), ('B', "cdd")],
                )],
            ),
            Step::new(
                "Domains",
                vec![choice_field(
                    fields::DOMAINS,
                    FieldKind::MultiChoice,
                    &[('A', "tech"), ('B', "finance"), ('C', "marketing")],
                )],
            )
            .with_rule(StepRule::AtLeastOne {
                field: fields::DOMAINS.into(),
            }),
            Step::new("CV", vec![text(fields::CV_FILE, FieldKind::File, false)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_text_overwritten_only_when_non_empty() {
        let registry = registry();
        let step = registry.step(2).unwrap();
        let mut inputs = InputSurface::for_registry(&registry);
        let mut record = AnswerRecord::new();

        inputs.set_text(fields::PHONE, "+33 6 12 34 56 78");
        save_step(step, &inputs, &mut record);
        assert_eq!(record.text(fields::PHONE), Some("+33 6 12 34 56 78"));

        inputs.set_text(fields::PHONE, "");
        save_step(step, &inputs, &mut record);
        assert_eq!(record.text(fields::PHONE), Some("+33 6 12 34 56 78"));
    }

    #[test]
    fn test_multi_choice_recomputed_from_scratch() {
        let registry = registry();
        let step = registry.step(5).unwrap();
        let mut inputs = InputSurface::for_registry(&registry);
        let mut record = AnswerRecord::new();

        inputs.toggle(fields::DOMAINS, "tech");
        inputs.toggle(fields::DOMAINS, "finance");
        save_step(step, &inputs, &mut record);
        assert_eq!(record.get(fields::DOMAINS).and_then(|v| v.as_set()).map(|s| s.len()), Some(2));

        inputs.toggle(fields::DOMAINS, "tech");
        inputs.toggle(fields::DOMAINS, "finance");
        inputs.toggle(fields::DOMAINS, "marketing");
        save_step(step, &inputs, &mut record);
        let saved: Vec<_> = record
            .get(fields::DOMAINS)
            .and_then(|v| v.as_set())
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        assert_eq!(saved, vec!["marketing".to_string()]);
    }

    #[test]
    fn test_single_choice_kept_when_nothing_selected() {
        let registry = registry();
        let step = registry.step(4).unwrap();
        let mut inputs = InputSurface::for_registry(&registry);
        let mut record = AnswerRecord::new();

        save_step(step, &inputs, &mut record);
        assert!(!record.contains(fields::CONTRACT_TYPE));

        inputs.select(fields::CONTRACT_TYPE, "cdd");
        save_step(step, &inputs, &mut record);
        assert_eq!(record.text(fields::CONTRACT_TYPE), Some("cdd"));
    }

    #[test]
    fn test_later_steps_do_not_clear_earlier_answers() {
        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);
        let mut record = AnswerRecord::new();

        inputs.set_text(fields::EMAIL, "jane@example.com");
        save_step(registry.step(1).unwrap(), &inputs, &mut record);
        for index in 2..=registry.len() {
            save_step(registry.step(index).unwrap(), &inputs, &mut record);
        }
        assert_eq!(record.text(fields::EMAIL), Some("jane@example.com"));
    }

    #[test]
    fn test_build_payload_resyncs_skipped_steps() {
        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);
        let mut record = AnswerRecord::new();

        inputs.set_text(fields::EMAIL, "jane@example.com");
        inputs.set_text(fields::EXPECTED_GRADUATION, "2026");
        inputs.select(fields::CONTRACT_TYPE, "cdi");
        inputs.toggle(fields::DOMAINS, "finance");

        let payload = build_payload(&registry, &inputs, &mut record).expect("payload");
        assert_eq!(payload.email.as_deref(), Some("jane@example.com"));
        assert_eq!(payload.current_education.expected_graduation, Some(2026));
        assert_eq!(payload.job_preferences.contract_type.as_deref(), Some("cdi"));
        assert_eq!(payload.job_preferences.domains, vec!["finance".to_string()]);
        assert_eq!(payload.phone, None);
        assert_eq!(payload.cv_url, None);
    }

    #[test]
    fn test_build_payload_is_idempotent() {
        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);
        let mut record = AnswerRecord::new();

        inputs.set_text(fields::EMAIL, "jane@example.com");
        inputs.toggle(fields::DOMAINS, "tech");
        record_attachment_url(&mut record, "https://files.example.com/cv.pdf");

        let first = build_payload(&registry, &inputs, &mut record).expect("first");
        let second = build_payload(&registry, &inputs, &mut record).expect("second");
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_malformed_graduation_year_is_an_error() {
        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);
        let mut record = AnswerRecord::new();

        inputs.set_text(fields::EXPECTED_GRADUATION, "soon");
        let result = build_payload(&registry, &inputs, &mut record);
        assert!(matches!(result, Err(Error::InvalidNumber { .. })));
    }

    #[test]
    fn test_payload_shape() {
        let registry = registry();
        let mut inputs = InputSurface::for_registry(&registry);
        let mut record = AnswerRecord::new();

        inputs.set_text(fields::EMAIL, "jane@example.com");
        record_file(&mut record, fields::CV_FILE, FileRef::from_path("/tmp/cv.pdf"));
        record_attachment_url(&mut record, "file:///tmp/cv.pdf");

        let payload = build_payload(&registry, &inputs, &mut record).expect("payload");
        let json = serde_json::to_value(&payload).expect("json");

        assert_eq!(json["email"], "jane@example.com");
        assert!(json["phone"].is_null());
        assert!(json["portfolioUrl"].is_null());
        assert!(json["currentEducation"]["programDuration"].is_null());
        assert!(json["currentEducation"]["expectedGraduation"].is_null());
        assert_eq!(json["completedEducation"], serde_json::json!([]));
        assert_eq!(json["experiences"], serde_json::json!([]));
        assert_eq!(json["skills"], serde_json::json!([]));
        assert_eq!(json["languages"], serde_json::json!([]));
        assert_eq!(json["cvUrl"], "file:///tmp/cv.pdf");
        assert_eq!(json["jobPreferences"]["domains"], serde_json::json!([]));
        assert!(json["jobPreferences"]["salaryMin"].is_null());
        assert!(json["jobPreferences"]["seniority"].is_null());
        assert!(json["jobPreferences"]["flexibility"].is_null());
    }

    #[test]
    fn test_attachment_url_cleared() {
        let mut record = AnswerRecord::new();
        record_attachment_url(&mut record, "file:///tmp/old.pdf");
        assert_eq!(record.text(fields::CV_URL), Some("file:///tmp/old.pdf"));

        assert!(clear_attachment_url(&mut record));
        assert_eq!(record.text(fields::CV_URL), None);
        assert!(!clear_attachment_url(&mut record));
    }
}
