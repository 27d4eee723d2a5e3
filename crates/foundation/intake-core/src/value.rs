//! Field values and the canonical answer record.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// A file selected on the upload affordance.
///
/// Holds a handle to the local file only. Turning it into a durable URL is the
/// job of an external attachment resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRef {
    pub name: String,
    pub path: PathBuf,
}

impl FileRef {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A discriminated answer value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    MultiChoice(BTreeSet<String>),
    File(FileRef),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::MultiChoice(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }
}

/// Canonical accumulated mapping of field name to value.
///
/// Only the aggregation functions in [`crate::aggregate`] write to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    values: BTreeMap<String, FieldValue>,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }

    pub(crate) fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.values.remove(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_ref_takes_name_from_path() {
        let file = FileRef::from_path("/tmp/uploads/cv-2024.pdf");
        assert_eq!(file.name, "cv-2024.pdf");
        assert_eq!(file.path(), Path::new("/tmp/uploads/cv-2024.pdf"));
    }

    #[test]
    fn test_field_value_accessors() {
        let text = FieldValue::Text("hello".into());
        assert_eq!(text.as_text(), Some("hello"));
        assert!(text.as_set().is_none());

        let set = FieldValue::MultiChoice(["a".to_string()].into_iter().collect());
        assert_eq!(set.as_set().map(BTreeSet::len), Some(1));
        assert!(set.as_file().is_none());
    }

    #[test]
    fn test_record_insert_overwrites() {
        let mut record = AnswerRecord::new();
        record.insert("email", FieldValue::Text("a@b.co".into()));
        record.insert("email", FieldValue::Text("c@d.co".into()));
        assert_eq!(record.len(), 1);
        assert_eq!(record.text("email"), Some("c@d.co"));
    }
}
