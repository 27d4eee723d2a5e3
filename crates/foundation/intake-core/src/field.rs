//! Field specifications.
//!
//! A field is a named, typed slot owned by exactly one step. Choice fields carry
//! their options, each tagged with a single-character shortcut key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of input a field collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Url,
    /// Integer collected as text, coerced at payload projection
    Number,
    /// Multi-line text; Enter inserts a newline instead of advancing
    LongText,
    SingleChoice,
    MultiChoice,
    File,
}

impl FieldKind {
    /// Free-text inputs that take keyboard focus.
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            Self::Text | Self::Email | Self::Tel | Self::Url | Self::Number | Self::LongText
        )
    }

    pub fn is_choice(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice)
    }

    pub fn is_multiline(self) -> bool {
        matches!(self, Self::LongText)
    }
}

/// Shortcut key tagging a choice: `A`-`G` or `1`-`5`.
///
/// Letters are stored upper-case so lookups are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortcutKey(char);

impl ShortcutKey {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            up @ ('A'..='G' | '1'..='5') => Some(Self(up)),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for ShortcutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ShortcutKey {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or(crate::Error::InvalidShortcut(s)),
            _ => Err(crate::Error::InvalidShortcut(s)),
        }
    }
}

impl From<ShortcutKey> for String {
    fn from(key: ShortcutKey) -> Self {
        key.0.to_string()
    }
}

/// One selectable option of a choice field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub key: ShortcutKey,
    /// Value stored in the answer record when selected
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl Choice {
    /// Label to display, falling back to the stored value.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.value
        } else {
            &self.label
        }
    }
}

/// A named, typed slot within a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl FieldSpec {
    pub fn choice_by_key(&self, key: ShortcutKey) -> Option<&Choice> {
        self.choices.iter().find(|c| c.key == key)
    }

    pub fn choice(&self, value: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_key_accepts_letters_and_digits() {
        assert_eq!(ShortcutKey::from_char('a').map(ShortcutKey::as_char), Some('A'));
        assert_eq!(ShortcutKey::from_char('G').map(ShortcutKey::as_char), Some('G'));
        assert_eq!(ShortcutKey::from_char('1').map(ShortcutKey::as_char), Some('1'));
        assert_eq!(ShortcutKey::from_char('5').map(ShortcutKey::as_char), Some('5'));
    }

    #[test]
    fn test_shortcut_key_rejects_out_of_range() {
        assert!(ShortcutKey::from_char('h').is_none());
        assert!(ShortcutKey::from_char('0').is_none());
        assert!(ShortcutKey::from_char('6').is_none());
        assert!(ShortcutKey::from_char(' ').is_none());
    }

    #[test]
    fn test_shortcut_key_deserializes_from_string() {
        let key: ShortcutKey = serde_json::from_str("\"c\"").expect("deserialize");
        assert_eq!(key.as_char(), 'C');
        assert!(serde_json::from_str::<ShortcutKey>("\"AB\"").is_err());
        assert!(serde_json::from_str::<ShortcutKey>("\"Z\"").is_err());
    }

    #[test]
    fn test_text_like_kinds() {
        assert!(FieldKind::Email.is_text_like());
        assert!(FieldKind::LongText.is_text_like());
        assert!(!FieldKind::SingleChoice.is_text_like());
        assert!(!FieldKind::File.is_text_like());
        assert!(FieldKind::MultiChoice.is_choice());
    }

    #[test]
    fn test_choice_display_label_falls_back_to_value() {
        let choice = Choice {
            key: ShortcutKey::from_char('A').unwrap(),
            value: "cdi".into(),
            label: String::new(),
        };
        assert_eq!(choice.display_label(), "cdi");
    }
}
