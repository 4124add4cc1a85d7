//! Shared form validation helpers.

/// Message for a blank required field.
pub const REQUIRED: &str = "This field is required.";

/// Per-field validation messages, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    /// Record a message for a field. Only the first message per field is kept.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.0.push((field, message.into()));
        }
    }

    /// The message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    /// Add every message of `other` that this set lacks.
    pub fn merge(&mut self, other: Self) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    /// Whether every field passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Trim a required text field and enforce a maximum length in characters.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    if value.chars().count() > max_chars {
        errors.add(
            field,
            format!("Ensure this value has at most {max_chars} characters."),
        );
        return None;
    }
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_wins() {
        let mut errors = FieldErrors::default();
        errors.add("name", "first");
        errors.add("name", "second");
        assert_eq!(errors.get("name"), Some("first"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_required_text() {
        let mut errors = FieldErrors::default();
        assert_eq!(
            required_text(&mut errors, "city", " Leeds ", 120),
            Some("Leeds".to_string())
        );
        assert_eq!(required_text(&mut errors, "postcode", "   ", 20), None);
        assert_eq!(required_text(&mut errors, "country", "abc", 2), None);
        assert_eq!(errors.get("postcode"), Some(REQUIRED));
        assert!(errors.get("country").is_some_and(|m| m.contains("at most 2")));
    }
}
