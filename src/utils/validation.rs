// src/utils/validation.rs

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use crate::models::user::{
    FULL_NAME_MESSAGE, INVALID_EMAIL_MESSAGE, REGISTER_PASSWORD_MESSAGE, SIGN_IN_PASSWORD_MESSAGE,
};

pub static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Result of checking one field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub is_valid: bool,
    pub message: String,
}

impl FieldCheck {
    pub fn new(is_valid: bool, message: impl Into<String>) -> Self {
        Self {
            is_valid,
            message: message.into(),
        }
    }
}

pub type Rule = Box<dyn Fn(&str) -> FieldCheck + Send + Sync>;

pub fn validate_email(value: &str) -> FieldCheck {
    FieldCheck::new(
        EMAIL_RE.is_match(&value.to_lowercase()),
        INVALID_EMAIL_MESSAGE,
    )
}

/// Rule requiring at least `min` characters.
pub fn min_chars(min: usize, message: &'static str) -> Rule {
    Box::new(move |value: &str| FieldCheck::new(value.chars().count() >= min, message))
}

/// Field values plus per-field error messages for one form.
///
/// Feedback is deferred: an empty value never shows an error, and an error disappears
/// as soon as the value becomes valid or empty again.
pub struct FormState {
    values: BTreeMap<String, String>,
    errors: BTreeMap<String, String>,
    rules: BTreeMap<String, Rule>,
}

impl FormState {
    /// A form with the given fields, all empty.
    pub fn new<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let values = fields
            .into_iter()
            .map(|f| (f.to_string(), String::new()))
            .collect();
        Self {
            values,
            errors: BTreeMap::new(),
            rules: BTreeMap::new(),
        }
    }

    pub fn with_rule(mut self, field: &str, rule: Rule) -> Self {
        self.values.entry(field.to_string()).or_default();
        self.rules.insert(field.to_string(), rule);
        self
    }

    /// Sign-in form: e-mail and a password of at least 5 characters.
    pub fn sign_in() -> Self {
        Self::new(["email", "password"])
            .with_rule("email", Box::new(validate_email))
            .with_rule("password", min_chars(5, SIGN_IN_PASSWORD_MESSAGE))
    }

    /// Registration form: full name (3+), e-mail, password (8+).
    pub fn register() -> Self {
        Self::new(["fullName", "email", "password"])
            .with_rule("fullName", min_chars(3, FULL_NAME_MESSAGE))
            .with_rule("email", Box::new(validate_email))
            .with_rule("password", min_chars(8, REGISTER_PASSWORD_MESSAGE))
    }

    /// Records a new value for `field` and recomputes that field's error.
    pub fn handle_input_change(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        let empty = value.is_empty();
        self.values.insert(field.to_string(), value);

        if empty {
            self.errors.remove(field);
            return;
        }

        let Some(rule) = self.rules.get(field) else {
            return;
        };

        let check = rule(&self.values[field]);
        if check.is_valid {
            self.errors.remove(field);
        } else {
            self.errors.insert(field.to_string(), check.message);
        }
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Current error message of `field`, if any.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn set_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_string(), message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Every field filled in and none showing an error.
    pub fn is_submittable(&self) -> bool {
        !self.has_errors() && self.values.values().all(|v| !v.is_empty())
    }
}

impl std::fmt::Debug for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormState")
            .field("fields", &self.values.keys().collect::<Vec<_>>())
            .field("errors", &self.errors)
            .finish()
    }
}
