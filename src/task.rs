//! The Task entity and the form-field schema shared by create and update.
//!
//! The schema is declared once as [`FORM_FIELDS`]; validation and form
//! rendering both iterate it, so the two write paths cannot drift apart.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum length of a task title, in characters.
pub const TITLE_MAX: usize = 100;
/// Maximum length of a task description, in characters.
pub const DESCRIPTION_MAX: usize = 1000;
/// Maximum length of the tags field, in characters.
pub const TAGS_MAX: usize = 200;

/// A single to-do item, the only persisted entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Store-assigned identifier, immutable for the task's lifetime.
    pub id: i64,
    /// Set once at creation, never updated.
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    /// Free-form text, empty when unset.
    pub tags: String,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// The mutable fields of a task. Everything except `id` and `created_at`
/// is replaced wholesale on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub tags: String,
}

impl TaskFields {
    /// Check the required/length constraints against the form schema.
    ///
    /// Runs inside the store before any write, and again in the handlers
    /// when re-rendering a submitted form.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        for spec in FORM_FIELDS {
            let value = match spec.name {
                "title" => self.title.as_str(),
                "description" => self.description.as_str(),
                "tags" => self.tags.as_str(),
                // due_date is already typed; nothing left to check
                _ => continue,
            };
            spec.check(value, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Widget drawn for a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    MultiLine,
    Date,
}

/// One entry in the shared form schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Form field name, also the key in [`FieldErrors`].
    pub name: &'static str,
    /// Human-readable label shown next to the widget.
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Maximum length in characters, if bounded.
    pub max_len: Option<usize>,
}

/// The fields of the create/update form, in display order.
pub const FORM_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "title",
        label: "Title",
        kind: FieldKind::Text,
        required: true,
        max_len: Some(TITLE_MAX),
    },
    FieldSpec {
        name: "description",
        label: "Description",
        kind: FieldKind::MultiLine,
        required: true,
        max_len: Some(DESCRIPTION_MAX),
    },
    FieldSpec {
        name: "due_date",
        label: "Due date",
        kind: FieldKind::Date,
        required: false,
        max_len: None,
    },
    FieldSpec {
        name: "tags",
        label: "Tags",
        kind: FieldKind::Text,
        required: false,
        max_len: Some(TAGS_MAX),
    },
];

impl FieldSpec {
    /// Validate a raw value against this spec, recording any message.
    pub fn check(&self, value: &str, errors: &mut FieldErrors) {
        if self.required && value.trim().is_empty() {
            errors.insert(self.name, "This field is required.");
            return;
        }
        if let Some(max) = self.max_len {
            let len = value.chars().count();
            if len > max {
                errors.insert(
                    self.name,
                    format!("Must be at most {} characters (got {}).", max, len),
                );
            }
        }
    }
}

/// Per-field validation messages, keyed by field name.
///
/// A `BTreeMap` keeps iteration order stable, so error listings render
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for a field, if it failed validation.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: &'static str, message: impl Into<String>) {
        self.0.insert(name, message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(name, msg)| (*name, msg.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", name, message)?;
            first = false;
        }
        Ok(())
    }
}
