//! Request body validation for the todo resource.
//!
//! Bodies arrive as arbitrary JSON values. Validation checks every field and
//! collects all problems instead of stopping at the first, so a client can
//! show each message next to the field it belongs to.

use crate::types::{NewTodo, TodoChanges};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Longest accepted todo text, in characters, after trimming
pub const MAX_TEXT_LEN: usize = 100;

const TEXT_REQUIRED: &str = "Todo text is required";
const TEXT_TOO_LONG: &str = "Todo text is too long";
const EXPECTED_STRING: &str = "Expected string";
const EXPECTED_BOOLEAN: &str = "Expected boolean";
const EXPECTED_OBJECT: &str = "Expected object";

/// Field-level validation failures
///
/// Serializes as `{"_errors": [...], "<field>": [...]}`; the `_errors` list
/// holds problems with the body as a whole and is omitted when empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    form_errors: Vec<String>,
    field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty error set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem with the body as a whole
    pub fn add_form_error(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    /// Records a problem with one field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns true when nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Messages recorded for `field`
    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.field_errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Messages about the body as a whole
    #[must_use]
    pub fn form_errors(&self) -> &[String] {
        &self.form_errors
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        let form = self.form_errors.iter().map(|m| (None, m));
        let fields = self
            .field_errors
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| (Some(field), m)));

        for (field, message) in form.chain(fields) {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            match field {
                Some(field) => write!(f, "{field}: {message}")?,
                None => write!(f, "{message}")?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let root = usize::from(!self.form_errors.is_empty());
        let mut map = serializer.serialize_map(Some(root + self.field_errors.len()))?;
        if !self.form_errors.is_empty() {
            map.serialize_entry("_errors", &self.form_errors)?;
        }
        for (field, messages) in &self.field_errors {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

/// Validates a create body: `{"text": string, "completed"?: bool}`
///
/// # Errors
///
/// Returns every problem found when the body is not an object, `text` is
/// missing, not a string, blank or too long, or `completed` is not a boolean.
pub fn validate_new_todo(body: &Value) -> Result<NewTodo, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(fields) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    let text = match fields.get("text") {
        None => {
            errors.add("text", TEXT_REQUIRED);
            None
        },
        Some(value) => check_text(value, &mut errors),
    };
    let completed = check_completed(fields, &mut errors);

    errors.into_result(NewTodo {
        text: text.unwrap_or_default(),
        completed: completed.unwrap_or(false),
    })
}

/// Validates an update body: `{"text"?: string, "completed"?: bool}`
///
/// Absent fields stay `None`. Keys other than `text` and `completed` are
/// ignored, so the `id` sent alongside is not inspected here.
///
/// # Errors
///
/// Same rules as [`validate_new_todo`], except that `text` may be omitted.
pub fn validate_changes(body: &Value) -> Result<TodoChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(fields) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    let text = fields
        .get("text")
        .and_then(|value| check_text(value, &mut errors));
    let completed = check_completed(fields, &mut errors);

    errors.into_result(TodoChanges { text, completed })
}

fn as_object<'a>(body: &'a Value, errors: &mut ValidationErrors) -> Option<&'a Map<String, Value>> {
    let object = body.as_object();
    if object.is_none() {
        errors.add_form_error(EXPECTED_OBJECT);
    }
    object
}

fn check_text(value: &Value, errors: &mut ValidationErrors) -> Option<String> {
    let Some(raw) = value.as_str() else {
        errors.add("text", EXPECTED_STRING);
        return None;
    };

    let text = raw.trim();
    if text.is_empty() {
        errors.add("text", TEXT_REQUIRED);
        None
    } else if text.chars().count() > MAX_TEXT_LEN {
        errors.add("text", TEXT_TOO_LONG);
        None
    } else {
        Some(text.to_owned())
    }
}

fn check_completed(fields: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<bool> {
    let value = fields.get("completed")?;
    let completed = value.as_bool();
    if completed.is_none() {
        errors.add("completed", EXPECTED_BOOLEAN);
    }
    completed
}
