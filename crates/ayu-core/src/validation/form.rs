use std::sync::LazyLock;

use regex::Regex;

use crate::error::IntakeError;
use crate::models::{FieldKind, FieldSpec, FieldValue, FormSchema, FormValues};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Names of fields whose current value fails its constraints, in schema order.
pub fn invalid_fields(schema: &FormSchema, values: &FormValues) -> Vec<String> {
    schema
        .fields()
        .iter()
        .filter(|spec| !field_is_valid(spec, values.get(&spec.name)))
        .map(|spec| spec.name.clone())
        .collect()
}

/// Structural check run before any network activity.
pub fn validate_form(schema: &FormSchema, values: &FormValues) -> Result<(), IntakeError> {
    let fields = invalid_fields(schema, values);
    if fields.is_empty() {
        Ok(())
    } else {
        Err(IntakeError::FormIncomplete { fields })
    }
}

fn field_is_valid(spec: &FieldSpec, value: Option<&FieldValue>) -> bool {
    let text = match (value, &spec.kind) {
        (Some(FieldValue::Checked(checked)), FieldKind::Checkbox) => {
            return *checked || !spec.required
        }
        (None, FieldKind::Checkbox) => return !spec.required,
        (Some(FieldValue::Text(text)), _) => text.as_str(),
        (None, _) => "",
        // Checkbox value stored on a text field or vice versa
        (Some(_), _) => return false,
    };

    // Free text is taken as typed; typed inputs are sanitized first
    let text = match spec.kind {
        FieldKind::Text | FieldKind::TextArea => text,
        _ => text.trim(),
    };

    if text.is_empty() {
        return !spec.required;
    }

    if spec
        .max_length
        .is_some_and(|max| text.chars().count() > max)
    {
        return false;
    }

    match &spec.kind {
        FieldKind::Email => EMAIL_RE.is_match(text),
        FieldKind::Number { min, max } => match text.parse::<f64>() {
            Ok(n) if n.is_finite() => {
                min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max)
            }
            _ => false,
        },
        FieldKind::Select { options } => options.iter().any(|o| o == text),
        FieldKind::Tel => text.bytes().all(|b| b.is_ascii_digit()),
        FieldKind::Text | FieldKind::TextArea | FieldKind::Checkbox => true,
    }
}
