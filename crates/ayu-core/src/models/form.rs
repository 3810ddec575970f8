use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_PHONE_DIGITS, PHOTO_COUNT_FIELD, REPORT_COUNT_FIELD, SUBMISSION_TIME_FIELD,
};
use crate::error::IntakeError;
use crate::models::FileCategory;

/// Input control type of a non-file form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Email,
    Tel,
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    Select {
        options: Vec<String>,
    },
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl FieldSpec {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            default: None,
            max_length: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    fn default_value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Checkbox => FieldValue::Checked(
                self.default
                    .as_deref()
                    .map(|d| d.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            ),
            _ => FieldValue::Text(self.default.clone().unwrap_or_default()),
        }
    }
}

/// Ordered set of non-file fields. Names are unique and never collide with
/// the file or metadata names of the submission payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, IntakeError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(IntakeError::InvalidSchema(
                    "field name must not be empty".to_string(),
                ));
            }
            if is_reserved_name(&field.name) {
                return Err(IntakeError::InvalidSchema(format!(
                    "field name '{}' is reserved for the submission payload",
                    field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(IntakeError::InvalidSchema(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }
        Ok(Self { fields })
    }

    /// Patient intake fields accepted by the submission endpoint.
    pub fn patient_intake() -> Self {
        let genders = options(&["male", "female", "other", "prefer-not-to-say"]);
        let blood_groups = options(&["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-", "unknown"]);
        let severities = options(&["mild", "moderate", "severe", "critical"]);

        let fields = vec![
            FieldSpec::new("fullName", "Full name", FieldKind::Text)
                .required()
                .with_max_length(100),
            FieldSpec::new(
                "age",
                "Age",
                FieldKind::Number {
                    min: Some(0.0),
                    max: Some(150.0),
                },
            )
            .required(),
            FieldSpec::new("gender", "Gender", FieldKind::Select { options: genders }).required(),
            FieldSpec::new("phone", "Phone number", FieldKind::Tel).required(),
            FieldSpec::new("email", "Email", FieldKind::Email),
            FieldSpec::new(
                "bloodGroup",
                "Blood group",
                FieldKind::Select {
                    options: blood_groups,
                },
            ),
            FieldSpec::new("allergies", "Known allergies", FieldKind::TextArea),
            FieldSpec::new("medications", "Current medications", FieldKind::TextArea),
            FieldSpec::new(
                "medicalConditions",
                "Existing medical conditions",
                FieldKind::TextArea,
            ),
            FieldSpec::new("chiefComplaint", "Chief complaint", FieldKind::Text)
                .required()
                .with_max_length(200),
            FieldSpec::new("symptoms", "Symptoms", FieldKind::TextArea).required(),
            FieldSpec::new("duration", "Duration of symptoms", FieldKind::Text),
            FieldSpec::new(
                "severity",
                "Severity",
                FieldKind::Select {
                    options: severities,
                },
            )
            .required(),
            FieldSpec::new("affectedBodyPart", "Affected body part", FieldKind::Text),
            FieldSpec::new(
                "temperature",
                "Temperature (°F)",
                FieldKind::Number {
                    min: Some(90.0),
                    max: Some(110.0),
                },
            ),
            FieldSpec::new(
                "heartRate",
                "Heart rate (bpm)",
                FieldKind::Number {
                    min: Some(20.0),
                    max: Some(250.0),
                },
            ),
            FieldSpec::new("bloodPressure", "Blood pressure", FieldKind::Text),
            FieldSpec::new(
                "oxygenLevel",
                "Oxygen saturation (%)",
                FieldKind::Number {
                    min: Some(50.0),
                    max: Some(100.0),
                },
            ),
            FieldSpec::new("additionalNotes", "Additional notes", FieldKind::TextArea),
            FieldSpec::new(
                "emergencyConsent",
                "I understand this is not an emergency service",
                FieldKind::Checkbox,
            )
            .required(),
            FieldSpec::new(
                "dataConsent",
                "I consent to sharing this information",
                FieldKind::Checkbox,
            )
            .required(),
        ];

        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fresh values holding each field's default.
    pub fn default_values(&self) -> FormValues {
        FormValues {
            values: self
                .fields
                .iter()
                .map(|f| (f.name.clone(), f.default_value()))
                .collect(),
        }
    }
}

fn options(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn is_reserved_name(name: &str) -> bool {
    if [SUBMISSION_TIME_FIELD, PHOTO_COUNT_FIELD, REPORT_COUNT_FIELD].contains(&name) {
        return true;
    }
    [FileCategory::Photo, FileCategory::Report]
        .iter()
        .any(|category| {
            name.strip_prefix(category.field_prefix())
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

impl FieldValue {
    /// Wire encoding: checkboxes become the literal `"true"`/`"false"`.
    pub fn encode(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Checked(checked) => checked.to_string(),
        }
    }
}

/// Current values of the non-file fields, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    values: Vec<(String, FieldValue)>,
}

impl FormValues {
    /// Set a text-like field. Tel fields keep digits only, capped at 15.
    pub fn set_text(
        &mut self,
        schema: &FormSchema,
        name: &str,
        value: &str,
    ) -> Result<(), IntakeError> {
        let spec = schema
            .field(name)
            .ok_or_else(|| IntakeError::InvalidInput(format!("unknown field '{}'", name)))?;

        let value = match spec.kind {
            FieldKind::Checkbox => {
                return Err(IntakeError::InvalidInput(format!(
                    "field '{}' is a checkbox",
                    name
                )))
            }
            FieldKind::Tel => normalize_phone(value),
            _ => value.to_string(),
        };

        self.put(name, FieldValue::Text(value));
        Ok(())
    }

    pub fn set_checked(
        &mut self,
        schema: &FormSchema,
        name: &str,
        checked: bool,
    ) -> Result<(), IntakeError> {
        match schema.field(name).map(|f| &f.kind) {
            Some(FieldKind::Checkbox) => {
                self.put(name, FieldValue::Checked(checked));
                Ok(())
            }
            Some(_) => Err(IntakeError::InvalidInput(format!(
                "field '{}' is not a checkbox",
                name
            ))),
            None => Err(IntakeError::InvalidInput(format!("unknown field '{}'", name))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Restore every field to its schema default.
    pub fn reset(&mut self, schema: &FormSchema) {
        *self = schema.default_values();
    }

    fn put(&mut self, name: &str, value: FieldValue) {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name.to_string(), value)),
        }
    }
}

/// Strip everything but digits and cap the length.
pub fn normalize_phone(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_PHONE_DIGITS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_schema_has_unique_names() {
        let schema = FormSchema::patient_intake();
        assert!(FormSchema::new(schema.fields().to_vec()).is_ok());
        assert_eq!(schema.fields().len(), 21);
    }

    #[test]
    fn schema_rejects_duplicates() {
        let result = FormSchema::new(vec![
            FieldSpec::new("name", "Name", FieldKind::Text),
            FieldSpec::new("name", "Name again", FieldKind::Text),
        ]);
        assert!(matches!(result, Err(IntakeError::InvalidSchema(_))));
    }

    #[test]
    fn schema_rejects_reserved_payload_names() {
        for name in ["photo_0", "report_12", "submissionTime", "photoCount"] {
            let result = FormSchema::new(vec![FieldSpec::new(name, "x", FieldKind::Text)]);
            assert!(result.is_err(), "{} should be reserved", name);
        }
        // Only the exact indexed form is reserved
        assert!(FormSchema::new(vec![FieldSpec::new("photo_notes", "x", FieldKind::Text)]).is_ok());
    }

    #[test]
    fn phone_keeps_digits_only() {
        assert_eq!(normalize_phone("+91 (987) 654-3210"), "919876543210");
        assert_eq!(normalize_phone("12345678901234567890"), "123456789012345");
        assert_eq!(normalize_phone("abc"), "");
    }

    #[test]
    fn set_text_normalizes_tel_fields() {
        let schema = FormSchema::patient_intake();
        let mut values = schema.default_values();
        values.set_text(&schema, "phone", "98-76 54").unwrap();
        assert_eq!(values.get("phone"), Some(&FieldValue::Text("987654".to_string())));
    }

    #[test]
    fn set_rejects_unknown_and_mismatched_fields() {
        let schema = FormSchema::patient_intake();
        let mut values = schema.default_values();
        assert!(values.set_text(&schema, "nope", "x").is_err());
        assert!(values.set_text(&schema, "dataConsent", "yes").is_err());
        assert!(values.set_checked(&schema, "fullName", true).is_err());
    }

    #[test]
    fn reset_restores_defaults() {
        let schema = FormSchema::new(vec![
            FieldSpec::new("name", "Name", FieldKind::Text).with_default("anon"),
            FieldSpec::new("agree", "Agree", FieldKind::Checkbox),
        ])
        .unwrap();
        let mut values = schema.default_values();
        values.set_text(&schema, "name", "Asha").unwrap();
        values.set_checked(&schema, "agree", true).unwrap();

        values.reset(&schema);
        assert_eq!(values.get("name"), Some(&FieldValue::Text("anon".to_string())));
        assert_eq!(values.get("agree"), Some(&FieldValue::Checked(false)));
    }

    #[test]
    fn checkbox_encodes_as_literal_bool() {
        assert_eq!(FieldValue::Checked(true).encode(), "true");
        assert_eq!(FieldValue::Checked(false).encode(), "false");
    }
}
