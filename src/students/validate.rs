//! Payload validation for inbound student records.
//!
//! Requests arrive as raw JSON objects and are checked field by field so that every violation
//! in a payload is reported at once, each tagged with its location and a machine-readable type.

use super::model::{NewStudent, StudentUpdate};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

/// Upper bound accepted for `gpa`.
pub const MAX_GPA: f64 = 4.0;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    )
    .expect("email pattern compiles")
});

/// Kind of constraint a field violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Violation {
    /// Required field was absent or null.
    #[serde(rename = "missing")]
    Missing,
    /// Field was not a JSON string.
    #[serde(rename = "string_type")]
    StringType,
    /// String field was empty.
    #[serde(rename = "string_too_short")]
    StringTooShort,
    /// Email failed syntax checks.
    #[serde(rename = "value_error.email")]
    Email,
    /// Value was neither a number nor a numeric string.
    #[serde(rename = "float_type")]
    FloatType,
    /// String could not be parsed as a number.
    #[serde(rename = "float_parsing")]
    FloatParsing,
    /// Number was NaN or infinite.
    #[serde(rename = "finite_number")]
    FiniteNumber,
    /// Number exceeded its upper bound.
    #[serde(rename = "less_than_equal")]
    LessThanEqual,
    /// Body was valid JSON but not an object.
    #[serde(rename = "model_type")]
    ModelType,
    /// Body could not be read as JSON.
    #[serde(rename = "json_invalid")]
    JsonInvalid,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Location of the offending value, e.g. `["body", "gpa"]`.
    pub loc: Vec<String>,
    /// Human-readable description.
    pub msg: String,
    /// Machine-readable violation kind.
    #[serde(rename = "type")]
    pub kind: Violation,
}

impl FieldError {
    fn field(field: &str, kind: Violation, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".into(), field.into()],
            msg: msg.into(),
            kind,
        }
    }

    /// Failure attributed to the request body as a whole.
    pub fn body(kind: Violation, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".into()],
            msg: msg.into(),
            kind,
        }
    }

    /// Name of the offending field, if the failure is attributed to one.
    pub fn field_name(&self) -> Option<&str> {
        self.loc.get(1).map(String::as_str)
    }
}

/// All validation failures found in one payload.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} validation error(s) in student payload", .errors.len())]
pub struct ValidationErrors {
    /// Individual failures, in field order.
    pub errors: Vec<FieldError>,
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

/// Validate a create payload: every field is required.
pub fn validate_new_student(body: &Value) -> Result<NewStudent, ValidationErrors> {
    let object = as_object(body)?;
    let mut errors = Vec::new();

    let name = required(object, "name", &mut errors, |value| check_text("name", value));
    let email = required(object, "email", &mut errors, check_email);
    let course = required(object, "course", &mut errors, |value| {
        check_text("course", value)
    });
    let gpa = required(object, "gpa", &mut errors, check_gpa);

    match (name, email, course, gpa) {
        (Some(name), Some(email), Some(course), Some(gpa)) if errors.is_empty() => {
            Ok(NewStudent {
                name,
                email,
                course,
                gpa,
            })
        }
        _ => Err(ValidationErrors { errors }),
    }
}

/// Validate an update payload: fields are optional and `null` counts as absent.
pub fn validate_student_update(body: &Value) -> Result<StudentUpdate, ValidationErrors> {
    let object = as_object(body)?;
    let mut errors = Vec::new();

    let update = StudentUpdate {
        name: optional(object, "name", &mut errors, |value| check_text("name", value)),
        email: optional(object, "email", &mut errors, check_email),
        course: optional(object, "course", &mut errors, |value| {
            check_text("course", value)
        }),
        gpa: optional(object, "gpa", &mut errors, check_gpa),
    };

    if errors.is_empty() {
        Ok(update)
    } else {
        Err(ValidationErrors { errors })
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    body.as_object().ok_or_else(|| {
        FieldError::body(
            Violation::ModelType,
            "Input should be a valid JSON object",
        )
        .into()
    })
}

fn present<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    object.get(field).filter(|value| !value.is_null())
}

fn required<T>(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
    check: impl FnOnce(&Value) -> Result<T, FieldError>,
) -> Option<T> {
    match present(object, field) {
        Some(value) => collect(check(value), errors),
        None => {
            errors.push(FieldError::field(field, Violation::Missing, "Field required"));
            None
        }
    }
}

fn optional<T>(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
    check: impl FnOnce(&Value) -> Result<T, FieldError>,
) -> Option<T> {
    present(object, field).and_then(|value| collect(check(value), errors))
}

fn collect<T>(result: Result<T, FieldError>, errors: &mut Vec<FieldError>) -> Option<T> {
    result.map_err(|error| errors.push(error)).ok()
}

fn check_text(field: &str, value: &Value) -> Result<String, FieldError> {
    let text = value.as_str().ok_or_else(|| {
        FieldError::field(field, Violation::StringType, "Input should be a valid string")
    })?;
    if text.is_empty() {
        return Err(FieldError::field(
            field,
            Violation::StringTooShort,
            "String should have at least 1 character",
        ));
    }
    Ok(text.to_string())
}

fn check_email(value: &Value) -> Result<String, FieldError> {
    let text = value.as_str().ok_or_else(|| {
        FieldError::field("email", Violation::StringType, "Input should be a valid string")
    })?;
    let candidate = text.trim();
    let invalid = |reason: &str| {
        FieldError::field(
            "email",
            Violation::Email,
            format!("value is not a valid email address: {reason}"),
        )
    };

    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return Err(invalid("an email address must have an @-sign"));
    };
    if candidate.len() > MAX_EMAIL_LENGTH {
        return Err(invalid("the email address is too long"));
    }
    if local.len() > MAX_LOCAL_PART_LENGTH {
        return Err(invalid("the part before the @-sign is too long"));
    }
    if !EMAIL_PATTERN.is_match(candidate) {
        return Err(invalid("the email address is malformed"));
    }

    Ok(format!("{local}@{}", domain.to_ascii_lowercase()))
}

fn check_gpa(value: &Value) -> Result<f64, FieldError> {
    let gpa = match value {
        Value::Number(number) => number.as_f64().ok_or_else(|| {
            FieldError::field("gpa", Violation::FloatType, "Input should be a valid number")
        })?,
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| {
            FieldError::field(
                "gpa",
                Violation::FloatParsing,
                "Input should be a valid number, unable to parse string as a number",
            )
        })?,
        _ => {
            return Err(FieldError::field(
                "gpa",
                Violation::FloatType,
                "Input should be a valid number",
            ));
        }
    };

    if !gpa.is_finite() {
        return Err(FieldError::field(
            "gpa",
            Violation::FiniteNumber,
            "Input should be a finite number",
        ));
    }
    if gpa > MAX_GPA {
        return Err(FieldError::field(
            "gpa",
            Violation::LessThanEqual,
            format!("Input should be less than or equal to {MAX_GPA}"),
        ));
    }
    Ok(gpa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(errors: &ValidationErrors) -> Vec<(Option<&str>, Violation)> {
        errors
            .errors
            .iter()
            .map(|error| (error.field_name(), error.kind))
            .collect()
    }

    #[test]
    fn accepts_complete_record() {
        let student = validate_new_student(&json!({
            "name": "Jane Doe",
            "email": "jdoe@example.com",
            "course": "Experiments, Science, and Fashion in Nanophotonics",
            "gpa": 3.0
        }))
        .expect("valid payload");

        assert_eq!(student.name, "Jane Doe");
        assert_eq!(student.email, "jdoe@example.com");
        assert_eq!(student.gpa, 3.0);
    }

    #[test]
    fn coerces_numeric_gpa_strings() {
        let student = validate_new_student(&json!({
            "name": "Jane Doe",
            "email": "jdoe@example.com",
            "course": "Test Course",
            "gpa": "3.0"
        }))
        .expect("numeric string accepted");
        assert_eq!(student.gpa, 3.0);
    }

    #[test]
    fn reports_every_missing_field() {
        let errors = validate_new_student(&json!({})).expect_err("empty payload rejected");
        assert_eq!(
            kinds(&errors),
            vec![
                (Some("name"), Violation::Missing),
                (Some("email"), Violation::Missing),
                (Some("course"), Violation::Missing),
                (Some("gpa"), Violation::Missing),
            ]
        );
    }

    #[test]
    fn rejects_gpa_above_four() {
        let errors = validate_new_student(&json!({
            "name": "Jane Doe",
            "email": "jdoe@example.com",
            "course": "Test Course",
            "gpa": 4.01
        }))
        .expect_err("gpa above bound");
        assert_eq!(kinds(&errors), vec![(Some("gpa"), Violation::LessThanEqual)]);
    }

    #[test]
    fn allows_negative_gpa() {
        let update = validate_student_update(&json!({ "gpa": -1.0 })).expect("no lower bound");
        assert_eq!(update.gpa, Some(-1.0));
    }

    #[test]
    fn rejects_non_finite_gpa_strings() {
        let errors =
            validate_student_update(&json!({ "gpa": "NaN" })).expect_err("nan rejected");
        assert_eq!(kinds(&errors), vec![(Some("gpa"), Violation::FiniteNumber)]);

        let errors =
            validate_student_update(&json!({ "gpa": "three" })).expect_err("text rejected");
        assert_eq!(kinds(&errors), vec![(Some("gpa"), Violation::FloatParsing)]);
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in [
            "plainaddress",
            "@example.com",
            "jdoe@",
            "jdoe@example",
            "jdoe@@example.com",
            "j doe@example.com",
            "jdoe@-example.com",
            "jdoe..x@example.com",
        ] {
            let errors = validate_new_student(&json!({
                "name": "Jane Doe",
                "email": email,
                "course": "Test Course",
                "gpa": 3.0
            }))
            .expect_err(email);
            assert_eq!(kinds(&errors), vec![(Some("email"), Violation::Email)], "{email}");
        }
    }

    #[test]
    fn lowercases_email_domain_only() {
        let update = validate_student_update(&json!({ "email": "J.Doe@Example.COM" }))
            .expect("valid email");
        assert_eq!(update.email.as_deref(), Some("J.Doe@example.com"));
    }

    #[test]
    fn accepts_whitespace_text_but_rejects_empty_and_non_string() {
        let update = validate_student_update(&json!({ "name": "   " }))
            .expect("whitespace is a non-empty string");
        assert_eq!(update.name.as_deref(), Some("   "));

        let errors = validate_student_update(&json!({ "name": "", "course": 12 }))
            .expect_err("bad text fields");
        assert_eq!(
            kinds(&errors),
            vec![
                (Some("name"), Violation::StringTooShort),
                (Some("course"), Violation::StringType),
            ]
        );
    }

    #[test]
    fn update_ignores_nulls_and_unknown_keys() {
        let update = validate_student_update(&json!({
            "name": null,
            "email": "new@example.com",
            "nickname": "JD"
        }))
        .expect("valid update");
        assert_eq!(
            update,
            StudentUpdate {
                email: Some("new@example.com".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn rejects_non_object_bodies() {
        let errors = validate_student_update(&json!(["name"])).expect_err("array body");
        assert_eq!(kinds(&errors), vec![(None, Violation::ModelType)]);
    }

    #[test]
    fn field_errors_serialize_with_location() {
        let error = FieldError::field("gpa", Violation::LessThanEqual, "too high");
        let json = serde_json::to_value(&error).expect("serialize");
        assert_eq!(
            json,
            json!({ "loc": ["body", "gpa"], "msg": "too high", "type": "less_than_equal" })
        );
    }
}
