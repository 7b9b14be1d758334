//! Validation rules for contact form submissions.
//!
//! The same [`CONTACT_SCHEMA`] is evaluated by the client while the user edits
//! the form and by the server on every submission.

use std::{borrow::Cow, fmt::Write as _, sync::LazyLock};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    contact::{ContactMessage, ContactName, ContactSubject, ContactSubmission},
    email_address::EmailAddress,
};

pub static CONTACT_SCHEMA: ContactSchema = ContactSchema {
    version: 1,
    fields: &[
        FieldSchema {
            field: ContactField::Name,
            rules: &[
                Rule::MinChars {
                    min: 2,
                    message: "Name must be at least 2 characters.",
                },
                Rule::MaxChars {
                    max: 256,
                    message: "Name must be at most 256 characters.",
                },
            ],
        },
        FieldSchema {
            field: ContactField::Email,
            rules: &[Rule::Email {
                message: "Please enter a valid email address.",
            }],
        },
        FieldSchema {
            field: ContactField::Subject,
            rules: &[
                Rule::MinChars {
                    min: 5,
                    message: "Subject must be at least 5 characters.",
                },
                Rule::MaxChars {
                    max: 256,
                    message: "Subject must be at most 256 characters.",
                },
            ],
        },
        FieldSchema {
            field: ContactField::Message,
            rules: &[
                Rule::MinChars {
                    min: 10,
                    message: "Message must be at least 10 characters.",
                },
                Rule::MaxChars {
                    max: 4096,
                    message: "Message must be at most 4096 characters.",
                },
            ],
        },
    ],
};

/// Dot-atom local part and a dotted domain name ending in an alphabetic top
/// level domain. Quoted local parts and address literals are not accepted.
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$",
    )
    .unwrap()
});

#[derive(Debug)]
pub struct ContactSchema {
    /// Incremented whenever a rule changes in a way that could reject
    /// previously accepted input.
    pub version: u32,
    pub fields: &'static [FieldSchema],
}

#[derive(Debug)]
pub struct FieldSchema {
    pub field: ContactField,
    pub rules: &'static [Rule],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// At least `min` characters (unicode scalar values).
    MinChars { min: usize, message: &'static str },
    /// At most `max` characters (unicode scalar values).
    MaxChars { max: usize, message: &'static str },
    /// A syntactically valid email address.
    Email { message: &'static str },
}

impl Rule {
    pub fn is_satisfied_by(&self, value: &str) -> bool {
        match *self {
            Rule::MinChars { min, .. } => value.chars().count() >= min,
            Rule::MaxChars { max, .. } => value.chars().count() <= max,
            Rule::Email { .. } => is_email(value),
        }
    }

    pub fn message(&self) -> &'static str {
        match *self {
            Rule::MinChars { message, .. }
            | Rule::MaxChars { message, .. }
            | Rule::Email { message } => message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl ContactField {
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Subject, Self::Message];

    /// The key of this field in a submission object.
    pub fn path(self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Subject => "subject",
            ContactField::Message => "message",
        }
    }
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// `None` if the input as a whole is malformed.
    pub field: Option<ContactField>,
    pub message: Cow<'static, str>,
}

impl Violation {
    fn new(field: ContactField, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }
}

/// Every rule a submission violated, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn for_field(&self, field: ContactField) -> impl Iterator<Item = &Violation> + '_ {
        self.violations
            .iter()
            .filter(move |v| v.field == Some(field))
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::from("Validation error: ");
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                out.push_str("; ");
            }
            out.push_str(&violation.message);
            if let Some(field) = violation.field {
                write!(&mut out, " at \"{field}\"")?;
            }
        }
        f.write_str(&out)
    }
}

impl ContactSchema {
    pub fn field(&self, field: ContactField) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.field == field)
    }

    /// Return the violations of a single field value.
    pub fn check_field(&self, field: ContactField, value: &str) -> Vec<Violation> {
        self.field(field)
            .map(|schema| schema.check(value))
            .unwrap_or_default()
    }

    /// Validate an untrusted submission.
    ///
    /// Keys not described by the schema are ignored.
    pub fn validate(&self, input: &Value) -> Result<ContactSubmission, ValidationError> {
        let Value::Object(object) = input else {
            return Err(ValidationError {
                violations: vec![Violation {
                    field: None,
                    message: format!("Expected object, received {}", type_name(input)).into(),
                }],
            });
        };

        let violations = self
            .fields
            .iter()
            .flat_map(|schema| match object.get(schema.field.path()) {
                None => vec![Violation::new(schema.field, "Required")],
                Some(Value::String(value)) => schema.check(value),
                Some(other) => vec![Violation::new(
                    schema.field,
                    format!("Expected string, received {}", type_name(other)),
                )],
            })
            .collect::<Vec<_>>();

        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }

        build_submission(object).map_err(|violation| ValidationError {
            violations: vec![violation],
        })
    }
}

impl FieldSchema {
    pub fn check(&self, value: &str) -> Vec<Violation> {
        self.rules
            .iter()
            .filter(|rule| !rule.is_satisfied_by(value))
            .map(|rule| Violation::new(self.field, rule.message()))
            .collect()
    }
}

fn build_submission(object: &Map<String, Value>) -> Result<ContactSubmission, Violation> {
    let text = |field: ContactField| {
        object
            .get(field.path())
            .and_then(Value::as_str)
            .unwrap_or_default()
    };

    Ok(ContactSubmission {
        name: ContactName::try_new(text(ContactField::Name))
            .map_err(|err| invalid(ContactField::Name, err))?,
        email: text(ContactField::Email)
            .parse::<EmailAddress>()
            .map_err(|err| invalid(ContactField::Email, err))?,
        subject: ContactSubject::try_new(text(ContactField::Subject))
            .map_err(|err| invalid(ContactField::Subject, err))?,
        message: ContactMessage::try_new(text(ContactField::Message))
            .map_err(|err| invalid(ContactField::Message, err))?,
    })
}

fn is_email(value: &str) -> bool {
    !value.starts_with('.')
        && !value.contains("..")
        && EMAIL_REGEX.is_match(value)
        && value.parse::<EmailAddress>().is_ok()
}

fn invalid(field: ContactField, err: impl std::fmt::Display) -> Violation {
    Violation::new(field, err.to_string())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn valid_submission() {
        let result = CONTACT_SCHEMA
            .validate(&json!({
                "name": "Al",
                "email": "a@b.com",
                "subject": "Hello there",
                "message": "This is a test message.",
                "unknown": 42,
            }))
            .unwrap();

        assert_eq!(*result.name, "Al");
        assert_eq!(result.email.as_str(), "a@b.com");
        assert_eq!(*result.subject, "Hello there");
        assert_eq!(*result.message, "This is a test message.");
    }

    #[test]
    fn reports_every_violation() {
        let err = CONTACT_SCHEMA
            .validate(&json!({
                "name": "A",
                "email": "a@b.com",
                "subject": "Hi",
                "message": "short",
            }))
            .unwrap_err();

        let fields = err
            .violations
            .iter()
            .map(|v| v.field)
            .collect::<Vec<_>>();
        assert_eq!(
            fields,
            [
                Some(ContactField::Name),
                Some(ContactField::Subject),
                Some(ContactField::Message)
            ]
        );
        assert_eq!(
            err.to_string(),
            "Validation error: Name must be at least 2 characters. at \"name\"; Subject must be \
             at least 5 characters. at \"subject\"; Message must be at least 10 characters. at \
             \"message\""
        );
    }

    #[test]
    fn missing_and_mistyped_fields() {
        let err = CONTACT_SCHEMA
            .validate(&json!({
                "name": 17,
                "email": null,
                "subject": "Hello there",
            }))
            .unwrap_err();

        assert_eq!(
            err.violations,
            [
                Violation::new(ContactField::Name, "Expected string, received number"),
                Violation::new(ContactField::Email, "Expected string, received null"),
                Violation::new(ContactField::Message, "Required"),
            ]
        );
    }

    #[test]
    fn not_an_object() {
        let err = CONTACT_SCHEMA.validate(&json!(["Al"])).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Expected object, received array");
    }

    #[test]
    fn check_field() {
        assert!(CONTACT_SCHEMA
            .check_field(ContactField::Email, "a@b.com")
            .is_empty());
        assert_eq!(
            CONTACT_SCHEMA.check_field(ContactField::Email, "not an email"),
            [Violation::new(
                ContactField::Email,
                "Please enter a valid email address."
            )]
        );
        assert_eq!(
            CONTACT_SCHEMA.check_field(ContactField::Message, &"x".repeat(4097)),
            [Violation::new(
                ContactField::Message,
                "Message must be at most 4096 characters."
            )]
        );
    }

    #[test]
    fn email_requires_dotted_domain() {
        for email in [
            "a@b.com",
            "max.mustermann@example.de",
            "o'brien+contact@mail.example.co.uk",
            "first-last@sub-domain.example.org",
        ] {
            assert!(
                CONTACT_SCHEMA.check_field(ContactField::Email, email).is_empty(),
                "{email}"
            );
        }

        for email in [
            "a@b",
            "user@localhost",
            "a@[127.0.0.1]",
            "a@127.0.0.1",
            "\"a b\"@c.com",
            "\"a\"@c.com",
            ".a@b.com",
            "a..b@c.com",
            "a.@b.com",
            "a@b.c",
            "a@b.c0m",
            "a@-b.com",
            "a@b..com",
            "@b.com",
        ] {
            assert_eq!(
                CONTACT_SCHEMA.check_field(ContactField::Email, email),
                [Violation::new(
                    ContactField::Email,
                    "Please enter a valid email address."
                )],
                "{email}"
            );
        }
    }

    #[test]
    fn lengths_count_characters() {
        assert!(CONTACT_SCHEMA.check_field(ContactField::Name, "Jö").is_empty());
        assert_eq!(CONTACT_SCHEMA.check_field(ContactField::Name, "ö").len(), 1);
    }

    #[test]
    fn schema_matches_model_invariants() {
        for (name, ok) in [("A", false), ("Al", true), (&*"x".repeat(257), false)] {
            assert_eq!(ContactName::try_new(name).is_ok(), ok);
            assert_eq!(CONTACT_SCHEMA.check_field(ContactField::Name, name).is_empty(), ok);
        }
    }
}
