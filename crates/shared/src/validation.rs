//! Field rules for koder records.
//!
//! Rules are checked in a fixed order (required, minimum length, maximum
//! length, pattern) and only the first failure is reported, so every field
//! shows at most one message. Lengths count chars, not bytes.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    domain::NewKoder,
    error::{ApiException, ErrorCode},
};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\S+@\S+$").expect("email pattern is a valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
}

impl Field {
    /// Form order; the first entry receives focus after a reset.
    pub const ALL: [Field; 3] = [Field::FirstName, Field::LastName, Field::Email];

    pub fn key(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "Name",
            Field::LastName => "Last Name",
            Field::Email => "Email",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::FirstName => "Type your name",
            Field::LastName => "Type your last name",
            Field::Email => "Type your email",
        }
    }

    pub fn rules(self) -> FieldRules {
        match self {
            Field::FirstName | Field::LastName => FieldRules {
                min_len: 2,
                max_len: 20,
                email_pattern: false,
            },
            Field::Email => FieldRules {
                min_len: 5,
                max_len: 50,
                email_pattern: true,
            },
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Every field is required; only the bounds and the pattern differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRules {
    pub min_len: usize,
    pub max_len: usize,
    pub email_pattern: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    Required,
    TooShort,
    TooLong,
    InvalidEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub violation: Violation,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        match (self.violation, self.field) {
            (Violation::Required, _) => "This field is required",
            (Violation::TooShort, Field::FirstName) => "The name is too short",
            (Violation::TooShort, Field::LastName) => "The last name is too short",
            (Violation::TooShort, Field::Email) => "The email is too short",
            (Violation::TooLong, Field::FirstName) => "The name is too long",
            (Violation::TooLong, Field::LastName) => "The last name is too long",
            (Violation::TooLong, Field::Email) => "The email is too long",
            (Violation::InvalidEmail, _) => "Invalid email",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub fn validate_field(field: Field, value: &str) -> Result<(), FieldError> {
    let rules = field.rules();
    let fail = |violation| Err(FieldError { field, violation });

    if value.is_empty() {
        return fail(Violation::Required);
    }
    let len = value.chars().count();
    if len < rules.min_len {
        return fail(Violation::TooShort);
    }
    if len > rules.max_len {
        return fail(Violation::TooLong);
    }
    if rules.email_pattern && !EMAIL_PATTERN.is_match(value) {
        return fail(Violation::InvalidEmail);
    }
    Ok(())
}

pub fn field_value(koder: &NewKoder, field: Field) -> &str {
    match field {
        Field::FirstName => &koder.first_name,
        Field::LastName => &koder.last_name,
        Field::Email => &koder.email,
    }
}

/// All failing fields of a payload, in form order.
pub fn validate_new_koder(koder: &NewKoder) -> Vec<FieldError> {
    Field::ALL
        .into_iter()
        .filter_map(|field| validate_field(field, field_value(koder, field)).err())
        .collect()
}

/// Server-side gate: rejects a payload with the first failing field.
pub fn ensure_valid_new_koder(koder: &NewKoder) -> Result<(), ApiException> {
    match validate_new_koder(koder).first() {
        Some(error) => Err(ApiException::new(
            ErrorCode::Validation,
            format!("{}: {}", error.field, error.message()),
        )),
        None => Ok(()),
    }
}
