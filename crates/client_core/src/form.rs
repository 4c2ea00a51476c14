//! Form state for a new koder: field values, inline errors, submit gating and
//! focus.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Deserialize;
use shared::{
    domain::NewKoder,
    validation::{validate_field, Field, FieldError},
};

/// When the submit control is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPolicy {
    /// Enabled until the first submit attempt; after that, disabled while any
    /// field is invalid.
    #[default]
    LenientUntilFirstSubmit,
    /// Disabled whenever any field is invalid.
    AlwaysValidate,
}

impl FromStr for SubmitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" | "lenient_until_first_submit" => Ok(Self::LenientUntilFirstSubmit),
            "always" | "always_validate" => Ok(Self::AlwaysValidate),
            other => Err(format!(
                "unknown submit policy '{other}' (expected 'lenient' or 'always')"
            )),
        }
    }
}

impl fmt::Display for SubmitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LenientUntilFirstSubmit => "lenient",
            Self::AlwaysValidate => "always",
        })
    }
}

#[derive(Debug, Clone)]
pub struct KoderForm {
    values: BTreeMap<Field, String>,
    errors: BTreeMap<Field, FieldError>,
    submitted: bool,
    focus: Option<Field>,
    policy: SubmitPolicy,
}

impl KoderForm {
    pub fn new(policy: SubmitPolicy) -> Self {
        Self {
            values: BTreeMap::new(),
            errors: BTreeMap::new(),
            submitted: false,
            focus: Some(Field::ALL[0]),
            policy,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<FieldError> {
        self.errors.values().copied().collect()
    }

    /// Stores the new value and re-checks that field only.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Option<FieldError> {
        let value = value.into();
        let result = validate_field(field, &value).err();
        self.values.insert(field, value);
        self.focus = Some(field);
        self.record(field, result);
        result
    }

    /// Re-checks every field and refreshes the inline errors.
    pub fn validate_all(&mut self) -> bool {
        for field in Field::ALL {
            let result = validate_field(field, self.value(field)).err();
            self.record(field, result);
        }
        self.errors.is_empty()
    }

    pub fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    /// True when every current value passes, whether or not errors are shown yet.
    pub fn is_valid(&self) -> bool {
        Field::ALL
            .into_iter()
            .all(|field| validate_field(field, self.value(field)).is_ok())
    }

    pub fn submit_enabled(&self) -> bool {
        match self.policy {
            SubmitPolicy::LenientUntilFirstSubmit => !self.submitted || self.is_valid(),
            SubmitPolicy::AlwaysValidate => self.is_valid(),
        }
    }

    /// Clears values, errors and the submitted flag, and moves focus to the
    /// first field.
    pub fn reset(&mut self) {
        self.values.clear();
        self.errors.clear();
        self.submitted = false;
        self.focus = Some(Field::ALL[0]);
    }

    pub fn to_new_koder(&self) -> NewKoder {
        NewKoder::new(
            self.value(Field::FirstName),
            self.value(Field::LastName),
            self.value(Field::Email),
        )
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            values: self.to_new_koder(),
            errors: self.errors.clone(),
            submitted: self.submitted,
            submit_enabled: self.submit_enabled(),
            all_valid: self.is_valid(),
            focus: self.focus,
        }
    }

    fn record(&mut self, field: Field, result: Option<FieldError>) {
        match result {
            Some(err) => {
                self.errors.insert(field, err);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }
}

impl Default for KoderForm {
    fn default() -> Self {
        Self::new(SubmitPolicy::default())
    }
}

/// Read-only copy of the form handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub values: NewKoder,
    pub errors: BTreeMap<Field, FieldError>,
    pub submitted: bool,
    pub submit_enabled: bool,
    pub all_valid: bool,
    pub focus: Option<Field>,
}

impl FormSnapshot {
    pub fn value(&self, field: Field) -> &str {
        shared::validation::field_value(&self.values, field)
    }

    pub fn error_message(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).map(FieldError::message)
    }
}
