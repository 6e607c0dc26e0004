//! Field-level and cross-field validation rules.
//!
//! Per-field rules run in a fixed precedence and the first failing rule wins:
//!
//! | # | Rule            | Applies to |
//! |---|-----------------|------------|
//! | 1 | required-empty  | required fields (checkbox: unchecked counts as empty) |
//! | 2 | email format    | non-empty email fields |
//! | 3 | phone format    | non-empty tel fields |
//! | 4 | future date     | the incident date only |
//!
//! The survey-before-incident rule compares two fields and only runs as part
//! of whole-form validation.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{FieldKind, FieldSpec, FieldValue, field_ids};
use crate::surface::FormSurface;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?\(?[0-9\s\-()]{10,}$").expect("phone pattern is valid")
});

/// User-input validation failures. The display text is the message shown
/// next to the offending field.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("This field is required.")]
    RequiredFieldEmpty,

    #[error("Please enter a valid email address.")]
    InvalidEmailFormat,

    #[error("Please enter a valid phone number.")]
    InvalidPhoneFormat,

    #[error("Incident date cannot be in the future.")]
    FutureIncidentDate,

    #[error("Survey date cannot be before incident date.")]
    SurveyBeforeIncident,
}

/// A validation failure bound to the field it is shown on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field_id: String,
    pub error: ValidationError,
}

impl FieldError {
    pub fn new(
        field_id: impl Into<String>,
        error: ValidationError,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            error,
        }
    }
}

/// Parses a date field value (`YYYY-MM-DD`).
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

pub fn is_valid_email(input: &str) -> bool {
    EMAIL_PATTERN.is_match(input)
}

pub fn is_valid_phone(input: &str) -> bool {
    PHONE_PATTERN.is_match(input)
}

/// Runs the per-field rules against `value`.
pub fn validate_field(
    spec: &FieldSpec,
    value: &FieldValue,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if spec.required && !value.is_filled() {
        return Err(ValidationError::RequiredFieldEmpty);
    }

    let text = value.as_text();
    if text.is_empty() {
        return Ok(());
    }

    match spec.kind {
        FieldKind::Email if !is_valid_email(text) => Err(ValidationError::InvalidEmailFormat),
        FieldKind::Tel if !is_valid_phone(text) => Err(ValidationError::InvalidPhoneFormat),
        FieldKind::Date if spec.id == field_ids::DATE_OF_INCIDENT => {
            match parse_date(text) {
                Some(date) if date > today => Err(ValidationError::FutureIncidentDate),
                _ => Ok(()),
            }
        }
        _ => Ok(()),
    }
}

/// Survey date must not precede the incident date. Missing or unparseable
/// dates are not compared.
pub fn validate_survey_after_incident(
    incident: &str,
    survey: &str,
) -> Result<(), ValidationError> {
    match (parse_date(incident), parse_date(survey)) {
        (Some(incident), Some(survey)) if survey < incident => {
            Err(ValidationError::SurveyBeforeIncident)
        }
        _ => Ok(()),
    }
}

/// Validates the whole form without touching it.
///
/// Every required field runs the full per-field chain, then the cross-field
/// date rule runs. Failures come back in document order with the cross-field
/// failure last.
pub fn validate_form<S: FormSurface + ?Sized>(
    surface: &S,
    today: NaiveDate,
) -> Vec<FieldError> {
    let mut errors: Vec<FieldError> = surface
        .fields()
        .iter()
        .filter(|spec| spec.required)
        .filter_map(|spec| {
            let value = surface
                .value(&spec.id)
                .unwrap_or_else(|| FieldValue::empty_for(spec.kind));
            validate_field(spec, &value, today)
                .err()
                .map(|error| FieldError::new(spec.id.clone(), error))
        })
        .collect();

    let incident = surface.text(field_ids::DATE_OF_INCIDENT);
    let survey = surface.text(field_ids::DATE_OF_SURVEY);
    if let Err(error) = validate_survey_after_incident(&incident, &survey) {
        errors.push(FieldError::new(field_ids::DATE_OF_SURVEY, error));
    }

    debug!(failures = errors.len(), "form validated");
    errors
}
