//! Field validation rules for employee and owner forms.
//!
//! Every rule is a pure predicate: `Ok(())` when the value is acceptable, otherwise a
//! [`FieldError`] carrying the message shown next to the offending field.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{EmployeeData, EmployeeDraft, Gender, OwnerDetails, RegistrationRequest};

/// Intentionally lax `local@domain.tld` shape. Do not tighten.
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email pattern"));

static NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s'-]+$").expect("Invalid name pattern"));

const MIN_NAME_LENGTH: usize = 2;

/// Form field identifiers, matching the camelCase keys of the client forms.
pub mod fields {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const GENDER: &str = "gender";
    pub const BUSINESS_NAME: &str = "businessName";
    pub const PHONE: &str = "phone";
    pub const EMAIL_TEMPLATE: &str = "emailTemplate";
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    TooShort,
    InvalidCharacters,
    InvalidFormat,
    MissingAtPrefix,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FieldError {}

/// All failing fields of one form submission, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message for a field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    fn check(&mut self, result: Result<(), FieldError>) {
        if let Err(err) = result {
            self.errors.push(err);
        }
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(err: FieldError) -> Self {
        Self { errors: vec![err] }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

fn label(field: &'static str) -> &'static str {
    match field {
        fields::FIRST_NAME => "First name",
        fields::LAST_NAME => "Last name",
        fields::BUSINESS_NAME => "Business name",
        fields::PHONE => "Phone number",
        fields::EMAIL => "Email",
        _ => "Field",
    }
}

/// Employee first/last name: required, at least two characters, letters and `' -` only.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(
            field,
            FieldErrorKind::Required,
            format!("{} is required", label(field)),
        ));
    }
    if value.chars().count() < MIN_NAME_LENGTH {
        return Err(FieldError::new(
            field,
            FieldErrorKind::TooShort,
            "Name must be at least 2 characters long",
        ));
    }
    if !NAME_REGEX.is_match(value) {
        return Err(FieldError::new(
            field,
            FieldErrorKind::InvalidCharacters,
            "Name can only contain letters, spaces, hyphens, and apostrophes",
        ));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::new(
            fields::EMAIL,
            FieldErrorKind::Required,
            "Email is required",
        ));
    }
    if !EMAIL_REGEX.is_match(value) {
        return Err(FieldError::new(
            fields::EMAIL,
            FieldErrorKind::InvalidFormat,
            "Please enter a valid email address",
        ));
    }
    Ok(())
}

pub fn validate_gender(value: Option<Gender>) -> Result<(), FieldError> {
    match value {
        Some(_) => Ok(()),
        None => Err(FieldError::new(
            fields::GENDER,
            FieldErrorKind::Required,
            "Please select a gender",
        )),
    }
}

/// Optional employee email template; when given it must start with `@`.
pub fn validate_email_template(value: Option<&str>) -> Result<(), FieldError> {
    match value {
        Some(template) if !template.is_empty() && !template.starts_with('@') => {
            Err(FieldError::new(
                fields::EMAIL_TEMPLATE,
                FieldErrorKind::MissingAtPrefix,
                "Email template should start with @",
            ))
        }
        _ => Ok(()),
    }
}

/// Plain required text: rejects only empty or whitespace-only values.
pub fn validate_required(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(
            field,
            FieldErrorKind::Required,
            format!("{} is required", label(field)),
        ));
    }
    Ok(())
}

/// Validate an employee form and turn it into employee data.
pub fn validate_employee(draft: &EmployeeDraft) -> Result<EmployeeData, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check(validate_name(fields::FIRST_NAME, &draft.first_name));
    errors.check(validate_name(fields::LAST_NAME, &draft.last_name));
    errors.check(validate_email(&draft.email));
    errors.check(validate_gender(draft.gender));

    // A missing gender has already been recorded in `errors`.
    match draft.gender {
        Some(gender) if errors.is_empty() => Ok(EmployeeData {
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            gender,
        }),
        _ => Err(errors),
    }
}

/// Owner details as edited in the business-details dialog.
pub fn validate_owner_details(details: &OwnerDetails) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    collect_owner_details(&mut errors, details);
    errors.into_result()
}

/// Registration form: owner details plus a well-formed email.
pub fn validate_registration(request: &RegistrationRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    collect_owner_details(&mut errors, &request.details);
    errors.check(validate_email(&request.email));
    errors.into_result()
}

fn collect_owner_details(errors: &mut ValidationErrors, details: &OwnerDetails) {
    errors.check(validate_required(fields::FIRST_NAME, &details.first_name));
    errors.check(validate_required(fields::LAST_NAME, &details.last_name));
    errors.check(validate_required(fields::BUSINESS_NAME, &details.business_name));
    errors.check(validate_required(fields::PHONE, &details.phone));
    errors.check(validate_email_template(details.email_template.as_deref()));
}
