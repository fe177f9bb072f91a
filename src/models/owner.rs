//! Business owner model matching the frontend BusinessOwner interface.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::Employee;

/// A registered business owner, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessOwner {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub business_name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_template: Option<String>,
    pub registered_at: String,
    #[serde(default)]
    pub employees: Vec<Employee>,
}

impl BusinessOwner {
    /// Build a freshly registered owner with no employees.
    pub fn register(request: RegistrationRequest, registered_at: DateTime<Utc>) -> Self {
        let details = request.details.normalized();
        Self {
            email: request.email,
            first_name: details.first_name,
            last_name: details.last_name,
            business_name: details.business_name,
            phone: details.phone,
            email_template: details.email_template,
            registered_at: registered_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            employees: Vec::new(),
        }
    }

    /// Copy of this owner with the editable details replaced.
    ///
    /// Email, registration time and employees are carried over unchanged.
    pub fn with_details(&self, details: OwnerDetails) -> Self {
        let details = details.normalized();
        Self {
            first_name: details.first_name,
            last_name: details.last_name,
            business_name: details.business_name,
            phone: details.phone,
            email_template: details.email_template,
            ..self.clone()
        }
    }

    pub fn details(&self) -> OwnerDetails {
        OwnerDetails {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            business_name: self.business_name.clone(),
            phone: self.phone.clone(),
            email_template: self.email_template.clone(),
        }
    }
}

/// The fields of an owner that the business-details dialog can change.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email_template: Option<String>,
}

impl OwnerDetails {
    /// An empty template is stored as absent.
    fn normalized(mut self) -> Self {
        if self.email_template.as_deref().is_some_and(str::is_empty) {
            self.email_template = None;
        }
        self
    }
}

/// Input collected by the registration sub-screen.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub details: OwnerDetails,
}
