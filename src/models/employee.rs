//! Employee model matching the frontend Employee interface.

use serde::{Deserialize, Serialize};

/// Gender options offered by the employee form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

/// An employee registered by a business owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
}

impl Employee {
    /// Create an employee with a freshly generated identifier.
    pub fn new(data: EmployeeData) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), data)
    }

    pub fn with_id(id: impl Into<String>, data: EmployeeData) -> Self {
        Self {
            id: id.into(),
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            gender: data.gender,
        }
    }

    /// Overwrite every field except the identifier.
    pub fn apply(&mut self, data: EmployeeData) {
        self.first_name = data.first_name;
        self.last_name = data.last_name;
        self.email = data.email;
        self.gender = data.gender;
    }
}

/// Validated employee fields without an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
}

/// Raw employee form input, as submitted by the add/edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDraft {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl EmployeeDraft {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        gender: Option<Gender>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            gender,
        }
    }

    /// A blank form prefilled with the owner's email template.
    pub fn blank(email_template: Option<&str>) -> Self {
        Self {
            email: email_template.unwrap_or_default().to_string(),
            gender: Some(Gender::PreferNotToSay),
            ..Self::default()
        }
    }
}

impl From<&Employee> for EmployeeDraft {
    fn from(employee: &Employee) -> Self {
        Self {
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            gender: Some(employee.gender),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_wire_format() {
        let json = serde_json::to_string(&Gender::PreferNotToSay).unwrap();
        assert_eq!(json, "\"prefer-not-to-say\"");
        assert_eq!(
            serde_json::from_str::<Gender>("\"female\"").unwrap(),
            Gender::Female
        );
        assert!(serde_json::from_str::<Gender>("\"\"").is_err());
    }

    #[test]
    fn test_employee_camel_case() {
        let employee = Employee::with_id(
            "e-1",
            EmployeeData {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jane@x.com".to_string(),
                gender: Gender::Female,
            },
        );
        let value = serde_json::to_value(&employee).unwrap();
        assert_eq!(value["firstName"], "Jane");
        assert_eq!(value["lastName"], "Doe");
        assert_eq!(value["gender"], "female");
    }

    #[test]
    fn test_apply_keeps_id() {
        let data = EmployeeData {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@x.com".to_string(),
            gender: Gender::Female,
        };
        let mut employee = Employee::new(data.clone());
        let id = employee.id.clone();
        employee.apply(EmployeeData {
            last_name: "Smith".to_string(),
            ..data
        });
        assert_eq!(employee.id, id);
        assert_eq!(employee.last_name, "Smith");
    }

    #[test]
    fn test_blank_draft_uses_template() {
        let draft = EmployeeDraft::blank(Some("@acme.com"));
        assert_eq!(draft.email, "@acme.com");
        assert_eq!(draft.gender, Some(Gender::PreferNotToSay));
        assert!(draft.first_name.is_empty());
    }
}
