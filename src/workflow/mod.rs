//! Screen-level orchestration: Login/Registration -> Wizard -> Confirmation.
//!
//! The controller owns the injected [`ApplicationState`] and a session-scoped slot holding the
//! active owner's email. Every user action is one method call and is only accepted on the
//! screen that offers it; rejected actions leave the state untouched.

use std::sync::Arc;

use chrono::Utc;

use crate::db::KeyValueStore;
use crate::errors::{AppError, BusinessRule};
use crate::models::{BusinessOwner, Employee, EmployeeDraft, OwnerDetails, RegistrationRequest};
use crate::state::ApplicationState;
use crate::validation;

/// Maximum number of employees one owner can register.
pub const MAX_EMPLOYEES: usize = 10;

/// Session slot key holding the logged-in owner's email.
pub const SESSION_KEY: &str = "businessOwnerEmail";

/// The screen currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Login,
    /// Login sub-state collecting owner details for an unknown email.
    Registration {
        email: String,
    },
    Wizard,
    Confirmation,
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn,
    RegistrationRequired,
}

/// Prompt shown when leaving the wizard with unsaved changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPrompt {
    pub target: Screen,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Navigated(Screen),
    ConfirmationRequired(NavigationPrompt),
}

/// What the confirmation screen displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationSummary {
    pub employee_count: usize,
    pub business_name: String,
    pub email: String,
}

const UNSAVED_CHANGES_MESSAGE: &str =
    "You have unsaved changes. Are you sure you want to leave without saving?";

pub struct WorkflowController {
    state: ApplicationState,
    session: Arc<dyn KeyValueStore>,
    screen: Screen,
    pending_navigation: Option<Screen>,
}

impl WorkflowController {
    pub fn new(state: ApplicationState, session: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state,
            session,
            screen: Screen::Login,
            pending_navigation: None,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    /// The leave-without-saving prompt, if one is open.
    pub fn pending_prompt(&self) -> Option<NavigationPrompt> {
        self.pending_navigation
            .clone()
            .map(|target| NavigationPrompt {
                target,
                message: UNSAVED_CHANGES_MESSAGE,
            })
    }

    // ==================== LOGIN / REGISTRATION ====================

    /// Look up the owner by email. Unknown emails switch to the registration sub-state.
    pub async fn submit_login(&mut self, email: &str) -> Result<LoginOutcome, AppError> {
        if !matches!(self.screen, Screen::Login | Screen::Registration { .. }) {
            return Err(self.unavailable("login"));
        }
        validation::validate_email(email).map_err(|e| AppError::Validation(e.into()))?;

        if self.state.find_owner(email).is_none() {
            tracing::info!("No owner registered for {}, offering registration", email);
            self.screen = Screen::Registration {
                email: email.to_string(),
            };
            return Ok(LoginOutcome::RegistrationRequired);
        }

        self.establish_session(email).await?;
        self.screen = Screen::Wizard;
        Ok(LoginOutcome::LoggedIn)
    }

    /// Register a new owner with no employees and log them in.
    pub async fn submit_registration(
        &mut self,
        request: RegistrationRequest,
    ) -> Result<(), AppError> {
        let Screen::Registration { email } = &self.screen else {
            return Err(self.unavailable("registration"));
        };
        if *email != request.email {
            return Err(AppError::BadRequest(format!(
                "Registration was started for {}, not {}",
                email, request.email
            )));
        }
        validation::validate_registration(&request)?;

        if self.state.find_owner(&request.email).is_some() {
            return Err(BusinessRule::OwnerAlreadyRegistered.into());
        }

        let email = request.email.clone();
        self.state
            .add_owner(BusinessOwner::register(request, Utc::now()))
            .await?;
        self.establish_session(&email).await?;
        self.screen = Screen::Wizard;
        Ok(())
    }

    pub fn cancel_registration(&mut self) {
        if matches!(self.screen, Screen::Registration { .. }) {
            self.screen = Screen::Login;
        }
    }

    // ==================== WIZARD ====================

    /// Wizard entry guard. Restores the session owner or redirects to login.
    ///
    /// Entering from another screen resets the working copy to the persisted employees.
    pub async fn enter_wizard(&mut self) -> Screen {
        if self.screen == Screen::Wizard && self.state.has_unsaved_changes() {
            return Screen::Wizard;
        }

        let restored = match self.session_email().await {
            Some(email) => self.state.set_current_owner(&email),
            None => false,
        };

        self.pending_navigation = None;
        self.screen = if restored {
            Screen::Wizard
        } else {
            tracing::debug!("No session identity, redirecting to login");
            Screen::Login
        };
        self.screen.clone()
    }

    /// Validate and append an employee to the working copy.
    pub fn add_employee(&mut self, draft: &EmployeeDraft) -> Result<Employee, AppError> {
        self.require_wizard("add employee")?;
        self.require_owner()?;
        let data = validation::validate_employee(draft)?;

        let employees = self.state.current_employees();
        if employees.len() >= MAX_EMPLOYEES {
            return Err(BusinessRule::EmployeeLimitReached.into());
        }
        if employees.iter().any(|e| e.email == data.email) {
            return Err(BusinessRule::DuplicateEmployeeEmail.into());
        }

        let employee = Employee::new(data);
        self.state.add_employee(employee.clone());
        Ok(employee)
    }

    /// Validate and apply an edit. The new email must not belong to another employee.
    pub fn edit_employee(&mut self, id: &str, draft: &EmployeeDraft) -> Result<Employee, AppError> {
        self.require_wizard("edit employee")?;
        self.require_owner()?;
        let data = validation::validate_employee(draft)?;

        if self
            .state
            .current_employees()
            .iter()
            .any(|e| e.id != id && e.email == data.email)
        {
            return Err(BusinessRule::DuplicateEmployeeEmail.into());
        }

        self.state
            .update_employee(id, data)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))
    }

    pub fn delete_employee(&mut self, id: &str) -> Result<(), AppError> {
        self.require_wizard("delete employee")?;
        self.require_owner()?;
        if !self.state.delete_employee(id) {
            return Err(AppError::NotFound(format!("Employee {} not found", id)));
        }
        Ok(())
    }

    /// Update the session owner's business details. Persists immediately.
    pub async fn edit_business_details(
        &mut self,
        details: OwnerDetails,
    ) -> Result<BusinessOwner, AppError> {
        self.require_wizard("edit business details")?;
        let owner = self.require_owner()?;
        validation::validate_owner_details(&details)?;

        let updated = owner.with_details(details);
        self.state.update_owner(updated.clone()).await?;
        Ok(updated)
    }

    /// The edit form for an employee in the working copy, prefilled with its current values.
    pub fn edit_employee_form(&self, id: &str) -> Option<EmployeeDraft> {
        self.state
            .current_employees()
            .iter()
            .find(|e| e.id == id)
            .map(EmployeeDraft::from)
    }

    /// The business details form, prefilled from the session owner.
    pub fn business_details_form(&self) -> Option<OwnerDetails> {
        self.state.current_owner().map(BusinessOwner::details)
    }

    /// A blank employee form, prefilled with the owner's email template.
    pub fn new_employee_form(&self) -> EmployeeDraft {
        EmployeeDraft::blank(
            self.state
                .current_owner()
                .and_then(|o| o.email_template.as_deref()),
        )
    }

    pub fn employee_slots_remaining(&self) -> usize {
        MAX_EMPLOYEES.saturating_sub(self.state.current_employees().len())
    }

    pub fn is_at_capacity(&self) -> bool {
        self.employee_slots_remaining() == 0
    }

    /// Navigate away, or open the unsaved-changes prompt first.
    ///
    /// The target screen's entry guard decides where navigation actually lands.
    pub async fn request_navigation(&mut self, target: Screen) -> NavigationOutcome {
        if self.state.has_unsaved_changes() {
            self.pending_navigation = Some(target.clone());
            return NavigationOutcome::ConfirmationRequired(NavigationPrompt {
                target,
                message: UNSAVED_CHANGES_MESSAGE,
            });
        }

        NavigationOutcome::Navigated(self.go_to(target).await)
    }

    /// Dismiss the prompt and keep editing.
    pub fn stay(&mut self) {
        self.pending_navigation = None;
    }

    /// Discard the working copy without persisting and follow the pending navigation.
    pub async fn leave_without_saving(&mut self) -> Option<Screen> {
        let target = self.pending_navigation.take()?;
        tracing::info!("Discarding unsaved employee changes");
        self.state.discard_changes();
        Some(self.go_to(target).await)
    }

    /// Commit the working copy and move to the confirmation screen.
    pub async fn submit_all(&mut self) -> Result<ConfirmationSummary, AppError> {
        self.require_wizard("submit")?;
        let owner = self.require_owner()?;
        if self.state.current_employees().is_empty() {
            return Err(BusinessRule::NoEmployees.into());
        }
        let email = owner.email.clone();

        self.state.save_changes().await?;
        tracing::info!(
            "Submitted {} employees for {}",
            self.state.current_employees().len(),
            email
        );

        self.pending_navigation = None;
        self.screen = Screen::Confirmation;
        self.summary_for(&email)
            .ok_or_else(|| AppError::NotFound(format!("Business owner {} not found", email)))
    }

    // ==================== CONFIRMATION ====================

    /// Confirmation entry guard. Unsaved wizard edits keep the wizard open.
    pub async fn enter_confirmation(&mut self) -> Screen {
        if self.state.has_unsaved_changes() {
            return self.screen.clone();
        }
        self.screen = match self.confirmation_summary().await {
            Some(_) => Screen::Confirmation,
            None => Screen::Login,
        };
        self.screen.clone()
    }

    /// Persisted employee count and business identity of the session owner.
    pub async fn confirmation_summary(&self) -> Option<ConfirmationSummary> {
        let email = self.session_email().await?;
        self.summary_for(&email)
    }

    /// Back to the wizard within the same session.
    pub async fn return_to_wizard(&mut self) -> Result<Screen, AppError> {
        self.require_confirmation("return to wizard")?;
        Ok(self.enter_wizard().await)
    }

    /// Forget the session identity and go back to login.
    pub async fn start_over(&mut self) -> Result<(), AppError> {
        self.require_confirmation("start over")?;
        self.session.clear().await?;
        self.state.clear_current_owner();
        self.pending_navigation = None;
        self.screen = Screen::Login;
        Ok(())
    }

    // ==================== HELPERS ====================

    async fn go_to(&mut self, target: Screen) -> Screen {
        match target {
            Screen::Wizard => self.enter_wizard().await,
            Screen::Confirmation => self.enter_confirmation().await,
            other => {
                self.screen = other.clone();
                other
            }
        }
    }

    fn require_wizard(&self, action: &str) -> Result<(), AppError> {
        if self.screen != Screen::Wizard {
            return Err(self.unavailable(action));
        }
        Ok(())
    }

    fn require_confirmation(&self, action: &str) -> Result<(), AppError> {
        if self.screen != Screen::Confirmation {
            return Err(self.unavailable(action));
        }
        Ok(())
    }

    fn unavailable(&self, action: &str) -> AppError {
        tracing::warn!("Rejected {} on the {:?} screen", action, self.screen);
        BusinessRule::ActionUnavailable.into()
    }

    async fn establish_session(&mut self, email: &str) -> Result<(), AppError> {
        self.session.set_item(SESSION_KEY, email).await?;
        if !self.state.set_current_owner(email) {
            return Err(AppError::NotFound(format!(
                "Business owner {} not found",
                email
            )));
        }
        tracing::info!("Session established for {}", email);
        Ok(())
    }

    async fn session_email(&self) -> Option<String> {
        match self.session.get_item(SESSION_KEY).await {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!("Failed to read session marker: {}", e);
                None
            }
        }
    }

    fn require_owner(&self) -> Result<BusinessOwner, AppError> {
        self.state
            .current_owner()
            .cloned()
            .ok_or(AppError::BusinessRule(BusinessRule::NoSession))
    }

    fn summary_for(&self, email: &str) -> Option<ConfirmationSummary> {
        self.state.find_owner(email).map(|owner| ConfirmationSummary {
            employee_count: owner.employees.len(),
            business_name: owner.business_name.clone(),
            email: owner.email.clone(),
        })
    }
}
