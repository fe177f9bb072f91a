//! Application state for one browser-like session.
//!
//! Holds every registered owner, the owner of the active session and a working copy of that
//! owner's employees. Owner-level mutations persist immediately; employee edits stay in the
//! working copy until [`ApplicationState::save_changes`].

use tokio::sync::broadcast;

use crate::errors::AppError;
use crate::models::{BusinessOwner, Employee, EmployeeData};
use crate::persistence::PersistentStore;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Notification sent to subscribers after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    OwnersChanged,
    CurrentOwnerChanged(Option<String>),
    EmployeesChanged,
    ChangesSaved,
    ChangesDiscarded,
}

/// Observable, in-memory application state.
pub struct ApplicationState {
    persistence: PersistentStore,
    owners: Vec<BusinessOwner>,
    current_owner: Option<BusinessOwner>,
    current_employees: Vec<Employee>,
    unsaved_changes: bool,
    changes: broadcast::Sender<StateChange>,
}

impl ApplicationState {
    /// Empty state writing through `persistence`.
    pub fn new(persistence: PersistentStore) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            persistence,
            owners: Vec::new(),
            current_owner: None,
            current_employees: Vec::new(),
            unsaved_changes: false,
            changes,
        }
    }

    /// Startup load: read owners through the adapter and write them back.
    ///
    /// When the local document could not be read in full, it is left in place instead.
    pub async fn load(persistence: PersistentStore) -> Result<Self, AppError> {
        let loaded = persistence.load().await;
        tracing::info!("Loaded {} business owners", loaded.owners.len());

        let mut state = Self::new(persistence);
        if loaded.local_intact {
            state.set_owners(loaded.owners).await?;
        } else {
            tracing::warn!("Stored data was only partly readable, not writing it back");
            state.owners = loaded.owners;
            state.notify(StateChange::OwnersChanged);
        }
        Ok(state)
    }

    /// Register an observer. Receivers only see changes sent after subscribing.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    pub fn owners(&self) -> &[BusinessOwner] {
        &self.owners
    }

    pub fn find_owner(&self, email: &str) -> Option<&BusinessOwner> {
        self.owners.iter().find(|o| o.email == email)
    }

    pub fn current_owner(&self) -> Option<&BusinessOwner> {
        self.current_owner.as_ref()
    }

    pub fn current_employees(&self) -> &[Employee] {
        &self.current_employees
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// Replace the whole collection. The previous one is restored if the write fails.
    pub async fn set_owners(&mut self, owners: Vec<BusinessOwner>) -> Result<(), AppError> {
        let previous = std::mem::replace(&mut self.owners, owners);
        if let Err(e) = self.persist().await {
            self.owners = previous;
            return Err(e);
        }
        self.notify(StateChange::OwnersChanged);
        Ok(())
    }

    /// Select the session owner by email.
    ///
    /// Returns `false` and clears the selection when no owner matches; callers treat that as
    /// "go to login".
    pub fn set_current_owner(&mut self, email: &str) -> bool {
        let owner = self.find_owner(email).cloned();
        let found = owner.is_some();

        self.current_employees = owner
            .as_ref()
            .map(|o| o.employees.clone())
            .unwrap_or_default();
        self.current_owner = owner;
        self.unsaved_changes = false;

        if !found {
            tracing::debug!("No business owner registered for {}", email);
        }
        self.notify(StateChange::CurrentOwnerChanged(
            self.current_owner.as_ref().map(|o| o.email.clone()),
        ));
        found
    }

    pub fn clear_current_owner(&mut self) {
        self.current_owner = None;
        self.current_employees.clear();
        self.unsaved_changes = false;
        self.notify(StateChange::CurrentOwnerChanged(None));
    }

    /// Append a new owner. Email uniqueness is checked by the caller.
    pub async fn add_owner(&mut self, owner: BusinessOwner) -> Result<(), AppError> {
        tracing::info!("Registering business owner {}", owner.email);
        self.owners.push(owner);
        if let Err(e) = self.persist().await {
            self.owners.pop();
            return Err(e);
        }
        self.notify(StateChange::OwnersChanged);
        Ok(())
    }

    /// Replace the owner with the same email, refreshing the session owner if it matches.
    ///
    /// On a failed write both the collection and the session owner keep their old record.
    pub async fn update_owner(&mut self, owner: BusinessOwner) -> Result<(), AppError> {
        let index = self
            .owners
            .iter()
            .position(|o| o.email == owner.email)
            .ok_or_else(|| {
                AppError::NotFound(format!("Business owner {} not found", owner.email))
            })?;

        let previous = std::mem::replace(&mut self.owners[index], owner.clone());
        let is_current = self
            .current_owner
            .as_ref()
            .is_some_and(|current| current.email == owner.email);
        let previous_current = if is_current {
            self.current_owner.replace(owner)
        } else {
            None
        };

        if let Err(e) = self.persist().await {
            self.owners[index] = previous;
            if is_current {
                self.current_owner = previous_current;
            }
            return Err(e);
        }

        self.notify(StateChange::OwnersChanged);
        Ok(())
    }

    pub fn add_employee(&mut self, employee: Employee) {
        self.current_employees.push(employee);
        self.mark_dirty();
    }

    /// Update an employee in the working copy. Returns the updated record, or `None` if the
    /// identifier is unknown.
    pub fn update_employee(&mut self, id: &str, data: EmployeeData) -> Option<&Employee> {
        let index = self.current_employees.iter().position(|e| e.id == id)?;
        self.current_employees[index].apply(data);
        self.mark_dirty();
        self.current_employees.get(index)
    }

    /// Remove an employee from the working copy. Returns whether it existed.
    pub fn delete_employee(&mut self, id: &str) -> bool {
        let before = self.current_employees.len();
        self.current_employees.retain(|e| e.id != id);
        let removed = self.current_employees.len() != before;
        if removed {
            self.mark_dirty();
        }
        removed
    }

    /// Commit the working copy into the session owner and persist it.
    ///
    /// A failed write leaves the working copy unsaved and the committed records untouched.
    pub async fn save_changes(&mut self) -> Result<(), AppError> {
        let Some(owner) = &self.current_owner else {
            return Ok(());
        };

        let updated = BusinessOwner {
            employees: self.current_employees.clone(),
            ..owner.clone()
        };
        self.update_owner(updated).await?;
        self.unsaved_changes = false;
        self.notify(StateChange::ChangesSaved);
        Ok(())
    }

    /// Drop the working copy and go back to the persisted employees. Nothing is written.
    pub fn discard_changes(&mut self) {
        self.current_employees = self
            .current_owner
            .as_ref()
            .map(|o| o.employees.clone())
            .unwrap_or_default();
        self.unsaved_changes = false;
        self.notify(StateChange::ChangesDiscarded);
    }

    fn mark_dirty(&mut self) {
        self.unsaved_changes = true;
        self.notify(StateChange::EmployeesChanged);
    }

    fn notify(&self, change: StateChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }

    async fn persist(&self) -> Result<(), AppError> {
        self.persistence.save(&self.owners).await
    }
}
