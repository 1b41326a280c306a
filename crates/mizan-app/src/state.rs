use mizan_core::{AccountRef, CustomerRef, EmployeeRef, ProjectRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::settings::{AppSettings, CompanySettings};

const ALL_PERMISSIONS: &str = "all";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state storage failed: {0}")]
    Storage(String),
    #[error("state encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl From<std::io::Error> for StateError {
    fn from(err: std::io::Error) -> Self {
        StateError::Storage(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Accountant,
    Manager,
    Employee,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// The closed set of state mutations.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Login(User),
    Logout,
    SetAccounts(Vec<AccountRef>),
    SetCustomers(Vec<CustomerRef>),
    SetEmployees(Vec<EmployeeRef>),
    SetProjects(Vec<ProjectRef>),
    UpdateSettings(AppSettings),
    UpdateCompany(CompanySettings),
    ResetSettings,
}

/// Which persisted groups an action touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changed {
    pub session: bool,
    pub settings: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub is_authenticated: bool,
    pub current_user: Option<User>,
    pub accounts: Vec<AccountRef>,
    pub customers: Vec<CustomerRef>,
    pub employees: Vec<EmployeeRef>,
    pub projects: Vec<ProjectRef>,
    pub settings: AppSettings,
}

impl AppState {
    pub fn reduce(&mut self, action: Action) -> Changed {
        match action {
            Action::Login(user) => {
                self.is_authenticated = true;
                self.current_user = Some(user);
                Changed {
                    session: true,
                    settings: false,
                }
            }
            Action::Logout => {
                self.is_authenticated = false;
                self.current_user = None;
                self.accounts.clear();
                self.customers.clear();
                self.employees.clear();
                self.projects.clear();
                Changed {
                    session: true,
                    settings: false,
                }
            }
            Action::SetAccounts(accounts) => {
                self.accounts = accounts;
                Changed::default()
            }
            Action::SetCustomers(customers) => {
                self.customers = customers;
                Changed::default()
            }
            Action::SetEmployees(employees) => {
                self.employees = employees;
                Changed::default()
            }
            Action::SetProjects(projects) => {
                self.projects = projects;
                Changed::default()
            }
            Action::UpdateSettings(settings) => {
                self.settings = settings;
                Changed {
                    session: false,
                    settings: true,
                }
            }
            Action::UpdateCompany(company) => {
                self.settings.company = company;
                Changed {
                    session: false,
                    settings: true,
                }
            }
            Action::ResetSettings => {
                self.settings = AppSettings::default();
                Changed {
                    session: false,
                    settings: true,
                }
            }
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        if !self.is_authenticated {
            return false;
        }
        let Some(user) = &self.current_user else {
            return false;
        };

        user.role == UserRole::Admin
            || user
                .permissions
                .iter()
                .any(|granted| granted == ALL_PERMISSIONS || granted == permission)
    }

    pub fn account_name(&self, id: Uuid) -> Option<&str> {
        self.accounts
            .iter()
            .find(|account| account.id == id)
            .map(|account| account.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accountant() -> User {
        User {
            id: Uuid::new_v4(),
            name: "نورة".to_string(),
            email: "noura@example.com".to_string(),
            role: UserRole::Accountant,
            permissions: vec!["journal.create".to_string(), "treasury.view".to_string()],
        }
    }

    #[test]
    fn permissions_require_a_session() {
        let mut state = AppState::default();
        assert!(!state.has_permission("journal.create"));

        state.reduce(Action::Login(accountant()));
        assert!(state.has_permission("journal.create"));
        assert!(!state.has_permission("employees.delete"));

        state.reduce(Action::Logout);
        assert!(!state.has_permission("journal.create"));
    }

    #[test]
    fn admins_and_all_grant_everything() {
        let mut state = AppState::default();
        state.reduce(Action::Login(User {
            role: UserRole::Admin,
            permissions: Vec::new(),
            ..accountant()
        }));
        assert!(state.has_permission("anything"));

        state.reduce(Action::Login(User {
            permissions: vec!["all".to_string()],
            ..accountant()
        }));
        assert!(state.has_permission("employees.delete"));
    }

    #[test]
    fn reducer_reports_touched_groups() {
        let mut state = AppState::default();
        let cash_id = Uuid::new_v4();
        let cached = state.reduce(Action::SetAccounts(vec![AccountRef {
            id: cash_id,
            code: "1000".to_string(),
            name: "النقدية".to_string(),
        }]));
        assert_eq!(cached, Changed::default());
        assert_eq!(state.account_name(cash_id), Some("النقدية"));

        let mut company = CompanySettings::default();
        company.name = "شركة الأفق".to_string();
        let changed = state.reduce(Action::UpdateCompany(company));
        assert!(changed.settings && !changed.session);
        assert_eq!(state.settings.company.name, "شركة الأفق");

        state.reduce(Action::ResetSettings);
        assert_eq!(state.settings, AppSettings::default());
    }
}
