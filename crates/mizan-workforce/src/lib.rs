pub mod employees;
pub mod projects;

pub use employees::{EmployeeFilter, EmployeeForm, EmployeeSummary, PayrollCalendar};
pub use projects::{ProjectFilter, ProjectForm, ProjectSummary, StatusCounts};
