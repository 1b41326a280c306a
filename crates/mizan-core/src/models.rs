use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::Lifecycle;
use crate::storage::{Record, Searchable};

/// Placeholder company scope used until multi-company support exists.
pub const DEFAULT_COMPANY_ID: &str = "00000000-0000-0000-0000-000000000001";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    #[default]
    Monthly,
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    pub company_id: String,
    pub employee_code: String,
    pub name: String,
    pub position: String,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hire_date: NaiveDate,
    pub salary: Decimal,
    pub salary_type: SalaryType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn to_ref(&self) -> EmployeeRef {
        EmployeeRef {
            id: self.id,
            code: self.employee_code.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub company_id: String,
    pub project_code: String,
    pub name: String,
    pub description: Option<String>,
    pub customer_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Decimal,
    pub contract_value: Decimal,
    pub expenses: Decimal,
    pub revenue: Decimal,
    pub progress_percentage: u8,
    pub status: ProjectStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn to_ref(&self) -> ProjectRef {
        ProjectRef {
            id: self.id,
            code: self.project_code.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalStatus {
    #[default]
    Draft,
    Posted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalLine {
    pub account_id: Option<Uuid>,
    /// Display name cached from the chart of accounts when the account was picked.
    pub account_name: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id: Uuid,
    pub company_id: String,
    pub entry_number: Option<String>,
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub status: JournalStatus,
    pub lines: Vec<JournalLine>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BankAccount {
    pub id: Uuid,
    pub company_id: String,
    pub account_name: String,
    pub bank_name: String,
    pub account_number: String,
    pub iban: Option<String>,
    pub currency: String,
    pub opening_balance: Decimal,
    pub current_balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashAccount {
    pub id: Uuid,
    pub company_id: String,
    pub account_name: String,
    pub custodian: Option<String>,
    pub location: Option<String>,
    pub currency: String,
    pub opening_balance: Decimal,
    pub current_balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Bank,
    Cash,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Deposit,
    Withdrawal,
    Transfer,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BankTransaction {
    pub id: Uuid,
    pub company_id: String,
    pub account_id: Uuid,
    pub account_type: AccountType,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub related_account_id: Option<Uuid>,
    pub transaction_date: NaiveDate,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRef {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployeeRef {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

impl Record for Employee {
    const TABLE: &'static str = "employees";
    const LABEL: &'static str = "employee";

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> &str {
        &self.company_id
    }
}

impl Lifecycle for Employee {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Searchable for Employee {
    fn matches(&self, term: &str) -> bool {
        contains_folded(&self.name, term)
            || contains_folded(&self.employee_code, term)
            || contains_folded(&self.position, term)
            || self
                .department
                .as_deref()
                .is_some_and(|department| contains_folded(department, term))
    }
}

impl Record for Project {
    const TABLE: &'static str = "projects";
    const LABEL: &'static str = "project";

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> &str {
        &self.company_id
    }
}

impl Lifecycle for Project {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Searchable for Project {
    fn matches(&self, term: &str) -> bool {
        contains_folded(&self.name, term)
            || contains_folded(&self.project_code, term)
            || self
                .description
                .as_deref()
                .is_some_and(|description| contains_folded(description, term))
    }
}

impl Record for BankAccount {
    const TABLE: &'static str = "bank_accounts";
    const LABEL: &'static str = "bank account";

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> &str {
        &self.company_id
    }
}

impl Lifecycle for BankAccount {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Searchable for BankAccount {
    fn matches(&self, term: &str) -> bool {
        contains_folded(&self.account_name, term)
            || contains_folded(&self.bank_name, term)
            || contains_folded(&self.account_number, term)
    }
}

impl Record for CashAccount {
    const TABLE: &'static str = "cash_accounts";
    const LABEL: &'static str = "cash account";

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> &str {
        &self.company_id
    }
}

impl Lifecycle for CashAccount {
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Searchable for CashAccount {
    fn matches(&self, term: &str) -> bool {
        contains_folded(&self.account_name, term)
            || self
                .custodian
                .as_deref()
                .is_some_and(|custodian| contains_folded(custodian, term))
            || self
                .location
                .as_deref()
                .is_some_and(|location| contains_folded(location, term))
    }
}

impl Record for BankTransaction {
    const TABLE: &'static str = "bank_transactions";
    const LABEL: &'static str = "bank transaction";

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> &str {
        &self.company_id
    }
}

impl Searchable for BankTransaction {
    fn matches(&self, term: &str) -> bool {
        self.reference
            .as_deref()
            .is_some_and(|reference| contains_folded(reference, term))
            || self
                .description
                .as_deref()
                .is_some_and(|description| contains_folded(description, term))
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_search_covers_code_position_and_department() {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4(),
            company_id: DEFAULT_COMPANY_ID.to_string(),
            employee_code: "EMP-1700000000000-042".to_string(),
            name: "أحمد علي".to_string(),
            position: "Accountant".to_string(),
            department: Some("Finance".to_string()),
            phone: None,
            email: None,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            salary: Decimal::new(8000, 0),
            salary_type: SalaryType::Monthly,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        assert!(employee.matches("أحمد"));
        assert!(employee.matches("emp-1700"));
        assert!(employee.matches("ACCOUNT"));
        assert!(employee.matches("finance"));
        assert!(!employee.matches("engineer"));
    }

    #[test]
    fn project_status_serializes_snake_case() {
        let encoded = serde_json::to_string(&ProjectStatus::OnHold).unwrap();
        assert_eq!(encoded, "\"on_hold\"");
    }
}
