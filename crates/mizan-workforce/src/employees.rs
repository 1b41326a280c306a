use chrono::{NaiveDate, Utc};
use mizan_core::{
    EMPLOYEE_CODE_PREFIX, Employee, FieldErrors, RecordForm, RowFilter, SalaryType, Searchable,
    StatusFilter, generate_code, term_matches,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

const HIRE_DATE_REQUIRED: &str = "تاريخ التعيين مطلوب";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmployeeForm {
    pub employee_code: String,
    pub name: String,
    pub position: String,
    pub department: String,
    pub phone: String,
    pub email: String,
    pub hire_date: Option<NaiveDate>,
    pub salary: Decimal,
    pub salary_type: SalaryType,
    pub is_active: bool,
    /// Prefix for a generated `employee_code`. Set by the application from
    /// its HR settings, never read from a request body.
    #[serde(skip, default = "default_code_prefix")]
    pub code_prefix: String,
}

fn default_code_prefix() -> String {
    EMPLOYEE_CODE_PREFIX.to_string()
}

impl Default for EmployeeForm {
    fn default() -> Self {
        Self {
            employee_code: String::new(),
            name: String::new(),
            position: String::new(),
            department: String::new(),
            phone: String::new(),
            email: String::new(),
            hire_date: None,
            salary: Decimal::ZERO,
            salary_type: SalaryType::Monthly,
            is_active: true,
            code_prefix: default_code_prefix(),
        }
    }
}

impl EmployeeForm {
    /// Prefills the form for editing.
    pub fn from_record(employee: &Employee) -> Self {
        Self {
            employee_code: employee.employee_code.clone(),
            name: employee.name.clone(),
            position: employee.position.clone(),
            department: employee.department.clone().unwrap_or_default(),
            phone: employee.phone.clone().unwrap_or_default(),
            email: employee.email.clone().unwrap_or_default(),
            hire_date: Some(employee.hire_date),
            salary: employee.salary,
            salary_type: employee.salary_type,
            is_active: employee.is_active,
            code_prefix: default_code_prefix(),
        }
    }

    /// Uses `prefix` for a generated code; a blank prefix keeps the default.
    pub fn with_code_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim();
        if !prefix.is_empty() {
            self.code_prefix = prefix.to_string();
        }
        self
    }
}

impl RecordForm for EmployeeForm {
    type Record = Employee;

    const EDITABLE_FIELDS: &'static [&'static str] = &[
        "employee_code",
        "name",
        "position",
        "department",
        "phone",
        "email",
        "hire_date",
        "salary",
        "salary_type",
        "is_active",
    ];

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "اسم الموظف مطلوب");
        errors.require("position", &self.position, "المسمى الوظيفي مطلوب");
        if self.hire_date.is_none() {
            errors.add("hire_date", HIRE_DATE_REQUIRED);
        }
        if self.salary <= Decimal::ZERO {
            errors.add("salary", "الراتب يجب أن يكون أكبر من صفر");
        }
        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            errors.add("email", "البريد الإلكتروني غير صالح");
        }
        errors
    }

    fn build(&self, existing: Option<&Employee>, company_id: &str) -> Result<Employee, FieldErrors> {
        let hire_date = FieldErrors::required("hire_date", self.hire_date, HIRE_DATE_REQUIRED)?;
        let now = Utc::now();
        let code = self.employee_code.trim();
        let employee_code = match (code.is_empty(), existing) {
            (false, _) => code.to_string(),
            (true, Some(before)) => before.employee_code.clone(),
            (true, None) => {
                let generated = generate_code(&self.code_prefix);
                debug!(code = %generated, "generated employee code");
                generated
            }
        };

        Ok(Employee {
            id: existing.map_or_else(Uuid::new_v4, |before| before.id),
            company_id: existing.map_or_else(
                || company_id.to_string(),
                |before| before.company_id.clone(),
            ),
            employee_code,
            name: self.name.trim().to_string(),
            position: self.position.trim().to_string(),
            department: optional_text(&self.department),
            phone: optional_text(&self.phone),
            email: optional_text(&self.email),
            hire_date,
            salary: self.salary,
            salary_type: self.salary_type,
            is_active: self.is_active,
            created_at: existing.map_or(now, |before| before.created_at),
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmployeeFilter {
    pub term: String,
    pub status: StatusFilter,
    pub salary_type: Option<SalaryType>,
}

impl RowFilter<Employee> for EmployeeFilter {
    fn accepts(&self, row: &Employee) -> bool {
        self.status.accepts(row.is_active)
            && self.salary_type.is_none_or(|wanted| wanted == row.salary_type)
            && term_matches(&self.term, |term| row.matches(term))
    }
}

/// Converts daily and hourly rates into a monthly figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayrollCalendar {
    pub working_days_per_month: u32,
    pub working_hours_per_day: u32,
}

impl Default for PayrollCalendar {
    fn default() -> Self {
        Self {
            working_days_per_month: 26,
            working_hours_per_day: 8,
        }
    }
}

impl PayrollCalendar {
    pub fn monthly_salary(&self, employee: &Employee) -> Decimal {
        let days = Decimal::from(self.working_days_per_month);
        match employee.salary_type {
            SalaryType::Monthly => employee.salary,
            SalaryType::Daily => employee.salary * days,
            SalaryType::Hourly => {
                employee.salary * days * Decimal::from(self.working_hours_per_day)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmployeeSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Monthly payroll of active employees only.
    pub monthly_payroll: Decimal,
}

impl EmployeeSummary {
    pub fn from_records(records: &[Employee], calendar: PayrollCalendar) -> Self {
        let mut summary = EmployeeSummary {
            total: records.len(),
            ..EmployeeSummary::default()
        };
        for employee in records {
            if employee.is_active {
                summary.active += 1;
                summary.monthly_payroll += calendar.monthly_salary(employee);
            } else {
                summary.inactive += 1;
            }
        }
        summary
    }
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
