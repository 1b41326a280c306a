//! Application settings persisted under `appSettings`.
//!
//! Every section carries defaults so that older or partial payloads still
//! load; values outside their allowed range reject the whole object.

use mizan_core::{ProjectStatus, SalaryType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub company: CompanySettings,
    pub general: GeneralSettings,
    pub accounting: AccountingSettings,
    pub hr: HrSettings,
    pub projects: ProjectSettings,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompanySettings {
    pub name: String,
    pub name_en: String,
    pub tax_number: String,
    pub commercial_register: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub logo_url: Option<String>,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            name: "شركتي".to_string(),
            name_en: "My Company".to_string(),
            tax_number: String::new(),
            commercial_register: String::new(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            logo_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextDirection {
    #[default]
    Rtl,
    Ltr,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralSettings {
    pub language: String,
    pub direction: TextDirection,
    pub date_format: String,
    pub timezone: String,
    pub theme: Theme,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            language: "ar".to_string(),
            direction: TextDirection::Rtl,
            date_format: "DD/MM/YYYY".to_string(),
            timezone: "Asia/Riyadh".to_string(),
            theme: Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccountingSettings {
    pub base_currency: String,
    pub decimal_places: u32,
    pub fiscal_year_start_month: u32,
    pub auto_number_entries: bool,
    pub journal_prefix: String,
    /// Informational. Unbalanced journal entries are refused regardless.
    pub require_balanced_entries: bool,
}

impl Default for AccountingSettings {
    fn default() -> Self {
        Self {
            base_currency: "SAR".to_string(),
            decimal_places: 2,
            fiscal_year_start_month: 1,
            auto_number_entries: true,
            journal_prefix: "JE".to_string(),
            require_balanced_entries: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HrSettings {
    pub default_salary_type: SalaryType,
    pub working_days_per_month: u32,
    pub working_hours_per_day: u32,
    pub employee_code_prefix: String,
}

impl Default for HrSettings {
    fn default() -> Self {
        Self {
            default_salary_type: SalaryType::Monthly,
            working_days_per_month: 26,
            working_hours_per_day: 8,
            employee_code_prefix: "EMP".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectSettings {
    pub project_code_prefix: String,
    pub default_status: ProjectStatus,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            project_code_prefix: "PRJ".to_string(),
            default_status: ProjectStatus::Planning,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationSettings {
    pub toast_duration_ms: u64,
    pub show_success: bool,
    pub show_errors: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            toast_duration_ms: 3000,
            show_success: true,
            show_errors: true,
        }
    }
}

impl AppSettings {
    /// Range problems, one message per offending field.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.accounting.decimal_places > 6 {
            problems.push("accounting.decimal_places must be at most 6".to_string());
        }
        if !(1..=12).contains(&self.accounting.fiscal_year_start_month) {
            problems.push("accounting.fiscal_year_start_month must be 1-12".to_string());
        }
        if self.accounting.base_currency.trim().len() != 3 {
            problems.push("accounting.base_currency must be a 3-letter code".to_string());
        }
        if !(1..=31).contains(&self.hr.working_days_per_month) {
            problems.push("hr.working_days_per_month must be 1-31".to_string());
        }
        if !(1..=24).contains(&self.hr.working_hours_per_day) {
            problems.push("hr.working_hours_per_day must be 1-24".to_string());
        }
        if self.hr.employee_code_prefix.trim().is_empty() {
            problems.push("hr.employee_code_prefix must not be blank".to_string());
        }
        if self.projects.project_code_prefix.trim().is_empty() {
            problems.push("projects.project_code_prefix must not be blank".to_string());
        }
        problems
    }

    pub fn is_valid(&self) -> bool {
        self.problems().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_payload_fills_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"company":{"name":"مؤسسة النور"},"hr":{"working_days_per_month":22}}"#)
                .unwrap();

        assert_eq!(settings.company.name, "مؤسسة النور");
        assert_eq!(settings.company.name_en, "My Company");
        assert_eq!(settings.hr.working_days_per_month, 22);
        assert_eq!(settings.hr.working_hours_per_day, 8);
        assert_eq!(settings.general.language, "ar");
        assert!(settings.is_valid());
    }

    #[test]
    fn out_of_range_values_are_reported() {
        let mut settings = AppSettings::default();
        settings.accounting.fiscal_year_start_month = 13;
        settings.hr.working_hours_per_day = 0;

        assert_eq!(settings.problems().len(), 2);
    }

    #[test]
    fn blank_code_prefixes_are_reported() {
        let mut settings = AppSettings::default();
        settings.hr.employee_code_prefix = "  ".to_string();
        settings.projects.project_code_prefix = String::new();

        let problems = settings.problems();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("hr.employee_code_prefix"));
        assert!(problems[1].starts_with("projects.project_code_prefix"));
    }
}
