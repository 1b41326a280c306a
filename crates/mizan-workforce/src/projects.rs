use chrono::{NaiveDate, Utc};
use mizan_core::{
    FieldErrors, PROJECT_CODE_PREFIX, Project, ProjectStatus, RecordForm, RowFilter, Searchable,
    StatusFilter, generate_code, term_matches,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectForm {
    pub project_code: String,
    pub name: String,
    pub description: String,
    pub customer_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Decimal,
    pub contract_value: Decimal,
    pub expenses: Decimal,
    pub revenue: Decimal,
    pub progress_percentage: i32,
    pub status: ProjectStatus,
    pub is_active: bool,
    #[serde(skip, default = "default_code_prefix")]
    pub code_prefix: String,
}

fn default_code_prefix() -> String {
    PROJECT_CODE_PREFIX.to_string()
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            project_code: String::new(),
            name: String::new(),
            description: String::new(),
            customer_id: None,
            project_manager_id: None,
            start_date: None,
            end_date: None,
            budget: Decimal::ZERO,
            contract_value: Decimal::ZERO,
            expenses: Decimal::ZERO,
            revenue: Decimal::ZERO,
            progress_percentage: 0,
            status: ProjectStatus::Planning,
            is_active: true,
            code_prefix: default_code_prefix(),
        }
    }
}

impl ProjectForm {
    pub fn from_record(project: &Project) -> Self {
        Self {
            project_code: project.project_code.clone(),
            name: project.name.clone(),
            description: project.description.clone().unwrap_or_default(),
            customer_id: project.customer_id,
            project_manager_id: project.project_manager_id,
            start_date: project.start_date,
            end_date: project.end_date,
            budget: project.budget,
            contract_value: project.contract_value,
            expenses: project.expenses,
            revenue: project.revenue,
            progress_percentage: i32::from(project.progress_percentage),
            status: project.status,
            is_active: project.is_active,
            code_prefix: default_code_prefix(),
        }
    }

    pub fn with_code_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim();
        if !prefix.is_empty() {
            self.code_prefix = prefix.to_string();
        }
        self
    }
}

impl RecordForm for ProjectForm {
    type Record = Project;

    const EDITABLE_FIELDS: &'static [&'static str] = &[
        "project_code",
        "name",
        "description",
        "customer_id",
        "project_manager_id",
        "start_date",
        "end_date",
        "budget",
        "contract_value",
        "expenses",
        "revenue",
        "progress_percentage",
        "status",
        "is_active",
    ];

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "اسم المشروع مطلوب");
        for (field, value) in [
            ("budget", self.budget),
            ("contract_value", self.contract_value),
            ("expenses", self.expenses),
            ("revenue", self.revenue),
        ] {
            if value < Decimal::ZERO {
                errors.add(field, "القيمة لا يمكن أن تكون سالبة");
            }
        }
        if !(0..=100).contains(&self.progress_percentage) {
            errors.add("progress_percentage", "نسبة الإنجاز يجب أن تكون بين 0 و 100");
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.add("end_date", "تاريخ الانتهاء يجب أن يكون بعد تاريخ البدء");
            }
        }
        errors
    }

    fn build(&self, existing: Option<&Project>, company_id: &str) -> Result<Project, FieldErrors> {
        let now = Utc::now();
        let code = self.project_code.trim();
        let project_code = match (code.is_empty(), existing) {
            (false, _) => code.to_string(),
            (true, Some(before)) => before.project_code.clone(),
            (true, None) => {
                let generated = generate_code(&self.code_prefix);
                debug!(code = %generated, "generated project code");
                generated
            }
        };
        let description = self.description.trim();

        Ok(Project {
            id: existing.map_or_else(Uuid::new_v4, |before| before.id),
            company_id: existing.map_or_else(
                || company_id.to_string(),
                |before| before.company_id.clone(),
            ),
            project_code,
            name: self.name.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            customer_id: self.customer_id,
            project_manager_id: self.project_manager_id,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
            contract_value: self.contract_value,
            expenses: self.expenses,
            revenue: self.revenue,
            progress_percentage: u8::try_from(self.progress_percentage.clamp(0, 100))
                .unwrap_or_default(),
            status: self.status,
            is_active: self.is_active,
            created_at: existing.map_or(now, |before| before.created_at),
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectFilter {
    pub term: String,
    pub status: StatusFilter,
    pub project_status: Option<ProjectStatus>,
    pub customer_id: Option<Uuid>,
}

impl RowFilter<Project> for ProjectFilter {
    fn accepts(&self, row: &Project) -> bool {
        self.status.accepts(row.is_active)
            && self.project_status.is_none_or(|wanted| wanted == row.status)
            && self
                .customer_id
                .is_none_or(|wanted| row.customer_id == Some(wanted))
            && term_matches(&self.term, |term| row.matches(term))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatusCounts {
    pub planning: usize,
    pub active: usize,
    pub on_hold: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    fn record(&mut self, status: ProjectStatus) {
        let slot = match status {
            ProjectStatus::Planning => &mut self.planning,
            ProjectStatus::Active => &mut self.active,
            ProjectStatus::OnHold => &mut self.on_hold,
            ProjectStatus::Completed => &mut self.completed,
            ProjectStatus::Cancelled => &mut self.cancelled,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectSummary {
    pub total: usize,
    pub active_records: usize,
    pub by_status: StatusCounts,
    pub total_budget: Decimal,
    pub total_contract_value: Decimal,
    pub total_expenses: Decimal,
    pub total_revenue: Decimal,
    pub profit: Decimal,
    pub average_progress: Decimal,
}

impl ProjectSummary {
    pub fn from_records(records: &[Project]) -> Self {
        let mut summary = ProjectSummary {
            total: records.len(),
            ..ProjectSummary::default()
        };
        let mut progress_sum = Decimal::ZERO;

        for project in records {
            if project.is_active {
                summary.active_records += 1;
            }
            summary.by_status.record(project.status);
            summary.total_budget += project.budget;
            summary.total_contract_value += project.contract_value;
            summary.total_expenses += project.expenses;
            summary.total_revenue += project.revenue;
            progress_sum += Decimal::from(project.progress_percentage);
        }

        summary.profit = summary.total_revenue - summary.total_expenses;
        if !records.is_empty() {
            summary.average_progress = (progress_sum / Decimal::from(records.len())).round_dp(2);
        }
        summary
    }
}
