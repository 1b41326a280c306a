use std::{net::SocketAddr, path::Path as FsPath, sync::Arc};

use anyhow::{Context, Result as AnyResult};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use mizan_app::{
    Action, AppSettings, AutoConfirm, Confirmer, FileStorage, ListStatus, Notifier, RecordList,
    StateStore, TracingNotifier, User, settings::CompanySettings,
};
use mizan_core::{
    BankAccount, BankTransaction, CashAccount, Employee, FieldErrors, JournalEntry, Lifecycle,
    Project, Record, RecordError, RecordForm, RecordStore, RowFilter, StoreError,
};
use mizan_finance::{
    BankAccountForm, BankTransactionForm, CashAccountForm, JournalEntryForm, JournalTotals,
    TransactionFilter, TransactionSummary, TreasuryFilter, TreasurySummary,
};
use mizan_platform::{PgRecordStore, ServiceConfig, StoreBackend, connect_database};
use mizan_store::InMemoryStore;
use mizan_workforce::{
    EmployeeFilter, EmployeeForm, EmployeeSummary, PayrollCalendar, ProjectFilter, ProjectForm,
    ProjectSummary,
};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

type List<T> = RecordList<T, dyn RecordStore<T>>;
type ApiError = (StatusCode, String);

#[derive(Clone)]
struct AppState {
    company_id: String,
    employees: Arc<List<Employee>>,
    projects: Arc<List<Project>>,
    bank_accounts: Arc<List<BankAccount>>,
    cash_accounts: Arc<List<CashAccount>>,
    transactions: Arc<List<BankTransaction>>,
    session: Arc<Mutex<StateStore<FileStorage>>>,
}

enum Backend {
    Memory,
    Postgres { pool: PgPool, create_tables: bool },
}

/// Binds an entity to the form, filter and summary its HTTP routes use.
trait Resource: Record {
    type Form: RecordForm<Record = Self>
        + Default
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;
    type Filter: RowFilter<Self> + DeserializeOwned + Send + Sync + 'static;
    type Summary: Serialize + Send + 'static;

    fn list(state: &AppState) -> &Arc<List<Self>>;
    fn summarize(records: &[Self], settings: &AppSettings) -> Self::Summary;

    /// Settings-driven values a request body cannot set.
    fn with_settings(form: Self::Form, _settings: &AppSettings) -> Self::Form {
        form
    }

    /// Empty create form prefilled with the configured defaults.
    fn blank_form(settings: &AppSettings) -> Self::Form {
        Self::with_settings(Self::Form::default(), settings)
    }

    /// Reference-list refresh for the session cache after the rows change.
    fn cache_action(_records: &[Self]) -> Option<Action> {
        None
    }
}

impl Resource for Employee {
    type Form = EmployeeForm;
    type Filter = EmployeeFilter;
    type Summary = EmployeeSummary;

    fn list(state: &AppState) -> &Arc<List<Self>> {
        &state.employees
    }

    fn summarize(records: &[Self], settings: &AppSettings) -> EmployeeSummary {
        let calendar = PayrollCalendar {
            working_days_per_month: settings.hr.working_days_per_month,
            working_hours_per_day: settings.hr.working_hours_per_day,
        };
        EmployeeSummary::from_records(records, calendar)
    }

    fn with_settings(form: EmployeeForm, settings: &AppSettings) -> EmployeeForm {
        form.with_code_prefix(&settings.hr.employee_code_prefix)
    }

    fn blank_form(settings: &AppSettings) -> EmployeeForm {
        Self::with_settings(
            EmployeeForm {
                salary_type: settings.hr.default_salary_type,
                ..EmployeeForm::default()
            },
            settings,
        )
    }

    fn cache_action(records: &[Self]) -> Option<Action> {
        Some(Action::SetEmployees(
            records
                .iter()
                .filter(|employee| employee.is_active)
                .map(Employee::to_ref)
                .collect(),
        ))
    }
}

impl Resource for Project {
    type Form = ProjectForm;
    type Filter = ProjectFilter;
    type Summary = ProjectSummary;

    fn list(state: &AppState) -> &Arc<List<Self>> {
        &state.projects
    }

    fn summarize(records: &[Self], _settings: &AppSettings) -> ProjectSummary {
        ProjectSummary::from_records(records)
    }

    fn with_settings(form: ProjectForm, settings: &AppSettings) -> ProjectForm {
        form.with_code_prefix(&settings.projects.project_code_prefix)
    }

    fn blank_form(settings: &AppSettings) -> ProjectForm {
        Self::with_settings(
            ProjectForm {
                status: settings.projects.default_status,
                ..ProjectForm::default()
            },
            settings,
        )
    }

    fn cache_action(records: &[Self]) -> Option<Action> {
        Some(Action::SetProjects(
            records
                .iter()
                .filter(|project| project.is_active)
                .map(Project::to_ref)
                .collect(),
        ))
    }
}

impl Resource for BankAccount {
    type Form = BankAccountForm;
    type Filter = TreasuryFilter;
    type Summary = TreasurySummary;

    fn list(state: &AppState) -> &Arc<List<Self>> {
        &state.bank_accounts
    }

    fn summarize(records: &[Self], _settings: &AppSettings) -> TreasurySummary {
        TreasurySummary::from_bank_accounts(records)
    }
}

impl Resource for CashAccount {
    type Form = CashAccountForm;
    type Filter = TreasuryFilter;
    type Summary = TreasurySummary;

    fn list(state: &AppState) -> &Arc<List<Self>> {
        &state.cash_accounts
    }

    fn summarize(records: &[Self], _settings: &AppSettings) -> TreasurySummary {
        TreasurySummary::from_cash_accounts(records)
    }
}

impl Resource for BankTransaction {
    type Form = BankTransactionForm;
    type Filter = TransactionFilter;
    type Summary = TransactionSummary;

    fn list(state: &AppState) -> &Arc<List<Self>> {
        &state.transactions
    }

    fn summarize(records: &[Self], _settings: &AppSettings) -> TransactionSummary {
        TransactionSummary::from_records(records)
    }
}

#[derive(Debug, Serialize)]
struct ListResponse<T, S> {
    status: ListStatus,
    rows: Vec<T>,
    summary: S,
}

#[derive(Debug, Serialize)]
struct JournalValidation {
    totals: JournalTotals,
    errors: FieldErrors,
    entry: Option<JournalEntry>,
}

#[derive(Debug, Serialize)]
struct SessionView {
    is_authenticated: bool,
    user: Option<User>,
}

#[derive(Debug, Serialize)]
struct PermissionCheck {
    permission: String,
    granted: bool,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mizan_gateway=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8090")?;
    let backend = match config.store_backend {
        StoreBackend::Memory => {
            warn!("using the in-memory store; records are lost on restart");
            Backend::Memory
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            Backend::Postgres {
                pool: connect_database(database_url).await?,
                create_tables: config.create_tables,
            }
        }
    };

    let state = build_state(&backend, &config.company_id, &config.state_path).await?;
    load_all(&state).await;

    let router = app_router(state);
    let addr: SocketAddr = config.http_addr.parse()?;
    info!("mizan gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn build_state(
    backend: &Backend,
    company_id: &str,
    state_path: &FsPath,
) -> AnyResult<AppState> {
    let confirmer: Arc<dyn Confirmer> = Arc::new(AutoConfirm);
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

    Ok(AppState {
        company_id: company_id.to_string(),
        employees: open_list(backend, company_id, &confirmer, &notifier).await?,
        projects: open_list(backend, company_id, &confirmer, &notifier).await?,
        bank_accounts: open_list(backend, company_id, &confirmer, &notifier).await?,
        cash_accounts: open_list(backend, company_id, &confirmer, &notifier).await?,
        transactions: open_list(backend, company_id, &confirmer, &notifier).await?,
        session: Arc::new(Mutex::new(StateStore::init(FileStorage::new(state_path)))),
    })
}

async fn open_list<T: Record>(
    backend: &Backend,
    company_id: &str,
    confirmer: &Arc<dyn Confirmer>,
    notifier: &Arc<dyn Notifier>,
) -> AnyResult<Arc<List<T>>> {
    let store: Arc<dyn RecordStore<T>> = match backend {
        Backend::Memory => Arc::new(InMemoryStore::<T>::new()),
        Backend::Postgres {
            pool,
            create_tables,
        } => {
            let store = PgRecordStore::<T>::new(pool.clone());
            if *create_tables {
                store
                    .ensure_table()
                    .await
                    .with_context(|| format!("failed to create table {}", T::TABLE))?;
            }
            Arc::new(store)
        }
    };

    Ok(Arc::new(RecordList::new(
        store,
        company_id,
        confirmer.clone(),
        notifier.clone(),
    )))
}

/// Initial load of every list. Failures stay visible in each list's status
/// until `/reload` succeeds.
async fn load_all(state: &AppState) {
    load_and_cache::<Employee>(state).await;
    load_and_cache::<Project>(state).await;
    load_and_cache::<BankAccount>(state).await;
    load_and_cache::<CashAccount>(state).await;
    load_and_cache::<BankTransaction>(state).await;
}

async fn load_and_cache<T: Resource>(state: &AppState) {
    match T::list(state).load().await {
        Ok(()) => refresh_cache::<T>(state).await,
        Err(err) => error!(table = T::TABLE, "initial load failed: {err}"),
    }
}

async fn refresh_cache<T: Resource>(state: &AppState) {
    let records = T::list(state).records().await;
    let Some(action) = T::cache_action(&records) else {
        return;
    };
    if let Err(err) = state.session.lock().await.dispatch(action) {
        warn!(table = T::TABLE, "failed to refresh cached references: {err}");
    }
}

fn app_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/journal-entries/validate", post(validate_journal_entry))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/settings/company", put(update_company))
        .route("/settings/reset", post(reset_settings))
        .route("/session", get(get_session))
        .route("/session/login", post(login))
        .route("/session/logout", post(logout))
        .route("/session/permissions/{permission}", get(check_permission));

    let router = lifecycle_routes::<Employee>(router, "/employees");
    let router = lifecycle_routes::<Project>(router, "/projects");
    let router = lifecycle_routes::<BankAccount>(router, "/bank-accounts");
    let router = lifecycle_routes::<CashAccount>(router, "/cash-accounts");
    let router = record_routes::<BankTransaction>(router, "/bank-transactions").route(
        "/bank-transactions/{id}",
        put(update_record::<BankTransaction>),
    );

    router.with_state(state)
}

fn record_routes<T: Resource>(router: Router<AppState>, base: &str) -> Router<AppState> {
    router
        .route(base, get(list_records::<T>).post(create_record::<T>))
        .route(&format!("{base}/new"), get(new_form::<T>))
        .route(&format!("{base}/reload"), post(reload_records::<T>))
        .route(
            &format!("{base}/load-unscoped"),
            post(load_unscoped_records::<T>),
        )
}

fn lifecycle_routes<T: Resource + Lifecycle>(
    router: Router<AppState>,
    base: &str,
) -> Router<AppState> {
    record_routes::<T>(router, base)
        .route(
            &format!("{base}/{{id}}"),
            put(update_record::<T>).delete(delete_record::<T>),
        )
        .route(&format!("{base}/{{id}}/toggle"), post(toggle_record::<T>))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_records<T: Resource>(
    State(state): State<AppState>,
    Query(filter): Query<T::Filter>,
) -> Json<ListResponse<T, T::Summary>> {
    let list = T::list(&state);
    let settings = state.session.lock().await.state().settings.clone();
    let records = list.records().await;

    Json(ListResponse {
        status: list.status().await,
        summary: T::summarize(&records, &settings),
        rows: list.rows_matching(&filter).await,
    })
}

async fn new_form<T: Resource>(State(state): State<AppState>) -> Json<T::Form> {
    let settings = state.session.lock().await.state().settings.clone();
    Json(T::blank_form(&settings))
}

async fn create_record<T: Resource>(
    State(state): State<AppState>,
    Json(form): Json<T::Form>,
) -> Result<(StatusCode, Json<T>), ApiError> {
    let settings = state.session.lock().await.state().settings.clone();
    let form = T::with_settings(form, &settings);
    let saved = T::list(&state)
        .submit_form(&form, None)
        .await
        .map_err(record_error)?;
    refresh_cache::<T>(&state).await;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn update_record<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<T::Form>,
) -> Result<Json<T>, ApiError> {
    let saved = T::list(&state)
        .submit_form(&form, Some(id))
        .await
        .map_err(record_error)?;
    refresh_cache::<T>(&state).await;
    Ok(Json(saved))
}

async fn toggle_record<T: Resource + Lifecycle>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<T>, ApiError> {
    let updated = T::list(&state)
        .toggle_status(id)
        .await
        .map_err(record_error)?;
    refresh_cache::<T>(&state).await;
    Ok(Json(updated))
}

async fn delete_record<T: Resource + Lifecycle>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    T::list(&state)
        .permanent_delete(id)
        .await
        .map_err(record_error)?;
    refresh_cache::<T>(&state).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn reload_records<T: Resource>(
    State(state): State<AppState>,
) -> Result<Json<ListStatus>, ApiError> {
    let list = T::list(&state);
    list.retry().await.map_err(record_error)?;
    refresh_cache::<T>(&state).await;
    Ok(Json(list.status().await))
}

async fn load_unscoped_records<T: Resource>(
    State(state): State<AppState>,
) -> Result<Json<ListStatus>, ApiError> {
    let list = T::list(&state);
    list.load_unscoped().await.map_err(record_error)?;
    refresh_cache::<T>(&state).await;
    Ok(Json(list.status().await))
}

async fn validate_journal_entry(
    State(state): State<AppState>,
    Json(form): Json<JournalEntryForm>,
) -> (StatusCode, Json<JournalValidation>) {
    let totals = form.totals();
    match form.submit(&state.company_id, |entry| entry) {
        Ok(entry) => (
            StatusCode::OK,
            Json(JournalValidation {
                totals,
                errors: FieldErrors::new(),
                entry: Some(entry),
            }),
        ),
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(JournalValidation {
                totals,
                errors,
                entry: None,
            }),
        ),
    }
}

async fn get_settings(State(state): State<AppState>) -> Json<AppSettings> {
    Json(state.session.lock().await.state().settings.clone())
}

async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<AppSettings>,
) -> Result<Json<AppSettings>, ApiError> {
    let problems = settings.problems();
    if !problems.is_empty() {
        return Err(invalid_request(problems.join("; ")));
    }

    let mut session = state.session.lock().await;
    session
        .dispatch(Action::UpdateSettings(settings))
        .map_err(internal_error)?;
    Ok(Json(session.state().settings.clone()))
}

async fn update_company(
    State(state): State<AppState>,
    Json(company): Json<CompanySettings>,
) -> Result<Json<AppSettings>, ApiError> {
    if company.name.trim().is_empty() {
        return Err(invalid_request("company name is required"));
    }

    let mut session = state.session.lock().await;
    session
        .dispatch(Action::UpdateCompany(company))
        .map_err(internal_error)?;
    Ok(Json(session.state().settings.clone()))
}

async fn reset_settings(State(state): State<AppState>) -> Result<Json<AppSettings>, ApiError> {
    let mut session = state.session.lock().await;
    session
        .dispatch(Action::ResetSettings)
        .map_err(internal_error)?;
    Ok(Json(session.state().settings.clone()))
}

async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(SessionView {
        is_authenticated: session.state().is_authenticated,
        user: session.state().current_user.clone(),
    })
}

async fn login(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<SessionView>, ApiError> {
    if user.name.trim().is_empty() || user.email.trim().is_empty() {
        return Err(invalid_request("user name and email are required"));
    }

    let mut session = state.session.lock().await;
    session
        .dispatch(Action::Login(user))
        .map_err(internal_error)?;
    info!("session started");
    Ok(Json(SessionView {
        is_authenticated: session.state().is_authenticated,
        user: session.state().current_user.clone(),
    }))
}

async fn logout(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state
        .session
        .lock()
        .await
        .dispatch(Action::Logout)
        .map_err(internal_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn check_permission(
    State(state): State<AppState>,
    Path(permission): Path<String>,
) -> Json<PermissionCheck> {
    let granted = state.session.lock().await.has_permission(&permission);
    Json(PermissionCheck {
        permission,
        granted,
    })
}

fn record_error(err: RecordError) -> ApiError {
    let status = match &err {
        RecordError::Validation(errors) => {
            let body = serde_json::to_string(errors).unwrap_or_else(|_| errors.to_string());
            return (StatusCode::UNPROCESSABLE_ENTITY, body);
        }
        RecordError::ActiveRecord { .. }
        | RecordError::Busy(_)
        | RecordError::Cancelled
        | RecordError::InvalidTransition { .. } => StatusCode::CONFLICT,
        RecordError::NotFound { .. } | RecordError::Persistence(StoreError::NotFound { .. }) => {
            StatusCode::NOT_FOUND
        }
        RecordError::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
        RecordError::ScopedQuery { .. } => StatusCode::BAD_GATEWAY,
        RecordError::Schema { .. } | RecordError::Persistence(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status.is_server_error() {
        error!("request failed: {err}");
    }
    (status, err.to_string())
}

fn invalid_request(err: impl std::fmt::Display) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn internal_error<E: std::fmt::Display>(err: E) -> ApiError {
    error!("internal error: {err}");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mizan_core::StatusFilter;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::*;

    async fn memory_state() -> (AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = build_state(
            &Backend::Memory,
            mizan_core::DEFAULT_COMPANY_ID,
            &dir.path().join("state.json"),
        )
        .await
        .unwrap();
        load_all(&state).await;
        (state, dir)
    }

    fn employee_form(name: &str) -> EmployeeForm {
        EmployeeForm {
            name: name.to_string(),
            position: "محاسب".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            salary: Decimal::new(9000, 0),
            ..EmployeeForm::default()
        }
    }

    #[tokio::test]
    async fn created_employee_is_listed_and_cached() {
        let (state, _dir) = memory_state().await;

        let (status, Json(saved)) =
            create_record::<Employee>(State(state.clone()), Json(employee_form("ليلى")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(saved.employee_code.starts_with("EMP-"));

        let Json(listing) =
            list_records::<Employee>(State(state.clone()), Query(EmployeeFilter::default())).await;
        assert_eq!(listing.rows.len(), 1);
        assert_eq!(listing.summary.active, 1);
        assert_eq!(listing.summary.monthly_payroll, Decimal::new(9000, 0));

        let cached = state.session.lock().await.state().employees.clone();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].id, saved.id);
    }

    #[tokio::test]
    async fn invalid_form_is_unprocessable() {
        let (state, _dir) = memory_state().await;

        let (status, body) = create_record::<Employee>(
            State(state),
            Json(EmployeeForm {
                name: String::new(),
                ..employee_form("")
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("name"));
    }

    #[tokio::test]
    async fn active_records_cannot_be_deleted_until_toggled() {
        let (state, _dir) = memory_state().await;
        let (_, Json(saved)) =
            create_record::<Employee>(State(state.clone()), Json(employee_form("عمر")))
                .await
                .unwrap();

        let (status, _) = delete_record::<Employee>(State(state.clone()), Path(saved.id))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);

        let Json(toggled) = toggle_record::<Employee>(State(state.clone()), Path(saved.id))
            .await
            .unwrap();
        assert!(!toggled.is_active);

        let status = delete_record::<Employee>(State(state.clone()), Path(saved.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(listing) = list_records::<Employee>(
            State(state),
            Query(EmployeeFilter {
                status: StatusFilter::All,
                ..EmployeeFilter::default()
            }),
        )
        .await;
        assert!(listing.rows.is_empty());
    }

    #[tokio::test]
    async fn unknown_record_is_not_found() {
        let (state, _dir) = memory_state().await;
        let (status, _) = toggle_record::<Project>(State(state), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unbalanced_journal_entry_is_rejected() {
        let (state, _dir) = memory_state().await;
        let form: JournalEntryForm = serde_json::from_value(serde_json::json!({
            "date": "2024-03-01",
            "reference": "INV-7",
            "description": "تسوية",
            "lines": [
                { "debit": "100", "credit": "0" },
                { "debit": "0", "credit": "50" }
            ]
        }))
        .unwrap();

        let (status, Json(result)) = validate_journal_entry(State(state), Json(form)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!result.totals.balanced);
        assert!(result.errors.contains("lines"));
        assert!(result.entry.is_none());
    }

    #[tokio::test]
    async fn balanced_journal_entry_is_accepted() {
        let (state, _dir) = memory_state().await;
        let mut form = JournalEntryForm::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        form.reference = "INV-8".to_string();
        form.description = "قيد افتتاحي".to_string();
        form.add_line();
        form.set_line_amounts(0, Decimal::new(100, 0), Decimal::ZERO)
            .unwrap();
        form.set_line_amounts(1, Decimal::ZERO, Decimal::new(100, 0))
            .unwrap();

        let (status, Json(result)) = validate_journal_entry(State(state), Json(form)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(result.totals.balanced);
        let entry = result.entry.unwrap();
        assert_eq!(entry.lines.len(), 2);
        assert_eq!(entry.company_id, mizan_core::DEFAULT_COMPANY_ID);
    }

    #[tokio::test]
    async fn out_of_range_settings_are_refused() {
        let (state, _dir) = memory_state().await;
        let mut settings = AppSettings::default();
        settings.hr.working_days_per_month = 40;

        let (status, body) = update_settings(State(state.clone()), Json(settings))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("working_days_per_month"));

        let Json(current) = get_settings(State(state)).await;
        assert_eq!(current, AppSettings::default());
    }

    #[tokio::test]
    async fn configured_defaults_reach_new_records() {
        let (state, _dir) = memory_state().await;
        let mut settings = AppSettings::default();
        settings.hr.employee_code_prefix = "STAFF".to_string();
        settings.hr.default_salary_type = mizan_core::SalaryType::Daily;
        settings.projects.project_code_prefix = "SITE".to_string();
        settings.projects.default_status = mizan_core::ProjectStatus::Active;
        update_settings(State(state.clone()), Json(settings))
            .await
            .unwrap();

        let Json(template) = new_form::<Employee>(State(state.clone())).await;
        assert_eq!(template.salary_type, mizan_core::SalaryType::Daily);
        let Json(template) = new_form::<Project>(State(state.clone())).await;
        assert_eq!(template.status, mizan_core::ProjectStatus::Active);

        let (_, Json(employee)) =
            create_record::<Employee>(State(state.clone()), Json(employee_form("هند")))
                .await
                .unwrap();
        assert!(mizan_core::is_generated_code("STAFF", &employee.employee_code));

        let (_, Json(project)) = create_record::<Project>(
            State(state),
            Json(ProjectForm {
                name: "مستودع الدمام".to_string(),
                ..ProjectForm::default()
            }),
        )
        .await
        .unwrap();
        assert!(mizan_core::is_generated_code("SITE", &project.project_code));
    }

    #[tokio::test]
    async fn permissions_follow_the_session() {
        let (state, _dir) = memory_state().await;
        let user = User {
            id: Uuid::new_v4(),
            name: "سلمان".to_string(),
            email: "salman@example.com".to_string(),
            role: mizan_app::UserRole::Employee,
            permissions: vec!["projects.view".to_string()],
        };

        login(State(state.clone()), Json(user)).await.unwrap();
        let Json(check) =
            check_permission(State(state.clone()), Path("projects.view".to_string())).await;
        assert!(check.granted);

        logout(State(state.clone())).await.unwrap();
        let Json(check) = check_permission(State(state), Path("projects.view".to_string())).await;
        assert!(!check.granted);
    }
}
