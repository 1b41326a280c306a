use std::sync::Arc;

use mizan_core::{
    Lifecycle, Record, RecordError, RecordForm, RecordQuery, RecordStore, RowFilter, SaveRequest,
    StoreError, toggle_patch,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::in_flight::InFlight;
use crate::messages;
use crate::ports::{Confirmer, Notice, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailureKind {
    Connectivity,
    Schema,
    ScopedQuery,
    Persistence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    Scoped,
    /// Every company's rows; only entered on explicit operator request.
    Unscoped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListStatus {
    Idle,
    Loading,
    Ready {
        mode: LoadMode,
    },
    /// Sticky until `retry` or `load_unscoped` succeeds.
    Failed {
        kind: LoadFailureKind,
        message: String,
    },
}

/// Loaded collection of one entity plus the actions its rows expose.
pub struct RecordList<T, S: ?Sized> {
    store: Arc<S>,
    company_id: String,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
    records: RwLock<Vec<T>>,
    status: RwLock<ListStatus>,
    mode: RwLock<LoadMode>,
    in_flight: InFlight,
}

impl<T, S> RecordList<T, S>
where
    T: Record,
    S: RecordStore<T> + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        company_id: impl Into<String>,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            company_id: company_id.into(),
            confirmer,
            notifier,
            records: RwLock::new(Vec::new()),
            status: RwLock::new(ListStatus::Idle),
            mode: RwLock::new(LoadMode::Scoped),
            in_flight: InFlight::new(),
        }
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub async fn status(&self) -> ListStatus {
        self.status.read().await.clone()
    }

    pub async fn records(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    pub async fn find(&self, id: Uuid) -> Option<T> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    pub async fn rows_matching<F: RowFilter<T>>(&self, filter: &F) -> Vec<T> {
        self.records
            .read()
            .await
            .iter()
            .filter(|record| filter.accepts(record))
            .cloned()
            .collect()
    }

    /// Whether the row's action controls should be disabled.
    pub fn is_busy(&self, id: Uuid) -> bool {
        self.in_flight.contains(id)
    }

    /// Connection check, then table check, then the company-scoped query.
    pub async fn load(&self) -> Result<(), RecordError> {
        *self.status.write().await = ListStatus::Loading;

        let result = match self.ensure_reachable().await {
            Ok(()) => self.store.get_all(&self.company_id).await.map_err(|err| {
                match err {
                    StoreError::Unavailable(message) => RecordError::Connectivity(message),
                    encoding @ StoreError::Encoding(_) => RecordError::Persistence(encoding),
                    other => RecordError::ScopedQuery {
                        company_id: self.company_id.clone(),
                        message: other.to_string(),
                    },
                }
            }),
            Err(err) => Err(err),
        };

        self.finish_load(result, LoadMode::Scoped).await
    }

    /// Manual retry after a failed load.
    pub async fn retry(&self) -> Result<(), RecordError> {
        info!(table = T::TABLE, "retrying load");
        self.load().await
    }

    /// Operator-requested fetch across every company scope.
    pub async fn load_unscoped(&self) -> Result<(), RecordError> {
        warn!(
            table = T::TABLE,
            company_id = %self.company_id,
            "loading rows without company scope"
        );
        let loaded = self.fetch_unscoped().await;
        if loaded.is_ok() {
            self.notifier
                .notify(Notice::info(messages::unscoped_rows()))
                .await;
        }
        loaded
    }

    async fn fetch_unscoped(&self) -> Result<(), RecordError> {
        *self.status.write().await = ListStatus::Loading;

        let result = match self.ensure_reachable().await {
            Ok(()) => self
                .store
                .query(&RecordQuery::unscoped())
                .await
                .map_err(|err| match err {
                    StoreError::Unavailable(message) => RecordError::Connectivity(message),
                    other => RecordError::Persistence(other),
                }),
            Err(err) => Err(err),
        };

        self.finish_load(result, LoadMode::Unscoped).await
    }

    /// Creates or updates through the store, then reloads.
    pub async fn save(&self, request: SaveRequest<T>) -> Result<T, RecordError> {
        let (id, created) = match &request {
            SaveRequest::Create(record) => (record.id(), true),
            SaveRequest::Update { id, .. } => (*id, false),
        };
        let _guard = self.in_flight.try_begin(id).ok_or(RecordError::Busy(id))?;

        let outcome = match request {
            SaveRequest::Create(record) => self.store.add(record).await,
            SaveRequest::Update { id, patch } if patch.is_empty() => {
                debug!(table = T::TABLE, %id, "no changed fields; skipping update");
                return self.find(id).await.ok_or(RecordError::NotFound {
                    label: T::LABEL,
                    id,
                });
            }
            SaveRequest::Update { id, patch } => self.store.update(id, patch).await,
        };

        match outcome {
            Ok(saved) => {
                info!(table = T::TABLE, %id, created, "record saved");
                self.notifier
                    .notify(Notice::success(messages::saved(T::LABEL, created)))
                    .await;
                self.reload().await;
                Ok(saved)
            }
            Err(err) => {
                error!(table = T::TABLE, %id, "failed to save record: {err}");
                self.notifier
                    .notify(Notice::error(messages::save_failed(
                        T::LABEL,
                        &err.to_string(),
                    )))
                    .await;
                Err(RecordError::Persistence(err))
            }
        }
    }

    /// Validates `form` against the loaded record (if editing) and saves it.
    /// Validation failures never reach the store.
    pub async fn submit_form<F>(&self, form: &F, existing_id: Option<Uuid>) -> Result<T, RecordError>
    where
        F: RecordForm<Record = T>,
    {
        let existing = match existing_id {
            Some(id) => Some(self.find(id).await.ok_or(RecordError::NotFound {
                label: T::LABEL,
                id,
            })?),
            None => None,
        };

        let request = form
            .submit(existing.as_ref(), &self.company_id)
            .map_err(RecordError::Validation)?;
        self.save(request).await
    }

    async fn ensure_reachable(&self) -> Result<(), RecordError> {
        match self.store.test_connection().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(RecordError::Connectivity(format!(
                    "data store did not answer the connection check for {}",
                    T::TABLE
                )));
            }
            Err(err) => return Err(RecordError::Connectivity(err.to_string())),
        }

        match self.store.check_table_structure().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(RecordError::Schema { table: T::TABLE }),
            Err(StoreError::Unavailable(message)) => Err(RecordError::Connectivity(message)),
            Err(err) => {
                error!(table = T::TABLE, "table structure check failed: {err}");
                Err(RecordError::Schema { table: T::TABLE })
            }
        }
    }

    async fn finish_load(
        &self,
        result: Result<Vec<T>, RecordError>,
        mode: LoadMode,
    ) -> Result<(), RecordError> {
        match result {
            Ok(rows) => {
                info!(table = T::TABLE, count = rows.len(), ?mode, "records loaded");
                *self.records.write().await = rows;
                *self.mode.write().await = mode;
                *self.status.write().await = ListStatus::Ready { mode };
                Ok(())
            }
            Err(err) => {
                error!(table = T::TABLE, "failed to load records: {err}");
                let kind = match &err {
                    RecordError::Connectivity(_) => LoadFailureKind::Connectivity,
                    RecordError::Schema { .. } => LoadFailureKind::Schema,
                    RecordError::Persistence(_) => LoadFailureKind::Persistence,
                    _ => LoadFailureKind::ScopedQuery,
                };
                *self.status.write().await = ListStatus::Failed {
                    kind,
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    /// Refetch after a successful mutation, keeping the current load mode.
    async fn reload(&self) {
        let mode = *self.mode.read().await;
        let reloaded = match mode {
            LoadMode::Scoped => self.load().await,
            LoadMode::Unscoped => self.fetch_unscoped().await,
        };
        if let Err(err) = reloaded {
            warn!(table = T::TABLE, "reload after change failed: {err}");
        }
    }
}

impl<T, S> RecordList<T, S>
where
    T: Lifecycle,
    S: RecordStore<T> + ?Sized,
{
    /// Flips `is_active` after confirmation. The loaded rows only change
    /// through the reload that follows a successful update.
    pub async fn toggle_status(&self, id: Uuid) -> Result<T, RecordError> {
        let _guard = self.in_flight.try_begin(id).ok_or(RecordError::Busy(id))?;
        let record = self.find(id).await.ok_or(RecordError::NotFound {
            label: T::LABEL,
            id,
        })?;
        let patch = toggle_patch(&record)?;
        let activating = !record.is_active();

        if !self
            .confirmer
            .confirm(&messages::confirm_toggle(T::LABEL, activating))
            .await
        {
            return Err(RecordError::Cancelled);
        }

        match self.store.update(id, patch).await {
            Ok(updated) => {
                info!(table = T::TABLE, %id, is_active = activating, "record status toggled");
                self.notifier
                    .notify(Notice::success(messages::toggled(T::LABEL, activating)))
                    .await;
                self.reload().await;
                Ok(updated)
            }
            Err(err) => {
                error!(table = T::TABLE, %id, "failed to toggle record status: {err}");
                self.notifier
                    .notify(Notice::error(messages::action_failed(&err.to_string())))
                    .await;
                Err(RecordError::Persistence(err))
            }
        }
    }

    /// Irreversible delete, only for inactive records.
    pub async fn permanent_delete(&self, id: Uuid) -> Result<(), RecordError> {
        let _guard = self.in_flight.try_begin(id).ok_or(RecordError::Busy(id))?;
        let record = self.find(id).await.ok_or(RecordError::NotFound {
            label: T::LABEL,
            id,
        })?;

        if let Err(err) = record.ensure_deletable() {
            warn!(table = T::TABLE, %id, "refused to delete active record");
            self.notifier
                .notify(Notice::error(messages::delete_active(T::LABEL)))
                .await;
            return Err(err);
        }

        if !self
            .confirmer
            .confirm(&messages::confirm_delete(T::LABEL))
            .await
        {
            return Err(RecordError::Cancelled);
        }

        match self.store.delete(id).await {
            Ok(()) => {
                info!(table = T::TABLE, %id, "record permanently deleted");
                self.notifier
                    .notify(Notice::success(messages::deleted(T::LABEL)))
                    .await;
                self.reload().await;
                Ok(())
            }
            Err(err) => {
                error!(table = T::TABLE, %id, "failed to delete record: {err}");
                self.notifier
                    .notify(Notice::error(messages::action_failed(&err.to_string())))
                    .await;
                Err(RecordError::Persistence(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use mizan_core::{BankAccount, DEFAULT_COMPANY_ID, Employee, is_generated_code};
    use mizan_finance::BankAccountForm;
    use mizan_store::{Faults, InMemoryStore};
    use mizan_workforce::{EmployeeFilter, EmployeeForm};
    use rust_decimal::Decimal;

    use super::*;
    use crate::ports::{AutoConfirm, NoticeLevel};

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        fn levels(&self) -> Vec<NoticeLevel> {
            self.notices
                .lock()
                .unwrap()
                .iter()
                .map(|notice| notice.level)
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    struct Decline {
        asked: AtomicBool,
    }

    #[async_trait]
    impl Confirmer for Decline {
        async fn confirm(&self, _prompt: &str) -> bool {
            self.asked.store(true, Ordering::SeqCst);
            false
        }
    }

    fn employee_form(name: &str, is_active: bool) -> EmployeeForm {
        EmployeeForm {
            name: name.to_string(),
            position: "مهندس".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2024, 9, 1),
            salary: Decimal::from(7000),
            is_active,
            ..EmployeeForm::default()
        }
    }

    fn seeded(records: Vec<Employee>) -> Arc<InMemoryStore<Employee>> {
        Arc::new(InMemoryStore::with_records(records))
    }

    fn list_over(
        store: Arc<InMemoryStore<Employee>>,
        notifier: Arc<RecordingNotifier>,
    ) -> RecordList<Employee, InMemoryStore<Employee>> {
        RecordList::new(store, DEFAULT_COMPANY_ID, Arc::new(AutoConfirm), notifier)
    }

    fn build(form: EmployeeForm) -> Employee {
        form.build(None, DEFAULT_COMPANY_ID).unwrap()
    }

    #[tokio::test]
    async fn failed_connection_stops_before_any_query() {
        let store = seeded(vec![build(employee_form("a", true))]);
        store
            .set_faults(Faults {
                offline: true,
                schema_mismatch: true,
                ..Faults::default()
            })
            .await;
        let list = list_over(store.clone(), Arc::default());

        let err = list.load().await.unwrap_err();

        assert!(matches!(err, RecordError::Connectivity(_)));
        let calls = store.calls().await;
        assert_eq!(calls.structure_checks, 0);
        assert_eq!(calls.queries, 0);
        assert!(matches!(
            list.status().await,
            ListStatus::Failed {
                kind: LoadFailureKind::Connectivity,
                ..
            }
        ));
        assert!(list.records().await.is_empty());
    }

    #[tokio::test]
    async fn schema_mismatch_is_reported_and_retry_recovers() {
        let store = seeded(vec![build(employee_form("a", true))]);
        store
            .set_faults(Faults {
                schema_mismatch: true,
                ..Faults::default()
            })
            .await;
        let list = list_over(store.clone(), Arc::default());

        assert!(matches!(
            list.load().await,
            Err(RecordError::Schema { table: "employees" })
        ));
        assert_eq!(store.calls().await.queries, 0);

        store.set_faults(Faults::default()).await;
        list.retry().await.unwrap();
        assert_eq!(
            list.status().await,
            ListStatus::Ready {
                mode: LoadMode::Scoped
            }
        );
        assert_eq!(list.records().await.len(), 1);
    }

    #[tokio::test]
    async fn scoped_query_failure_does_not_fall_back_silently() {
        let mut foreign = build(employee_form("foreign", true));
        foreign.company_id = "another-company".to_string();
        let store = seeded(vec![build(employee_form("local", true)), foreign]);
        store
            .set_faults(Faults {
                scoped_query_fails: true,
                ..Faults::default()
            })
            .await;
        let list = list_over(store.clone(), Arc::default());

        let err = list.load().await.unwrap_err();
        assert!(matches!(err, RecordError::ScopedQuery { .. }));
        assert!(list.records().await.is_empty());
        assert_eq!(store.calls().await.queries, 1);

        list.load_unscoped().await.unwrap();
        assert_eq!(list.records().await.len(), 2);
        assert_eq!(
            list.status().await,
            ListStatus::Ready {
                mode: LoadMode::Unscoped
            }
        );
    }

    #[tokio::test]
    async fn undecodable_rows_surface_as_persistence_failure() {
        let store = seeded(vec![build(employee_form("local", true))]);
        store
            .set_faults(Faults {
                corrupt_rows: true,
                ..Faults::default()
            })
            .await;
        let list = list_over(store.clone(), Arc::default());

        let err = list.load().await.unwrap_err();

        assert!(matches!(err, RecordError::Persistence(StoreError::Encoding(_))));
        assert!(matches!(
            list.status().await,
            ListStatus::Failed {
                kind: LoadFailureKind::Persistence,
                ..
            }
        ));
        assert!(list.records().await.is_empty());
    }

    #[tokio::test]
    async fn unscoped_notice_is_shown_once_per_operator_request() {
        let mut foreign = build(employee_form("foreign", true));
        foreign.company_id = "another-company".to_string();
        let local = build(employee_form("local", true));
        let store = seeded(vec![local.clone(), foreign]);
        let notifier = Arc::new(RecordingNotifier::default());
        let list = list_over(store.clone(), notifier.clone());

        list.load_unscoped().await.unwrap();
        list.toggle_status(local.id).await.unwrap();

        assert_eq!(notifier.levels(), vec![NoticeLevel::Info, NoticeLevel::Success]);
        assert_eq!(
            list.status().await,
            ListStatus::Ready {
                mode: LoadMode::Unscoped
            }
        );
        assert_eq!(list.records().await.len(), 2);
    }

    #[tokio::test]
    async fn deleting_active_record_never_calls_store() {
        let active = build(employee_form("active", true));
        let store = seeded(vec![active.clone()]);
        let notifier = Arc::new(RecordingNotifier::default());
        let list = list_over(store.clone(), notifier.clone());
        list.load().await.unwrap();

        let err = list.permanent_delete(active.id).await.unwrap_err();

        assert!(matches!(err, RecordError::ActiveRecord { .. }));
        assert_eq!(store.calls().await.deletes, 0);
        assert_eq!(list.records().await.len(), 1);
        assert_eq!(notifier.levels(), vec![NoticeLevel::Error]);
    }

    #[tokio::test]
    async fn deleting_inactive_record_removes_it_after_reload() {
        let inactive = build(employee_form("inactive", false));
        let kept = build(employee_form("kept", true));
        let store = seeded(vec![inactive.clone(), kept.clone()]);
        let list = list_over(store.clone(), Arc::default());
        list.load().await.unwrap();

        list.permanent_delete(inactive.id).await.unwrap();

        let ids: Vec<Uuid> = list.records().await.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![kept.id]);
        assert_eq!(store.calls().await.deletes, 1);
        assert!(!list.is_busy(inactive.id));
    }

    #[tokio::test]
    async fn toggle_then_delete_walks_the_lifecycle() {
        let employee = build(employee_form("cycle", true));
        let store = seeded(vec![employee.clone()]);
        let list = list_over(store.clone(), Arc::default());
        list.load().await.unwrap();

        let toggled = list.toggle_status(employee.id).await.unwrap();
        assert!(!toggled.is_active);
        assert!(!list.find(employee.id).await.unwrap().is_active);

        list.permanent_delete(employee.id).await.unwrap();
        assert!(list.records().await.is_empty());
    }

    #[tokio::test]
    async fn failed_toggle_leaves_rows_unchanged() {
        let employee = build(employee_form("stuck", true));
        let store = seeded(vec![employee.clone()]);
        let notifier = Arc::new(RecordingNotifier::default());
        let list = list_over(store.clone(), notifier.clone());
        list.load().await.unwrap();
        store
            .set_faults(Faults {
                writes_fail: true,
                ..Faults::default()
            })
            .await;

        let err = list.toggle_status(employee.id).await.unwrap_err();

        assert!(matches!(err, RecordError::Persistence(_)));
        assert!(list.find(employee.id).await.unwrap().is_active);
        assert_eq!(notifier.levels(), vec![NoticeLevel::Error]);
    }

    #[tokio::test]
    async fn declined_confirmation_cancels_without_store_call() {
        let inactive = build(employee_form("keep me", false));
        let store = seeded(vec![inactive.clone()]);
        let decline = Arc::new(Decline {
            asked: AtomicBool::new(false),
        });
        let list = RecordList::new(
            store.clone(),
            DEFAULT_COMPANY_ID,
            decline.clone(),
            Arc::new(RecordingNotifier::default()),
        );
        list.load().await.unwrap();

        assert!(matches!(
            list.permanent_delete(inactive.id).await,
            Err(RecordError::Cancelled)
        ));
        assert!(matches!(
            list.toggle_status(inactive.id).await,
            Err(RecordError::Cancelled)
        ));
        assert!(decline.asked.load(Ordering::SeqCst));
        let calls = store.calls().await;
        assert_eq!(calls.deletes + calls.updates, 0);
    }

    #[tokio::test]
    async fn busy_record_rejects_second_action() {
        let employee = build(employee_form("busy", false));
        let store = seeded(vec![employee.clone()]);
        let list = list_over(store.clone(), Arc::default());
        list.load().await.unwrap();

        let _held = list.in_flight.try_begin(employee.id).unwrap();
        assert!(list.is_busy(employee.id));
        assert!(matches!(
            list.toggle_status(employee.id).await,
            Err(RecordError::Busy(_))
        ));
        assert!(list.is_busy(employee.id));
        assert!(matches!(
            list.permanent_delete(employee.id).await,
            Err(RecordError::Busy(_))
        ));
        assert!(list.is_busy(employee.id));
        let calls = store.calls().await;
        assert_eq!(calls.updates, 0);
        assert_eq!(calls.deletes, 0);
    }

    #[tokio::test]
    async fn create_generates_code_and_reloads() {
        let store = seeded(Vec::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let list = list_over(store.clone(), notifier.clone());
        list.load().await.unwrap();

        let created = list
            .submit_form(&employee_form("جديد", true), None)
            .await
            .unwrap();

        assert!(is_generated_code("EMP", &created.employee_code));
        assert_eq!(created.company_id, DEFAULT_COMPANY_ID);
        assert_eq!(list.records().await, vec![created]);
        assert_eq!(notifier.levels(), vec![NoticeLevel::Success]);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_store() {
        let store = seeded(Vec::new());
        let list = list_over(store.clone(), Arc::default());
        list.load().await.unwrap();

        let err = list
            .submit_form(&EmployeeForm::default(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, RecordError::Validation(ref errors) if errors.contains("name")));
        assert_eq!(store.calls().await.adds, 0);
    }

    #[tokio::test]
    async fn failed_save_is_notified_and_returned() {
        let store = seeded(Vec::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let list = list_over(store.clone(), notifier.clone());
        list.load().await.unwrap();
        store
            .set_faults(Faults {
                writes_fail: true,
                ..Faults::default()
            })
            .await;

        let err = list
            .submit_form(&employee_form("x", true), None)
            .await
            .unwrap_err();

        assert!(matches!(err, RecordError::Persistence(_)));
        assert_eq!(notifier.levels(), vec![NoticeLevel::Error]);
        assert!(list.records().await.is_empty());
    }

    #[tokio::test]
    async fn update_sends_only_changed_fields() {
        let employee = build(employee_form("before", true));
        let store = seeded(vec![employee.clone()]);
        let list = list_over(store.clone(), Arc::default());
        list.load().await.unwrap();

        let mut form = EmployeeForm::from_record(&employee);
        form.name = "after".to_string();
        let updated = list.submit_form(&form, Some(employee.id)).await.unwrap();

        assert_eq!(updated.name, "after");
        assert_eq!(updated.employee_code, employee.employee_code);
        assert_eq!(store.calls().await.updates, 1);

        let unchanged = EmployeeForm::from_record(&updated);
        list.submit_form(&unchanged, Some(employee.id)).await.unwrap();
        assert_eq!(store.calls().await.updates, 1);
    }

    #[tokio::test]
    async fn filtered_rows_follow_the_filter() {
        let store = seeded(vec![
            build(employee_form("Huda", true)),
            build(employee_form("Karim", false)),
        ]);
        let list = list_over(store, Arc::default());
        list.load().await.unwrap();

        let filter = EmployeeFilter {
            term: "hud".to_string(),
            ..EmployeeFilter::default()
        };
        let rows = list.rows_matching(&filter).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Huda");
    }

    #[tokio::test]
    async fn bank_account_balance_edits_do_not_reach_store() {
        let store: Arc<InMemoryStore<BankAccount>> = Arc::new(InMemoryStore::new());
        let list = RecordList::new(
            store.clone(),
            DEFAULT_COMPANY_ID,
            Arc::new(AutoConfirm),
            Arc::new(RecordingNotifier::default()),
        );
        list.load().await.unwrap();

        let form = BankAccountForm {
            account_name: "الحساب الرئيسي".to_string(),
            bank_name: "البنك الأهلي".to_string(),
            account_number: "001".to_string(),
            opening_balance: Decimal::from(500),
            ..BankAccountForm::default()
        };
        let created = list.submit_form(&form, None).await.unwrap();
        assert_eq!(created.current_balance, Decimal::from(500));

        let mut edit = BankAccountForm::from_record(&created);
        edit.current_balance = Decimal::from(1_000_000);
        list.submit_form(&edit, Some(created.id)).await.unwrap();

        let stored = &store.snapshot().await[0];
        assert_eq!(stored.current_balance, Decimal::from(500));
        assert_eq!(stored.opening_balance, Decimal::from(500));
    }
}
