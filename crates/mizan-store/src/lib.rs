use async_trait::async_trait;
use chrono::Utc;
use mizan_core::{Record, RecordPatch, RecordQuery, RecordStore, StoreError};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Failure switches for exercising the load guard and error paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Faults {
    pub offline: bool,
    pub schema_mismatch: bool,
    pub scoped_query_fails: bool,
    pub writes_fail: bool,
    pub corrupt_rows: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub connection_checks: usize,
    pub structure_checks: usize,
    pub queries: usize,
    pub adds: usize,
    pub updates: usize,
    pub deletes: usize,
}

/// Process-local record table. Rows keep insertion order.
pub struct InMemoryStore<T> {
    rows: RwLock<Vec<T>>,
    faults: RwLock<Faults>,
    calls: RwLock<CallCounts>,
}

impl<T: Record> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::with_records(Vec::new())
    }
}

impl<T: Record> InMemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            rows: RwLock::new(records),
            faults: RwLock::new(Faults::default()),
            calls: RwLock::new(CallCounts::default()),
        }
    }

    pub async fn set_faults(&self, faults: Faults) {
        *self.faults.write().await = faults;
    }

    pub async fn calls(&self) -> CallCounts {
        *self.calls.read().await
    }

    pub async fn snapshot(&self) -> Vec<T> {
        self.rows.read().await.clone()
    }

    async fn faults(&self) -> Faults {
        *self.faults.read().await
    }

    async fn ensure_online(&self) -> Result<(), StoreError> {
        if self.faults().await.offline {
            return Err(StoreError::Unavailable(format!(
                "{} store is offline",
                T::TABLE
            )));
        }
        Ok(())
    }

    async fn ensure_writable(&self) -> Result<(), StoreError> {
        self.ensure_online().await?;
        if self.faults().await.writes_fail {
            return Err(StoreError::Query(format!("write to {} rejected", T::TABLE)));
        }
        Ok(())
    }

    fn row_is_active(row: &T) -> Result<Option<bool>, StoreError> {
        let encoded = serde_json::to_value(row)?;
        Ok(encoded.get("is_active").and_then(Value::as_bool))
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for InMemoryStore<T> {
    async fn test_connection(&self) -> Result<bool, StoreError> {
        self.calls.write().await.connection_checks += 1;
        Ok(!self.faults().await.offline)
    }

    async fn check_table_structure(&self) -> Result<bool, StoreError> {
        self.calls.write().await.structure_checks += 1;
        self.ensure_online().await?;
        Ok(!self.faults().await.schema_mismatch)
    }

    async fn get_all(&self, company_id: &str) -> Result<Vec<T>, StoreError> {
        self.query(&RecordQuery::scoped(company_id)).await
    }

    async fn query(&self, query: &RecordQuery) -> Result<Vec<T>, StoreError> {
        self.calls.write().await.queries += 1;
        self.ensure_online().await?;
        if query.is_scoped() && self.faults().await.scoped_query_fails {
            return Err(StoreError::Query(format!(
                "column company_id missing on {}",
                T::TABLE
            )));
        }

        if self.faults().await.corrupt_rows {
            return Err(StoreError::Encoding(format!(
                "stored {} payload does not decode",
                T::TABLE
            )));
        }

        let rows = self.rows.read().await;
        let mut matched = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            if query.accepts(row.company_id(), Self::row_is_active(row)?) {
                matched.push(row.clone());
            }
        }
        debug!(table = T::TABLE, count = matched.len(), "in-memory query");
        Ok(matched)
    }

    async fn add(&self, record: T) -> Result<T, StoreError> {
        self.calls.write().await.adds += 1;
        self.ensure_writable().await?;

        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.id() == record.id()) {
            return Err(StoreError::Query(format!(
                "duplicate key {} in {}",
                record.id(),
                T::TABLE
            )));
        }
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: RecordPatch) -> Result<T, StoreError> {
        self.calls.write().await.updates += 1;
        self.ensure_writable().await?;

        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or(StoreError::NotFound {
                table: T::TABLE,
                id,
            })?;
        let updated = patch.touched(Utc::now()).apply_to(&*row)?;
        *row = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.calls.write().await.deletes += 1;
        self.ensure_writable().await?;

        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(StoreError::NotFound {
                table: T::TABLE,
                id,
            });
        }
        Ok(())
    }
}
