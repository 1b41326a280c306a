use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

/// A persisted entity owned by a company scope.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;
    const LABEL: &'static str;

    fn id(&self) -> Uuid;
    fn company_id(&self) -> &str;
}

pub trait Searchable {
    /// Case-insensitive match of a free-text search term.
    fn matches(&self, term: &str) -> bool;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data store unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("{table} record {id} not found")]
    NotFound { table: &'static str, id: Uuid },
    #[error("record encoding failed: {0}")]
    Encoding(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Encoding(err.to_string())
    }
}

/// Filter for the generic query escape hatch. `company_id: None` is unscoped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub company_id: Option<String>,
    pub active: Option<bool>,
}

impl RecordQuery {
    pub fn scoped(company_id: &str) -> Self {
        Self {
            company_id: Some(company_id.to_string()),
            active: None,
        }
    }

    pub fn unscoped() -> Self {
        Self::default()
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn is_scoped(&self) -> bool {
        self.company_id.is_some()
    }

    pub fn accepts(&self, company_id: &str, is_active: Option<bool>) -> bool {
        let company_ok = self
            .company_id
            .as_deref()
            .is_none_or(|scope| scope == company_id);
        let active_ok = match (self.active, is_active) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        };
        company_ok && active_ok
    }
}

/// Partial update: only the named fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordPatch(Map<String, Value>);

const PROTECTED_FIELDS: [&str; 3] = ["id", "company_id", "created_at"];

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Serialize) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Serialize) {
        if PROTECTED_FIELDS.contains(&field) {
            return;
        }
        self.0.insert(field.to_string(), json!(value));
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn touched(self, at: DateTime<Utc>) -> Self {
        self.with("updated_at", at)
    }

    pub fn as_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Merges the patch over a serialized copy of `record`.
    pub fn apply_to<T: Record>(&self, record: &T) -> Result<T, StoreError> {
        let mut current = serde_json::to_value(record)?;
        let Value::Object(fields) = &mut current else {
            return Err(StoreError::Encoding(format!(
                "{} does not serialize to an object",
                T::LABEL
            )));
        };
        for (field, value) in &self.0 {
            if !fields.contains_key(field) {
                return Err(StoreError::Encoding(format!(
                    "unknown {} field '{}'",
                    T::LABEL,
                    field
                )));
            }
            fields.insert(field.clone(), value.clone());
        }
        Ok(serde_json::from_value(current)?)
    }
}

/// Remote data store client for one entity table.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    async fn test_connection(&self) -> Result<bool, StoreError>;
    async fn check_table_structure(&self) -> Result<bool, StoreError>;
    async fn get_all(&self, company_id: &str) -> Result<Vec<T>, StoreError>;
    async fn query(&self, query: &RecordQuery) -> Result<Vec<T>, StoreError>;
    async fn add(&self, record: T) -> Result<T, StoreError>;
    async fn update(&self, id: Uuid, patch: RecordPatch) -> Result<T, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
